//! The fixed four-port contract the plugin exposes to hosts: mono audio in,
//! mono audio out and two control scalars.

use crate::notch::{HarmonicNotchCascade, MAX_STAGES};

pub const PORT_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    Input = 0,
    Output = 1,
    BaseFrequency = 2,
    Harmonics = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    Audio,
    Control,
}

/// Bounds and scaling of a control port. The default is always the middle of
/// the range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeHint {
    pub lower: f32,
    pub upper: f32,
    pub logarithmic: bool,
    pub integer: bool,
}

impl RangeHint {
    /// The "middle" default as LADSPA hosts compute it: the geometric mean for
    /// logarithmic ranges, the arithmetic mean otherwise.
    pub fn default_value(&self) -> f32 {
        let middle = if self.logarithmic {
            (self.lower.ln() * 0.5 + self.upper.ln() * 0.5).exp()
        } else {
            self.lower * 0.5 + self.upper * 0.5
        };

        if self.integer {
            middle.round()
        } else {
            middle
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortDescriptor {
    pub name: &'static str,
    pub direction: PortDirection,
    pub kind: PortKind,
    pub hint: Option<RangeHint>,
}

pub const BASE_FREQUENCY_HINT: RangeHint = RangeHint {
    lower: 50.0,
    upper: 20000.0,
    logarithmic: true,
    integer: false,
};

// Padded so rounding hosts still land on 1 and MAX_STAGES
pub const HARMONICS_HINT: RangeHint = RangeHint {
    lower: 0.9,
    upper: 0.1 + MAX_STAGES as f32,
    logarithmic: false,
    integer: true,
};

pub static PORTS: [PortDescriptor; PORT_COUNT] = [
    PortDescriptor {
        name: "Input",
        direction: PortDirection::Input,
        kind: PortKind::Audio,
        hint: None,
    },
    PortDescriptor {
        name: "Output",
        direction: PortDirection::Output,
        kind: PortKind::Audio,
        hint: None,
    },
    PortDescriptor {
        name: "Base frequency",
        direction: PortDirection::Input,
        kind: PortKind::Control,
        hint: Some(BASE_FREQUENCY_HINT),
    },
    PortDescriptor {
        name: "Number of harmonics",
        direction: PortDirection::Input,
        kind: PortKind::Control,
        hint: Some(HARMONICS_HINT),
    },
];

impl Port {
    pub const ALL: [Port; PORT_COUNT] = [
        Port::Input,
        Port::Output,
        Port::BaseFrequency,
        Port::Harmonics,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn descriptor(self) -> &'static PortDescriptor {
        &PORTS[self.index()]
    }

    /// Feeds a control value into the cascade, which recomputes right away.
    ///
    /// The harmonic count is truncated toward zero and then clamped by the
    /// cascade. Audio ports carry no scalar and are ignored; their buffers are
    /// passed per block instead.
    pub fn bind_control(self, cascade: &mut HarmonicNotchCascade, value: f32) {
        match self {
            Port::BaseFrequency => cascade.set_base_frequency(value),
            Port::Harmonics => cascade.set_stage_count(value as i32),
            Port::Input | Port::Output => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notch::{DEFAULT_BASE_FREQUENCY, DEFAULT_STAGE_COUNT};

    #[test]
    fn indices_follow_the_table() {
        for (i, port) in Port::ALL.into_iter().enumerate() {
            assert_eq!(port.index(), i);
            assert_eq!(port.descriptor(), &PORTS[i]);
        }
    }

    #[test]
    fn layout_matches_contract() {
        assert_eq!(Port::Input.descriptor().kind, PortKind::Audio);
        assert_eq!(Port::Output.descriptor().direction, PortDirection::Output);
        assert_eq!(Port::BaseFrequency.descriptor().kind, PortKind::Control);
        assert_eq!(Port::Harmonics.descriptor().kind, PortKind::Control);
        assert!(Port::Input.descriptor().hint.is_none());
        assert!(Port::Output.descriptor().hint.is_none());
        assert_eq!(Port::BaseFrequency.descriptor().hint, Some(BASE_FREQUENCY_HINT));
        assert_eq!(Port::Harmonics.descriptor().hint, Some(HARMONICS_HINT));
    }

    #[test]
    fn middle_defaults_match_cascade_defaults() {
        let freq = BASE_FREQUENCY_HINT.default_value();
        assert!((freq - DEFAULT_BASE_FREQUENCY).abs() < 0.01, "{freq}");

        let harmonics = HARMONICS_HINT.default_value();
        assert_eq!(harmonics, DEFAULT_STAGE_COUNT as f32);
    }

    #[test]
    fn harmonics_port_is_clamped() {
        let mut cascade = HarmonicNotchCascade::new(44100.0);
        for value in 0..=30 {
            Port::Harmonics.bind_control(&mut cascade, value as f32);
            assert_eq!(cascade.stage_count(), value.clamp(1, MAX_STAGES));
        }

        Port::Harmonics.bind_control(&mut cascade, 3.7);
        assert_eq!(cascade.stage_count(), 3);
        Port::Harmonics.bind_control(&mut cascade, 0.9);
        assert_eq!(cascade.stage_count(), 1);
    }

    #[test]
    fn frequency_port_is_not_clamped() {
        let mut cascade = HarmonicNotchCascade::new(44100.0);
        Port::BaseFrequency.bind_control(&mut cascade, 30000.0);
        assert_eq!(cascade.base_frequency(), 30000.0);
        assert_eq!(cascade.effective_stage_count(), 0);
    }

    #[test]
    fn audio_ports_leave_the_cascade_alone() {
        let mut cascade = HarmonicNotchCascade::new(44100.0);
        Port::Input.bind_control(&mut cascade, 5.0);
        Port::Output.bind_control(&mut cascade, 5.0);
        assert_eq!(cascade.base_frequency(), DEFAULT_BASE_FREQUENCY);
        assert_eq!(cascade.stage_count(), DEFAULT_STAGE_COUNT);
    }
}
