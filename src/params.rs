use nih_plug::prelude::*;
use nih_plug_iced::IcedState;
use std::sync::Arc;

use crate::editor;
use crate::ports::{Port, BASE_FREQUENCY_HINT, HARMONICS_HINT};

#[derive(Params)]
pub struct NotchHarmonicsParams {
    /// The editor state, saved together with the parameter state so the custom scaling can be
    /// restored.
    #[persist = "editor-state"]
    pub editor_state: Arc<IcedState>,

    #[id = "base_frequency"]
    pub base_frequency: FloatParam,

    #[id = "harmonics"]
    pub harmonics: IntParam,
}

impl Default for NotchHarmonicsParams {
    fn default() -> Self {
        // Ranges come from the port table so the plugin and the port contract
        // can't disagree
        let frequency = BASE_FREQUENCY_HINT;
        let harmonics = HARMONICS_HINT;

        Self {
            editor_state: editor::default_state(),

            base_frequency: FloatParam::new(
                Port::BaseFrequency.descriptor().name,
                frequency.default_value(),
                FloatRange::Skewed {
                    min: frequency.lower,
                    max: frequency.upper,
                    factor: FloatRange::skew_factor(-2.0),
                },
            )
            .with_value_to_string(formatters::v2s_f32_hz_then_khz(1))
            .with_string_to_value(formatters::s2v_f32_hz_then_khz()),

            harmonics: IntParam::new(
                Port::Harmonics.descriptor().name,
                harmonics.default_value() as i32,
                IntRange::Linear {
                    min: harmonics.lower.ceil() as i32,
                    max: harmonics.upper.floor() as i32,
                },
            ),
        }
    }
}
