use atomic_float::AtomicF32;
use nih_plug::prelude::*;
use std::sync::Arc;

use crate::editor;
use crate::notch::HarmonicNotchCascade;
use crate::params::NotchHarmonicsParams;
use crate::ports::Port;

/// The time it takes for the peak meter to decay by 12 dB after switching to complete silence.
const PEAK_METER_DECAY_MS: f64 = 150.0;

pub struct NotchHarmonics {
    params: Arc<NotchHarmonicsParams>,

    /// Needed to normalize the peak meter's response based on the sample rate.
    peak_meter_decay_weight: f32,
    /// Output level shown in the editor, stored as voltage gain.
    peak_meter: Arc<AtomicF32>,

    // Rebuilt in `initialize` once the sample rate is known
    cascade: HarmonicNotchCascade,
}

impl NotchHarmonics {
    /// Pushes parameter values that changed since the last block into the
    /// cascade.
    fn bind_controls(&mut self) {
        self.cascade.bind_changed(
            self.params.base_frequency.value(),
            self.params.harmonics.value(),
        );
    }
}

/// Zero, negative and non-finite rates are refused.
fn is_usable_sample_rate(sample_rate: f32) -> bool {
    sample_rate.is_finite() && sample_rate > 0.0
}

impl Default for NotchHarmonics {
    fn default() -> Self {
        Self {
            params: Arc::new(NotchHarmonicsParams::default()),

            peak_meter_decay_weight: 1.0,
            peak_meter: Arc::new(AtomicF32::new(util::MINUS_INFINITY_DB)),

            cascade: HarmonicNotchCascade::new(44100.0),
        }
    }
}

impl Plugin for NotchHarmonics {
    const NAME: &'static str = "Notch Harmonics";
    const VENDOR: &'static str = "Kakeru3";
    const URL: &'static str = "";
    const EMAIL: &'static str = "";

    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // One audio input, one audio output
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[AudioIOLayout {
        main_input_channels: NonZeroU32::new(1),
        main_output_channels: NonZeroU32::new(1),
        ..AudioIOLayout::const_default()
    }];

    // Coefficients are only recomputed between blocks
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    fn editor(&mut self, _async_executor: AsyncExecutor<Self>) -> Option<Box<dyn Editor>> {
        editor::create(
            self.params.clone(),
            self.peak_meter.clone(),
            self.params.editor_state.clone(),
        )
    }

    fn initialize(
        &mut self,
        _audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let sample_rate = buffer_config.sample_rate;
        if !is_usable_sample_rate(sample_rate) {
            nih_log!("Cannot run at a sample rate of {sample_rate} Hz");
            return false;
        }

        self.cascade = HarmonicNotchCascade::new(sample_rate);
        Port::BaseFrequency.bind_control(&mut self.cascade, self.params.base_frequency.value());
        Port::Harmonics.bind_control(&mut self.cascade, self.params.harmonics.value() as f32);
        nih_log!(
            "Notching {} harmonics of {} Hz at {} Hz ({} below Nyquist)",
            self.cascade.stage_count(),
            self.cascade.base_frequency(),
            sample_rate,
            self.cascade.effective_stage_count()
        );

        // After `PEAK_METER_DECAY_MS` milliseconds of pure silence, the peak meter's value should
        // have dropped by 12 dB
        self.peak_meter_decay_weight = 0.25f64
            .powf((sample_rate as f64 * PEAK_METER_DECAY_MS / 1000.0).recip())
            as f32;

        true
    }

    fn reset(&mut self) {
        self.cascade.reset();
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        self.bind_controls();

        // The host hands input and output over as one buffer
        let Some(channel) = buffer.as_slice().first_mut() else {
            return ProcessStatus::Normal;
        };
        self.cascade.run_in_place(channel);

        if self.params.editor_state.is_open() {
            let peak_amplitude = channel.iter().fold(0.0_f32, |peak, s| peak.max(s.abs()));
            let current_peak_meter = self.peak_meter.load(std::sync::atomic::Ordering::Relaxed);
            let new_peak_meter = if peak_amplitude > current_peak_meter {
                peak_amplitude
            } else {
                current_peak_meter * self.peak_meter_decay_weight
                    + peak_amplitude * (1.0 - self.peak_meter_decay_weight)
            };

            self.peak_meter
                .store(new_peak_meter, std::sync::atomic::Ordering::Relaxed);
        }

        ProcessStatus::Normal
    }
}

impl ClapPlugin for NotchHarmonics {
    const CLAP_ID: &'static str = "com.kakeru3.notch-harmonics";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("Multiple notch filters placed at harmonics of a base frequency");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Mono,
        ClapFeature::Filter,
    ];
}

impl Vst3Plugin for NotchHarmonics {
    const VST3_CLASS_ID: [u8; 16] = *b"NotchHarmonicsKk";
    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Filter];
}
