/// Upper bound on the number of harmonics that can be notched out.
pub const MAX_STAGES: usize = 23;

pub const DEFAULT_BASE_FREQUENCY: f32 = 1000.0;
pub const DEFAULT_STAGE_COUNT: usize = 12;

/// Relative bandwidth of every notch. Fixed for the whole design.
const BANDWIDTH: f64 = 0.0003;

/// Pole radius, `1 - 3 * BANDWIDTH`.
pub const POLE_RADIUS: f64 = 1.0 - 3.0 * BANDWIDTH;

/// The five coefficients of a notch stage.
///
/// Feedforward terms are `a0..a2`, feedback terms are `b1` and `b2`, both
/// following the DSP Guide sign convention where feedback is added:
/// `y = a0*x + a1*x1 + a2*x2 + b1*y1 + b2*y2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NotchCoefficients {
    pub a0: f32,
    pub a1: f32,
    pub a2: f32,
    pub b1: f32,
    pub b2: f32,
}

impl NotchCoefficients {
    /// Coefficients that pass the signal through unchanged.
    pub const IDENTITY: Self = Self {
        a0: 1.0,
        a1: 0.0,
        a2: 0.0,
        b1: 0.0,
        b2: 0.0,
    };

    /// Designs the notch for harmonic `harmonic` (1-based) of `base_frequency`.
    ///
    /// Eq. 19-8 of the DSP Guide by S.W. Smith (http://www.dspguide.com/ch19/3.htm).
    /// Only meaningful while `harmonic * base_frequency / sample_rate` lies in
    /// `(0, 0.5)`, the cascade skips stages outside of that range.
    pub fn design(harmonic: usize, base_frequency: f32, sample_rate: f32) -> Self {
        let f = harmonic as f64 * base_frequency as f64 / sample_rate as f64;
        let cosw = (std::f64::consts::TAU * f).cos();
        let r = POLE_RADIUS;
        let k = (1.0 - 2.0 * r * cosw + r * r) / (2.0 - 2.0 * cosw);

        Self {
            a0: k as f32,
            a1: (-2.0 * k * cosw) as f32,
            a2: k as f32,
            b1: (2.0 * r * cosw) as f32,
            b2: (-r * r) as f32,
        }
    }
}

impl Default for NotchCoefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Converts to the normalized form used by the `biquad` crate, where the
/// feedback terms are subtracted.
impl From<NotchCoefficients> for biquad::Coefficients<f32> {
    fn from(c: NotchCoefficients) -> Self {
        biquad::Coefficients {
            a1: -c.b1,
            a2: -c.b2,
            b0: c.a0,
            b1: c.a1,
            b2: c.a2,
        }
    }
}

/// A single second-order notch with its own delay history.
#[derive(Debug, Clone, Copy)]
pub struct NotchStage {
    coefficients: NotchCoefficients,
    // [two samples back, previous sample]
    prev_in: [f32; 2],
    prev_out: [f32; 2],
}

impl NotchStage {
    pub const fn new() -> Self {
        Self {
            coefficients: NotchCoefficients::IDENTITY,
            prev_in: [0.0; 2],
            prev_out: [0.0; 2],
        }
    }

    pub fn design(harmonic: usize, base_frequency: f32, sample_rate: f32) -> Self {
        let mut stage = Self::new();
        stage.reconfigure(harmonic, base_frequency, sample_rate);
        stage
    }

    /// Installs new coefficients. The history is always cleared together with
    /// the coefficient swap, there is no way to keep one without the other.
    pub fn reconfigure(&mut self, harmonic: usize, base_frequency: f32, sample_rate: f32) {
        *self = Self {
            coefficients: NotchCoefficients::design(harmonic, base_frequency, sample_rate),
            prev_in: [0.0; 2],
            prev_out: [0.0; 2],
        };
    }

    pub fn reset(&mut self) {
        self.prev_in = [0.0; 2];
        self.prev_out = [0.0; 2];
    }

    pub fn coefficients(&self) -> NotchCoefficients {
        self.coefficients
    }

    /// Input and output history, oldest sample first.
    pub fn history(&self) -> ([f32; 2], [f32; 2]) {
        (self.prev_in, self.prev_out)
    }

    #[inline]
    pub fn process_sample(&mut self, x: f32) -> f32 {
        // Eq. 19-1 of the DSP Guide (http://www.dspguide.com/ch19/1.htm)
        let c = &self.coefficients;
        let y = c.a0 * x
            + c.a1 * self.prev_in[1]
            + c.a2 * self.prev_in[0]
            + c.b1 * self.prev_out[1]
            + c.b2 * self.prev_out[0];

        self.prev_in = [self.prev_in[1], x];
        self.prev_out = [self.prev_out[1], y];
        y
    }

    pub fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        for (out, &x) in output.iter_mut().zip(input) {
            *out = self.process_sample(x);
        }
    }

    pub fn process_in_place(&mut self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }

    /// Magnitude response of this stage at `frequency`.
    pub fn response_at(&self, frequency: f32, sample_rate: f32) -> f32 {
        let w = std::f64::consts::TAU * frequency as f64 / sample_rate as f64;
        let (sin1, cos1) = w.sin_cos();
        let (sin2, cos2) = (2.0 * w).sin_cos();
        let c = &self.coefficients;

        // H(z) = (a0 + a1 z^-1 + a2 z^-2) / (1 - b1 z^-1 - b2 z^-2), z = e^jw
        let num_re = c.a0 as f64 + c.a1 as f64 * cos1 + c.a2 as f64 * cos2;
        let num_im = -(c.a1 as f64 * sin1 + c.a2 as f64 * sin2);
        let den_re = 1.0 - c.b1 as f64 * cos1 - c.b2 as f64 * cos2;
        let den_im = c.b1 as f64 * sin1 + c.b2 as f64 * sin2;

        ((num_re * num_re + num_im * num_im) / (den_re * den_re + den_im * den_im)).sqrt() as f32
    }
}

impl Default for NotchStage {
    fn default() -> Self {
        Self::new()
    }
}

/// A chain of notches at the first `stage_count` harmonics of a base
/// frequency, applied one after another.
///
/// Storage is a fixed array so neither parameter changes nor block
/// processing ever allocate.
#[derive(Debug, Clone)]
pub struct HarmonicNotchCascade {
    base_frequency: f32,
    sample_rate: f32,
    stage_count: usize,
    stages: [NotchStage; MAX_STAGES],
}

impl HarmonicNotchCascade {
    pub fn new(sample_rate: f32) -> Self {
        let mut cascade = Self {
            base_frequency: DEFAULT_BASE_FREQUENCY,
            sample_rate,
            stage_count: DEFAULT_STAGE_COUNT,
            stages: [NotchStage::new(); MAX_STAGES],
        };
        cascade.update_parameters();
        cascade
    }

    pub fn base_frequency(&self) -> f32 {
        self.base_frequency
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn stage_count(&self) -> usize {
        self.stage_count
    }

    /// Stage `index` (harmonic `index + 1`), including inactive ones.
    pub fn stage(&self, index: usize) -> Option<&NotchStage> {
        self.stages.get(index)
    }

    /// Any value is accepted here. Harmonics that end up above Nyquist are
    /// skipped while processing.
    pub fn set_base_frequency(&mut self, base_frequency: f32) {
        self.base_frequency = base_frequency;
        self.update_parameters();
    }

    pub fn set_stage_count(&mut self, stage_count: i32) {
        self.stage_count = stage_count.clamp(1, MAX_STAGES as i32) as usize;
        self.update_parameters();
    }

    /// Applies both control values at once, recomputing only when one of them
    /// differs from what is already installed. Returns whether anything was
    /// recomputed. Rebinding unchanged values would wipe every stage's history.
    pub fn bind_changed(&mut self, base_frequency: f32, stage_count: i32) -> bool {
        let stage_count = stage_count.clamp(1, MAX_STAGES as i32) as usize;
        if base_frequency == self.base_frequency && stage_count == self.stage_count {
            return false;
        }

        self.base_frequency = base_frequency;
        self.stage_count = stage_count;
        self.update_parameters();
        true
    }

    /// Redesigns every active stage and clears its history. Inactive stages
    /// keep whatever they had, they don't run anyway.
    pub fn update_parameters(&mut self) {
        let (base_frequency, sample_rate) = (self.base_frequency, self.sample_rate);
        for (i, stage) in self.stages[..self.stage_count].iter_mut().enumerate() {
            stage.reconfigure(i + 1, base_frequency, sample_rate);
        }
    }

    /// Clears the history of the active stages, coefficients stay as they are.
    pub fn reset(&mut self) {
        for stage in self.stages[..self.stage_count].iter_mut() {
            stage.reset();
        }
    }

    fn exceeds_nyquist(&self, harmonic: usize) -> bool {
        self.base_frequency * harmonic as f32 > self.sample_rate / 2.0
    }

    /// Number of stages a block will run: the active stages up to, but not
    /// including, the first harmonic above Nyquist.
    pub fn effective_stage_count(&self) -> usize {
        (1..=self.stage_count)
            .take_while(|&harmonic| !self.exceeds_nyquist(harmonic))
            .count()
    }

    /// Filters `input` into `output`.
    ///
    /// The first stage reads `input`, every following stage works on `output`
    /// in place, so `output` ends up holding the result of the last stage that
    /// ran. When not even the fundamental is below Nyquist the input is copied
    /// over unchanged. Only the common length of both buffers is touched.
    pub fn run(&mut self, input: &[f32], output: &mut [f32]) {
        let len = input.len().min(output.len());
        let (input, output) = (&input[..len], &mut output[..len]);

        let effective = self.effective_stage_count();
        let Some((first, rest)) = self.stages[..effective].split_first_mut() else {
            for (out, &x) in output.iter_mut().zip(input) {
                *out = x;
            }
            return;
        };

        first.process_block(input, output);
        for stage in rest {
            stage.process_in_place(output);
        }
    }

    /// Same as [`run`](Self::run) for hosts that hand over a single buffer.
    pub fn run_in_place(&mut self, buffer: &mut [f32]) {
        let effective = self.effective_stage_count();
        for stage in self.stages[..effective].iter_mut() {
            stage.process_in_place(buffer);
        }
    }
}
