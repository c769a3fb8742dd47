use nih_plug::prelude::*;

mod editor;
pub mod notch;
mod params;
pub mod ports;
mod processor;

pub use notch::{HarmonicNotchCascade, NotchCoefficients, NotchStage, MAX_STAGES};
pub use ports::{Port, PortDescriptor, PORTS};
pub use processor::NotchHarmonics;

nih_export_clap!(NotchHarmonics);
nih_export_vst3!(NotchHarmonics);
