//! CRT emulation: the effect parameter set and the screen-space pass that consumes it.

mod params;
mod pass;

pub use params::{CrtField, CrtParams, CrtUniforms, INTENSITY_TABLE, IntensityMapping};
pub use pass::CrtPass;
