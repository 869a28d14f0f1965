use serde::{Deserialize, Serialize};
use spectrokin_schemas::color::RgbSample;

/// Fixed parameters of one simulated assay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssayParameters {
    /// Maximum velocity, concentration units per second.
    pub vmax: f64,
    pub km: f64,
    pub initial_substrate: f64,
    pub duration_s: f64,
    pub frame_interval_s: f64,
    /// Absorbance per unit product concentration, per channel.
    pub absorptivity: RgbSample,
    pub sample_intensity: RgbSample,
    pub reference_intensity: RgbSample,
    /// Fractional loss of lamp intensity per second.
    pub lamp_drift_per_s: f64,
    /// Half-width of the uniform noise added to every intensity reading.
    pub noise: f64,
    pub seed: u64,
}

impl AssayParameters {
    /// Initial velocity implied by the Michaelis-Menten equation.
    pub fn true_v0(&self) -> f64 {
        self.vmax * self.initial_substrate / (self.km + self.initial_substrate)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssayState {
    pub tick: u64,
    pub time_s: f64,
    pub substrate: f64,
    pub product: f64,
}
