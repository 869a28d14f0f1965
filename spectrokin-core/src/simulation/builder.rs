use crate::{
    error::SpectroKinError,
    logger::FrameLogger,
    simulation::{
        engine::AssaySimulation,
        state::{AssayParameters, AssayState},
    },
};
use rand::{rngs::StdRng, SeedableRng};
use spectrokin_schemas::color::RgbSample;

/// A fluent builder for constructing an `AssaySimulation`.
///
/// Every setting has a default describing a yellow-product assay read mostly
/// in the green channel, so only the kinetic constants usually need setting.
#[derive(Debug, Clone)]
pub struct AssaySimulationBuilder {
    params: AssayParameters,
    log_path: Option<String>,
}

impl Default for AssaySimulationBuilder {
    fn default() -> Self {
        Self {
            params: AssayParameters {
                vmax: 0.01,
                km: 2.0,
                initial_substrate: 1.0,
                duration_s: 60.0,
                frame_interval_s: 0.5,
                absorptivity: RgbSample::new(0.2, 1.0, 0.1),
                sample_intensity: RgbSample::new(180.0, 200.0, 170.0),
                reference_intensity: RgbSample::new(150.0, 160.0, 140.0),
                lamp_drift_per_s: 0.001,
                noise: 0.3,
                seed: 0,
            },
            log_path: None,
        }
    }
}

impl AssaySimulationBuilder {
    /// Creates a builder with the default assay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the enzyme's Michaelis-Menten constants.
    pub fn with_kinetics(mut self, vmax: f64, km: f64) -> Self {
        self.params.vmax = vmax;
        self.params.km = km;
        self
    }

    pub fn with_substrate(mut self, concentration: f64) -> Self {
        self.params.initial_substrate = concentration;
        self
    }

    /// Sets the scan length and the spacing between frames, in seconds.
    pub fn with_timing(mut self, duration_s: f64, frame_interval_s: f64) -> Self {
        self.params.duration_s = duration_s;
        self.params.frame_interval_s = frame_interval_s;
        self
    }

    pub fn with_absorptivity(mut self, absorptivity: RgbSample) -> Self {
        self.params.absorptivity = absorptivity;
        self
    }

    /// Sets the blank intensities of the sample and reference ROIs.
    pub fn with_intensities(mut self, sample: RgbSample, reference: RgbSample) -> Self {
        self.params.sample_intensity = sample;
        self.params.reference_intensity = reference;
        self
    }

    pub fn with_lamp_drift(mut self, per_second: f64) -> Self {
        self.params.lamp_drift_per_s = per_second;
        self
    }

    /// Sets the uniform noise half-width and the seed that makes it repeatable.
    pub fn with_noise(mut self, amplitude: f64, seed: u64) -> Self {
        self.params.noise = amplitude;
        self.params.seed = seed;
        self
    }

    /// Configures the simulation to write every frame to the specified CSV file.
    pub fn with_frame_logging_to_file(mut self, path: &str) -> Self {
        self.log_path = Some(path.to_string());
        self
    }

    /// Consumes the builder and returns a ready-to-run `AssaySimulation`.
    ///
    /// # Errors
    ///
    /// Returns `SpectroKinError::ConfigError` for non-physical parameters and
    /// `SpectroKinError::FileIO` if the frame log cannot be created.
    pub fn build(self) -> Result<AssaySimulation, SpectroKinError> {
        let p = &self.params;
        let checks = [
            (p.vmax >= 0.0, "vmax must be non-negative"),
            (p.km > 0.0, "km must be positive"),
            (p.initial_substrate >= 0.0, "substrate must be non-negative"),
            (p.frame_interval_s > 0.0, "frame interval must be positive"),
            (p.duration_s >= p.frame_interval_s, "duration must cover at least one frame"),
            (p.noise >= 0.0, "noise must be non-negative"),
        ];
        if let Some((_, message)) = checks.iter().find(|(ok, _)| !ok) {
            return Err(SpectroKinError::ConfigError(message.to_string()));
        }

        let logger = match self.log_path {
            Some(path) => Some(
                FrameLogger::new(&path).map_err(|e| SpectroKinError::FileIO(path.clone(), e))?,
            ),
            None => None,
        };

        let state = AssayState {
            tick: 0,
            time_s: 0.0,
            substrate: self.params.initial_substrate,
            product: 0.0,
        };

        Ok(AssaySimulation {
            state,
            params: self.params,
            rng: StdRng::seed_from_u64(self.params.seed),
            logger,
            blank_emitted: false,
        })
    }
}
