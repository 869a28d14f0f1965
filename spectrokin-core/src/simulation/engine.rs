use super::state::{AssayParameters, AssayState};
use crate::{error::SpectroKinError, logger::FrameLogger};
use log::debug;
use rand::{rngs::StdRng, Rng};
use spectrokin_schemas::{
    color::RgbSample,
    sample::{FramePhase, RawFrame},
};

/// Euler sub-steps per frame interval.
const SUBSTEPS: u32 = 10;

pub struct AssaySimulation {
    pub(super) state: AssayState,
    pub(super) params: AssayParameters,
    pub(super) rng: StdRng,
    pub(super) logger: Option<FrameLogger>,
    pub(super) blank_emitted: bool,
}

impl AssaySimulation {
    /// Runs the whole assay: one blank frame followed by scan frames from
    /// `t = 0` to the configured duration.
    pub fn run(&mut self) -> Result<Vec<RawFrame>, SpectroKinError> {
        let mut frames = Vec::new();
        while let Some(frame) = self.tick()? {
            frames.push(frame);
        }
        debug!(
            "Simulated {} frames, substrate {:.4} -> {:.4}",
            frames.len(),
            self.params.initial_substrate,
            self.state.substrate
        );
        Ok(frames)
    }

    /// Produces the next frame, or `None` once the scan is over. The first
    /// call yields the blank.
    pub fn tick(&mut self) -> Result<Option<RawFrame>, SpectroKinError> {
        let frame = if !self.blank_emitted {
            self.blank_emitted = true;
            self.capture(FramePhase::Blank)
        } else {
            let steps = (self.params.duration_s / self.params.frame_interval_s).round() as u64;
            if self.state.tick > steps {
                return Ok(None);
            }
            let frame = self.capture(FramePhase::Scan);
            self.advance_reaction();
            frame
        };

        if let Some(logger) = &mut self.logger {
            logger
                .log_frame(&frame)
                .map_err(|e| SpectroKinError::CsvError("frame log".to_string(), e))?;
        }
        Ok(Some(frame))
    }

    fn capture(&mut self, phase: FramePhase) -> RawFrame {
        let lamp = (1.0 - self.params.lamp_drift_per_s * self.state.time_s).max(0.0);
        let product = self.state.product;
        let absorptivity = self.params.absorptivity;
        let sample_intensity = self.params.sample_intensity;
        let reference_intensity = self.params.reference_intensity;

        let sample = sample_intensity.map(|channel, intensity| {
            let transmittance = 10f64.powf(-absorptivity.get(channel) * product);
            (intensity * lamp * transmittance + self.noise()).max(0.0)
        });
        let reference = reference_intensity.map(|_, intensity| (intensity * lamp + self.noise()).max(0.0));

        RawFrame::new(phase, self.state.time_s, sample, reference)
    }

    fn noise(&mut self) -> f64 {
        let amplitude = self.params.noise;
        if amplitude == 0.0 {
            0.0
        } else {
            self.rng.gen_range(-amplitude..=amplitude)
        }
    }

    fn advance_reaction(&mut self) {
        let h = self.params.frame_interval_s / f64::from(SUBSTEPS);
        for _ in 0..SUBSTEPS {
            let s = self.state.substrate;
            let v = self.params.vmax * s / (self.params.km + s);
            let converted = (v * h).min(s);
            self.state.substrate -= converted;
            self.state.product += converted;
        }
        self.state.tick += 1;
        self.state.time_s = self.state.tick as f64 * self.params.frame_interval_s;
    }

    pub fn params(&self) -> &AssayParameters {
        &self.params
    }

    pub fn state(&self) -> &AssayState {
        &self.state
    }
}
