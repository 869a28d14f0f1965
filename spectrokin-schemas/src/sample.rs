use crate::color::RgbSample;
use serde::{Deserialize, Serialize};

/// Baseline readings of both ROIs taken once, before the reaction starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlankReference {
    pub blank_sample: RgbSample,
    pub blank_reference: RgbSample,
}

/// One analysis tick of an active scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbsorbanceSample {
    /// Seconds since the scan started.
    pub time: f64,
    pub abs: RgbSample,
    pub sample: RgbSample,
    pub reference: RgbSample,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FramePhase {
    Blank,
    Scan,
}

/// A raw camera frame as exchanged in frame CSV files: mean intensities of the
/// sample and reference ROIs at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawFrame {
    pub phase: FramePhase,
    pub time: f64,
    pub sample_r: f64,
    pub sample_g: f64,
    pub sample_b: f64,
    pub reference_r: f64,
    pub reference_g: f64,
    pub reference_b: f64,
}

impl RawFrame {
    pub fn new(phase: FramePhase, time: f64, sample: RgbSample, reference: RgbSample) -> Self {
        Self {
            phase,
            time,
            sample_r: sample.r,
            sample_g: sample.g,
            sample_b: sample.b,
            reference_r: reference.r,
            reference_g: reference.g,
            reference_b: reference.b,
        }
    }

    pub fn sample(&self) -> RgbSample {
        RgbSample::new(self.sample_r, self.sample_g, self.sample_b)
    }

    pub fn reference(&self) -> RgbSample {
        RgbSample::new(self.reference_r, self.reference_g, self.reference_b)
    }
}
