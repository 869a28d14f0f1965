use serde::{Deserialize, Serialize};
use spectrokin_schemas::{
    color::RgbSample,
    sample::{AbsorbanceSample, RawFrame},
};
use csv::Writer;
use std::fs;
use std::io;
use std::path::Path;

/// One row of an absorbance log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbsorbanceLogEntry {
    pub time: f64,
    pub abs_r: f64,
    pub abs_g: f64,
    pub abs_b: f64,
    pub sample_r: f64,
    pub sample_g: f64,
    pub sample_b: f64,
    pub reference_r: f64,
    pub reference_g: f64,
    pub reference_b: f64,
}

impl From<&AbsorbanceSample> for AbsorbanceLogEntry {
    fn from(s: &AbsorbanceSample) -> Self {
        Self {
            time: s.time,
            abs_r: s.abs.r,
            abs_g: s.abs.g,
            abs_b: s.abs.b,
            sample_r: s.sample.r,
            sample_g: s.sample.g,
            sample_b: s.sample.b,
            reference_r: s.reference.r,
            reference_g: s.reference.g,
            reference_b: s.reference.b,
        }
    }
}

impl From<AbsorbanceLogEntry> for AbsorbanceSample {
    fn from(e: AbsorbanceLogEntry) -> Self {
        Self {
            time: e.time,
            abs: RgbSample::new(e.abs_r, e.abs_g, e.abs_b),
            sample: RgbSample::new(e.sample_r, e.sample_g, e.sample_b),
            reference: RgbSample::new(e.reference_r, e.reference_g, e.reference_b),
        }
    }
}

/// Writes raw camera frames to CSV as they are produced.
pub struct FrameLogger {
    writer: Writer<fs::File>,
}

impl FrameLogger {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, io::Error> {
        let writer = Writer::from_path(path)?;
        Ok(Self { writer })
    }

    pub fn log_frame(&mut self, frame: &RawFrame) -> Result<(), csv::Error> {
        self.writer.serialize(frame)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes corrected absorbance samples to CSV, one row per tick.
pub struct AbsorbanceLogger {
    writer: Writer<fs::File>,
}

impl AbsorbanceLogger {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, io::Error> {
        let writer = Writer::from_path(path)?;
        Ok(Self { writer })
    }

    pub fn log_sample(&mut self, sample: &AbsorbanceSample) -> Result<(), csv::Error> {
        self.writer.serialize(AbsorbanceLogEntry::from(sample))?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn log_all(&mut self, samples: &[AbsorbanceSample]) -> Result<(), csv::Error> {
        for sample in samples {
            self.writer.serialize(AbsorbanceLogEntry::from(sample))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
