//! Ownership of one scan's blank and absorbance sequence.

use crate::{
    absorbance,
    analysis::{self, AnalysisConfig},
    error::SpectroKinError,
};
use log::info;
use spectrokin_schemas::{
    color::RgbSample,
    kinetics::KineticFit,
    record::ScanRecord,
    sample::{AbsorbanceSample, BlankReference, FramePhase, RawFrame},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    /// Waiting for the blank reference.
    Blanking,
    Scanning,
    Finished,
}

/// Collects the samples of a single scan.
///
/// The blank is captured exactly once and before any scan frame; every later
/// frame is corrected against it and appended in time order. Appending takes
/// `&mut self`, so a session has a single writer, and [`ScanSession::finish`]
/// freezes the sequence before it can be analysed.
#[derive(Debug, Clone)]
pub struct ScanSession {
    phase: ScanPhase,
    blank: Option<BlankReference>,
    samples: Vec<AbsorbanceSample>,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanSession {
    pub fn new() -> Self {
        Self {
            phase: ScanPhase::Blanking,
            blank: None,
            samples: Vec::new(),
        }
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn blank(&self) -> Option<&BlankReference> {
        self.blank.as_ref()
    }

    pub fn samples(&self) -> &[AbsorbanceSample] {
        &self.samples
    }

    pub fn capture_blank(&mut self, sample: RgbSample, reference: RgbSample) -> Result<(), SpectroKinError> {
        match self.phase {
            ScanPhase::Blanking => {
                self.blank = Some(BlankReference {
                    blank_sample: sample,
                    blank_reference: reference,
                });
                self.phase = ScanPhase::Scanning;
                info!("Blank captured, scanning");
                Ok(())
            }
            ScanPhase::Scanning => Err(SpectroKinError::BlankAlreadyCaptured),
            ScanPhase::Finished => Err(SpectroKinError::SessionFinished),
        }
    }

    /// Corrects one frame against the blank and appends it.
    pub fn push_frame(
        &mut self,
        time: f64,
        sample: RgbSample,
        reference: RgbSample,
    ) -> Result<&AbsorbanceSample, SpectroKinError> {
        let blank = match (self.phase, self.blank.as_ref()) {
            (ScanPhase::Scanning, Some(blank)) => blank,
            (ScanPhase::Finished, _) => return Err(SpectroKinError::SessionFinished),
            _ => return Err(SpectroKinError::BlankNotCaptured),
        };
        if !time.is_finite() {
            return Err(SpectroKinError::InvalidTime(time));
        }
        if let Some(previous) = self.samples.last() {
            if time <= previous.time {
                return Err(SpectroKinError::NonMonotonicTime {
                    previous: previous.time,
                    time,
                });
            }
        }

        let abs = absorbance::correct_against(&sample, &reference, blank);
        self.samples.push(AbsorbanceSample {
            time,
            abs,
            sample,
            reference,
        });
        Ok(&self.samples[self.samples.len() - 1])
    }

    /// Routes a raw frame to [`Self::capture_blank`] or [`Self::push_frame`].
    pub fn ingest(&mut self, frame: &RawFrame) -> Result<(), SpectroKinError> {
        match frame.phase {
            FramePhase::Blank => self.capture_blank(frame.sample(), frame.reference()),
            FramePhase::Scan => self
                .push_frame(frame.time, frame.sample(), frame.reference())
                .map(|_| ()),
        }
    }

    /// Ends the scan. No frames are accepted afterwards.
    pub fn finish(&mut self) {
        if self.phase != ScanPhase::Finished {
            info!("Scan finished with {} samples", self.samples.len());
        }
        self.phase = ScanPhase::Finished;
    }

    /// Finishes the scan and analyses the frozen sequence.
    pub fn analyze(&mut self, config: &AnalysisConfig) -> Result<KineticFit, SpectroKinError> {
        self.finish();
        analysis::analyze_with(&self.samples, config)
    }

    /// Consumes the session into the record handed to the results store.
    pub fn into_record(self, timestamp: String, analysis: Option<KineticFit>) -> ScanRecord {
        ScanRecord {
            timestamp,
            absorbance_data: self.samples,
            analysis,
        }
    }
}

/// Builds a finished session from a sequence of raw frames.
pub fn session_from_frames<'a, I>(frames: I) -> Result<ScanSession, SpectroKinError>
where
    I: IntoIterator<Item = &'a RawFrame>,
{
    let mut session = ScanSession::new();
    for frame in frames {
        session.ingest(frame)?;
    }
    session.finish();
    Ok(session)
}
