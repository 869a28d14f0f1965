use crate::{kinetics::KineticFit, sample::AbsorbanceSample};
use serde::{Deserialize, Serialize};

/// The JSON blob handed to the results history store once a scan completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    /// RFC 3339 timestamp of when the scan finished.
    pub timestamp: String,
    pub absorbance_data: Vec<AbsorbanceSample>,
    pub analysis: Option<KineticFit>,
}
