//! Interface of the results history store.
//!
//! The store itself lives outside this crate; the core only produces the
//! [`ScanRecord`]s it persists.

use crate::error::SpectroKinError;
use serde::{Deserialize, Serialize};
use spectrokin_schemas::record::ScanRecord;

/// Short listing entry for a stored scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub id: String,
    pub timestamp: String,
    pub v0: Option<f64>,
    pub r_squared: Option<f64>,
}

impl ScanSummary {
    pub fn from_record(id: impl Into<String>, record: &ScanRecord) -> Self {
        Self {
            id: id.into(),
            timestamp: record.timestamp.clone(),
            v0: record.analysis.as_ref().map(|a| a.v0),
            r_squared: record.analysis.as_ref().map(|a| a.r_squared),
        }
    }
}

pub trait ResultsStore {
    /// Persists a record and returns its id.
    fn save(&mut self, record: &ScanRecord) -> Result<String, SpectroKinError>;
    fn list(&self) -> Result<Vec<ScanSummary>, SpectroKinError>;
    fn get(&self, id: &str) -> Result<Option<ScanRecord>, SpectroKinError>;
    /// Returns whether a record was removed.
    fn delete(&mut self, id: &str) -> Result<bool, SpectroKinError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectrokin_schemas::{color::Channel, kinetics::KineticFit};
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct MemoryStore {
        records: BTreeMap<String, ScanRecord>,
    }

    impl ResultsStore for MemoryStore {
        fn save(&mut self, record: &ScanRecord) -> Result<String, SpectroKinError> {
            let id = format!("scan_{}", self.records.len());
            self.records.insert(id.clone(), record.clone());
            Ok(id)
        }

        fn list(&self) -> Result<Vec<ScanSummary>, SpectroKinError> {
            Ok(self
                .records
                .iter()
                .map(|(id, record)| ScanSummary::from_record(id.as_str(), record))
                .collect())
        }

        fn get(&self, id: &str) -> Result<Option<ScanRecord>, SpectroKinError> {
            Ok(self.records.get(id).cloned())
        }

        fn delete(&mut self, id: &str) -> Result<bool, SpectroKinError> {
            Ok(self.records.remove(id).is_some())
        }
    }

    fn record(v0: Option<f64>) -> ScanRecord {
        ScanRecord {
            timestamp: "2026-10-16T09:30:00Z".to_string(),
            absorbance_data: Vec::new(),
            analysis: v0.map(|v0| KineticFit {
                v0,
                r_squared: 0.98,
                primary_channel: Channel::G,
                start_time: 0.0,
                end_time: 4.0,
                phases: Vec::new(),
            }),
        }
    }

    #[test]
    fn test_store_contract() {
        let mut store = MemoryStore::default();
        let id = store.save(&record(Some(0.012))).unwrap();
        store.save(&record(None)).unwrap();

        let listing = store.list().unwrap();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].v0, Some(0.012));
        assert_eq!(listing[1].r_squared, None);

        assert!(store.get(&id).unwrap().is_some());
        assert!(store.delete(&id).unwrap());
        assert!(!store.delete(&id).unwrap());
        assert!(store.get(&id).unwrap().is_none());
    }

    #[test]
    fn test_record_json_shape() {
        let json = serde_json::to_value(record(Some(0.5))).unwrap();

        assert!(json.get("absorbanceData").is_some());
        assert_eq!(json["analysis"]["primaryChannel"], "g");
        assert_eq!(json["analysis"]["r_squared"], 0.98);
        assert!(json["analysis"].get("startTime").is_some());
    }
}
