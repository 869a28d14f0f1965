//! Shared data model for the SpectroKin toolkit.
//!
//! Everything in this crate is plain serde data: colour triples sampled from
//! the camera ROIs, absorbance time series, kinetic fit results, device
//! commands and the record shapes handed to external collaborators.

pub mod color;
pub mod command;
pub mod file_formats;
pub mod kinetics;
pub mod record;
pub mod sample;
