//! Numeric core of the SpectroKin toolkit.
//!
//! The analysis path runs camera ROI readings through [`absorbance`]
//! correction, collects them in a [`session::ScanSession`], extracts the
//! initial rate with [`analysis::analyze`] and combines several scans into
//! Michaelis-Menten parameters with [`enzyme::estimate`]. The [`codec`]
//! module builds the binary command packets for the electrochemical
//! accessory and decodes its telemetry replies.
//!
//! All analysis functions are pure and synchronous.

pub mod absorbance;
pub mod analysis;
pub mod chart;
pub mod codec;
pub mod enzyme;
pub mod error;
pub mod io;
pub mod logger;
pub mod regression;
pub mod segment;
pub mod session;
pub mod simulation;
pub mod smoothing;
pub mod store;

pub use error::SpectroKinError;
