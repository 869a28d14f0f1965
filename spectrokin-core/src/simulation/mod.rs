//! Synthetic Michaelis-Menten assays.
//!
//! Generates the raw sample/reference ROI frames a phone camera would record
//! while a chromogenic product accumulates, including lamp drift and sensor
//! noise. Used for demos and end-to-end tests of the analysis pipeline.

pub mod builder;
pub mod engine;
pub mod state;

pub use builder::AssaySimulationBuilder;
pub use engine::AssaySimulation;
