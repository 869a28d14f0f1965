use crate::color::Channel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
}

impl PlotPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A named sub-window of an absorbance curve and its linear fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseResult {
    pub name: String,
    pub time_start: f64,
    pub time_end: f64,
    pub slope: f64,
    #[serde(rename = "r_squared")]
    pub r_squared: f64,
}

/// Result of analysing one complete scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KineticFit {
    pub v0: f64,
    #[serde(rename = "r_squared")]
    pub r_squared: f64,
    pub primary_channel: Channel,
    pub start_time: f64,
    pub end_time: f64,
    pub phases: Vec<PhaseResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubstrateVelocityPoint {
    pub s: f64,
    pub v0: f64,
}

impl SubstrateVelocityPoint {
    pub fn new(s: f64, v0: f64) -> Self {
        Self { s, v0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearizationMethod {
    LineweaverBurk,
    HanesWoolf,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KineticParameters {
    pub vmax: f64,
    pub km: f64,
    pub michaelis_menten: Vec<PlotPoint>,
    pub lineweaver_burk: Vec<PlotPoint>,
    pub hanes_woolf: Vec<PlotPoint>,
    /// Linearizations whose estimate entered the averaged `vmax`/`km`.
    #[serde(default)]
    pub methods: Vec<LinearizationMethod>,
}
