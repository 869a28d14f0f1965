use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use spectrokin_core::{analysis::AnalysisConfig, chart::DEFAULT_MAX_POINTS, codec::DecodeMode};
use std::{fs, path::Path};

/// Settings for every subcommand, loaded from an optional YAML file.
/// Missing sections and fields fall back to their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    pub chart: ChartConfig,
    pub telemetry: TelemetryConfig,
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub max_points: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            max_points: DEFAULT_MAX_POINTS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Require header and footer bytes on telemetry frames.
    pub strict: bool,
}

impl TelemetryConfig {
    pub fn mode(&self) -> DecodeMode {
        if self.strict {
            DecodeMode::Strict
        } else {
            DecodeMode::Lenient
        }
    }
}

/// Ground truth and acquisition settings of the synthetic demo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub vmax: f64,
    pub km: f64,
    pub substrates: Vec<f64>,
    pub duration_s: f64,
    pub frame_interval_s: f64,
    pub noise: f64,
    pub seed: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            vmax: 0.01,
            km: 2.0,
            substrates: vec![0.5, 1.0, 2.0, 4.0, 8.0, 16.0],
            duration_s: 60.0,
            frame_interval_s: 0.5,
            noise: 0.3,
            seed: 42,
        }
    }
}

impl AppConfig {
    /// Loads the configuration file, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML from {:?}", path))?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }
}
