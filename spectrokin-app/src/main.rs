//! # SpectroKin
//!
//! Command-line front end for the spectrometry toolkit: initial-rate analysis
//! of recorded scans, Michaelis-Menten estimation, potentiostat packet
//! encoding and telemetry decoding.
//!
//! ```bash
//! spectrokin analyze scan.csv --output scan.json --log absorbance.csv
//! spectrokin estimate points.csv
//! spectrokin encode commands.yaml
//! spectrokin decode --strict awIAAAAAwD8AACBAjw==
//! spectrokin demo runs/demo
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod workflow;

use config::AppConfig;
use workflow::AnalyzeOutputs;

/// SpectroKin - absorbance kinetics and potentiostat packet toolkit
#[derive(Parser)]
#[command(name = "spectrokin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// YAML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a recorded scan (one blank row followed by scan rows)
    Analyze {
        /// Frame CSV path
        #[arg(value_name = "FRAMES")]
        input: PathBuf,

        /// Write the scan record JSON here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the corrected absorbance series as CSV here
        #[arg(short, long)]
        log: Option<PathBuf>,

        /// Write the decimated per-channel chart series as JSON here
        #[arg(long)]
        chart: Option<PathBuf>,
    },

    /// Estimate Vmax and Km from substrate/velocity pairs
    Estimate {
        /// CSV with `s` and `v0` columns
        #[arg(value_name = "POINTS")]
        input: PathBuf,

        /// Write the kinetic parameters JSON here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the packet bytes of device commands
    Encode {
        /// YAML or JSON command file
        #[arg(value_name = "COMMANDS")]
        input: PathBuf,
    },

    /// Decode a base64 telemetry payload
    Decode {
        #[arg(value_name = "BASE64")]
        payload: String,

        /// Require header and footer bytes
        #[arg(long)]
        strict: bool,
    },

    /// Simulate a substrate series and estimate its kinetic constants
    Demo {
        #[arg(value_name = "OUTPUT_DIR", default_value = "spectrokin_demo")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            input,
            output,
            log,
            chart,
        } => {
            let outputs = AnalyzeOutputs {
                record: output.as_deref(),
                absorbance_log: log.as_deref(),
                chart: chart.as_deref(),
            };
            workflow::run_analyze(&input, &outputs, &config).map(|_| ())
        }
        Commands::Estimate { input, output } => {
            workflow::run_estimate(&input, output.as_deref()).map(|_| ())
        }
        Commands::Encode { input } => workflow::run_encode(&input),
        Commands::Decode { payload, strict } => {
            config.telemetry.strict |= strict;
            workflow::run_decode(&payload, &config)
        }
        Commands::Demo { output } => {
            workflow::run_demo(&output, &config)?;
            println!("\nDemo complete. Results are in {:?}", output);
            Ok(())
        }
    }
}
