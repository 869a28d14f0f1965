use crate::config::{AppConfig, DemoConfig};
use anyhow::{Context, Result};
use log::{info, warn};
use spectrokin_core::{
    chart, codec, enzyme, io,
    logger::AbsorbanceLogger,
    session::{session_from_frames, ScanSession},
    simulation::AssaySimulationBuilder,
    store::ScanSummary,
};
use spectrokin_schemas::{
    kinetics::{KineticFit, KineticParameters, SubstrateVelocityPoint},
    record::ScanRecord,
};
use std::{fs, path::Path};

/// Resolution of the fitted hyperbola written next to the demo results.
const CURVE_POINTS: usize = 50;

/// Output files requested for a single-scan analysis.
#[derive(Debug, Default)]
pub struct AnalyzeOutputs<'a> {
    pub record: Option<&'a Path>,
    pub absorbance_log: Option<&'a Path>,
    pub chart: Option<&'a Path>,
}

/// Analyses one frame CSV and writes the requested outputs.
pub fn run_analyze(input: &Path, outputs: &AnalyzeOutputs<'_>, config: &AppConfig) -> Result<KineticFit> {
    info!("Reading frames from {:?}", input);
    let frames = io::read_frames(input)?;
    let mut session = session_from_frames(&frames)
        .with_context(|| format!("Invalid frame sequence in {:?}", input))?;

    let fit = session.analyze(&config.analysis)?;
    print_fit_report(&input.display().to_string(), &fit);

    if let Some(path) = outputs.absorbance_log {
        let mut logger = AbsorbanceLogger::new(path)
            .with_context(|| format!("Failed to create absorbance log: {:?}", path))?;
        logger.log_all(session.samples())?;
        info!("Absorbance log written to {:?}", path);
    }
    if let Some(path) = outputs.chart {
        io::write_json(path, &chart::reduce(session.samples(), config.chart.max_points))?;
        info!("Chart series written to {:?}", path);
    }
    if let Some(path) = outputs.record {
        let record = session.into_record(timestamp(), Some(fit.clone()));
        io::write_json(path, &record)?;
        info!("Scan record written to {:?}", path);
    }

    Ok(fit)
}

/// Estimates Vmax/Km from an `s,v0` CSV.
pub fn run_estimate(input: &Path, output: Option<&Path>) -> Result<KineticParameters> {
    let points = io::read_points(input)?;
    info!("Loaded {} substrate/velocity pairs from {:?}", points.len(), input);

    let params = enzyme::estimate(&points);
    print_kinetics_report(&params, None);

    if let Some(path) = output {
        io::write_json(path, &params)?;
        info!("Kinetic parameters written to {:?}", path);
    }
    Ok(params)
}

/// Prints the packet bytes of every command in a YAML/JSON file.
pub fn run_encode(input: &Path) -> Result<()> {
    let commands = io::load_commands(input)?;
    if commands.is_empty() {
        warn!("No commands found in {:?}", input);
    }
    for command in &commands {
        for packet in codec::encode(command) {
            println!("{:<10} [{:>2} bytes] {}", format!("{:?}", command.kind()), packet.len(), codec::to_hex(&packet));
        }
    }
    Ok(())
}

pub fn run_decode(payload: &str, config: &AppConfig) -> Result<()> {
    let telemetry = codec::decode_telemetry(payload, config.telemetry.mode())
        .context("Failed to decode telemetry payload")?;
    println!("{}", serde_json::to_string(&telemetry)?);
    Ok(())
}

/// Simulates one scan per configured substrate concentration, analyses each,
/// and estimates the kinetic constants across them.
pub fn run_demo(output_dir: &Path, config: &AppConfig) -> Result<KineticParameters> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;
    let demo = &config.demo;
    info!(
        "Simulating {} scans (Vmax {}, Km {}) into {:?}",
        demo.substrates.len(),
        demo.vmax,
        demo.km,
        output_dir
    );

    let mut points = Vec::new();
    let mut summaries = Vec::new();
    for (i, &substrate) in demo.substrates.iter().enumerate() {
        let scan_id = format!("scan_{:02}_s{}", i + 1, substrate);
        let (record, fit) = simulate_scan(output_dir, &scan_id, substrate, i as u64, demo, config)?;

        io::write_json(output_dir.join(format!("{}.json", scan_id)), &record)?;
        summaries.push(ScanSummary::from_record(scan_id, &record));
        if let Some(fit) = fit {
            points.push(SubstrateVelocityPoint::new(substrate, fit.v0));
        }
    }

    io::write_points(output_dir.join("points.csv"), &points)?;
    let params = enzyme::estimate(&points);
    io::write_json(output_dir.join("kinetics.json"), &params)?;

    let s_max = points.iter().map(|p| p.s).fold(0.0, f64::max);
    let curve = enzyme::michaelis_menten_curve(params.vmax, params.km, s_max, CURVE_POINTS);
    io::write_json(output_dir.join("kinetics_curve.json"), &curve)?;

    print_history(&summaries);
    print_kinetics_report(&params, Some(demo));
    Ok(params)
}

fn simulate_scan(
    output_dir: &Path,
    scan_id: &str,
    substrate: f64,
    index: u64,
    demo: &DemoConfig,
    config: &AppConfig,
) -> Result<(ScanRecord, Option<KineticFit>)> {
    let frame_log = output_dir.join(format!("{}.csv", scan_id));
    let frames = AssaySimulationBuilder::new()
        .with_kinetics(demo.vmax, demo.km)
        .with_substrate(substrate)
        .with_timing(demo.duration_s, demo.frame_interval_s)
        .with_noise(demo.noise, demo.seed.wrapping_add(index))
        .with_frame_logging_to_file(&frame_log.to_string_lossy())
        .build()?
        .run()?;

    let mut session: ScanSession = session_from_frames(&frames)?;
    let fit = match session.analyze(&config.analysis) {
        Ok(fit) => Some(fit),
        Err(e) => {
            warn!("Scan '{}' could not be analysed: {}", scan_id, e);
            None
        }
    };
    Ok((session.into_record(timestamp(), fit.clone()), fit))
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn print_fit_report(source: &str, fit: &KineticFit) {
    println!("\n--- [Scan Analysis] {} ---", source);
    println!("  - Primary channel:  {}", fit.primary_channel);
    println!("  - V0:               {:.6} A/s", fit.v0);
    println!("  - R²:               {:.4}", fit.r_squared);
    println!("  - Window:           {:.2} s - {:.2} s", fit.start_time, fit.end_time);
    for phase in &fit.phases {
        println!(
            "    - {:<12} {:>7.2} s - {:>7.2} s  slope {:>10.6}  R² {:.4}",
            phase.name, phase.time_start, phase.time_end, phase.slope, phase.r_squared
        );
    }
}

fn print_history(summaries: &[ScanSummary]) {
    println!("\n--- [Scan History] ---");
    for summary in summaries {
        match (summary.v0, summary.r_squared) {
            (Some(v0), Some(r_squared)) => {
                println!("  - {:<16} V0 {:>10.6}  R² {:.4}", summary.id, v0, r_squared)
            }
            _ => println!("  - {:<16} (no analysis)", summary.id),
        }
    }
}

fn print_kinetics_report(params: &KineticParameters, truth: Option<&DemoConfig>) {
    println!("\n--- [Enzyme Kinetics] ---");
    println!("========================================");
    println!("  - Pairs:            {}", params.michaelis_menten.len());
    println!("  - Methods used:     {:?}", params.methods);
    println!("  - Vmax:             {:.6}", params.vmax);
    println!("  - Km:               {:.6}", params.km);
    if let Some(truth) = truth {
        println!(
            "  - Simulated truth:  Vmax {:.6}, Km {:.6} ({:+.1}% / {:+.1}%)",
            truth.vmax,
            truth.km,
            relative_error(params.vmax, truth.vmax),
            relative_error(params.km, truth.km)
        );
    }
    if params.methods.is_empty() {
        println!("  (no linearization produced a usable fit)");
    }
    println!("========================================");
}

fn relative_error(estimate: f64, truth: f64) -> f64 {
    if truth == 0.0 {
        0.0
    } else {
        (estimate - truth) / truth * 100.0
    }
}
