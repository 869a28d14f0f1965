//! Kinetic analysis of a completed scan.

use crate::{
    error::SpectroKinError,
    regression,
    segment::{self, SegmentFit, SegmentSearchConfig},
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use spectrokin_schemas::{
    color::Channel,
    kinetics::{KineticFit, PhaseResult},
    sample::AbsorbanceSample,
};

/// Fewest samples a scan needs before it can be analysed.
pub const MIN_SAMPLES: usize = 5;

pub const INITIAL_RATE_PHASE: &str = "Initial Rate";
pub const LAG_PHASE: &str = "Lag";
pub const PLATEAU_PHASE: &str = "Plateau";

/// How the initial-rate slope is reported as `v0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum V0Policy {
    /// The slope with its sign; a bleaching reaction gives a negative `v0`.
    Signed,
    Absolute,
}

impl V0Policy {
    pub fn apply(self, slope: f64) -> f64 {
        match self {
            V0Policy::Signed => slope,
            V0Policy::Absolute => slope.abs(),
        }
    }
}

/// The single sign convention for every reported `v0`.
pub const V0_POLICY: V0Policy = V0Policy::Signed;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub search: SegmentSearchConfig,
}

/// Best window of one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelFit {
    pub channel: Channel,
    pub segment: SegmentFit,
}

/// Analyses a scan with the default configuration.
pub fn analyze(samples: &[AbsorbanceSample]) -> Result<KineticFit, SpectroKinError> {
    analyze_with(samples, &AnalysisConfig::default())
}

/// Runs the initial-rate search on each colour channel, keeps the channel
/// whose window fits best, and reports its rate, window and phases.
pub fn analyze_with(
    samples: &[AbsorbanceSample],
    config: &AnalysisConfig,
) -> Result<KineticFit, SpectroKinError> {
    if samples.len() < MIN_SAMPLES {
        return Err(SpectroKinError::InsufficientData {
            required: MIN_SAMPLES,
            actual: samples.len(),
        });
    }

    let time: Vec<f64> = samples.iter().map(|s| s.time).collect();
    let primary = select_primary_channel(&channel_fits(samples, &time, &config.search));
    let segment = primary.segment;

    debug!(
        "Primary channel '{}': slope {:.6}, R² {:.4}, window {}..={}",
        primary.channel, segment.slope, segment.r_squared, segment.start_index, segment.end_index
    );
    if segment.r_squared == 0.0 {
        warn!("No channel produced a usable linear fit; reporting a zero-quality rate");
    }

    let values = channel_values(samples, primary.channel);
    let phases = build_phases(&time, &values, &segment);

    Ok(KineticFit {
        v0: V0_POLICY.apply(segment.slope),
        r_squared: segment.r_squared,
        primary_channel: primary.channel,
        start_time: time[segment.start_index],
        end_time: time[segment.end_index],
        phases,
    })
}

/// Segment search result for every channel, in priority order.
pub fn channel_fits(
    samples: &[AbsorbanceSample],
    time: &[f64],
    search: &SegmentSearchConfig,
) -> Vec<ChannelFit> {
    Channel::ALL
        .iter()
        .map(|&channel| {
            let values = channel_values(samples, channel);
            let segment = segment::find_initial_rate_with(time, &values, search);
            debug!("Channel '{}': slope {:.6}, R² {:.4}", channel, segment.slope, segment.r_squared);
            ChannelFit { channel, segment }
        })
        .collect()
}

/// Highest R² wins; an equal score never displaces an earlier channel.
/// `fits` always holds one entry per channel.
fn select_primary_channel(fits: &[ChannelFit]) -> ChannelFit {
    fits[1..].iter().fold(fits[0], |best, candidate| {
        if candidate.segment.r_squared > best.segment.r_squared {
            *candidate
        } else {
            best
        }
    })
}

fn channel_values(samples: &[AbsorbanceSample], channel: Channel) -> Vec<f64> {
    samples.iter().map(|s| s.abs.get(channel)).collect()
}

fn build_phases(time: &[f64], values: &[f64], segment: &SegmentFit) -> Vec<PhaseResult> {
    let mut phases = Vec::with_capacity(3);

    if segment.start_index >= 2 {
        phases.push(fit_phase(LAG_PHASE, time, values, 0, segment.start_index - 1));
    }

    phases.push(PhaseResult {
        name: INITIAL_RATE_PHASE.to_string(),
        time_start: round_time(time[segment.start_index]),
        time_end: round_time(time[segment.end_index]),
        slope: segment.slope,
        r_squared: segment.r_squared,
    });

    let last = time.len() - 1;
    if last >= segment.end_index + 2 {
        phases.push(fit_phase(PLATEAU_PHASE, time, values, segment.end_index + 1, last));
    }

    phases
}

fn fit_phase(name: &str, time: &[f64], values: &[f64], start: usize, end: usize) -> PhaseResult {
    let fit = regression::fit(&time[start..=end], &values[start..=end]);
    PhaseResult {
        name: name.to_string(),
        time_start: round_time(time[start]),
        time_end: round_time(time[end]),
        slope: fit.slope,
        r_squared: fit.r_squared,
    }
}

/// Phase timestamps are reported to two decimals.
fn round_time(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectrokin_schemas::color::RgbSample;

    fn series<F>(n: usize, abs: F) -> Vec<AbsorbanceSample>
    where
        F: Fn(f64) -> RgbSample,
    {
        (0..n)
            .map(|i| {
                let time = i as f64 * 0.5;
                AbsorbanceSample {
                    time,
                    abs: abs(time),
                    sample: RgbSample::default(),
                    reference: RgbSample::default(),
                }
            })
            .collect()
    }

    #[test]
    fn test_linear_red_channel_is_primary() {
        let samples = series(20, |t| RgbSample::new(0.03 * t + 0.05, 0.2, 0.4));
        let fit = analyze(&samples).unwrap();

        assert_eq!(fit.primary_channel, Channel::R);
        assert!((fit.r_squared - 1.0).abs() < 1e-9);
        assert!((fit.v0 - 0.03).abs() < 1e-9);
        assert!(fit.start_time < fit.end_time);
        assert!(fit.phases.iter().any(|p| p.name == INITIAL_RATE_PHASE));
    }

    #[test]
    fn test_green_channel_selected_when_it_fits_best() {
        let samples = series(20, |t| {
            let wobble = if (t * 2.0) as usize % 2 == 0 { 0.01 } else { -0.01 };
            RgbSample::new(0.01 * t + wobble, 0.05 * t, 0.0)
        });
        let fit = analyze(&samples).unwrap();

        assert_eq!(fit.primary_channel, Channel::G);
        assert!((fit.v0 - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_tie_prefers_red() {
        let samples = series(12, |t| RgbSample::new(0.02 * t, 0.02 * t, 0.02 * t));
        let fit = analyze(&samples).unwrap();
        assert_eq!(fit.primary_channel, Channel::R);
    }

    #[test]
    fn test_negative_slope_keeps_sign() {
        let samples = series(10, |t| RgbSample::new(1.0 - 0.05 * t, 0.0, 0.0));
        let fit = analyze(&samples).unwrap();
        assert!((fit.v0 + 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_insufficient_data() {
        let samples = series(4, |t| RgbSample::new(t, t, t));
        match analyze(&samples) {
            Err(SpectroKinError::InsufficientData { required, actual }) => {
                assert_eq!(required, 5);
                assert_eq!(actual, 4);
            }
            other => panic!("expected InsufficientData, got {:?}", other),
        }
    }

    #[test]
    fn test_plateau_phase_follows_window() {
        let samples = series(20, |t| RgbSample::new(0.03 * t, 0.0, 0.0));
        let fit = analyze(&samples).unwrap();

        let names: Vec<&str> = fit.phases.iter().map(|p| p.name.as_str()).collect();
        assert!(names.contains(&INITIAL_RATE_PHASE));
        assert_eq!(names.last(), Some(&PLATEAU_PHASE));
        let plateau = fit.phases.last().unwrap();
        assert_eq!(plateau.time_end, 9.5);
    }

    #[test]
    fn test_phase_times_are_rounded() {
        let mut samples = series(8, |t| RgbSample::new(0.1 * t, 0.0, 0.0));
        for (i, s) in samples.iter_mut().enumerate() {
            s.time = i as f64 * 0.3333;
        }
        let fit = analyze(&samples).unwrap();
        let initial = fit.phases.iter().find(|p| p.name == INITIAL_RATE_PHASE).unwrap();

        assert_eq!(initial.time_start, round_time(fit.start_time));
        assert_eq!(initial.time_end, round_time(fit.end_time));
        assert!((initial.time_end - fit.end_time).abs() <= 0.005 + 1e-12);
    }

    #[test]
    fn test_absolute_policy() {
        assert_eq!(V0Policy::Absolute.apply(-0.2), 0.2);
        assert_eq!(V0Policy::Signed.apply(-0.2), -0.2);
    }

    #[test]
    fn test_lag_phase_precedes_initial_rate() {
        // Flat for the first six samples, then a steady rise.
        let samples = series(20, |t| {
            let abs = if t < 3.0 { 0.1 } else { 0.1 + 0.03 * (t - 3.0) };
            RgbSample::new(abs, 0.0, 0.0)
        });
        let config = AnalysisConfig {
            search: SegmentSearchConfig {
                search_fraction: 1.0,
                ..SegmentSearchConfig::default()
            },
        };
        let fit = analyze_with(&samples, &config).unwrap();

        let names: Vec<&str> = fit.phases.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names[0], LAG_PHASE);
        assert_eq!(names[1], INITIAL_RATE_PHASE);
        assert!(fit.start_time >= 3.0);
        assert!((fit.v0 - 0.03).abs() < 1e-9);

        let lag = &fit.phases[0];
        assert_eq!(lag.time_start, 0.0);
        assert!(lag.time_end < fit.start_time);
    }
}
