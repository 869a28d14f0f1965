//! Initial-rate search over an absorbance time series.
//!
//! Per-frame absorbance is noisy, and the initial velocity is the steepest
//! sustained linear stretch near the start of the curve rather than the best
//! pair of points. The search smooths the series, fits every candidate window
//! on the smoothed values and scores each fit against the raw readings, so
//! smoothing can never inflate the reported R².

use crate::{
    regression::{self, LinearFit, DEGENERATE_DENOMINATOR},
    smoothing::{self, MOVING_AVERAGE_WINDOW},
};
use serde::{Deserialize, Serialize};

/// Fraction of the series, counted from the first sample, that candidate
/// windows may cover. `1.0` searches every window in the series.
pub const INITIAL_RATE_SEARCH_FRACTION: f64 = 0.4;

/// Raw R² scores closer than this to the best so far do not displace it.
pub const SCORE_TOLERANCE: f64 = 1e-12;

/// Default minimum number of points in a candidate window.
pub const DEFAULT_MIN_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentSearchConfig {
    pub min_window: usize,
    pub search_fraction: f64,
    pub smoothing_window: usize,
}

impl Default for SegmentSearchConfig {
    fn default() -> Self {
        Self {
            min_window: DEFAULT_MIN_WINDOW,
            search_fraction: INITIAL_RATE_SEARCH_FRACTION,
            smoothing_window: MOVING_AVERAGE_WINDOW,
        }
    }
}

impl SegmentSearchConfig {
    pub fn with_min_window(min_window: usize) -> Self {
        Self {
            min_window,
            ..Self::default()
        }
    }

    /// Number of leading points that candidate windows are drawn from.
    pub fn search_len(&self, n: usize) -> usize {
        let min_window = self.effective_min_window();
        let fraction = if self.search_fraction.is_finite() {
            self.search_fraction.clamp(0.0, 1.0)
        } else {
            1.0
        };
        let wanted = (n as f64 * fraction).ceil() as usize;
        wanted.max(min_window).min(n)
    }

    fn effective_min_window(&self) -> usize {
        self.min_window.max(2)
    }
}

/// Best window found by [`find_initial_rate`]. Indices are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub start_index: usize,
    pub end_index: usize,
}

impl SegmentFit {
    fn whole_series(fit: LinearFit, len: usize) -> Self {
        Self {
            slope: fit.slope,
            intercept: fit.intercept,
            r_squared: fit.r_squared,
            start_index: 0,
            end_index: len.saturating_sub(1),
        }
    }
}

/// Finds the initial-rate window using the default search settings.
pub fn find_initial_rate(time: &[f64], absorbance: &[f64], min_window: usize) -> SegmentFit {
    find_initial_rate_with(time, absorbance, &SegmentSearchConfig::with_min_window(min_window))
}

/// Finds the window with the highest raw R² among all windows of at least
/// `config.min_window` points inside the search range.
///
/// Windows are visited by ascending start index, then ascending end index;
/// the first window reaching the best score is kept, and scores within
/// [`SCORE_TOLERANCE`] of the best count as equal. A series shorter than the
/// minimum window is fitted as a whole.
pub fn find_initial_rate_with(
    time: &[f64],
    absorbance: &[f64],
    config: &SegmentSearchConfig,
) -> SegmentFit {
    let n = time.len().min(absorbance.len());
    let (time, absorbance) = (&time[..n], &absorbance[..n]);
    let min_window = config.effective_min_window();

    if n < min_window {
        return SegmentFit::whole_series(regression::fit(time, absorbance), n);
    }

    let smoothed = smoothing::moving_average(absorbance, config.smoothing_window);
    let search_len = config.search_len(n);
    let sums = PrefixSums::new(&time[..search_len], &smoothed[..search_len], &absorbance[..search_len]);

    let mut best: Option<SegmentFit> = None;
    for start in 0..=search_len - min_window {
        for end in start + min_window - 1..search_len {
            let candidate = sums.score(start, end);
            if !best.is_some_and(|b| candidate.r_squared <= b.r_squared + SCORE_TOLERANCE) {
                best = Some(candidate);
            }
        }
    }

    best.unwrap_or_else(|| SegmentFit::whole_series(regression::fit(time, absorbance), n))
}

/// Running sums over the search range, so each window is fitted and scored
/// in constant time.
///
/// Times and values are shifted by the first sample before summing; a flat
/// series then sums to exact zeros and reports R² = 0.
struct PrefixSums {
    time_origin: f64,
    value_origin: f64,
    cumulative: Vec<WindowSums>,
}

#[derive(Debug, Clone, Copy, Default)]
struct WindowSums {
    n: f64,
    t: f64,
    tt: f64,
    smoothed: f64,
    t_smoothed: f64,
    raw: f64,
    raw_raw: f64,
    t_raw: f64,
}

impl WindowSums {
    fn add(self, t: f64, smoothed: f64, raw: f64) -> Self {
        Self {
            n: self.n + 1.0,
            t: self.t + t,
            tt: self.tt + t * t,
            smoothed: self.smoothed + smoothed,
            t_smoothed: self.t_smoothed + t * smoothed,
            raw: self.raw + raw,
            raw_raw: self.raw_raw + raw * raw,
            t_raw: self.t_raw + t * raw,
        }
    }

    fn minus(self, other: Self) -> Self {
        Self {
            n: self.n - other.n,
            t: self.t - other.t,
            tt: self.tt - other.tt,
            smoothed: self.smoothed - other.smoothed,
            t_smoothed: self.t_smoothed - other.t_smoothed,
            raw: self.raw - other.raw,
            raw_raw: self.raw_raw - other.raw_raw,
            t_raw: self.t_raw - other.t_raw,
        }
    }
}

impl PrefixSums {
    fn new(time: &[f64], smoothed: &[f64], raw: &[f64]) -> Self {
        let time_origin = time.first().copied().unwrap_or(0.0);
        let value_origin = raw.first().copied().unwrap_or(0.0);

        let mut cumulative = Vec::with_capacity(time.len() + 1);
        let mut running = WindowSums::default();
        cumulative.push(running);
        for ((&t, &s), &r) in time.iter().zip(smoothed).zip(raw) {
            running = running.add(t - time_origin, s - value_origin, r - value_origin);
            cumulative.push(running);
        }

        Self {
            time_origin,
            value_origin,
            cumulative,
        }
    }

    /// Least-squares line through the smoothed values of `start..=end`,
    /// scored against the raw values. Matches [`regression::fit`] followed by
    /// [`regression::r_squared_against`] on the same window.
    fn score(&self, start: usize, end: usize) -> SegmentFit {
        let w = self.cumulative[end + 1].minus(self.cumulative[start]);

        // Slope and intercept in shifted coordinates. A degenerate fit is the
        // zero line of the unshifted data.
        let denominator = w.n * w.tt - w.t * w.t;
        let usable = denominator.is_finite() && denominator.abs() >= DEGENERATE_DENOMINATOR;
        let (slope, intercept) = if usable {
            let slope = (w.n * w.t_smoothed - w.t * w.smoothed) / denominator;
            let intercept = (w.smoothed - slope * w.t) / w.n;
            if slope.is_finite() && intercept.is_finite() {
                (slope, intercept)
            } else {
                (0.0, -self.value_origin)
            }
        } else {
            (0.0, -self.value_origin)
        };

        let ss_tot = w.raw_raw - w.raw * w.raw / w.n;
        let r_squared = if ss_tot <= f64::EPSILON * w.n {
            0.0
        } else {
            let ss_res = w.raw_raw - 2.0 * slope * w.t_raw - 2.0 * intercept * w.raw
                + slope * slope * w.tt
                + 2.0 * slope * intercept * w.t
                + w.n * intercept * intercept;
            let r_squared = 1.0 - ss_res / ss_tot;
            if r_squared.is_nan() {
                0.0
            } else {
                r_squared.clamp(0.0, 1.0)
            }
        };

        SegmentFit {
            slope,
            intercept: intercept + self.value_origin - slope * self.time_origin,
            r_squared,
            start_index: start,
            end_index: end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn times(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 * 0.5).collect()
    }

    #[test]
    fn test_search_len() {
        let config = SegmentSearchConfig::default();
        assert_eq!(config.search_len(20), 8);
        assert_eq!(config.search_len(6), 5);
        assert_eq!(config.search_len(3), 3);

        let all = SegmentSearchConfig {
            search_fraction: 1.0,
            ..SegmentSearchConfig::default()
        };
        assert_eq!(all.search_len(20), 20);
    }

    #[test]
    fn test_linear_series_fits_perfectly() {
        let time = times(20);
        let abs: Vec<f64> = time.iter().map(|t| 0.02 * t + 0.1).collect();
        let fit = find_initial_rate(&time, &abs, 5);

        assert!((fit.slope - 0.02).abs() < 1e-9);
        assert!((fit.r_squared - 1.0).abs() < 1e-9);
        assert_eq!(fit.start_index, 0);
        assert!(fit.end_index < 8);
    }

    #[test]
    fn test_prefers_linear_start_over_plateau() {
        let time = times(30);
        let abs: Vec<f64> = (0..30)
            .map(|i| {
                let rise = 0.05 * i as f64;
                let wobble = if i % 2 == 0 { 0.004 } else { -0.004 };
                rise.min(0.6) + wobble
            })
            .collect();
        let config = SegmentSearchConfig {
            search_fraction: 1.0,
            ..SegmentSearchConfig::default()
        };
        let fit = find_initial_rate_with(&time, &abs, &config);

        assert!(fit.end_index <= 13, "window ran into plateau: {:?}", fit);
        assert!((fit.slope - 0.1).abs() < 0.01);
    }

    #[test]
    fn test_short_series_falls_back_to_whole_fit() {
        let time = times(3);
        let abs = [0.0, 0.1, 0.2];
        let fit = find_initial_rate(&time, &abs, 5);

        assert_eq!(fit.start_index, 0);
        assert_eq!(fit.end_index, 2);
        assert!((fit.slope - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_flat_series_reports_zero() {
        let time = times(10);
        let abs = vec![0.3; 10];
        let fit = find_initial_rate(&time, &abs, 5);

        assert!(fit.slope.abs() < 1e-12);
        assert_eq!(fit.r_squared, 0.0);
        assert_eq!(fit.start_index, 0);
    }

    #[test]
    fn test_r_squared_scored_against_raw_values() {
        let time = times(20);
        let abs: Vec<f64> = time
            .iter()
            .enumerate()
            .map(|(i, t)| 0.02 * t + if i % 2 == 0 { 0.02 } else { -0.02 })
            .collect();
        let fit = find_initial_rate(&time, &abs, 5);
        let window = fit.start_index..fit.end_index + 1;

        let raw = regression::r_squared_against(
            fit.slope,
            fit.intercept,
            &time[window.clone()],
            &abs[window.clone()],
        );
        let smoothed = smoothing::moving_average(&abs, MOVING_AVERAGE_WINDOW);
        let against_smoothed =
            regression::r_squared_against(fit.slope, fit.intercept, &time[window.clone()], &smoothed[window]);

        assert!((fit.r_squared - raw).abs() < 1e-9, "{} vs {}", fit.r_squared, raw);
        assert!(fit.r_squared < 1.0);
        assert!(against_smoothed > fit.r_squared);
    }

    /// Reference search refitting every window from scratch.
    fn exhaustive_search(time: &[f64], abs: &[f64], config: &SegmentSearchConfig) -> SegmentFit {
        let smoothed = smoothing::moving_average(abs, config.smoothing_window);
        let search_len = config.search_len(time.len());
        let mut best: Option<SegmentFit> = None;
        for start in 0..=search_len - config.min_window {
            for end in start + config.min_window - 1..search_len {
                let line = regression::fit(&time[start..=end], &smoothed[start..=end]);
                let r_squared =
                    regression::r_squared_against(line.slope, line.intercept, &time[start..=end], &abs[start..=end]);
                if best.map_or(true, |b| r_squared > b.r_squared + SCORE_TOLERANCE) {
                    best = Some(SegmentFit {
                        slope: line.slope,
                        intercept: line.intercept,
                        r_squared,
                        start_index: start,
                        end_index: end,
                    });
                }
            }
        }
        best.unwrap()
    }

    #[test]
    fn test_running_sums_match_exhaustive_refits() {
        let time = times(60);
        // Deterministic pseudo-noise on a slow ramp that saturates.
        let abs: Vec<f64> = (0..60)
            .map(|i| {
                let t = time[i];
                let noise = ((i * 7919) % 23) as f64 / 23.0 - 0.5;
                0.4 * (1.0 - (-t / 12.0).exp()) + 0.01 * noise + 1.5
            })
            .collect();

        for fraction in [0.4, 1.0] {
            let config = SegmentSearchConfig {
                search_fraction: fraction,
                ..SegmentSearchConfig::default()
            };
            let fast = find_initial_rate_with(&time, &abs, &config);
            let slow = exhaustive_search(&time, &abs, &config);

            assert_eq!((fast.start_index, fast.end_index), (slow.start_index, slow.end_index));
            assert!((fast.slope - slow.slope).abs() < 1e-9);
            assert!((fast.intercept - slow.intercept).abs() < 1e-9);
            assert!((fast.r_squared - slow.r_squared).abs() < 1e-9);
        }
    }
}
