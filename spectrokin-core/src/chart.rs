//! Reshaping of absorbance time series for display.

use serde::{Deserialize, Serialize};
use spectrokin_schemas::{color::Channel, kinetics::PlotPoint, sample::AbsorbanceSample};

pub const DEFAULT_MAX_POINTS: usize = 200;

/// Absorbance of each channel against time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub r: Vec<PlotPoint>,
    pub g: Vec<PlotPoint>,
    pub b: Vec<PlotPoint>,
}

impl ChartSeries {
    pub fn channel(&self, channel: Channel) -> &[PlotPoint] {
        match channel {
            Channel::R => &self.r,
            Channel::G => &self.g,
            Channel::B => &self.b,
        }
    }
}

/// Keeps at most `max_points` samples, evenly spaced by index. The first and
/// last samples are always kept when `max_points >= 2`; a single-point budget
/// keeps only the first sample, and `0` disables decimation.
pub fn decimate(samples: &[AbsorbanceSample], max_points: usize) -> Vec<AbsorbanceSample> {
    let n = samples.len();
    if n <= max_points || max_points == 0 {
        return samples.to_vec();
    }
    if max_points == 1 {
        return vec![samples[0]];
    }

    let step = (n - 1) as f64 / (max_points - 1) as f64;
    (0..max_points)
        .map(|i| samples[((i as f64 * step).round() as usize).min(n - 1)])
        .collect()
}

pub fn channel_series(samples: &[AbsorbanceSample], channel: Channel) -> Vec<PlotPoint> {
    samples
        .iter()
        .map(|s| PlotPoint::new(s.time, s.abs.get(channel)))
        .collect()
}

/// Decimates `samples` and splits them into one series per channel.
pub fn reduce(samples: &[AbsorbanceSample], max_points: usize) -> ChartSeries {
    let kept = decimate(samples, max_points);
    ChartSeries {
        r: channel_series(&kept, Channel::R),
        g: channel_series(&kept, Channel::G),
        b: channel_series(&kept, Channel::B),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectrokin_schemas::color::RgbSample;

    fn samples(n: usize) -> Vec<AbsorbanceSample> {
        (0..n)
            .map(|i| AbsorbanceSample {
                time: i as f64,
                abs: RgbSample::new(i as f64, 2.0 * i as f64, 3.0 * i as f64),
                sample: RgbSample::default(),
                reference: RgbSample::default(),
            })
            .collect()
    }

    #[test]
    fn test_short_series_untouched() {
        assert_eq!(decimate(&samples(10), 20).len(), 10);
    }

    #[test]
    fn test_decimate_keeps_endpoints() {
        let kept = decimate(&samples(1001), 11);

        assert_eq!(kept.len(), 11);
        assert_eq!(kept[0].time, 0.0);
        assert_eq!(kept[5].time, 500.0);
        assert_eq!(kept[10].time, 1000.0);
        assert!(kept.windows(2).all(|w| w[0].time < w[1].time));
    }

    #[test]
    fn test_reduce_splits_channels() {
        let series = reduce(&samples(5), DEFAULT_MAX_POINTS);

        assert_eq!(series.r.len(), 5);
        assert_eq!(series.channel(Channel::G)[2], PlotPoint::new(2.0, 4.0));
        assert_eq!(series.b[4], PlotPoint::new(4.0, 12.0));
    }

    #[test]
    fn test_single_point_budget_keeps_first() {
        let kept = decimate(&samples(5), 1);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].time, 0.0);

        assert_eq!(decimate(&samples(5), 0).len(), 5);
    }
}
