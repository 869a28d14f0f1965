/// Nominal width of the centred moving average.
pub const MOVING_AVERAGE_WINDOW: usize = 5;

/// Centred moving average with a window of `window` points.
///
/// Near either end the half-width shrinks symmetrically to the number of
/// points available on the shorter side, so no padding is introduced and a
/// perfectly linear series passes through unchanged. An even `window` is
/// treated as the next odd size down.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let half = window.max(1).saturating_sub(1) / 2;

    (0..n)
        .map(|i| {
            let reach = half.min(i).min(n - 1 - i);
            let slice = &values[i - reach..=i + reach];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_series_is_unchanged() {
        let values: Vec<f64> = (0..10).map(|i| 0.3 * i as f64 + 1.0).collect();
        let smoothed = moving_average(&values, MOVING_AVERAGE_WINDOW);

        for (a, b) in values.iter().zip(&smoothed) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_boundaries_shrink() {
        let values = [0.0, 10.0, 0.0, 10.0, 0.0, 10.0];
        let smoothed = moving_average(&values, 5);

        // Endpoints have no neighbours on one side and stay as-is.
        assert_eq!(smoothed[0], 0.0);
        assert_eq!(smoothed[5], 10.0);
        // Second point averages three values.
        assert!((smoothed[1] - 10.0 / 3.0).abs() < 1e-12);
        // Interior points use the full window.
        assert!((smoothed[2] - 20.0 / 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_spike_is_damped() {
        let values = [1.0, 1.0, 1.0, 6.0, 1.0, 1.0, 1.0];
        let smoothed = moving_average(&values, 5);
        assert!((smoothed[3] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_and_single() {
        assert!(moving_average(&[], 5).is_empty());
        assert_eq!(moving_average(&[4.2], 5), vec![4.2]);
    }
}
