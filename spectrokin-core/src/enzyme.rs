//! Michaelis-Menten parameters from several (substrate, V0) pairs.
//!
//! Two linearizations are fitted independently and their estimates averaged
//! over whichever of them produced usable values:
//!
//! - Lineweaver-Burk: `1/v0 = (Km/Vmax)(1/s) + 1/Vmax`
//! - Hanes-Woolf: `s/v0 = (1/Vmax)s + Km/Vmax`

use crate::regression::{self, LinearFit};
use log::{debug, warn};
use spectrokin_schemas::kinetics::{
    KineticParameters, LinearizationMethod, PlotPoint, SubstrateVelocityPoint,
};

/// Fewest points any estimate needs.
pub const MIN_POINTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodEstimate {
    pub method: LinearizationMethod,
    pub vmax: f64,
    pub km: f64,
}

/// Estimates Vmax and Km. Never fails: too few points, or no usable
/// linearization, give zeroed parameters.
pub fn estimate(points: &[SubstrateVelocityPoint]) -> KineticParameters {
    if points.len() < MIN_POINTS {
        warn!("Need at least {} substrate/velocity pairs, got {}", MIN_POINTS, points.len());
        return KineticParameters::default();
    }

    let mut michaelis_menten: Vec<PlotPoint> =
        points.iter().map(|p| PlotPoint::new(p.s, p.v0)).collect();
    sort_by_x(&mut michaelis_menten);

    let valid: Vec<&SubstrateVelocityPoint> = points.iter().filter(|p| is_valid(p)).collect();
    if valid.len() < points.len() {
        debug!("Ignoring {} pairs with non-positive s or v0", points.len() - valid.len());
    }

    let mut lineweaver_burk: Vec<PlotPoint> =
        valid.iter().map(|p| PlotPoint::new(1.0 / p.s, 1.0 / p.v0)).collect();
    let mut hanes_woolf: Vec<PlotPoint> =
        valid.iter().map(|p| PlotPoint::new(p.s, p.s / p.v0)).collect();
    sort_by_x(&mut lineweaver_burk);
    sort_by_x(&mut hanes_woolf);

    let estimates: Vec<MethodEstimate> = if valid.len() >= MIN_POINTS {
        [
            lineweaver_burk_estimate(&lineweaver_burk),
            hanes_woolf_estimate(&hanes_woolf),
        ]
        .into_iter()
        .flatten()
        .collect()
    } else {
        warn!("Fewer than {} pairs with positive s and v0; no linearization attempted", MIN_POINTS);
        Vec::new()
    };

    let (vmax, km) = average(&estimates);
    debug!("Vmax {:.6}, Km {:.6} from {} method(s)", vmax, km, estimates.len());

    KineticParameters {
        vmax,
        km,
        michaelis_menten,
        lineweaver_burk,
        hanes_woolf,
        methods: estimates.iter().map(|e| e.method).collect(),
    }
}

/// `vmax = 1/intercept`, `km = slope * vmax`.
pub fn lineweaver_burk_estimate(points: &[PlotPoint]) -> Option<MethodEstimate> {
    let fit = fit_points(points);
    if fit.intercept == 0.0 {
        return None;
    }
    let vmax = 1.0 / fit.intercept;
    finite_estimate(LinearizationMethod::LineweaverBurk, vmax, fit.slope * vmax)
}

/// `vmax = 1/slope`, `km = intercept * vmax`.
pub fn hanes_woolf_estimate(points: &[PlotPoint]) -> Option<MethodEstimate> {
    let fit = fit_points(points);
    if fit.slope == 0.0 {
        return None;
    }
    let vmax = 1.0 / fit.slope;
    finite_estimate(LinearizationMethod::HanesWoolf, vmax, fit.intercept * vmax)
}

/// Points of the fitted Michaelis-Menten hyperbola `v = vmax * s / (km + s)`
/// over `0..=s_max`, for overlaying on the measured pairs.
pub fn michaelis_menten_curve(vmax: f64, km: f64, s_max: f64, n: usize) -> Vec<PlotPoint> {
    if n < 2 || s_max.is_nan() || s_max <= 0.0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let s = s_max * i as f64 / (n - 1) as f64;
            let denominator = km + s;
            let v = if denominator == 0.0 { 0.0 } else { vmax * s / denominator };
            PlotPoint::new(s, v)
        })
        .collect()
}

fn is_valid(point: &SubstrateVelocityPoint) -> bool {
    point.s.is_finite() && point.v0.is_finite() && point.s > 0.0 && point.v0 > 0.0
}

fn fit_points(points: &[PlotPoint]) -> LinearFit {
    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
    regression::fit(&xs, &ys)
}

fn finite_estimate(method: LinearizationMethod, vmax: f64, km: f64) -> Option<MethodEstimate> {
    if vmax.is_finite() && km.is_finite() {
        Some(MethodEstimate { method, vmax, km })
    } else {
        debug!("{:?} produced non-finite parameters", method);
        None
    }
}

fn average(estimates: &[MethodEstimate]) -> (f64, f64) {
    if estimates.is_empty() {
        return (0.0, 0.0);
    }
    let n = estimates.len() as f64;
    let vmax = estimates.iter().map(|e| e.vmax).sum::<f64>() / n;
    let km = estimates.iter().map(|e| e.km).sum::<f64>() / n;
    (vmax, km)
}

fn sort_by_x(points: &mut [PlotPoint]) {
    points.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
}
