//! Beer-Lambert absorbance with reference-channel drift correction.
//!
//! The reference ROI sees the same light source as the sample ROI but no
//! reagent, so any change in its reading since the blank is lamp or exposure
//! drift. Scaling the sample by `blank_reference / reference` removes it before
//! the absorbance is taken against the blank sample.

use spectrokin_schemas::{color::RgbSample, sample::BlankReference};

/// Floor applied to every divisor and to the transmittance before `log10`.
pub const EPSILON: f64 = 1e-9;

/// Absorbance of one channel. Never negative; degenerate inputs resolve to
/// zero or to the epsilon-guarded bound instead of failing.
pub fn channel_absorbance(sample: f64, blank_sample: f64, reference: f64, blank_reference: f64) -> f64 {
    let corrected = sample * (blank_reference / reference.max(EPSILON));
    let transmittance = corrected / blank_sample.max(EPSILON);
    let absorbance = -transmittance.max(EPSILON).log10();
    if absorbance.is_nan() {
        0.0
    } else {
        absorbance.max(0.0)
    }
}

/// Drift-corrected absorbance for all three channels.
pub fn correct(
    sample: &RgbSample,
    blank_sample: &RgbSample,
    reference: &RgbSample,
    blank_reference: &RgbSample,
) -> RgbSample {
    sample.map(|channel, value| {
        channel_absorbance(
            value,
            blank_sample.get(channel),
            reference.get(channel),
            blank_reference.get(channel),
        )
    })
}

/// [`correct`] against a captured blank.
pub fn correct_against(sample: &RgbSample, reference: &RgbSample, blank: &BlankReference) -> RgbSample {
    correct(sample, &blank.blank_sample, reference, &blank.blank_reference)
}
