//! Two-zone particle-life force law.

use crate::constants::{BETA_MAX, BETA_MIN};

/// Radial force for a normalized distance `d = r / max_radius`.
///
/// Below `beta` every pair repels linearly from -1 at contact to 0 at `beta`.
/// Between `beta` and 1 the force is a triangle scaled by `attraction`, peaking
/// at `(1 + beta) / 2`. At and beyond 1 there is no force. `beta` must already
/// be clamped into `[0.01, 0.99]` (see [`repulsion_ratio`]).
#[inline]
pub fn force(d: f32, attraction: f32, beta: f32) -> f32 {
    if d < beta {
        d / beta - 1.0
    } else if d < 1.0 {
        attraction * (1.0 - (2.0 * d - 1.0 - beta).abs() / (1.0 - beta))
    } else {
        0.0
    }
}

/// `min_radius / max_radius`, clamped so neither denominator in [`force`] degenerates.
#[inline]
pub fn repulsion_ratio(min_radius: f32, max_radius: f32) -> f32 {
    let beta = min_radius / max_radius;
    if beta.is_nan() {
        BETA_MIN
    } else {
        beta.clamp(BETA_MIN, BETA_MAX)
    }
}
