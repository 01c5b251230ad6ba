//! Flat-plane polyline measurement and arc-length truncation for the path reveal.
//!
//! Coordinates are treated as ordinary 2D points (lng on x, lat on y), matching how the path is
//! drawn on screen. No geodesic correction is applied.

use crate::foundation::core::LngLat;

/// Progress at or above `1 - FULL_PROGRESS_EPSILON` returns the whole path.
pub const FULL_PROGRESS_EPSILON: f64 = 1e-9;

/// Sum of Euclidean segment lengths along `coords`.
pub fn total_length(coords: &[LngLat]) -> f64 {
    coords
        .windows(2)
        .map(|w| w[0].to_point().distance(w[1].to_point()))
        .sum()
}

/// Prefix of `coords` covering `progress` of its total length.
///
/// - fewer than 2 points, or `progress <= 0` (including NaN): empty
/// - `progress >= 1` (within [`FULL_PROGRESS_EPSILON`]): `coords` unchanged
/// - otherwise: every fully consumed point plus one point linearly interpolated along the
///   segment where the target length falls
pub fn truncate(coords: &[LngLat], progress: f64) -> Vec<LngLat> {
    if coords.len() < 2 || progress.is_nan() || progress <= 0.0 {
        return Vec::new();
    }
    if progress >= 1.0 - FULL_PROGRESS_EPSILON {
        return coords.to_vec();
    }

    let target = total_length(coords) * progress;
    let mut accumulated = 0.0;
    let mut out = Vec::with_capacity(coords.len());

    for w in coords.windows(2) {
        let (p1, p2) = (w[0].to_point(), w[1].to_point());
        let segment = p1.distance(p2);
        out.push(w[0]);

        if accumulated + segment >= target {
            let ratio = if segment > 0.0 {
                (target - accumulated) / segment
            } else {
                0.0
            };
            out.push(LngLat::from_point(p1.lerp(p2, ratio)));
            return out;
        }
        accumulated += segment;
    }

    // Summation drift left the target just past the end.
    out.extend(coords.last().copied());
    out
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/path.rs"]
mod tests;
