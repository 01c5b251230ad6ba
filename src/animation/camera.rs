use crate::animation::ease::Ease;
use crate::foundation::core::LngLat;
use crate::foundation::math::lerp;

/// One instant of virtual-camera pose.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CameraState {
    /// Longitude of the view centre, degrees.
    pub lng: f64,
    /// Latitude of the view centre, degrees.
    pub lat: f64,
    /// Map zoom level.
    pub zoom: f64,
    /// Tilt away from nadir, degrees.
    pub pitch: f64,
    /// Rotation clockwise from north, degrees.
    pub bearing: f64,
}

impl CameraState {
    /// View centre as a coordinate pair.
    pub fn center(&self) -> LngLat {
        LngLat(self.lng, self.lat)
    }

    /// `true` when every field is finite.
    pub fn is_finite(&self) -> bool {
        [self.lng, self.lat, self.zoom, self.pitch, self.bearing]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Interpolate between two poses at raw progress `raw_t` using `ease`.
///
/// Every field is interpolated independently and linearly in the eased domain. Longitude and
/// latitude are treated as flat coordinates: no great-circle path and no antimeridian wrap, so
/// legs are expected to be short camera moves.
pub fn interpolate(a: &CameraState, b: &CameraState, raw_t: f64, ease: Ease) -> CameraState {
    let t = ease.apply(raw_t);
    CameraState {
        lng: lerp(a.lng, b.lng, t),
        lat: lerp(a.lat, b.lat, t),
        zoom: lerp(a.zoom, b.zoom, t),
        pitch: lerp(a.pitch, b.pitch, t),
        bearing: lerp(a.bearing, b.bearing, t),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/camera.rs"]
mod tests;
