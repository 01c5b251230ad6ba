use crate::foundation::error::{MaptrailError, MaptrailResult};

pub use kurbo::{Affine, Point, Vec2};

/// Absolute 0-based frame index in export order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> MaptrailResult<Self> {
        if den == 0 {
            return Err(MaptrailError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(MaptrailError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Timestamp (seconds from export start) of frame `idx`.
    ///
    /// Computed as `idx * den / num` in one division so integer frame rates give exactly `idx / fps`.
    pub fn frame_time_secs(self, idx: FrameIndex) -> f64 {
        (idx.0 as f64 * f64::from(self.den)) / f64::from(self.num)
    }

    /// Number of frames needed to cover `secs`, i.e. `ceil(secs * fps)`.
    ///
    /// A 1e-9 tolerance keeps products like `0.1 * 30` from rounding up to an extra frame.
    pub fn secs_to_frames_ceil(self, secs: f64) -> u64 {
        let exact = secs * self.as_f64();
        (exact - 1e-9).ceil().max(0.0) as u64
    }
}

/// Output resolution in pixels.
///
/// Serialized as `"WIDTHxHEIGHT"` (e.g. `"1920x1080"`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Create a resolution, rejecting zero dimensions.
    pub fn new(width: u32, height: u32) -> MaptrailResult<Self> {
        if width == 0 || height == 0 {
            return Err(MaptrailError::validation(
                "resolution width/height must be non-zero",
            ));
        }
        Ok(Self { width, height })
    }

    /// Centre of the viewport in screen coordinates.
    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    /// Size of one tightly packed RGBA8 frame at this resolution.
    pub fn rgba_len(self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }
}

impl std::str::FromStr for Resolution {
    type Err = MaptrailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| MaptrailError::validation(format!("resolution '{s}' is not WxH")))?;
        let width = w
            .trim()
            .parse::<u32>()
            .map_err(|e| MaptrailError::validation(format!("resolution width '{w}': {e}")))?;
        let height = h
            .trim()
            .parse::<u32>()
            .map_err(|e| MaptrailError::validation(format!("resolution height '{h}': {e}")))?;
        Self::new(width, height)
    }
}

impl TryFrom<String> for Resolution {
    type Error = MaptrailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Resolution> for String {
    fn from(r: Resolution) -> Self {
        r.to_string()
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Geographic coordinate pair, serialized as `[lng, lat]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LngLat(pub f64, pub f64);

impl LngLat {
    /// Longitude in degrees.
    pub fn lng(self) -> f64 {
        self.0
    }

    /// Latitude in degrees.
    pub fn lat(self) -> f64 {
        self.1
    }

    /// `true` when both components are finite.
    pub fn is_finite(self) -> bool {
        self.0.is_finite() && self.1.is_finite()
    }

    /// View as a flat 2D point (lng on x, lat on y).
    pub fn to_point(self) -> Point {
        Point::new(self.0, self.1)
    }

    /// Inverse of [`LngLat::to_point`].
    pub fn from_point(p: Point) -> Self {
        Self(p.x, p.y)
    }
}

/// Stable identifier for waypoints and pins.
///
/// Identifiers are plain integers so they can be embedded verbatim in generated script source.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic allocator for [`EntityId`]s, seeded past every id already in a project.
#[derive(Clone, Debug, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Start allocating after the largest id in `existing`.
    pub fn after<I: IntoIterator<Item = EntityId>>(existing: I) -> Self {
        let next = existing
            .into_iter()
            .map(|id| id.0.saturating_add(1))
            .max()
            .unwrap_or(1)
            .max(1);
        Self { next }
    }

    /// Hand out the next id.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
