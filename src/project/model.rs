use std::collections::HashSet;

use crate::animation::camera::CameraState;
use crate::animation::ease::Ease;
use crate::animation::reveal::PathReveal;
use crate::foundation::core::{EntityId, Fps, LngLat, Resolution};
use crate::foundation::error::{MaptrailError, MaptrailResult};

/// User-authored camera stop. Consecutive waypoints define animation legs.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Waypoint {
    /// Stable identifier, referenced from frame records and keyframe scripts.
    pub id: EntityId,
    /// Captured camera pose.
    #[serde(flatten)]
    pub camera: CameraState,
}

/// Visual variant of a pin marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PinStyle {
    /// Teardrop map pin.
    #[default]
    Classic,
    /// Rounded speech bubble (twice as wide as the other styles).
    Bubble,
    /// Rounded square with a pointer.
    Square,
    /// Pennant on a pole.
    Flag,
    /// Plain dot, anchored at its centre.
    Dot,
}

impl PinStyle {
    /// Every style, in menu order.
    pub const ALL: [PinStyle; 5] = [
        PinStyle::Classic,
        PinStyle::Bubble,
        PinStyle::Square,
        PinStyle::Flag,
        PinStyle::Dot,
    ];

    /// Identifier used in project files.
    pub fn name(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Bubble => "bubble",
            Self::Square => "square",
            Self::Flag => "flag",
            Self::Dot => "dot",
        }
    }
}

impl From<String> for PinStyle {
    fn from(name: String) -> Self {
        Self::ALL
            .into_iter()
            .find(|s| s.name() == name)
            .unwrap_or_default()
    }
}

impl From<PinStyle> for String {
    fn from(s: PinStyle) -> Self {
        s.name().to_string()
    }
}

/// Decorative map-anchored marker with an optional text label.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pin {
    /// Stable identifier.
    pub id: EntityId,
    /// Anchor longitude.
    pub lng: f64,
    /// Anchor latitude.
    pub lat: f64,
    /// Label text; empty for no label.
    pub text: String,
    /// Marker shape.
    pub style: PinStyle,
    /// Marker fill colour (`#rgb`, `#rrggbb` or `#rrggbbaa`).
    pub color: String,
    /// Marker scale factor. Zero or `null` in a file reads as 1.
    #[serde(deserialize_with = "scale_or_one")]
    pub scale: f64,
    /// Label scale factor relative to the marker. Zero or `null` in a file reads as 1.
    #[serde(deserialize_with = "scale_or_one")]
    pub text_scale: f64,
    /// Horizontal label offset in unscaled marker pixels.
    pub text_offset_x: f64,
    /// Vertical label offset in unscaled marker pixels.
    pub text_offset_y: f64,
    /// Label colour.
    pub text_color: String,
    /// Label font family.
    pub font_family: String,
}

impl Default for Pin {
    fn default() -> Self {
        Self {
            id: EntityId(0),
            lng: 0.0,
            lat: 0.0,
            text: "Label".to_string(),
            style: PinStyle::Bubble,
            color: "#F72210".to_string(),
            scale: 1.0,
            text_scale: 1.0,
            text_offset_x: 0.0,
            text_offset_y: 0.0,
            text_color: "#FFFFFF".to_string(),
            font_family: "sans-serif".to_string(),
        }
    }
}

impl Pin {
    /// Anchor as a coordinate pair.
    pub fn position(&self) -> LngLat {
        LngLat(self.lng, self.lat)
    }

    /// Check values that feed icon generation and projection.
    pub fn validate(&self) -> MaptrailResult<()> {
        if !self.position().is_finite() {
            return Err(MaptrailError::validation(format!(
                "pin {} position must be finite",
                self.id
            )));
        }
        for (name, v) in [("scale", self.scale), ("textScale", self.text_scale)] {
            if !v.is_finite() || v <= 0.0 {
                return Err(MaptrailError::validation(format!(
                    "pin {} {name} must be positive",
                    self.id
                )));
            }
        }
        if !self.text_offset_x.is_finite() || !self.text_offset_y.is_finite() {
            return Err(MaptrailError::validation(format!(
                "pin {} text offset must be finite",
                self.id
            )));
        }
        for (name, c) in [("color", &self.color), ("textColor", &self.text_color)] {
            if !is_hex_color(c) {
                return Err(MaptrailError::validation(format!(
                    "pin {} {name} '{c}' is not a hex colour",
                    self.id
                )));
            }
        }
        Ok(())
    }
}

/// Dash pattern of the drawn path line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStyle {
    /// Continuous line.
    Solid,
    /// Long dashes.
    #[default]
    Dashed,
    /// Short dots.
    Dotted,
}

impl PathStyle {
    /// Dash pattern in multiples of the line width; `None` for a solid line.
    pub fn dash_array(self) -> Option<[f64; 2]> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some([2.0, 2.0]),
            Self::Dotted => Some([0.1, 2.0]),
        }
    }
}

/// Export and styling configuration with every field enumerated.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationSettings {
    /// Output frame size.
    pub resolution: Resolution,
    /// Map style URL handed to the renderer.
    pub map_style: String,
    /// Path line colour.
    pub path_color: String,
    /// Path line width in pixels. Files may carry it as a numeric string.
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub path_width: f64,
    /// Path line dash pattern.
    pub path_style: PathStyle,
    /// Seconds per leg (waypoint model) or per timeline segment.
    pub duration: f64,
    /// Capture rate in frames per second.
    pub fps: u32,
    /// Camera easing.
    pub easing: Ease,
    /// Seconds before the path starts drawing in.
    pub line_anim_delay: f64,
    /// Seconds the path draw-in takes.
    pub line_anim_duration: f64,
    /// Path draw-in easing.
    pub line_easing: Ease,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            resolution: Resolution {
                width: 1920,
                height: 1080,
            },
            map_style: "https://tiles.openfreemap.org/styles/bright".to_string(),
            path_color: "#F72210".to_string(),
            path_width: 5.0,
            path_style: PathStyle::Dashed,
            duration: 3.0,
            fps: 30,
            easing: Ease::InOutCubic,
            line_anim_delay: 0.0,
            line_anim_duration: 3.0,
            line_easing: Ease::Linear,
        }
    }
}

impl AnimationSettings {
    /// Validate everything an export depends on. Called once at export start.
    pub fn validate(&self) -> MaptrailResult<()> {
        Resolution::new(self.resolution.width, self.resolution.height)?;
        if self.fps == 0 {
            return Err(MaptrailError::validation("fps must be > 0"));
        }
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(MaptrailError::validation("duration must be > 0"));
        }
        if !self.line_anim_duration.is_finite() || self.line_anim_duration <= 0.0 {
            return Err(MaptrailError::validation(
                "path animation duration must be > 0",
            ));
        }
        if !self.line_anim_delay.is_finite() || self.line_anim_delay < 0.0 {
            return Err(MaptrailError::validation(
                "path animation delay must be >= 0",
            ));
        }
        if !self.path_width.is_finite() || self.path_width <= 0.0 {
            return Err(MaptrailError::validation("path width must be > 0"));
        }
        if !is_hex_color(&self.path_color) {
            return Err(MaptrailError::validation(format!(
                "path colour '{}' is not a hex colour",
                self.path_color
            )));
        }
        Ok(())
    }

    /// Capture rate as a validated [`Fps`].
    pub fn fps(&self) -> MaptrailResult<Fps> {
        Fps::new(self.fps, 1)
    }

    /// Path draw-in timing.
    pub fn path_reveal(&self) -> PathReveal {
        PathReveal {
            delay_secs: self.line_anim_delay,
            duration_secs: self.line_anim_duration,
            ease: self.line_easing,
        }
    }
}

/// Everything a project file stores.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    /// Export and styling settings.
    pub settings: AnimationSettings,
    /// Camera stops in animation order.
    pub waypoints: Vec<Waypoint>,
    /// Decorative markers.
    pub pins: Vec<Pin>,
    /// User-drawn polyline in drawing order.
    pub custom_path: Vec<LngLat>,
}

impl Project {
    /// Structural checks applied to every loaded project.
    ///
    /// Export-time checks (fps, durations) live in [`AnimationSettings::validate`].
    pub fn validate(&self) -> MaptrailResult<()> {
        let mut seen = HashSet::new();
        for w in &self.waypoints {
            if !seen.insert(w.id) {
                return Err(MaptrailError::validation(format!(
                    "duplicate waypoint id {}",
                    w.id
                )));
            }
            if !w.camera.is_finite() {
                return Err(MaptrailError::validation(format!(
                    "waypoint {} camera must be finite",
                    w.id
                )));
            }
        }

        let mut seen = HashSet::new();
        for p in &self.pins {
            if !seen.insert(p.id) {
                return Err(MaptrailError::validation(format!(
                    "duplicate pin id {}",
                    p.id
                )));
            }
            p.validate()?;
        }

        if let Some(i) = self.custom_path.iter().position(|c| !c.is_finite()) {
            return Err(MaptrailError::validation(format!(
                "path point {i} must be finite"
            )));
        }
        Ok(())
    }

    /// Look up a waypoint by id.
    pub fn waypoint(&self, id: EntityId) -> Option<&Waypoint> {
        self.waypoints.iter().find(|w| w.id == id)
    }

    /// Look up a pin by id.
    pub fn pin(&self, id: EntityId) -> Option<&Pin> {
        self.pins.iter().find(|p| p.id == id)
    }

    /// Every id in use, waypoints and pins alike.
    pub fn entity_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.waypoints
            .iter()
            .map(|w| w.id)
            .chain(self.pins.iter().map(|p| p.id))
    }

    /// `true` when the drawn path has enough points to animate.
    pub fn has_animatable_path(&self) -> bool {
        self.custom_path.len() >= 2
    }
}

fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Num(f64),
        Str(String),
    }

    match <Repr as serde::Deserialize>::deserialize(deserializer)? {
        Repr::Num(v) => Ok(v),
        Repr::Str(s) => s.trim().parse::<f64>().map_err(|_| {
            <D::Error as serde::de::Error>::custom(format!("expected a number, got \"{s}\""))
        }),
    }
}

fn scale_or_one<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = <Option<f64> as serde::Deserialize>::deserialize(deserializer)?;
    Ok(match v {
        None => 1.0,
        Some(v) if v == 0.0 => 1.0,
        Some(v) => v,
    })
}

/// Accept `#rgb`, `#rrggbb` and `#rrggbbaa`.
pub(crate) fn is_hex_color(s: &str) -> bool {
    let Some(hex) = s.strip_prefix('#') else {
        return false;
    };
    matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
#[path = "../../tests/unit/project/model.rs"]
mod tests;
