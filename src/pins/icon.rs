//! Per-pin marker icons.
//!
//! Each pin owns one generated icon, keyed by pin id. An icon is regenerated only when a
//! style-affecting field changes (moving a pin keeps its icon) and released when the pin is
//! removed.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::foundation::core::{EntityId, Vec2};
use crate::foundation::error::MaptrailResult;
use crate::project::model::{Pin, PinStyle};
use crate::render::frame::{FrameRGBA, SvgRasterizer};

const BASE_HEIGHT: f64 = 50.0;
const BASE_FONT_PX: f64 = 12.0;

struct StyleTemplate {
    view_box: &'static str,
    body: &'static str,
    base_width: f64,
}

fn template(style: PinStyle) -> StyleTemplate {
    match style {
        PinStyle::Classic => StyleTemplate {
            view_box: "0 0 24 24",
            body: r#"<path d="M12 2C8.13 2 5 5.13 5 9c0 5.25 7 13 7 13s7-7.75 7-13c0-3.87-3.13-7-7-7zm0 9.5c-1.38 0-2.5-1.12-2.5-2.5s1.12-2.5 2.5-2.5 2.5 1.12 2.5 2.5-1.12 2.5-2.5 2.5z" fill="%C" stroke="white" stroke-width="1"/>"#,
            base_width: 50.0,
        },
        PinStyle::Bubble => StyleTemplate {
            view_box: "0 0 100 50",
            body: r#"<rect x="2" y="2" width="96" height="46" rx="15" fill="%C" stroke="white" stroke-width="3"/><path d="M50 48 L40 60 L60 60 Z" fill="%C" stroke="white" stroke-width="0"/>"#,
            base_width: 100.0,
        },
        PinStyle::Square => StyleTemplate {
            view_box: "0 0 24 24",
            body: r#"<rect x="2" y="2" width="20" height="20" rx="4" fill="%C" stroke="white" stroke-width="2"/><path d="M12 22l-4 4h8l-4-4z" fill="%C"/>"#,
            base_width: 50.0,
        },
        PinStyle::Flag => StyleTemplate {
            view_box: "0 0 24 24",
            body: r##"<path d="M5 2v20" stroke="#000" stroke-width="2"/><path d="M5 4h14l-4 5 4 5H5" fill="%C" stroke="none"/>"##,
            base_width: 50.0,
        },
        PinStyle::Dot => StyleTemplate {
            view_box: "0 0 20 20",
            body: r#"<circle cx="10" cy="10" r="8" fill="%C" stroke="white" stroke-width="2"/>"#,
            base_width: 50.0,
        },
    }
}

/// Which point of the icon sits on the pin's coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerAnchor {
    /// Icon centre (dots).
    Center,
    /// Bottom centre (every pointed style).
    Bottom,
}

/// Generated marker resource for one pin.
#[derive(Clone, Debug)]
pub struct PinIcon {
    /// Pin the icon was generated for.
    pub pin: EntityId,
    /// Standalone SVG document, `width`x`height` CSS pixels.
    pub svg: String,
    /// Icon width in pixels.
    pub width: u32,
    /// Icon height in pixels.
    pub height: u32,
    /// Anchor point placed on the pin coordinate.
    pub anchor: MarkerAnchor,
    /// Rasterized icon (premultiplied).
    pub raster: FrameRGBA,
}

impl PinIcon {
    /// Offset from the icon's top-left corner to its anchor point.
    pub fn anchor_offset(&self) -> Vec2 {
        let w = f64::from(self.width);
        let h = f64::from(self.height);
        match self.anchor {
            MarkerAnchor::Center => Vec2::new(w / 2.0, h / 2.0),
            MarkerAnchor::Bottom => Vec2::new(w / 2.0, h),
        }
    }
}

/// Build the SVG document for a pin.
///
/// Colours are validated as hex by [`Pin::validate`]; free text is XML-escaped.
pub fn pin_svg(pin: &Pin) -> String {
    let t = template(pin.style);
    let width = t.base_width * pin.scale;
    let height = BASE_HEIGHT * pin.scale;
    let body = t.body.replace("%C", &xml_escape(&pin.color));

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    let _ = write!(
        svg,
        r#"<svg x="0" y="0" width="{width}" height="{height}" viewBox="{}">{body}</svg>"#,
        t.view_box
    );

    if !pin.text.is_empty() {
        let font_px = BASE_FONT_PX * pin.scale * pin.text_scale;
        let x = width / 2.0 + pin.text_offset_x * pin.scale;
        let y = height / 2.0 + pin.text_offset_y * pin.scale;
        let filter_id = format!("shadow-{}", pin.id);
        let _ = write!(
            svg,
            r#"<filter id="{filter_id}"><feDropShadow dx="1" dy="1" stdDeviation="1" flood-color="black" flood-opacity="0.8"/></filter>"#
        );
        let _ = write!(
            svg,
            r#"<text x="{x}" y="{y}" font-family="{}" font-size="{font_px}" font-weight="800" fill="{}" text-anchor="middle" dominant-baseline="central" filter="url(#{filter_id})">{}</text>"#,
            xml_escape(&pin.font_family),
            xml_escape(&pin.text_color),
            xml_escape(&single_line(&pin.text)),
        );
    }

    svg.push_str("</svg>");
    svg
}

fn single_line(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}

/// Escape text for use in XML content and double-quoted attributes.
pub(crate) fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Fields that change the icon's appearance. Position is deliberately absent.
#[derive(Clone, Debug, PartialEq)]
struct IconKey {
    text: String,
    style: PinStyle,
    color: String,
    scale: u64,
    text_scale: u64,
    text_offset: (u64, u64),
    text_color: String,
    font_family: String,
}

impl IconKey {
    fn of(pin: &Pin) -> Self {
        Self {
            text: pin.text.clone(),
            style: pin.style,
            color: pin.color.clone(),
            scale: pin.scale.to_bits(),
            text_scale: pin.text_scale.to_bits(),
            text_offset: (pin.text_offset_x.to_bits(), pin.text_offset_y.to_bits()),
            text_color: pin.text_color.clone(),
            font_family: pin.font_family.clone(),
        }
    }
}

struct CachedIcon {
    key: IconKey,
    icon: Arc<PinIcon>,
}

/// Icon cache keyed by pin id.
pub struct PinIconCache {
    rasterizer: SvgRasterizer,
    icons: HashMap<EntityId, CachedIcon>,
    generated: u64,
}

impl PinIconCache {
    /// Empty cache using `rasterizer` for icon generation.
    pub fn new(rasterizer: SvgRasterizer) -> Self {
        Self {
            rasterizer,
            icons: HashMap::new(),
            generated: 0,
        }
    }

    /// Build a fresh cache holding icons for every pin in `pins`.
    pub fn build_all<'a, I: IntoIterator<Item = &'a Pin>>(
        rasterizer: SvgRasterizer,
        pins: I,
    ) -> MaptrailResult<Self> {
        let mut cache = Self::new(rasterizer);
        for pin in pins {
            cache.refresh(pin)?;
        }
        Ok(cache)
    }

    /// Return the icon for `pin`, regenerating it if a style-affecting field changed.
    pub fn refresh(&mut self, pin: &Pin) -> MaptrailResult<Arc<PinIcon>> {
        let key = IconKey::of(pin);
        if let Some(cached) = self.icons.get(&pin.id)
            && cached.key == key
        {
            return Ok(cached.icon.clone());
        }

        pin.validate()?;
        let svg = pin_svg(pin);
        let raster = self.rasterizer.rasterize(&svg)?;
        let icon = Arc::new(PinIcon {
            pin: pin.id,
            width: raster.width,
            height: raster.height,
            anchor: match pin.style {
                PinStyle::Dot => MarkerAnchor::Center,
                _ => MarkerAnchor::Bottom,
            },
            svg,
            raster,
        });
        self.generated += 1;
        tracing::debug!(pin = %pin.id, style = pin.style.name(), "generated pin icon");
        self.icons.insert(
            pin.id,
            CachedIcon {
                key,
                icon: icon.clone(),
            },
        );
        Ok(icon)
    }

    /// Cached icon for `id`, if any.
    pub fn get(&self, id: EntityId) -> Option<Arc<PinIcon>> {
        self.icons.get(&id).map(|c| c.icon.clone())
    }

    /// Drop the icon for a removed pin. Returns `true` if one was cached.
    pub fn release(&mut self, id: EntityId) -> bool {
        self.icons.remove(&id).is_some()
    }

    /// Number of cached icons.
    pub fn len(&self) -> usize {
        self.icons.len()
    }

    /// `true` when no icons are cached.
    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    /// Total icons generated over the cache's lifetime.
    pub fn generated(&self) -> u64 {
        self.generated
    }

    /// Rasterizer shared with the cache.
    pub fn rasterizer(&self) -> &SvgRasterizer {
        &self.rasterizer
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pins/icon.rs"]
mod tests;
