//! Headless CPU map renderer.
//!
//! Draws a flat Web-Mercator view: a background, a tile grid, the path layer and the pin
//! markers. Bearing rotates the view around the screen centre; pitch is accepted but not drawn.
//! Repaints happen synchronously inside [`MapRenderer::request_repaint`], after which the
//! completion event is sent.

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt::Write as _;

use crate::animation::camera::CameraState;
use crate::foundation::core::{Affine, EntityId, LngLat, Point, Resolution, Vec2};
use crate::foundation::error::{MaptrailError, MaptrailResult};
use crate::pins::icon::{PinIcon, xml_escape};
use crate::render::frame::{FrameRGBA, SvgRasterizer, rasterize_svg};
use crate::render::renderer::{MapRenderer, PathLineStyle, RenderNotifier, RepaintId};

const TILE_SIZE: f64 = 512.0;
const MAX_LATITUDE: f64 = 85.051_128_779_806_6;
const BACKGROUND: &str = "#e4ecef";
const GRID: &str = "#c9d6dd";

/// Mercator position of `at` in world pixels at `zoom`.
pub fn world_point(at: LngLat, zoom: f64) -> Point {
    let world = TILE_SIZE * 2f64.powf(zoom);
    let lat = at.lat().clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (at.lng() + 180.0) / 360.0 * world;
    let y = (1.0 - (PI / 4.0 + lat / 2.0).tan().ln() / PI) / 2.0 * world;
    Point::new(x, y)
}

struct Marker {
    svg: String,
    offset: Vec2,
    at: LngLat,
}

/// CPU renderer backed by `resvg`.
pub struct PreviewRenderer {
    resolution: Resolution,
    rasterizer: SvgRasterizer,
    camera: CameraState,
    path: Vec<LngLat>,
    path_style: PathLineStyle,
    markers: BTreeMap<EntityId, Marker>,
    notifier: Option<RenderNotifier>,
    last_repaint: u64,
    surface: FrameRGBA,
}

impl PreviewRenderer {
    /// Renderer with a `resolution`-sized surface.
    pub fn new(resolution: Resolution, rasterizer: SvgRasterizer) -> Self {
        Self {
            resolution,
            rasterizer,
            camera: CameraState::default(),
            path: Vec::new(),
            path_style: PathLineStyle::default(),
            markers: BTreeMap::new(),
            notifier: None,
            last_repaint: 0,
            surface: FrameRGBA::transparent(resolution),
        }
    }

    /// Surface size.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Screen transform for the current pose, mapping pose-relative world pixels to the surface.
    fn view(&self) -> Affine {
        Affine::translate(self.resolution.center().to_vec2())
            * Affine::rotate(-self.camera.bearing.to_radians())
    }

    fn relative(&self, at: LngLat) -> Point {
        let c = world_point(self.camera.center(), self.camera.zoom);
        let p = world_point(at, self.camera.zoom);
        (p - c).to_point()
    }

    /// SVG document for the current state.
    pub fn scene_svg(&self) -> String {
        let w = self.resolution.width;
        let h = self.resolution.height;
        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        );
        let _ = write!(svg, r#"<rect width="{w}" height="{h}" fill="{BACKGROUND}"/>"#);

        let [a, b, c, d, e, f] = self.view().as_coeffs();
        let _ = write!(svg, r#"<g transform="matrix({a} {b} {c} {d} {e} {f})">"#);
        self.write_grid(&mut svg);
        self.write_path(&mut svg);
        svg.push_str("</g>");

        for marker in self.markers.values() {
            let p = self.project(marker.at) - marker.offset;
            let _ = write!(
                svg,
                r#"<g transform="translate({} {})">{}</g>"#,
                p.x, p.y, marker.svg
            );
        }
        svg.push_str("</svg>");
        svg
    }

    fn write_grid(&self, svg: &mut String) {
        let spacing = 256.0 * 2f64.powf(self.camera.zoom - self.camera.zoom.floor());
        let c = world_point(self.camera.center(), self.camera.zoom);
        let reach = f64::from(self.resolution.width).hypot(f64::from(self.resolution.height)) / 2.0;

        let x0 = ((c.x - reach) / spacing).floor() * spacing - c.x;
        let y0 = ((c.y - reach) / spacing).floor() * spacing - c.y;
        let _ = write!(svg, r#"<g stroke="{GRID}" stroke-width="1" fill="none">"#);
        let mut x = x0;
        while x <= reach {
            let _ = write!(svg, r#"<line x1="{x}" y1="{}" x2="{x}" y2="{reach}"/>"#, -reach);
            x += spacing;
        }
        let mut y = y0;
        while y <= reach {
            let _ = write!(svg, r#"<line x1="{}" y1="{y}" x2="{reach}" y2="{y}"/>"#, -reach);
            y += spacing;
        }
        svg.push_str("</g>");
    }

    fn write_path(&self, svg: &mut String) {
        if self.path.len() < 2 {
            return;
        }
        let style = &self.path_style;
        let mut points = String::new();
        for at in &self.path {
            let p = self.relative(*at);
            let _ = write!(points, "{},{} ", p.x, p.y);
        }
        let _ = write!(
            svg,
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{}" stroke-linecap="round" stroke-linejoin="round""#,
            points.trim_end(),
            xml_escape(&style.color),
            style.width
        );
        if let Some([on, off]) = style.dash {
            let _ = write!(
                svg,
                r#" stroke-dasharray="{} {}""#,
                on * style.width,
                off * style.width
            );
        }
        svg.push_str("/>");
    }

    fn paint(&mut self) -> MaptrailResult<()> {
        let svg = self.scene_svg();
        let tree = self.rasterizer.parse(&svg)?;
        self.surface = rasterize_svg(&tree, self.resolution.width, self.resolution.height)?;
        Ok(())
    }
}

impl MapRenderer for PreviewRenderer {
    fn camera(&self) -> CameraState {
        self.camera
    }

    fn jump_to(&mut self, camera: &CameraState) -> MaptrailResult<()> {
        if !camera.is_finite() {
            return Err(MaptrailError::renderer("camera pose must be finite"));
        }
        self.camera = *camera;
        Ok(())
    }

    fn set_path_data(&mut self, coords: &[LngLat]) -> MaptrailResult<()> {
        self.path.clear();
        self.path.extend_from_slice(coords);
        Ok(())
    }

    fn set_path_style(&mut self, style: &PathLineStyle) -> MaptrailResult<()> {
        self.path_style = style.clone();
        Ok(())
    }

    fn upsert_marker(&mut self, id: EntityId, icon: &PinIcon, at: LngLat) -> MaptrailResult<()> {
        self.markers.insert(
            id,
            Marker {
                svg: icon.svg.clone(),
                offset: icon.anchor_offset(),
                at,
            },
        );
        Ok(())
    }

    fn remove_marker(&mut self, id: EntityId) {
        self.markers.remove(&id);
    }

    fn on_render_complete(&mut self, notifier: RenderNotifier) {
        self.notifier = Some(notifier);
    }

    fn request_repaint(&mut self) -> MaptrailResult<RepaintId> {
        self.last_repaint += 1;
        let id = RepaintId(self.last_repaint);
        let result = self.paint();
        if let Some(n) = self.notifier.as_ref() {
            match &result {
                Ok(()) => n.idle(id),
                Err(e) => n.failed(e.to_string()),
            };
        }
        Ok(id)
    }

    fn project(&self, at: LngLat) -> Point {
        self.view() * self.relative(at)
    }

    fn read_pixels(&self) -> MaptrailResult<FrameRGBA> {
        Ok(self.surface.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/preview.rs"]
mod tests;
