//! Editing facade.
//!
//! [`Studio`] is what a UI layer talks to: it owns the project, the renderer session and the pin
//! icon cache, and keeps the renderer's markers and path layer in step with every edit.

use std::path::Path;

use crate::encode::script::{ScriptInput, keyframe_script};
use crate::encode::sink::FrameSink;
use crate::export::pipeline::{
    ExportInput, ExportMonitor, ExportOptions, ExportProgress, ExportReport, Exporter, FramePlan,
};
use crate::export::record::{FrameRecord, records_to_json};
use crate::foundation::core::{EntityId, IdAllocator, LngLat};
use crate::foundation::error::{MaptrailError, MaptrailResult};
use crate::pins::icon::PinIconCache;
use crate::project::model::{AnimationSettings, Pin, PinStyle, Project, Waypoint};
use crate::render::frame::SvgRasterizer;
use crate::render::renderer::{MapRenderer, PathLineStyle};
use crate::render::session::RendererSession;

/// One field-level pin edit.
#[derive(Clone, Debug, PartialEq)]
pub enum PinEdit {
    /// Label text.
    Text(String),
    /// Marker shape.
    Style(PinStyle),
    /// Marker colour.
    Color(String),
    /// Marker scale.
    Scale(f64),
    /// Label scale.
    TextScale(f64),
    /// Label offset in unscaled marker pixels.
    TextOffset {
        /// Horizontal offset.
        x: f64,
        /// Vertical offset.
        y: f64,
    },
    /// Label colour.
    TextColor(String),
    /// Label font family.
    FontFamily(String),
}

impl PinEdit {
    fn apply(self, pin: &mut Pin) {
        match self {
            Self::Text(v) => pin.text = v,
            Self::Style(v) => pin.style = v,
            Self::Color(v) => pin.color = v,
            Self::Scale(v) => pin.scale = v,
            Self::TextScale(v) => pin.text_scale = v,
            Self::TextOffset { x, y } => {
                pin.text_offset_x = x;
                pin.text_offset_y = y;
            }
            Self::TextColor(v) => pin.text_color = v,
            Self::FontFamily(v) => pin.font_family = v,
        }
    }
}

/// Project editor bound to one renderer.
pub struct Studio {
    project: Project,
    session: RendererSession,
    icons: PinIconCache,
    ids: IdAllocator,
    exporter: Exporter,
    drawing: bool,
    last_records: Vec<FrameRecord>,
}

impl Studio {
    /// Studio with an empty project.
    pub fn new(
        session: RendererSession,
        rasterizer: SvgRasterizer,
        options: ExportOptions,
    ) -> MaptrailResult<Self> {
        Self::with_project(session, rasterizer, Project::default(), options)
    }

    /// Studio opened on `project`.
    pub fn with_project(
        session: RendererSession,
        rasterizer: SvgRasterizer,
        project: Project,
        options: ExportOptions,
    ) -> MaptrailResult<Self> {
        project.validate()?;
        let icons = PinIconCache::build_all(rasterizer, &project.pins)?;
        let mut studio = Self {
            ids: IdAllocator::after(project.entity_ids()),
            project,
            session,
            icons,
            exporter: Exporter::new(options),
            drawing: false,
            last_records: Vec::new(),
        };
        studio.sync_renderer(&[])?;
        Ok(studio)
    }

    /// Current project.
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Current settings.
    pub fn settings(&self) -> &AnimationSettings {
        &self.project.settings
    }

    /// Replace the settings. Export-time checks run when an export starts.
    pub fn set_settings(&mut self, settings: AnimationSettings) -> MaptrailResult<()> {
        self.ensure_idle()?;
        self.session
            .renderer_mut()
            .set_path_style(&PathLineStyle::from_settings(&settings))?;
        self.project.settings = settings;
        Ok(())
    }

    /// Renderer session.
    pub fn session(&self) -> &RendererSession {
        &self.session
    }

    /// Renderer, for interactive camera moves while idle.
    pub fn renderer_mut(&mut self) -> MaptrailResult<&mut dyn MapRenderer> {
        self.ensure_idle()?;
        Ok(self.session.renderer_mut())
    }

    /// Monitor of this studio's export slot.
    pub fn monitor(&self) -> ExportMonitor {
        self.exporter.monitor().clone()
    }

    /// Pin icons currently held.
    pub fn icons(&self) -> &PinIconCache {
        &self.icons
    }

    fn ensure_idle(&self) -> MaptrailResult<()> {
        if self.exporter.monitor().is_busy() {
            return Err(MaptrailError::validation(
                "project cannot be edited while an export is running",
            ));
        }
        Ok(())
    }

    fn waypoint_index(&self, id: EntityId) -> MaptrailResult<usize> {
        self.project
            .waypoints
            .iter()
            .position(|w| w.id == id)
            .ok_or_else(|| MaptrailError::validation(format!("no waypoint with id {id}")))
    }

    fn pin_index(&self, id: EntityId) -> MaptrailResult<usize> {
        self.project
            .pins
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| MaptrailError::validation(format!("no pin with id {id}")))
    }

    // Waypoints.

    /// Capture the renderer's current pose as a new waypoint at the end of the list.
    pub fn add_waypoint(&mut self) -> MaptrailResult<EntityId> {
        self.ensure_idle()?;
        let camera = self.session.renderer().camera();
        if !camera.is_finite() {
            return Err(MaptrailError::renderer("renderer reported a non-finite pose"));
        }
        let id = self.ids.next_id();
        self.project.waypoints.push(Waypoint { id, camera });
        tracing::debug!(%id, "waypoint added");
        Ok(id)
    }

    /// Overwrite waypoint `id` with the renderer's current pose.
    pub fn recapture_waypoint(&mut self, id: EntityId) -> MaptrailResult<()> {
        self.ensure_idle()?;
        let idx = self.waypoint_index(id)?;
        let camera = self.session.renderer().camera();
        if !camera.is_finite() {
            return Err(MaptrailError::renderer("renderer reported a non-finite pose"));
        }
        self.project.waypoints[idx].camera = camera;
        Ok(())
    }

    /// Delete waypoint `id`.
    pub fn remove_waypoint(&mut self, id: EntityId) -> MaptrailResult<()> {
        self.ensure_idle()?;
        let idx = self.waypoint_index(id)?;
        self.project.waypoints.remove(idx);
        Ok(())
    }

    /// Jump the renderer to waypoint `id`.
    pub fn go_to_waypoint(&mut self, id: EntityId) -> MaptrailResult<()> {
        self.ensure_idle()?;
        let idx = self.waypoint_index(id)?;
        let camera = self.project.waypoints[idx].camera;
        self.session.show_pose(&camera, None)
    }

    /// Render waypoint `id` as a single still and return it as PNG.
    ///
    /// The renderer stays at the waypoint's pose afterwards.
    pub fn snapshot_waypoint(&mut self, id: EntityId) -> MaptrailResult<Vec<u8>> {
        self.go_to_waypoint(id)?;
        self.session
            .repaint_and_wait(self.exporter.options().render_timeout)?;
        let frame = self.session.capture(self.project.settings.resolution)?;
        frame.to_png_bytes()
    }

    // Pins.

    /// Add a pin with default styling at the current map centre.
    pub fn add_pin(&mut self) -> MaptrailResult<EntityId> {
        self.ensure_idle()?;
        let center = self.session.renderer().camera().center();
        let pin = Pin {
            id: self.ids.next_id(),
            lng: center.lng(),
            lat: center.lat(),
            ..Pin::default()
        };
        let id = pin.id;
        let icon = self.icons.refresh(&pin)?;
        self.session
            .renderer_mut()
            .upsert_marker(id, &icon, pin.position())?;
        self.project.pins.push(pin);
        tracing::debug!(%id, "pin added");
        Ok(id)
    }

    /// Apply one field edit to pin `id`.
    ///
    /// The edit is validated first; an invalid edit leaves the pin untouched. Edits that change
    /// the pin's look regenerate its icon.
    pub fn update_pin(&mut self, id: EntityId, edit: PinEdit) -> MaptrailResult<()> {
        self.ensure_idle()?;
        let idx = self.pin_index(id)?;
        let mut pin = self.project.pins[idx].clone();
        edit.apply(&mut pin);
        pin.validate()?;

        let icon = self.icons.refresh(&pin)?;
        self.session
            .renderer_mut()
            .upsert_marker(id, &icon, pin.position())?;
        self.project.pins[idx] = pin;
        Ok(())
    }

    /// Move pin `id` (a drag). The icon is reused.
    pub fn move_pin(&mut self, id: EntityId, to: LngLat) -> MaptrailResult<()> {
        self.ensure_idle()?;
        if !to.is_finite() {
            return Err(MaptrailError::validation("pin position must be finite"));
        }
        let idx = self.pin_index(id)?;
        let mut pin = self.project.pins[idx].clone();
        pin.lng = to.lng();
        pin.lat = to.lat();
        let icon = self.icons.refresh(&pin)?;
        self.session.renderer_mut().upsert_marker(id, &icon, to)?;
        self.project.pins[idx] = pin;
        Ok(())
    }

    /// Delete pin `id`, releasing its icon and renderer marker.
    pub fn remove_pin(&mut self, id: EntityId) -> MaptrailResult<()> {
        self.ensure_idle()?;
        let idx = self.pin_index(id)?;
        self.project.pins.remove(idx);
        self.icons.release(id);
        self.session.renderer_mut().remove_marker(id);
        Ok(())
    }

    // Path drawing.

    /// Toggle drawing mode.
    pub fn set_drawing(&mut self, on: bool) {
        self.drawing = on;
    }

    /// `true` while map clicks append path points.
    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// Handle a map click. Returns `true` when a path point was appended.
    pub fn click(&mut self, at: LngLat) -> MaptrailResult<bool> {
        if !self.drawing {
            return Ok(false);
        }
        self.ensure_idle()?;
        if !at.is_finite() {
            return Err(MaptrailError::validation("path point must be finite"));
        }
        self.project.custom_path.push(at);
        self.session
            .renderer_mut()
            .set_path_data(&self.project.custom_path)?;
        Ok(true)
    }

    /// Remove every drawn path point.
    pub fn clear_path(&mut self) -> MaptrailResult<()> {
        self.ensure_idle()?;
        self.project.custom_path.clear();
        self.session.renderer_mut().set_path_data(&[])
    }

    // Export.

    /// Run an export of the current project into `sink`.
    ///
    /// On success the frame records are kept for [`Studio::keyframe_script`].
    pub fn render(
        &mut self,
        plan: FramePlan<'_>,
        sink: &mut dyn FrameSink,
        progress: &mut dyn FnMut(ExportProgress),
    ) -> MaptrailResult<ExportReport> {
        let input = ExportInput {
            settings: &self.project.settings,
            waypoints: &self.project.waypoints,
            pins: &self.project.pins,
            path: &self.project.custom_path,
        };
        let report = self
            .exporter
            .run(&mut self.session, &input, plan, sink, progress)?;
        self.last_records = report.records.clone();
        Ok(report)
    }

    /// Records of the last successful export.
    pub fn last_records(&self) -> &[FrameRecord] {
        &self.last_records
    }

    /// Keyframe script for the last successful export.
    pub fn keyframe_script(&self) -> MaptrailResult<String> {
        keyframe_script(&ScriptInput {
            resolution: self.project.settings.resolution,
            fps: self.project.settings.fps()?,
            waypoints: &self.project.waypoints,
            pins: &self.project.pins,
            records: &self.last_records,
        })
    }

    /// Last export's records as JSON.
    pub fn records_json(&self) -> MaptrailResult<String> {
        records_to_json(&self.last_records)
    }

    // Persistence.

    /// Save the project to `path`.
    pub fn save(&self, path: &Path) -> MaptrailResult<()> {
        self.project.save_to_path(path)
    }

    /// Load the project at `path`, replacing the current one.
    pub fn load(&mut self, path: &Path) -> MaptrailResult<()> {
        self.ensure_idle()?;
        let project = Project::from_path(path)?;
        self.replace_project(project)
    }

    /// Load a project from JSON text, replacing the current one.
    pub fn load_json_str(&mut self, json: &str) -> MaptrailResult<()> {
        self.ensure_idle()?;
        let project = Project::from_json_str(json)?;
        self.replace_project(project)
    }

    /// Swap in a parsed project. Nothing changes unless every pin icon builds.
    fn replace_project(&mut self, project: Project) -> MaptrailResult<()> {
        let icons = PinIconCache::build_all(self.icons.rasterizer().clone(), &project.pins)
            .map_err(|e| MaptrailError::parse(format!("project pins: {e}")))?;

        let old_pins: Vec<EntityId> = self.project.pins.iter().map(|p| p.id).collect();
        let old_project = std::mem::replace(&mut self.project, project);
        let old_icons = std::mem::replace(&mut self.icons, icons);

        if let Err(e) = self.sync_renderer(&old_pins) {
            // Put the previous state back on the renderer as well.
            let new_pins: Vec<EntityId> = self.project.pins.iter().map(|p| p.id).collect();
            self.project = old_project;
            self.icons = old_icons;
            if let Err(restore) = self.sync_renderer(&new_pins) {
                tracing::warn!(error = %restore, "failed to restore renderer after load error");
            }
            return Err(e);
        }

        self.ids = IdAllocator::after(self.project.entity_ids());
        self.drawing = false;
        self.last_records.clear();
        tracing::info!(
            waypoints = self.project.waypoints.len(),
            pins = self.project.pins.len(),
            "project replaced"
        );
        Ok(())
    }

    /// Push path, path style and markers of the current project to the renderer, removing the
    /// markers in `stale` first.
    fn sync_renderer(&mut self, stale: &[EntityId]) -> MaptrailResult<()> {
        let renderer = self.session.renderer_mut();
        for id in stale {
            renderer.remove_marker(*id);
        }
        renderer.set_path_style(&PathLineStyle::from_settings(&self.project.settings))?;
        renderer.set_path_data(&self.project.custom_path)?;
        for pin in &self.project.pins {
            let icon = self
                .icons
                .get(pin.id)
                .ok_or_else(|| MaptrailError::renderer(format!("no icon for pin {}", pin.id)))?;
            renderer.upsert_marker(pin.id, &icon, pin.position())?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/studio.rs"]
mod tests;
