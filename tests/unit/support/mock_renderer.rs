//! Scriptable in-process renderer for unit tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::animation::camera::CameraState;
use crate::foundation::core::{EntityId, LngLat, Point, Resolution};
use crate::foundation::error::{MaptrailError, MaptrailResult};
use crate::pins::icon::PinIcon;
use crate::render::frame::FrameRGBA;
use crate::render::renderer::{MapRenderer, PathLineStyle, RenderNotifier, RepaintId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MockMode {
    /// Signal idle right away.
    Immediate,
    /// Send a stale idle event before the real one.
    StaleFirst,
    /// Never signal.
    Hang,
    /// Report failure on the n-th repaint (1-based).
    FailAt(u64),
}

#[derive(Debug, Default)]
pub(crate) struct MockLog {
    pub poses: Vec<CameraState>,
    pub paths: Vec<Vec<LngLat>>,
    pub repaints: u64,
    pub markers: BTreeMap<EntityId, LngLat>,
    pub styles: Vec<PathLineStyle>,
    /// Copy of the subscription, for sending events from the test.
    pub notifier: Option<RenderNotifier>,
}

pub(crate) struct MockRenderer {
    pub log: Arc<Mutex<MockLog>>,
    mode: MockMode,
    resolution: Resolution,
    camera: CameraState,
    notifier: Option<RenderNotifier>,
    next_repaint: u64,
    painted: u64,
}

impl MockRenderer {
    pub fn new(mode: MockMode) -> (Self, Arc<Mutex<MockLog>>) {
        let log = Arc::new(Mutex::new(MockLog::default()));
        let r = Self {
            log: log.clone(),
            mode,
            resolution: Resolution {
                width: 8,
                height: 6,
            },
            camera: CameraState::default(),
            notifier: None,
            next_repaint: 0,
            painted: 0,
        };
        (r, log)
    }
}

impl MapRenderer for MockRenderer {
    fn camera(&self) -> CameraState {
        self.camera
    }

    fn jump_to(&mut self, camera: &CameraState) -> MaptrailResult<()> {
        self.camera = *camera;
        self.log.lock().unwrap().poses.push(*camera);
        Ok(())
    }

    fn set_path_data(&mut self, coords: &[LngLat]) -> MaptrailResult<()> {
        self.log.lock().unwrap().paths.push(coords.to_vec());
        Ok(())
    }

    fn set_path_style(&mut self, style: &PathLineStyle) -> MaptrailResult<()> {
        self.log.lock().unwrap().styles.push(style.clone());
        Ok(())
    }

    fn upsert_marker(&mut self, id: EntityId, _icon: &PinIcon, at: LngLat) -> MaptrailResult<()> {
        self.log.lock().unwrap().markers.insert(id, at);
        Ok(())
    }

    fn remove_marker(&mut self, id: EntityId) {
        self.log.lock().unwrap().markers.remove(&id);
    }

    fn on_render_complete(&mut self, notifier: RenderNotifier) {
        self.log.lock().unwrap().notifier = Some(notifier.clone());
        self.notifier = Some(notifier);
    }

    fn request_repaint(&mut self) -> MaptrailResult<RepaintId> {
        self.next_repaint += 1;
        let id = RepaintId(self.next_repaint);
        self.log.lock().unwrap().repaints += 1;
        let notifier = self
            .notifier
            .as_ref()
            .ok_or_else(|| MaptrailError::renderer("no subscription"))?;
        match self.mode {
            MockMode::Immediate => {
                self.painted = id.0;
                notifier.idle(id);
            }
            MockMode::StaleFirst => {
                notifier.idle(RepaintId(id.0 - 1));
                self.painted = id.0;
                notifier.idle(id);
            }
            MockMode::Hang => {}
            MockMode::FailAt(n) if n == id.0 => {
                notifier.failed("gpu lost");
            }
            MockMode::FailAt(_) => {
                self.painted = id.0;
                notifier.idle(id);
            }
        }
        Ok(id)
    }

    fn project(&self, at: LngLat) -> Point {
        let c = self.resolution.center();
        Point::new(
            c.x + (at.lng() - self.camera.lng) * 100.0,
            c.y - (at.lat() - self.camera.lat) * 100.0,
        )
    }

    fn read_pixels(&self) -> MaptrailResult<FrameRGBA> {
        let px = [(self.painted % 256) as u8, 0, 0, 255];
        Ok(FrameRGBA {
            width: self.resolution.width,
            height: self.resolution.height,
            data: px.repeat((self.resolution.width * self.resolution.height) as usize),
            premultiplied: true,
        })
    }
}
