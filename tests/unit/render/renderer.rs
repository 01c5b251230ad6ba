use super::*;

struct Surface(FrameRGBA);

impl MapRenderer for Surface {
    fn camera(&self) -> CameraState {
        CameraState::default()
    }
    fn jump_to(&mut self, _camera: &CameraState) -> MaptrailResult<()> {
        Ok(())
    }
    fn set_path_data(&mut self, _coords: &[LngLat]) -> MaptrailResult<()> {
        Ok(())
    }
    fn set_path_style(&mut self, _style: &PathLineStyle) -> MaptrailResult<()> {
        Ok(())
    }
    fn upsert_marker(&mut self, _id: EntityId, _icon: &PinIcon, _at: LngLat) -> MaptrailResult<()> {
        Ok(())
    }
    fn remove_marker(&mut self, _id: EntityId) {}
    fn on_render_complete(&mut self, _notifier: RenderNotifier) {}
    fn request_repaint(&mut self) -> MaptrailResult<RepaintId> {
        Ok(RepaintId(0))
    }
    fn project(&self, at: LngLat) -> Point {
        at.to_point()
    }
    fn read_pixels(&self) -> MaptrailResult<FrameRGBA> {
        Ok(self.0.clone())
    }
}

fn opaque(width: u32, height: u32) -> FrameRGBA {
    FrameRGBA {
        width,
        height,
        data: [10, 20, 30, 255].repeat((width * height) as usize),
        premultiplied: true,
    }
}

#[test]
fn readback_passes_matching_surface_through() {
    let surface = Surface(opaque(4, 2));
    let res = Resolution::new(4, 2).unwrap();
    let f = ReadbackCapture.capture_frame(&surface, res).unwrap();
    assert_eq!(f, surface.0);
}

#[test]
fn readback_resamples_to_requested_size() {
    let surface = Surface(opaque(8, 4));
    let res = Resolution::new(4, 2).unwrap();
    let f = ReadbackCapture.capture_frame(&surface, res).unwrap();
    assert_eq!((f.width, f.height), (4, 2));
    assert!(!f.premultiplied);
    assert_eq!(&f.data[..4], &[10, 20, 30, 255]);
}

#[test]
fn readback_rejects_malformed_surface() {
    let mut bad = opaque(2, 2);
    bad.data.truncate(3);
    let res = Resolution::new(2, 2).unwrap();
    assert!(ReadbackCapture.capture_frame(&Surface(bad), res).is_err());
}

#[test]
fn notifier_reports_listener_state() {
    let (n, rx) = RenderNotifier::channel();
    assert!(n.idle(RepaintId(3)));
    assert!(n.failed("boom"));
    assert_eq!(rx.recv().unwrap(), RenderEvent::Idle(RepaintId(3)));
    assert_eq!(rx.recv().unwrap(), RenderEvent::Failed("boom".to_string()));
    drop(rx);
    assert!(!n.idle(RepaintId(4)));
}

#[test]
fn path_line_style_follows_settings() {
    let s = PathLineStyle::default();
    assert_eq!(s.color, "#F72210");
    assert_eq!(s.width, 5.0);
    assert_eq!(s.dash, Some([2.0, 2.0]));
}
