use super::*;

fn zoom_pose(zoom: f64) -> CameraState {
    CameraState {
        zoom,
        ..CameraState::default()
    }
}

#[test]
fn rejects_degenerate_timelines() {
    assert!(WaypointTimeline::new(vec![zoom_pose(1.0)], 1.0, Ease::Linear).is_err());
    assert!(WaypointTimeline::new(vec![zoom_pose(1.0), zoom_pose(2.0)], 0.0, Ease::Linear).is_err());
    assert!(
        WaypointTimeline::new(vec![zoom_pose(1.0), zoom_pose(2.0)], f64::NAN, Ease::Linear)
            .is_err()
    );
}

#[test]
fn duration_is_legs_times_leg_length() {
    let tl = WaypointTimeline::new(
        vec![zoom_pose(10.0), zoom_pose(14.0), zoom_pose(12.0)],
        2.0,
        Ease::Linear,
    )
    .unwrap();
    assert_eq!(tl.duration_secs(), 4.0);
}

#[test]
fn evaluates_within_and_across_legs() {
    let tl = WaypointTimeline::new(
        vec![zoom_pose(10.0), zoom_pose(14.0), zoom_pose(12.0)],
        2.0,
        Ease::Linear,
    )
    .unwrap();
    assert_eq!(tl.camera_at(0.0).unwrap().zoom, 10.0);
    assert_eq!(tl.camera_at(1.0).unwrap().zoom, 12.0);
    assert_eq!(tl.camera_at(2.0).unwrap().zoom, 14.0);
    assert_eq!(tl.camera_at(3.0).unwrap().zoom, 13.0);
    assert_eq!(tl.camera_at(4.0).unwrap().zoom, 12.0);
    assert_eq!(tl.camera_at(99.0).unwrap().zoom, 12.0);
    assert_eq!(tl.camera_at(-1.0).unwrap().zoom, 10.0);
    assert!(tl.camera_at(f64::INFINITY).is_err());
}
