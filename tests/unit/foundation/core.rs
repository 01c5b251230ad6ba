use super::*;

#[test]
fn fps_rejects_zero() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn frame_time_is_index_over_fps() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.frame_time_secs(FrameIndex(0)), 0.0);
    assert_eq!(fps.frame_time_secs(FrameIndex(59)), 59.0 / 30.0);
    assert_eq!(fps.frame_time_secs(FrameIndex(90)), 3.0);
}

#[test]
fn frames_ceil_absorbs_float_noise() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.secs_to_frames_ceil(2.0), 60);
    assert_eq!(fps.secs_to_frames_ceil(0.1), 3);
    assert_eq!(fps.secs_to_frames_ceil(0.11), 4);
    assert_eq!(fps.secs_to_frames_ceil(0.0), 0);
}

#[test]
fn resolution_parses_and_prints() {
    let r: Resolution = "1920x1080".parse().unwrap();
    assert_eq!(r, Resolution::new(1920, 1080).unwrap());
    assert_eq!(r.to_string(), "1920x1080");
    assert!("1920".parse::<Resolution>().is_err());
    assert!("0x10".parse::<Resolution>().is_err());
    assert!("axb".parse::<Resolution>().is_err());
}

#[test]
fn resolution_serializes_as_string() {
    let r = Resolution::new(640, 360).unwrap();
    let json = serde_json::to_string(&r).unwrap();
    assert_eq!(json, "\"640x360\"");
    let back: Resolution = serde_json::from_str(&json).unwrap();
    assert_eq!(back, r);
}

#[test]
fn lnglat_serializes_as_pair() {
    let json = serde_json::to_string(&LngLat(-46.5, -23.25)).unwrap();
    assert_eq!(json, "[-46.5,-23.25]");
}

#[test]
fn id_allocator_starts_after_existing() {
    let mut ids = IdAllocator::after([EntityId(4), EntityId(17), EntityId(2)]);
    assert_eq!(ids.next_id(), EntityId(18));
    assert_eq!(ids.next_id(), EntityId(19));

    let mut fresh = IdAllocator::after(std::iter::empty());
    assert_eq!(fresh.next_id(), EntityId(1));
}
