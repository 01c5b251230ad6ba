use super::*;

use crate::animation::camera::CameraState;
use crate::export::record::{EntityProjection, PinProjection};
use crate::foundation::core::{EntityId, FrameIndex};

fn waypoint(id: u64) -> Waypoint {
    Waypoint {
        id: EntityId(id),
        camera: CameraState::default(),
    }
}

fn records(n: u64, fps: Fps) -> Vec<FrameRecord> {
    (0..n)
        .map(|i| FrameRecord {
            time: fps.frame_time_secs(FrameIndex(i)),
            camera: CameraState {
                zoom: 10.0 + i as f64 * 0.1,
                bearing: -5.5,
                pitch: 30.0,
                ..CameraState::default()
            },
            path_progress: 0.0,
            waypoints: vec![EntityProjection {
                id: EntityId(1),
                x: 100.5,
                y: 200.25,
            }],
            pins: vec![PinProjection {
                id: EntityId(9),
                text: "Home".to_string(),
                x: 1.0,
                y: 2.0,
            }],
        })
        .collect()
}

fn input<'a>(wps: &'a [Waypoint], pins: &'a [Pin], recs: &'a [FrameRecord]) -> ScriptInput<'a> {
    ScriptInput {
        resolution: Resolution::new(1920, 1080).unwrap(),
        fps: Fps::new(30, 1).unwrap(),
        waypoints: wps,
        pins,
        records: recs,
    }
}

#[test]
fn escapes_quotes_backslashes_and_line_breaks() {
    assert_eq!(
        escape_string_literal("a\"b\\c\nd\re\u{2028}f\u{1}"),
        "a\\\"b\\\\c\\nd\\re\\u2028f\\u0001"
    );
    assert_eq!(escape_string_literal("Café 東京"), "Café 東京");
}

#[test]
fn key_times_match_records_exactly() {
    let fps = Fps::new(30, 1).unwrap();
    let recs = records(7, fps);
    let wps = [waypoint(1), waypoint(2)];
    let script = keyframe_script(&input(&wps, &[], &recs)).unwrap();

    let times: Vec<f64> = script
        .lines()
        .filter_map(|l| l.trim().strip_prefix("sZoom.property(\"Slider\").setValueAtTime("))
        .map(|rest| rest.split(',').next().unwrap().parse::<f64>().unwrap())
        .collect();
    assert_eq!(times.len(), recs.len());
    for (t, r) in times.iter().zip(&recs) {
        assert_eq!(t.to_bits(), r.time.to_bits());
    }
    assert!(script.contains("setValueAtTime(0.03333333333333333, 10.1)"));
}

#[test]
fn composition_and_trackers_are_declared() {
    let fps = Fps::new(30, 1).unwrap();
    let recs = records(31, fps);
    let wps = [waypoint(1), waypoint(2)];
    let pins = [Pin {
        id: EntityId(9),
        text: "Say \"hi\"\nnow".to_string(),
        ..Pin::default()
    }];
    let script = keyframe_script(&input(&wps, &pins, &recs)).unwrap();

    assert!(script.contains("addComp(\"Map Animation\", 1920, 1080, 1, 2, 30)"));
    assert!(script.contains("wp_1.name = \"Tracker WP 1\";"));
    assert!(script.contains("wp_2.name = \"Tracker WP 2\";"));
    assert!(script.contains("pin_9.name = \"Pin Say \\\"hi\\\"\\nnow\";"));
    assert!(script.contains(
        "if (wpNulls[1]) { wpNulls[1].transform.position.setValueAtTime(0, [100.5, 200.25]); }"
    ));
    assert!(script.contains("sBear.property(\"Slider\").setValueAtTime(1, -5.5);"));
}

#[test]
fn empty_records_are_an_encoding_error() {
    let err = keyframe_script(&input(&[], &[], &[])).unwrap_err();
    assert!(matches!(err, MaptrailError::Encoding(_)));
}

#[test]
fn non_finite_values_are_rejected() {
    let fps = Fps::new(30, 1).unwrap();
    let mut recs = records(2, fps);
    recs[1].camera.zoom = f64::NAN;
    let err = keyframe_script(&input(&[], &[], &recs)).unwrap_err();
    assert!(err.to_string().contains("zoom"));
}

#[test]
fn writes_script_file() {
    let fps = Fps::new(30, 1).unwrap();
    let recs = records(2, fps);
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("target/unit_encode_script")
        .join(SCRIPT_FILE_NAME);
    write_keyframe_script(&input(&[], &[], &recs), &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("(function() {"));
}
