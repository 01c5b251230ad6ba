use super::*;
use crate::animation::camera::CameraState;
use crate::foundation::core::{EntityId, LngLat};
use crate::project::model::{Pin, PinStyle, Waypoint};

const ORIGINAL_STYLE: &str = r##"{
  "settings": {
    "resolution": "1280x720",
    "mapStyle": "https://tiles.openfreemap.org/styles/bright",
    "pathColor": "#F72210",
    "pathWidth": 5,
    "pathStyle": "dotted",
    "duration": 2,
    "fps": 30,
    "easing": "easeInOutCubic",
    "lineAnimDelay": 0.5,
    "lineAnimDuration": 3,
    "lineEasing": "easeOutQuad"
  },
  "waypoints": [
    { "id": 1718000000001, "lat": -23.55, "lng": -46.633, "zoom": 10, "pitch": 0, "bearing": 0 },
    { "id": 1718000000002, "lat": -23.50, "lng": -46.600, "zoom": 14, "pitch": 30, "bearing": 15 }
  ],
  "pins": [
    { "id": 1718000000003, "lng": -46.62, "lat": -23.54, "text": "Sé", "color": "#00AAFF",
      "scale": 1.5, "textScale": 1, "style": "dot", "textOffsetX": 0, "textOffsetY": -4 }
  ],
  "customPath": [[-46.633, -23.55], [-46.62, -23.53], [-46.6, -23.5]]
}"##;

fn sample_project() -> Project {
    let mut p = Project::default();
    p.settings.fps = 25;
    p.waypoints = vec![
        Waypoint {
            id: EntityId(1),
            camera: CameraState {
                lng: 2.35,
                lat: 48.85,
                zoom: 11.0,
                pitch: 10.0,
                bearing: -5.0,
            },
        },
        Waypoint {
            id: EntityId(2),
            camera: CameraState {
                lng: 2.29,
                lat: 48.86,
                zoom: 15.5,
                pitch: 45.0,
                bearing: 20.0,
            },
        },
    ];
    p.pins = vec![Pin {
        id: EntityId(3),
        lng: 2.2945,
        lat: 48.8584,
        text: "Tour \"Eiffel\"\nParis".to_string(),
        style: PinStyle::Flag,
        ..Pin::default()
    }];
    p.custom_path = vec![LngLat(2.35, 48.85), LngLat(2.3, 48.86), LngLat(2.2945, 48.8584)];
    p
}

#[test]
fn loads_original_project_files() {
    let p = Project::from_json_str(ORIGINAL_STYLE).unwrap();
    assert_eq!(p.settings.resolution.width, 1280);
    assert_eq!(p.settings.fps, 30);
    assert_eq!(p.waypoints.len(), 2);
    assert_eq!(p.waypoints[1].camera.zoom, 14.0);
    assert_eq!(p.pins[0].style, PinStyle::Dot);
    assert_eq!(p.pins[0].text_color, "#FFFFFF");
    assert_eq!(p.custom_path.len(), 3);
}

#[test]
fn path_width_may_be_a_numeric_string() {
    let json = ORIGINAL_STYLE.replace("\"pathWidth\": 5", "\"pathWidth\": \"7\"");
    let p = Project::from_json_str(&json).unwrap();
    assert_eq!(p.settings.path_width, 7.0);
    p.settings.validate().unwrap();

    let reloaded = Project::from_json_str(&p.to_json_string().unwrap()).unwrap();
    assert_eq!(reloaded.settings.path_width, 7.0);

    let json = ORIGINAL_STYLE.replace("\"pathWidth\": 5", "\"pathWidth\": \"wide\"");
    let err = Project::from_json_str(&json).unwrap_err();
    assert!(matches!(err, MaptrailError::Parse(_)));
}

#[test]
fn zero_or_null_pin_scales_read_as_one() {
    let json = ORIGINAL_STYLE
        .replace("\"scale\": 1.5", "\"scale\": 0")
        .replace("\"textScale\": 1", "\"textScale\": null");
    let p = Project::from_json_str(&json).unwrap();
    assert_eq!(p.pins[0].scale, 1.0);
    assert_eq!(p.pins[0].text_scale, 1.0);

    let json = ORIGINAL_STYLE.replace("\"scale\": 1.5", "\"scale\": -2");
    assert!(Project::from_json_str(&json).is_err());
}

#[test]
fn save_then_load_is_identical() {
    let p = sample_project();
    let json = p.to_json_string().unwrap();
    let back = Project::from_json_str(&json).unwrap();
    assert_eq!(back, p);
    assert_eq!(back.custom_path, p.custom_path);
}

#[test]
fn save_to_disk_round_trips() {
    let dir = std::path::PathBuf::from("target").join("unit_project_file");
    let path = dir.join("project.json");
    let p = sample_project();
    p.save_to_path(&path).unwrap();
    let back = Project::from_path(&path).unwrap();
    assert_eq!(back, p);
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = Project::from_json_str("{ \"waypoints\": [ { \"id\": 1, ").unwrap_err();
    assert!(matches!(err, MaptrailError::Parse(_)));
}

#[test]
fn invalid_content_is_a_parse_error() {
    let json = r#"{ "pins": [ { "id": 1 }, { "id": 1 } ] }"#;
    let err = Project::from_json_str(json).unwrap_err();
    assert!(matches!(err, MaptrailError::Parse(_)));
    assert!(err.to_string().contains("duplicate pin id 1"));
}

#[test]
fn missing_file_is_a_parse_error() {
    let err = Project::from_path(std::path::Path::new("target/does/not/exist.json")).unwrap_err();
    assert!(matches!(err, MaptrailError::Parse(_)));
}
