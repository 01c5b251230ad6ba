use super::*;

#[test]
fn endpoints_are_stable() {
    for ease in Ease::ALL {
        assert_eq!(ease.apply(0.0), 0.0, "{ease}");
        assert_eq!(ease.apply(1.0), 1.0, "{ease}");
    }
}

#[test]
fn monotonic_spot_check() {
    for ease in Ease::ALL {
        let a = ease.apply(0.25);
        let b = ease.apply(0.5);
        let c = ease.apply(0.75);
        assert!(a < b, "{ease}");
        assert!(b < c, "{ease}");
    }
}

#[test]
fn out_of_range_input_is_clamped() {
    for ease in Ease::ALL {
        assert_eq!(ease.apply(-0.5), 0.0);
        assert_eq!(ease.apply(1.5), 1.0);
        assert_eq!(ease.apply(f64::NAN), 0.0);
    }
}

#[test]
fn known_midpoints() {
    assert_eq!(Ease::Linear.apply(0.3), 0.3);
    assert_eq!(Ease::InQuad.apply(0.5), 0.25);
    assert_eq!(Ease::OutQuad.apply(0.5), 0.75);
    assert_eq!(Ease::InOutCubic.apply(0.5), 0.5);
    assert!((Ease::InOutSine.apply(0.5) - 0.5).abs() < 1e-12);
    assert_eq!(Ease::InQuart.apply(0.5), 0.0625);
}

#[test]
fn names_round_trip_and_unknown_falls_back() {
    for ease in Ease::ALL {
        assert_eq!(Ease::from_name(ease.name()), Some(ease));
    }
    assert_eq!(Ease::resolve("easeOutBounce"), Ease::Linear);
    assert_eq!(Ease::from_name("easeOutBounce"), None);
}

#[test]
fn serde_uses_identifiers() {
    let json = serde_json::to_string(&Ease::InOutCubic).unwrap();
    assert_eq!(json, "\"easeInOutCubic\"");
    let e: Ease = serde_json::from_str("\"easeOutSine\"").unwrap();
    assert_eq!(e, Ease::OutSine);
    let unknown: Ease = serde_json::from_str("\"wobble\"").unwrap();
    assert_eq!(unknown, Ease::Linear);
}
