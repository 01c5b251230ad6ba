use super::*;

fn l_shape() -> Vec<LngLat> {
    vec![LngLat(0.0, 0.0), LngLat(10.0, 0.0), LngLat(10.0, 20.0)]
}

fn zigzag() -> Vec<LngLat> {
    vec![
        LngLat(-46.633, -23.55),
        LngLat(-46.61, -23.54),
        LngLat(-46.6, -23.57),
        LngLat(-46.58, -23.52),
        LngLat(-46.59, -23.5),
    ]
}

#[test]
fn non_positive_progress_is_empty() {
    for p in [0.0, -0.1, -10.0, f64::NAN] {
        assert!(truncate(&l_shape(), p).is_empty());
    }
}

#[test]
fn full_progress_is_unchanged() {
    for p in [1.0, 1.5, 1.0 - 1e-12] {
        assert_eq!(truncate(&l_shape(), p), l_shape());
    }
}

#[test]
fn too_few_points_is_empty() {
    assert!(truncate(&[], 0.5).is_empty());
    assert!(truncate(&[LngLat(1.0, 1.0)], 0.5).is_empty());
    assert!(truncate(&[LngLat(1.0, 1.0)], 1.0).is_empty());
}

#[test]
fn halfway_lands_inside_second_segment() {
    // Segments of length 10 and 20; 50% is 15, i.e. 25% along the second segment.
    let out = truncate(&l_shape(), 0.5);
    assert_eq!(
        out,
        vec![LngLat(0.0, 0.0), LngLat(10.0, 0.0), LngLat(10.0, 5.0)]
    );
}

#[test]
fn early_progress_stays_in_first_segment() {
    let out = truncate(&l_shape(), 0.1);
    assert_eq!(out, vec![LngLat(0.0, 0.0), LngLat(3.0, 0.0)]);
}

#[test]
fn truncated_length_matches_progress() {
    let coords = zigzag();
    let total = total_length(&coords);
    for i in 1..100 {
        let p = f64::from(i) / 100.0;
        let len = total_length(&truncate(&coords, p));
        assert!(
            (len - p * total).abs() < 1e-12,
            "p={p} len={len} expected={}",
            p * total
        );
    }
}

#[test]
fn output_is_deterministic() {
    let coords = zigzag();
    assert_eq!(truncate(&coords, 0.37), truncate(&coords, 0.37));
}

#[test]
fn degenerate_zero_length_path_does_not_produce_nan() {
    let coords = vec![LngLat(1.0, 1.0), LngLat(1.0, 1.0)];
    let out = truncate(&coords, 0.5);
    assert_eq!(out, vec![LngLat(1.0, 1.0), LngLat(1.0, 1.0)]);
}
