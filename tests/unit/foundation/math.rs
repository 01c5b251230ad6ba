use super::*;

#[test]
fn lerp_hits_endpoints() {
    assert_eq!(lerp(10.0, 14.0, 0.0), 10.0);
    assert_eq!(lerp(10.0, 14.0, 1.0), 14.0);
    assert_eq!(lerp(10.0, 14.0, 0.5), 12.0);
    assert_eq!(lerp(0.1, 0.7, 1.0), 0.7);
}

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(255, 0), 0);
    assert_eq!(mul_div255_u16(128, 255), 128);
}

#[test]
fn unpremultiply_restores_straight_color() {
    let mut px = vec![128u8, 0, 0, 128, 10, 20, 30, 255, 5, 5, 5, 0];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[255, 0, 0, 128]);
    assert_eq!(&px[4..8], &[10, 20, 30, 255]);
    assert_eq!(&px[8..], &[5, 5, 5, 0]);
}
