use super::*;

#[test]
fn fnv_seeded_hash_is_stable() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"stillmotion");
    let mut b = Fnv1a64::new(Fnv1a64::OFFSET_BASIS);
    b.write_bytes(b"still");
    b.write_bytes(b"motion");
    assert_eq!(a.finish(), b.finish());

    let mut c = Fnv1a64::new_default();
    c.write_u64(7);
    let mut d = Fnv1a64::new_default();
    d.write_u64(8);
    assert_ne!(c.finish(), d.finish());
}

#[test]
fn saturate_clamps_and_rounds() {
    assert_eq!(saturate_u8(-3.0), 0);
    assert_eq!(saturate_u8(300.0), 255);
    assert_eq!(saturate_u8(127.5), 128);
    assert_eq!(saturate_u8(127.49), 127);
    assert_eq!(saturate_u8(f32::NAN), 0);
}

#[test]
fn scale_lut_never_wraps() {
    for factor in [0.0f32, 0.8, 1.0, 1.05, 4.0] {
        let lut = scale_lut(factor);
        assert_eq!(lut[0], 0);
        for (v, out) in lut.iter().enumerate() {
            assert_eq!(*out, saturate_u8(v as f32 * factor));
        }
    }
    assert_eq!(scale_lut(4.0)[255], 255);
    assert_eq!(scale_lut(1.0)[200], 200);
}
