use super::*;

const SKIN: [u8; 3] = [224, 172, 140];
const BACKDROP: [u8; 3] = [128, 128, 128];

fn portrait(w: u32, h: u32, face: FaceBox) -> SourceImage {
    let mut data = Vec::with_capacity((w * h * 3) as usize);
    for y in 0..h {
        for x in 0..w {
            let inside = x >= face.x && x < face.x + face.w && y >= face.y && y < face.y + face.h;
            data.extend_from_slice(if inside { &SKIN } else { &BACKDROP });
        }
    }
    SourceImage::from_rgb8(w, h, data).unwrap()
}

#[test]
fn classifies_skin_and_gray() {
    let loc = SkinToneLocator::default();
    assert!(loc.is_skin(&SKIN));
    assert!(!loc.is_skin(&BACKDROP));
    assert!(!loc.is_skin(&[0, 0, 0]));
}

#[test]
fn finds_cell_aligned_face_exactly() {
    let face = FaceBox::new(60, 40, 100, 120);
    let img = portrait(256, 256, face);
    let found = SkinToneLocator::default().detect(&img).unwrap();
    assert_eq!(found, Some(face));
}

#[test]
fn plain_backdrop_has_no_face() {
    let img = SourceImage::solid(128, 96, BACKDROP).unwrap();
    assert_eq!(SkinToneLocator::default().detect(&img).unwrap(), None);
}

#[test]
fn tiny_skin_patch_is_ignored() {
    let img = portrait(256, 256, FaceBox::new(100, 100, 4, 4));
    assert_eq!(SkinToneLocator::default().detect(&img).unwrap(), None);
}

#[test]
fn largest_region_wins() {
    let w = 256u32;
    let h = 256u32;
    let small = FaceBox::new(8, 8, 32, 32);
    let big = FaceBox::new(120, 100, 96, 120);
    let mut data = Vec::with_capacity((w * h * 3) as usize);
    for y in 0..h {
        for x in 0..w {
            let in_box =
                |b: FaceBox| x >= b.x && x < b.x + b.w && y >= b.y && y < b.y + b.h;
            data.extend_from_slice(if in_box(small) || in_box(big) { &SKIN } else { &BACKDROP });
        }
    }
    let img = SourceImage::from_rgb8(w, h, data).unwrap();
    assert_eq!(SkinToneLocator::default().detect(&img).unwrap(), Some(big));
}
