use super::*;

#[test]
fn clip_to_trims_overhanging_box() {
    let b = FaceBox::new(600, 400, 100, 100);
    assert!(!b.fits_within(640, 480));
    assert_eq!(b.clip_to(640, 480), Some(FaceBox::new(600, 400, 40, 80)));
    assert_eq!(FaceBox::new(700, 0, 10, 10).clip_to(640, 480), None);
    assert!(FaceBox::new(200, 100, 240, 240).fits_within(640, 480));
}

#[test]
fn upper_band_floors_height() {
    let b = FaceBox::new(200, 100, 240, 240);
    assert_eq!(b.upper_band(0.4), FaceBox::new(200, 100, 240, 96));
    assert_eq!(FaceBox::new(0, 0, 10, 7).upper_band(0.4).h, 2);
}

#[test]
fn normalized_to_pixels_truncates() {
    let n = NormalizedBox {
        xmin: 0.3125,
        ymin: 0.2083,
        width: 0.375,
        height: 0.5,
        confidence: 0.9,
    };
    assert_eq!(n.to_pixels(640, 480), Some(FaceBox::new(200, 99, 240, 240)));
}

#[test]
fn normalized_off_edge_is_clipped() {
    let n = NormalizedBox {
        xmin: -0.1,
        ymin: 0.9,
        width: 0.3,
        height: 0.3,
        confidence: 1.0,
    };
    assert_eq!(n.to_pixels(100, 100), Some(FaceBox::new(0, 90, 20, 10)));

    let gone = NormalizedBox {
        xmin: 1.2,
        ..n
    };
    assert_eq!(gone.to_pixels(100, 100), None);

    let nan = NormalizedBox {
        xmin: f64::NAN,
        ..n
    };
    assert_eq!(nan.to_pixels(100, 100), None);
}

#[test]
fn best_candidate_prefers_confidence_then_order() {
    let mk = |xmin: f64, confidence: f64| NormalizedBox {
        xmin,
        ymin: 0.0,
        width: 0.1,
        height: 0.1,
        confidence,
    };
    let c = [mk(0.1, 0.6), mk(0.2, 0.9), mk(0.3, 0.9), mk(0.4, 0.4)];
    assert_eq!(best_candidate(&c, 0.5).unwrap().xmin, 0.2);
    assert!(best_candidate(&c, 0.95).is_none());
    assert!(best_candidate(&[], 0.0).is_none());
}

#[test]
fn trivial_locators() {
    let img = SourceImage::solid(4, 4, [0, 0, 0]).unwrap();
    assert_eq!(NoFaceLocator.detect(&img).unwrap(), None);

    let b = FaceBox::new(1, 1, 100, 100);
    let mut boxed: Box<dyn FaceLocator> = Box::new(FixedFaceLocator(b));
    assert_eq!(boxed.detect(&img).unwrap(), Some(b));
}
