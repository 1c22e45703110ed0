use super::*;

fn gradient(w: u32, h: u32) -> SourceImage {
    let mut data = Vec::with_capacity((w * h * 3) as usize);
    for y in 0..h {
        for x in 0..w {
            let v = (x * 10 + y) as u8;
            data.extend_from_slice(&[v, v, v]);
        }
    }
    SourceImage::from_rgb8(w, h, data).unwrap()
}

fn quiet() -> Compositor {
    Compositor::new(
        CompositorOpts {
            noise_sigma: 0.0,
            ..CompositorOpts::default()
        },
        NoiseSeed(1),
    )
}

#[test]
fn translate_black_fill_shifts_content() {
    let src = gradient(5, 4);
    let out = translate(&src, 2, 1, BorderFill::Black);
    // Uncovered top row and left columns are black.
    assert_eq!(out.channel(3, 0, 0), Some(0));
    assert_eq!(out.channel(0, 2, 0), Some(0));
    assert_eq!(out.channel(1, 2, 0), Some(0));
    // out(x, y) = src(x - 2, y - 1)
    assert_eq!(out.channel(2, 1, 0), Some(src.as_raw()[0]));
    assert_eq!(out.channel(4, 3, 1), Some((2 * 10 + 2) as u8));
}

#[test]
fn translate_negative_offsets() {
    let src = gradient(5, 4);
    let out = translate(&src, -3, -2, BorderFill::Black);
    assert_eq!(out.channel(0, 0, 0), Some((3 * 10 + 2) as u8));
    assert_eq!(out.channel(2, 0, 0), Some(0));
    assert_eq!(out.channel(0, 2, 0), Some(0));
}

#[test]
fn translate_replicate_fill_repeats_edges() {
    let src = gradient(5, 4);
    let out = translate(&src, 2, -1, BorderFill::Replicate);
    // Left columns replicate source column 0 of the sampled row.
    assert_eq!(out.channel(0, 0, 0), Some(1));
    assert_eq!(out.channel(1, 0, 0), Some(1));
    // Bottom row replicates the last source row.
    assert_eq!(out.channel(2, 3, 0), Some(3));
}

#[test]
fn translate_beyond_size_is_all_fill() {
    let src = SourceImage::solid(4, 4, [200, 200, 200]).unwrap();
    assert!(translate(&src, 10, 0, BorderFill::Black).data.iter().all(|&v| v == 0));
    assert!(
        translate(&src, -10, 0, BorderFill::Replicate)
            .data
            .iter()
            .all(|&v| v == 200)
    );
}

#[test]
fn brightness_saturates_instead_of_wrapping() {
    let src = SourceImage::from_rgb8(1, 1, vec![0, 128, 250]).unwrap();
    let mut frame = src.to_frame();
    scale_brightness(&mut frame, 1.05);
    assert_eq!(frame.data, vec![0, 134, 255]);

    let mut frame = src.to_frame();
    scale_brightness(&mut frame, 3.0);
    assert_eq!(frame.data, vec![0, 255, 255]);
}

#[test]
fn darken_region_clips_malformed_box() {
    let src = SourceImage::solid(4, 4, [100, 100, 100]).unwrap();
    let mut frame = src.to_frame();
    darken_region(&mut frame, FaceBox::new(2, 2, 10, 10), 0.8);
    assert_eq!(frame.channel(3, 3, 0), Some(80));
    assert_eq!(frame.channel(2, 2, 2), Some(80));
    assert_eq!(frame.channel(1, 1, 0), Some(100));

    let mut frame = src.to_frame();
    darken_region(&mut frame, FaceBox::new(9, 9, 2, 2), 0.8);
    assert_eq!(frame.data, src.as_raw());
}

#[test]
fn noise_is_zero_mean_and_saturating() {
    let src = SourceImage::solid(64, 64, [128, 0, 255]).unwrap();
    let mut frame = src.to_frame();
    let mut stream = NoiseSeed(5).frame_stream(FrameIndex(0));
    add_gaussian_noise(&mut frame, 1.0, &mut stream);

    let mid: Vec<f64> = frame.data.chunks_exact(3).map(|p| f64::from(p[0])).collect();
    let mean = mid.iter().sum::<f64>() / mid.len() as f64;
    assert!((mean - 128.0).abs() < 0.1, "mean {mean}");
    assert!(mid.iter().any(|&v| v != 128.0));
    assert!(frame.data.chunks_exact(3).all(|p| p[1] <= 5 && p[2] >= 250));
}

#[test]
fn render_never_mutates_source() {
    let src = gradient(16, 12);
    let before = src.fingerprint();
    let comp = Compositor::new(CompositorOpts::default(), NoiseSeed(3));
    let params = AnimationParams {
        offset_x: 3,
        offset_y: -2,
        brightness_factor: 1.05,
        is_blink_frame: true,
    };
    for i in 0..5 {
        let frame = comp.render(&src, Some(FaceBox::new(2, 2, 8, 8)), &params, FrameIndex(i));
        assert_eq!((frame.width, frame.height), (16, 12));
    }
    assert_eq!(src.fingerprint(), before);
}

#[test]
fn no_face_means_brightness_only() {
    let src = gradient(8, 8);
    let params = AnimationParams {
        offset_x: 3,
        offset_y: 2,
        brightness_factor: 0.95,
        is_blink_frame: true,
    };
    let frame = quiet().render(&src, None, &params, FrameIndex(0));

    let mut expected = src.to_frame();
    scale_brightness(&mut expected, 0.95);
    assert_eq!(frame, expected);
}

#[test]
fn blink_darkens_upper_band_only() {
    let src = SourceImage::solid(20, 20, [100, 100, 100]).unwrap();
    let face = FaceBox::new(5, 5, 10, 10);
    let blink = AnimationParams {
        is_blink_frame: true,
        ..AnimationParams::IDENTITY
    };
    let frame = quiet().render(&src, Some(face), &blink, FrameIndex(0));

    // Band rows 5..9 (floor(10 * 0.4) = 4).
    assert_eq!(frame.mean_in(5, 5, 10, 4), 80.0);
    assert_eq!(frame.mean_in(5, 9, 10, 6), 100.0);
    assert_eq!(frame.mean_in(0, 0, 5, 20), 100.0);
}

#[test]
fn noise_depends_on_frame_index_and_seed_only() {
    let src = SourceImage::solid(8, 8, [120, 120, 120]).unwrap();
    let comp = Compositor::new(CompositorOpts::default(), NoiseSeed(11));
    let p = AnimationParams::IDENTITY;
    let a = comp.render(&src, None, &p, FrameIndex(4));
    let b = comp.render(&src, None, &p, FrameIndex(4));
    let c = comp.render(&src, None, &p, FrameIndex(5));
    assert_eq!(a, b);
    assert_ne!(a, c);
}
