use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        StillmotionError::face_detection("x")
            .to_string()
            .contains("face detection error:")
    );
    assert!(
        StillmotionError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(StillmotionError::io("x").to_string().contains("io error:"));
    assert!(
        StillmotionError::state("x")
            .to_string()
            .contains("pipeline state error:")
    );
}

#[test]
fn path_variants_mention_the_path() {
    let err = StillmotionError::InputNotFound(PathBuf::from("missing/photo.jpg"));
    assert!(err.to_string().contains("missing/photo.jpg"));

    let err = StillmotionError::invalid_image("bad.png", "truncated");
    let msg = err.to_string();
    assert!(msg.contains("bad.png"));
    assert!(msg.contains("truncated"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = StillmotionError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
