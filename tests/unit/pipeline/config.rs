use super::*;
use crate::render::compositor::BorderFill;

#[test]
fn defaults_describe_five_second_clip() {
    let cfg = PipelineConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.fps().unwrap().get(), 30);
    assert_eq!(cfg.total_frames(), 150);
    assert_eq!(cfg.blink_interval_frames, 90);
    assert_eq!(cfg.compositor.noise_sigma, 1.0);
    assert!(!cfg.threading.parallel);
}

#[test]
fn partial_json_keeps_defaults() {
    let cfg: PipelineConfig = serde_json::from_str(
        r#"{"duration_secs": 2, "noise_sigma": 0, "border_fill": "replicate", "seed": 7}"#,
    )
    .unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.total_frames(), 60);
    assert_eq!(cfg.compositor.noise_sigma, 0.0);
    assert_eq!(cfg.compositor.border_fill, BorderFill::Replicate);
    assert_eq!(cfg.compositor.blink_factor, 0.8);
    assert_eq!(cfg.noise_seed(), NoiseSeed(7));
    assert_eq!(cfg.motion, MotionProfile::default());
}

#[test]
fn zero_duration_is_valid_and_empty() {
    let cfg = PipelineConfig {
        duration_secs: 0,
        ..PipelineConfig::default()
    };
    cfg.validate().unwrap();
    assert_eq!(cfg.total_frames(), 0);

    let no_rate = PipelineConfig {
        fps: 0,
        ..PipelineConfig::default()
    };
    assert_eq!(no_rate.total_frames(), 0);
}

#[test]
fn invalid_values_are_rejected() {
    let bad = [
        PipelineConfig {
            fps: 0,
            ..PipelineConfig::default()
        },
        PipelineConfig {
            compositor: CompositorOpts {
                noise_sigma: -1.0,
                ..CompositorOpts::default()
            },
            ..PipelineConfig::default()
        },
        PipelineConfig {
            compositor: CompositorOpts {
                blink_band_ratio: 0.0,
                ..CompositorOpts::default()
            },
            ..PipelineConfig::default()
        },
        PipelineConfig {
            motion: MotionProfile {
                light_amplitude: 1.5,
                ..MotionProfile::default()
            },
            ..PipelineConfig::default()
        },
        PipelineConfig {
            threading: RenderThreading {
                threads: Some(0),
                ..RenderThreading::default()
            },
            ..PipelineConfig::default()
        },
    ];
    for cfg in bad {
        let err = cfg.validate().unwrap_err();
        assert!(
            matches!(err, StillmotionError::Configuration(_)),
            "unexpected error: {err}"
        );
    }
}

#[test]
fn from_path_reports_configuration_errors() {
    let dir = std::env::temp_dir().join(format!("stillmotion_cfg_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let missing = dir.join("missing.json");
    assert!(matches!(
        PipelineConfig::from_path(&missing),
        Err(StillmotionError::Configuration(_))
    ));

    let broken = dir.join("broken.json");
    std::fs::write(&broken, b"{ fps: ").unwrap();
    assert!(matches!(
        PipelineConfig::from_path(&broken),
        Err(StillmotionError::Configuration(_))
    ));

    let ok = dir.join("ok.json");
    std::fs::write(&ok, br#"{"fps": 24, "threading": {"parallel": true}}"#).unwrap();
    let cfg = PipelineConfig::from_path(&ok).unwrap();
    assert_eq!(cfg.total_frames(), 120);
    assert!(cfg.threading.parallel);
    assert_eq!(cfg.threading.chunk_size, 16);

    let _ = std::fs::remove_dir_all(&dir);
}
