//! Config files on disk.

use hdrv_compute::CpuDevice;
use hdrv_core::{DecodedImage, PixelFormat};
use hdrv_pipeline::{PipelineConfig, PipelineController, PipelineError};
use std::fs;

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.yaml");

    let mut config = PipelineConfig::default();
    config.histogram.skip_top_bin = false;
    config.histogram.max_percentile = 0.9999;
    config.display.default_hdr_max_nits = 1000.0;
    config.save(&path).unwrap();

    assert_eq!(PipelineConfig::load(&path).unwrap(), config);
}

#[test]
fn test_missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = PipelineConfig::load(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
    assert_eq!(err.status(), None);
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    fs::write(&path, "histogram:\n  gamma: -1.0\n").unwrap();
    assert!(PipelineConfig::load(&path).is_err());
}

#[test]
fn test_loaded_config_drives_the_controller() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.yaml");
    fs::write(&path, "view:\n  max_zoom: 4.0\n").unwrap();
    let config = PipelineConfig::load(&path).unwrap();

    let mut ctl = PipelineController::new(CpuDevice::new(), config).unwrap();
    ctl.set_target_size(20, 10).unwrap();
    ctl.load_image(DecodedImage::solid(PixelFormat::RGBA8, 4, 4, [1.0; 4])).unwrap();
    ctl.fit_to_window(true).unwrap();
    // magnification is allowed up to the configured limit
    assert_eq!(ctl.view().zoom, 2.5);
    assert_eq!(ctl.view().offset, (5.0, 0.0));
}

#[test]
fn test_controller_rejects_inverted_zoom_limits() {
    let mut config = PipelineConfig::default();
    config.view.max_zoom = 0.1;
    config.view.min_sphere_zoom = 0.25;
    let result = PipelineController::new(CpuDevice::new(), config);
    assert!(matches!(result, Err(PipelineError::Config(_))));
}
