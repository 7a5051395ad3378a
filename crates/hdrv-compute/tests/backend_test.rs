//! CpuDevice behaviour through the GpuDevice trait.

use hdrv_compute::{
    ComputeError, ComputeImage, CpuDevice, DeviceCaps, GpuDevice, ImageHandle, Kernel, KernelKind,
};

fn run(device: &mut CpuDevice, kernel: Kernel, input: &ComputeImage) -> ComputeImage {
    let src = device.upload(input).unwrap();
    let effect = device.create_effect(kernel.kind()).unwrap();
    let out = device.apply(&effect, &kernel, &[&src]).unwrap();
    device.download(&out).unwrap()
}

#[test]
fn test_white_level_adjust_scales_rgb_only() {
    let mut device = CpuDevice::new();
    let out = run(
        &mut device,
        Kernel::WhiteLevelAdjust { input_nits: 80.0, output_nits: 240.0 },
        &ComputeImage::solid(2, 2, [1.0, 0.5, 0.25, 0.5]),
    );
    let px = out.pixel(1, 1);
    assert!((px[0] - 3.0).abs() < 1e-6);
    assert!((px[1] - 1.5).abs() < 1e-6);
    assert!((px[2] - 0.75).abs() < 1e-6);
    assert_eq!(px[3], 0.5);
}

#[test]
fn test_rgb_scale_matrix_leaves_alpha() {
    let mut device = CpuDevice::new();
    let out = run(&mut device, Kernel::rgb_scale(2.0), &ComputeImage::solid(1, 1, [1.0, 1.0, 1.0, 0.25]));
    assert_eq!(out.pixel(0, 0), [2.0, 2.0, 2.0, 0.25]);
}

#[test]
fn test_scale_kernel_changes_size() {
    let mut device = CpuDevice::new();
    let src = device.upload(&ComputeImage::solid(100, 50, [1.0; 4])).unwrap();
    let effect = device.create_effect(KernelKind::Scale).unwrap();
    let out = device.apply(&effect, &Kernel::Scale { factor: 0.5 }, &[&src]).unwrap();
    assert_eq!(out.size(), (50, 25));
}

#[test]
fn test_mismatched_effect_is_rejected() {
    let mut device = CpuDevice::new();
    let src = device.upload(&ComputeImage::solid(1, 1, [1.0; 4])).unwrap();
    let effect = device.create_effect(KernelKind::SdrOverlay).unwrap();
    let err = device.apply(&effect, &Kernel::LuminanceHeatmap, &[&src]).unwrap_err();
    assert!(matches!(err, ComputeError::InvalidInput(_)));
}

#[test]
fn test_gain_map_merge_needs_two_inputs() {
    let mut device = CpuDevice::new();
    let src = device.upload(&ComputeImage::solid(1, 1, [1.0; 4])).unwrap();
    let kernel = Kernel::GainMapMerge { gamma: 1.0, white_scale: 1.0, gain: 2.0 };
    let effect = device.create_effect(kernel.kind()).unwrap();
    assert!(device.apply(&effect, &kernel, &[&src]).is_err());
    let out = device.apply(&effect, &kernel, &[&src, &src]).unwrap();
    assert_eq!(device.download(&out).unwrap().pixel(0, 0), [2.0, 2.0, 2.0, 1.0]);
}

#[test]
fn test_device_loss_blocks_calls_until_recovery() {
    let mut device = CpuDevice::new();
    let signal = device.loss_signal();
    let src = device.upload(&ComputeImage::solid(1, 1, [1.0; 4])).unwrap();

    signal.trigger();
    assert_eq!(device.check(), Err(ComputeError::DeviceRemoved));
    let err = device.present(Some(&src), (0.0, 0.0)).unwrap_err();
    assert!(err.is_device_lost());

    device.recover().unwrap();
    assert!(device.check().is_ok());
    assert_eq!(device.generation(), 1);

    // handles from the lost device are stale
    let err = device.present(Some(&src), (0.0, 0.0)).unwrap_err();
    assert_eq!(err, ComputeError::StaleHandle { expected: 1, found: 0 });
}

#[test]
fn test_loss_signal_works_across_threads() {
    let device = CpuDevice::new();
    let signal = device.loss_signal();
    std::thread::spawn(move || signal.trigger()).join().unwrap();
    assert!(device.check().unwrap_err().is_device_lost());
}

#[test]
fn test_missing_capabilities_are_unsupported() {
    let mut device = CpuDevice::with_caps(DeviceCaps { hdr_tonemap: false, histogram: false });
    assert!(device.create_effect(KernelKind::Histogram).unwrap_err().is_unsupported());
    assert!(device.create_effect(KernelKind::HdrTonemap).unwrap_err().is_unsupported());
    assert!(device.create_effect(KernelKind::SimpleTonemap).is_ok());
}

#[test]
fn test_injected_fault_carries_status() {
    let mut device = CpuDevice::new();
    device.inject_fault(0x8007_000E);
    let err = device.create_effect(KernelKind::ColorMatrix).unwrap_err();
    assert!(!err.is_device_lost());
    assert_eq!(err.status(), 0x8007_000E);
    assert!(device.create_effect(KernelKind::ColorMatrix).is_ok());
}

#[test]
fn test_present_and_read_target() {
    let mut device = CpuDevice::new();
    device.resize_target(8, 4).unwrap();
    let src = device.upload(&ComputeImage::solid(2, 2, [5.0, 2.5, 1.0, 1.0])).unwrap();
    device.present(Some(&src), (3.0, 1.0)).unwrap();
    let target = device.read_target().unwrap();
    assert_eq!(target.size(), (8, 4));
    assert_eq!(target.pixel(4, 2), [5.0, 2.5, 1.0, 1.0]);
    assert_eq!(target.pixel(0, 0), [0.0, 0.0, 0.0, 1.0]);
    assert_eq!(device.frames_presented(), 1);

    device.present(None, (0.0, 0.0)).unwrap();
    assert_eq!(device.read_target().unwrap().pixel(4, 2), [0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn test_histogram_reduction() {
    let mut device = CpuDevice::new();
    let src = device.upload(&ComputeImage::solid(4, 4, [0.3, 0.0, 0.0, 1.0])).unwrap();
    let effect = device.create_effect(KernelKind::Histogram).unwrap();
    let bins = device.histogram(&effect, &src, 10).unwrap();
    assert_eq!(bins.len(), 10);
    assert_eq!(bins[3], 1.0);
    assert!((bins.iter().sum::<f32>() - 1.0).abs() < 1e-6);
}
