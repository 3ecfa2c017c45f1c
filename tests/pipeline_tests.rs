//! End-to-end tests for the live terrain pipeline

use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use std::thread::sleep;
use std::time::{Duration, Instant};

use lidarterrain::{
    Calibration, ChannelSink, ColorImage, PipelineParams, TerrainEvent, TerrainPipeline,
    TerrainSink, ThresholdKind, ThresholdSet,
};

fn params(debounce_ms: u64) -> PipelineParams {
    PipelineParams {
        debounce_interval: Duration::from_millis(debounce_ms),
        ..Default::default()
    }
}

fn images(rx: &Receiver<TerrainEvent>) -> Vec<ColorImage> {
    rx.try_iter()
        .filter_map(|e| match e {
            TerrainEvent::ImageReady(img) => Some(img),
            _ => None,
        })
        .collect()
}

/// Synthetic 256x192 scene: depth grows left to right from 0.5m to ~3.0m.
fn scene() -> Vec<f32> {
    let (w, h) = (256, 192);
    (0..w * h).map(|i| 0.5 + (i % w) as f32 * 0.01).collect()
}

#[test]
fn test_calibration_then_four_bands() {
    let (sink, rx) = ChannelSink::new();
    let mut pipeline = TerrainPipeline::new(params(50), Arc::new(sink)).unwrap();
    let start = Instant::now();
    pipeline.reset_calibration_at(start);

    let frame = scene();
    for i in 0..60 {
        pipeline.on_frame_at(&frame, 256, 192, start + Duration::from_millis(i * 33));
    }
    assert!(pipeline.is_calibrating());
    pipeline.on_frame_at(&frame, 256, 192, start + Duration::from_secs(2));
    assert!(!pipeline.is_calibrating());

    let th = pipeline.thresholds();
    assert!(th.is_finite());
    // Strided columns 0..=252 -> 0.5 ..= 3.02
    assert!((th.ground_level - (3.02 - 0.6 * 2.52)).abs() < 1e-3);

    let last = images(&rx).pop().expect("image after calibration");
    assert_eq!((last.width, last.height), (64, 48));
    let left = last.pixel(0, 0).unwrap();
    let right = last.pixel(63, 0).unwrap();
    // Calibration puts the nearest depth a third of the way into the grass band.
    assert_eq!(left[0], 0);
    assert_eq!(left[2], 0);
    assert!((84..=85).contains(&left[1]), "green was {}", left[1]);
    assert_eq!(right, [0, 0, 255, 255], "farthest depth is water");
}

#[test]
fn test_burst_of_edits_recolors_once() {
    let (sink, rx) = ChannelSink::new();
    let mut pipeline = TerrainPipeline::with_thresholds(
        params(100),
        Arc::new(sink),
        ThresholdSet::new(2.0, 0.5, 0.5),
    )
    .unwrap();
    pipeline.on_frame(&scene(), 256, 192);
    let _ = images(&rx);

    for i in 0..8 {
        pipeline.set_threshold(ThresholdKind::Ground, 1.0 + i as f32 * 0.1);
        sleep(Duration::from_millis(10));
    }
    sleep(Duration::from_millis(500));

    let events: Vec<_> = rx.try_iter().collect();
    let labels = events
        .iter()
        .filter(|e| matches!(e, TerrainEvent::LabelUpdate(..)))
        .count();
    let recolors = events
        .iter()
        .filter(|e| matches!(e, TerrainEvent::ImageReady(_)))
        .count();
    assert_eq!(labels, 8);
    assert_eq!(recolors, 1);
}

#[test]
fn test_recolor_uses_thresholds_at_fire_time() {
    let (sink, rx) = ChannelSink::new();
    let mut pipeline = TerrainPipeline::new(params(80), Arc::new(sink)).unwrap();
    pipeline.on_frame(&vec![1.0; 16 * 16], 16, 16);
    let _ = images(&rx);

    pipeline.set_threshold(ThresholdKind::Ground, 5.0);
    pipeline.set_threshold(ThresholdKind::Below, 0.0);
    pipeline.set_threshold(ThresholdKind::Above, 10.0);

    let image = loop {
        match rx.recv_timeout(Duration::from_secs(2)).expect("debounced image") {
            TerrainEvent::ImageReady(img) => break img,
            _ => continue,
        }
    };
    // 1.0 is inside the mountain band [-5, 5): t = 0.6
    assert_eq!(image.pixel(0, 0), Some([91, 61, 30, 255]));
}

#[test]
fn test_request_recolor_without_frame_is_silent() {
    let (sink, rx) = ChannelSink::new();
    let pipeline = TerrainPipeline::new(params(20), Arc::new(sink)).unwrap();
    pipeline.request_recolor();
    sleep(Duration::from_millis(150));
    assert!(rx.try_iter().next().is_none());
}

#[test]
fn test_tiny_frames_produce_empty_images() {
    let (sink, rx) = ChannelSink::new();
    let mut pipeline = TerrainPipeline::new(params(20), Arc::new(sink)).unwrap();
    pipeline.on_frame(&[1.0; 9], 3, 3);
    let imgs = images(&rx);
    assert_eq!(imgs.len(), 1);
    assert!(imgs[0].is_empty());
}

#[derive(Default)]
struct RecordingSink {
    calibrations: Mutex<Vec<Calibration>>,
    labels: Mutex<Vec<String>>,
}

impl TerrainSink for RecordingSink {
    fn on_calibrated(&self, calibration: &Calibration) {
        self.calibrations.lock().unwrap().push(calibration.clone());
    }

    fn on_image_ready(&self, _image: ColorImage) {}

    fn on_label_update(&self, _kind: ThresholdKind, text: String) {
        self.labels.lock().unwrap().push(text);
    }
}

#[test]
fn test_custom_sink_receives_control_ranges() {
    let sink = Arc::new(RecordingSink::default());
    let mut pipeline = TerrainPipeline::new(params(20), sink.clone()).unwrap();
    let start = Instant::now();
    pipeline.reset_calibration_at(start);

    let frame: Vec<f32> = (0..40).map(|i| (i % 10 + 1) as f32).collect();
    pipeline.on_frame_at(&frame, 10, 4, start);
    // Frames stop; the window is closed by polling.
    let cal = pipeline
        .poll_calibration_at(start + Duration::from_secs(2))
        .expect("calibrated");

    // Columns 0, 4, 8 -> values 1, 5, 9
    assert_eq!((cal.stats.min, cal.stats.max), (1.0, 9.0));
    let recorded = sink.calibrations.lock().unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].controls.ground.min, 1.0);
    assert_eq!(recorded[0].controls.ground.max, 9.0);
    assert_eq!(sink.labels.lock().unwrap().len(), 3);

    // A second reset starts a fresh window.
    drop(recorded);
    pipeline.reset_calibration_at(start + Duration::from_secs(3));
    assert!(pipeline.is_calibrating());
}
