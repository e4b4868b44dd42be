// Test doubles for the Detector seam

use std::sync::atomic::{AtomicUsize, Ordering};

use super::{BoundingBox, DetectedObject, Detector, Frame};
use crate::error::{Result, VidSearchError};

/// Reports the same labels on every frame and counts calls
pub struct StaticDetector {
    labels: Vec<String>,
    calls: AtomicUsize,
}

impl StaticDetector {
    pub fn new(labels: &[&str]) -> Self {
        Self {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Detector for StaticDetector {
    fn detect(&self, frame: &Frame) -> Result<Vec<DetectedObject>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .labels
            .iter()
            .enumerate()
            .map(|(i, label)| DetectedObject {
                class_id: i,
                label: label.clone(),
                confidence: 0.9,
                bbox: BoundingBox { x1: 0.0, y1: 0.0, x2: frame.width as f32, y2: frame.height as f32 },
            })
            .collect())
    }
}

/// Fails on the n-th call (0-based)
pub struct FailingDetector {
    fail_on: usize,
    calls: AtomicUsize,
}

impl FailingDetector {
    pub fn new(fail_on: usize) -> Self {
        Self { fail_on, calls: AtomicUsize::new(0) }
    }
}

impl Detector for FailingDetector {
    fn detect(&self, _frame: &Frame) -> Result<Vec<DetectedObject>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == self.fail_on {
            return Err(VidSearchError::Detector("model exploded".to_string()));
        }
        Ok(Vec::new())
    }
}

pub fn blank_frame(width: u32, height: u32) -> Frame {
    Frame::new(width, height, vec![0; width as usize * height as usize * 3]).expect("valid frame")
}
