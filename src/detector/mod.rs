// Object detection on decoded frames
//
// `Detector` is the seam between frame sampling and the model. The ONNX
// backend sits behind the `onnx-detector` feature; tests plug in their own.

pub mod yolo;
#[cfg(feature = "onnx-detector")]
pub mod onnx;
#[cfg(test)]
pub mod mock;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Result, VidSearchError};

/// A decoded RGB24 frame
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if width == 0 || height == 0 || data.len() != expected {
            return Err(VidSearchError::Detector(format!(
                "frame buffer is {} bytes, expected {} for {}x{} rgb24",
                data.len(), expected, width, height
            )));
        }
        Ok(Self { width, height, data })
    }
}

/// Axis-aligned box in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);
        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - inter;
        if union <= 0.0 { 0.0 } else { inter / union }
    }
}

/// One recognized object in a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub class_id: usize,
    pub label: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

/// Thresholds applied to raw model output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorSettings {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
}

impl From<&Config> for DetectorSettings {
    fn from(config: &Config) -> Self {
        Self {
            confidence_threshold: config.confidence_threshold,
            iou_threshold: config.iou_threshold,
            max_detections: config.max_detections,
        }
    }
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

pub trait Detector: Send + Sync {
    /// Run the model on one frame. Zero objects is a valid answer.
    fn detect(&self, frame: &Frame) -> Result<Vec<DetectedObject>>;
}

/// Build the configured detector
#[cfg(feature = "onnx-detector")]
pub fn load_detector(config: &Config) -> Result<Box<dyn Detector>> {
    let detector = onnx::OnnxDetector::load(&config.model_path, DetectorSettings::from(config))?;
    Ok(Box::new(detector))
}

/// Build the configured detector
#[cfg(not(feature = "onnx-detector"))]
pub fn load_detector(config: &Config) -> Result<Box<dyn Detector>> {
    Err(VidSearchError::Detector(format!(
        "cannot load {}: built without the `onnx-detector` feature (rebuild with --features onnx-detector)",
        config.model_path.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_validates_buffer() {
        assert!(Frame::new(2, 2, vec![0; 12]).is_ok());
        assert!(Frame::new(2, 2, vec![0; 11]).is_err());
        assert!(Frame::new(0, 2, vec![]).is_err());
    }

    #[test]
    fn test_iou() {
        let a = BoundingBox { x1: 0.0, y1: 0.0, x2: 10.0, y2: 10.0 };
        let b = BoundingBox { x1: 5.0, y1: 0.0, x2: 15.0, y2: 10.0 };
        let c = BoundingBox { x1: 20.0, y1: 20.0, x2: 30.0, y2: 30.0 };

        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
        assert!((a.iou(&b) - 50.0 / 150.0).abs() < 1e-6);
        assert_eq!(a.iou(&c), 0.0);
    }

    #[test]
    fn test_settings_follow_config() {
        let mut config = Config::default();
        config.confidence_threshold = 0.5;
        let settings = DetectorSettings::from(&config);
        assert_eq!(settings.confidence_threshold, 0.5);
        assert_eq!(settings.max_detections, config.max_detections);
    }

    #[cfg(not(feature = "onnx-detector"))]
    #[test]
    fn test_load_detector_without_backend() {
        let err = load_detector(&Config::default()).err().unwrap();
        assert!(err.to_string().contains("onnx-detector"));
    }
}
