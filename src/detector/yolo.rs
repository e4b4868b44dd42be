// YOLOv8 input/output handling, independent of the inference runtime
//
// Input: letterboxed square RGB, CHW, scaled to [0, 1].
// Output: [1, 4 + classes, anchors] where rows 0..4 are cx, cy, w, h in
// input pixels and the remaining rows are per-class scores.

use image::imageops::{self, FilterType};
use image::RgbImage;

use super::{BoundingBox, DetectedObject, DetectorSettings, Frame};
use crate::constants::LETTERBOX_FILL;
use crate::error::{Result, VidSearchError};

/// Class names of the COCO-trained YOLOv8 checkpoints, indexed by class id
pub const COCO_LABELS: [&str; 80] = [
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck",
    "boat", "traffic light", "fire hydrant", "stop sign", "parking meter", "bench",
    "bird", "cat", "dog", "horse", "sheep", "cow", "elephant", "bear", "zebra",
    "giraffe", "backpack", "umbrella", "handbag", "tie", "suitcase", "frisbee",
    "skis", "snowboard", "sports ball", "kite", "baseball bat", "baseball glove",
    "skateboard", "surfboard", "tennis racket", "bottle", "wine glass", "cup",
    "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich", "orange",
    "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch",
    "potted plant", "bed", "dining table", "toilet", "tv", "laptop", "mouse",
    "remote", "keyboard", "cell phone", "microwave", "oven", "toaster", "sink",
    "refrigerator", "book", "clock", "vase", "scissors", "teddy bear",
    "hair drier", "toothbrush",
];

pub fn label_for(class_id: usize) -> String {
    COCO_LABELS
        .get(class_id)
        .map(|l| l.to_string())
        .unwrap_or_else(|| format!("class_{}", class_id))
}

/// How a frame was fitted into the model input, needed to map boxes back
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub input_size: u32,
    pub scale: f32,
    pub pad_x: u32,
    pub pad_y: u32,
}

/// Resize a frame into a square input tensor, keeping aspect ratio and padding with gray.
pub fn letterbox(frame: &Frame, input_size: u32) -> Result<(Vec<f32>, Letterbox)> {
    let scale = (input_size as f32 / frame.width as f32).min(input_size as f32 / frame.height as f32);
    let new_w = ((frame.width as f32 * scale).round() as u32).clamp(1, input_size);
    let new_h = ((frame.height as f32 * scale).round() as u32).clamp(1, input_size);
    let pad_x = (input_size - new_w) / 2;
    let pad_y = (input_size - new_h) / 2;

    let source = RgbImage::from_raw(frame.width, frame.height, frame.data.clone())
        .ok_or_else(|| VidSearchError::Detector("frame buffer does not match its dimensions".to_string()))?;
    let resized = if new_w == frame.width && new_h == frame.height {
        source
    } else {
        imageops::resize(&source, new_w, new_h, FilterType::Triangle)
    };

    let side = input_size as usize;
    let plane = side * side;
    let mut tensor = vec![LETTERBOX_FILL as f32 / 255.0; 3 * plane];

    for (x, y, pixel) in resized.enumerate_pixels() {
        let offset = (y + pad_y) as usize * side + (x + pad_x) as usize;
        for c in 0..3 {
            tensor[c * plane + offset] = pixel[c] as f32 / 255.0;
        }
    }

    Ok((tensor, Letterbox { input_size, scale, pad_x, pad_y }))
}

/// Turn raw model output into labelled objects in frame coordinates.
pub fn decode_output(
    data: &[f32],
    shape: &[usize],
    letterbox: &Letterbox,
    frame_width: u32,
    frame_height: u32,
    settings: &DetectorSettings,
) -> Result<Vec<DetectedObject>> {
    if shape.len() != 3 || shape[0] != 1 || shape[1] <= 4 {
        return Err(VidSearchError::Detector(format!(
            "unexpected output shape {:?}, expected [1, 4 + classes, anchors]",
            shape
        )));
    }
    let rows = shape[1];
    let anchors = shape[2];
    if data.len() != rows * anchors {
        return Err(VidSearchError::Detector(format!(
            "output has {} values, shape {:?} needs {}",
            data.len(), shape, rows * anchors
        )));
    }

    let at = |row: usize, anchor: usize| data[row * anchors + anchor];
    let max_x = frame_width as f32;
    let max_y = frame_height as f32;

    let mut candidates = Vec::new();
    for i in 0..anchors {
        let (class_id, score) = (4..rows)
            .map(|row| (row - 4, at(row, i)))
            .fold((0, f32::MIN), |best, cur| if cur.1 > best.1 { cur } else { best });

        if score < settings.confidence_threshold {
            continue;
        }

        let (cx, cy, w, h) = (at(0, i), at(1, i), at(2, i), at(3, i));
        let unpad = |v: f32, pad: u32| (v - pad as f32) / letterbox.scale;
        let bbox = BoundingBox {
            x1: unpad(cx - w / 2.0, letterbox.pad_x).clamp(0.0, max_x),
            y1: unpad(cy - h / 2.0, letterbox.pad_y).clamp(0.0, max_y),
            x2: unpad(cx + w / 2.0, letterbox.pad_x).clamp(0.0, max_x),
            y2: unpad(cy + h / 2.0, letterbox.pad_y).clamp(0.0, max_y),
        };

        candidates.push(DetectedObject {
            class_id,
            label: label_for(class_id),
            confidence: score,
            bbox,
        });
    }

    Ok(non_max_suppression(candidates, settings.iou_threshold, settings.max_detections))
}

/// Greedy per-class NMS. Output is sorted by confidence, highest first.
pub fn non_max_suppression(mut candidates: Vec<DetectedObject>, iou_threshold: f32, max_detections: usize) -> Vec<DetectedObject> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<DetectedObject> = Vec::new();
    for cand in candidates {
        if kept.len() >= max_detections {
            break;
        }
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == cand.class_id && k.bbox.iou(&cand.bbox) > iou_threshold);
        if !suppressed {
            kept.push(cand);
        }
    }
    kept
}
