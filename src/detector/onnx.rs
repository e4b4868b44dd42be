// YOLOv8 inference through ONNX Runtime

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::TensorRef;

use super::yolo::{decode_output, letterbox};
use super::{DetectedObject, Detector, DetectorSettings, Frame};
use crate::constants::{DETECTOR_INTRA_THREADS, MODEL_INPUT_SIZE};
use crate::error::{Result, VidSearchError};

/// YOLOv8 model exported with `yolo export format=onnx`.
///
/// `Session::run` needs `&mut self`, so the session sits behind a mutex and
/// frames are detected one at a time.
pub struct OnnxDetector {
    session: Mutex<Session>,
    settings: DetectorSettings,
}

impl OnnxDetector {
    pub fn load(model_path: &Path, settings: DetectorSettings) -> Result<Self> {
        if !model_path.exists() {
            return Err(VidSearchError::FileNotFound(model_path.display().to_string()));
        }

        let session = Session::builder()
            .map_err(|e: ort::Error| VidSearchError::Detector(e.to_string()))?
            .with_intra_threads(DETECTOR_INTRA_THREADS)
            .map_err(|e: ort::Error| VidSearchError::Detector(e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e: ort::Error| VidSearchError::Detector(format!("ONNX load failed: {e}")))?;

        log::info!("Detection model loaded from {}", model_path.display());

        Ok(Self {
            session: Mutex::new(session),
            settings,
        })
    }
}

impl Detector for OnnxDetector {
    fn detect(&self, frame: &Frame) -> Result<Vec<DetectedObject>> {
        let (input, lb) = letterbox(frame, MODEL_INPUT_SIZE)?;
        let side = MODEL_INPUT_SIZE as usize;

        let array = ndarray::Array4::from_shape_vec((1, 3, side, side), input)
            .map_err(|e| VidSearchError::Detector(e.to_string()))?;
        let tensor = TensorRef::from_array_view(&array)
            .map_err(|e| VidSearchError::Detector(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| VidSearchError::Detector("Session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| VidSearchError::Detector(format!("ONNX inference failed: {e}")))?;

        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| VidSearchError::Detector(format!("Output extraction: {e}")))?;

        let shape: Vec<usize> = shape.iter().map(|&d| d.max(0) as usize).collect();
        decode_output(data, &shape, &lb, frame.width, frame.height, &self.settings)
    }
}
