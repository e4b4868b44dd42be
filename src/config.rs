// Service configuration
//
// Every field has a default, so an empty JSON object (or no file at all)
// is a valid config. CLI flags override whatever the file provides.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Result, VidSearchError};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Config {
    pub bind: SocketAddr,
    pub data_dir: PathBuf,
    pub model_path: PathBuf,
    pub sample_interval_secs: f64,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
    pub translate: bool,
    pub target_language: String,
    pub translate_endpoint: String,
    pub translate_timeout_secs: u64,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            data_dir: PathBuf::from("."),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            sample_interval_secs: DEFAULT_SAMPLE_INTERVAL_SECS,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            max_detections: DEFAULT_MAX_DETECTIONS,
            translate: true,
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
            translate_endpoint: DEFAULT_TRANSLATE_ENDPOINT.to_string(),
            translate_timeout_secs: DEFAULT_TRANSLATE_TIMEOUT_SECS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    /// Load config from a JSON file, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|e| {
            VidSearchError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.sample_interval_secs.is_finite() || self.sample_interval_secs <= 0.0 {
            return Err(VidSearchError::Config(format!(
                "sample_interval_secs must be positive, got {}",
                self.sample_interval_secs
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(VidSearchError::Config(format!(
                "confidence_threshold must be within 0..=1, got {}",
                self.confidence_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(VidSearchError::Config(format!(
                "iou_threshold must be within 0..=1, got {}",
                self.iou_threshold
            )));
        }
        if self.max_detections == 0 {
            return Err(VidSearchError::Config("max_detections must be at least 1".to_string()));
        }
        if self.target_language.trim().is_empty() {
            return Err(VidSearchError::Config("target_language must not be empty".to_string()));
        }
        Ok(())
    }

    /// Path of the detections database
    pub fn db_path(&self) -> PathBuf {
        crate::db::get_db_path(&self.data_dir)
    }

    /// Folder uploaded videos are written to
    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join(UPLOADS_FOLDER)
    }
}
