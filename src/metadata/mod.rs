// Video metadata extraction

pub mod ffprobe;

use serde::{Deserialize, Serialize};

/// Properties of the first video stream in a container
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub fps: Option<f64>,
    pub duration_ms: Option<i64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub codec: Option<String>,
}

pub use ffprobe::probe;
