// Video analysis: sample frames, detect objects, flatten into (label, time) records

pub mod analyzer;
pub mod sampler;


use serde::{Deserialize, Serialize};

pub use analyzer::{analyze_frames, analyze_video};
pub use sampler::SamplingPlan;

/// One object seen at one moment of a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub object: String,
    pub time: f64,
}

/// Outcome of analyzing a single video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub fps: f64,
    pub interval_frames: u64,
    pub frames_sampled: u64,
    pub detections: Vec<Detection>,
}
