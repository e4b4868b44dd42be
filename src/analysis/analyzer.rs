// Entry point for turning a video file into detection records

use std::path::Path;

use super::sampler::{sample_video, SamplingPlan};
use super::{Analysis, Detection};
use crate::detector::{Detector, Frame};
use crate::error::{Result, VidSearchError};
use crate::metadata;

/// Run detection on already-sampled frames and flatten the results.
/// Records keep frame order, then the detector's order within a frame.
pub fn analyze_frames<I>(frames: I, plan: &SamplingPlan, detector: &dyn Detector) -> Result<Vec<Detection>>
where
    I: IntoIterator<Item = (u64, Frame)>,
{
    let mut detections = Vec::new();
    for (frame_number, frame) in frames {
        detect_into(&mut detections, frame_number, &frame, plan, detector)?;
    }
    Ok(detections)
}

fn detect_into(
    detections: &mut Vec<Detection>,
    frame_number: u64,
    frame: &Frame,
    plan: &SamplingPlan,
    detector: &dyn Detector,
) -> Result<()> {
    let time = plan.timestamp(frame_number);
    for object in detector.detect(frame)? {
        detections.push(Detection { object: object.label, time });
    }
    Ok(())
}

/// Probe, sample and detect a whole video
pub fn analyze_video(video_path: &Path, detector: &dyn Detector, interval_secs: f64) -> Result<Analysis> {
    let info = metadata::probe(video_path)?;
    let fps = info.fps.ok_or_else(|| {
        VidSearchError::FFprobe(format!("Could not determine frame rate of {}", video_path.display()))
    })?;
    let plan = SamplingPlan::new(fps, interval_secs)?;

    let mut detections = Vec::new();
    let frames_sampled = sample_video(video_path, &plan, |frame_number, frame| {
        detect_into(&mut detections, frame_number, &frame, &plan, detector)
    })?;

    log::info!(
        "Analyzed {}: {} frames sampled, {} objects detected",
        video_path.display(), frames_sampled, detections.len()
    );

    Ok(Analysis {
        fps,
        interval_frames: plan.interval_frames,
        frames_sampled,
        detections,
    })
}
