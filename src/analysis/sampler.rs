// Frame sampling: decode a container and keep every N-th frame
//
// N is the frame rate times the sampling interval, truncated, so a 30fps
// video sampled every 2s yields frames 0, 60, 120, ...

use std::io;
use std::path::Path;
use std::process::ExitStatus;
use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};

use crate::constants::TIMESTAMP_DECIMALS;
use crate::detector::Frame;
use crate::error::{Result, VidSearchError};

/// Which frames of a video get sampled, and at what timestamps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingPlan {
    pub fps: f64,
    pub interval_frames: u64,
}

impl SamplingPlan {
    pub fn new(fps: f64, interval_secs: f64) -> Result<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(VidSearchError::FFprobe(format!("unusable frame rate {}", fps)));
        }
        if !interval_secs.is_finite() || interval_secs <= 0.0 {
            return Err(VidSearchError::Config(format!(
                "sample interval must be positive, got {}",
                interval_secs
            )));
        }

        // Sub-frame intervals still sample every frame
        let interval_frames = ((fps * interval_secs) as u64).max(1);
        Ok(Self { fps, interval_frames })
    }

    pub fn is_sampled(&self, frame_number: u64) -> bool {
        frame_number % self.interval_frames == 0
    }

    /// Source frame number of the k-th sampled frame
    pub fn source_frame(&self, sample_index: u64) -> u64 {
        sample_index * self.interval_frames
    }

    /// Seconds into the video, rounded to hundredths
    pub fn timestamp(&self, frame_number: u64) -> f64 {
        round_to(frame_number as f64 / self.fps, TIMESTAMP_DECIMALS)
    }

    /// ffmpeg `select` filter that lets exactly the sampled frames through
    pub fn select_filter(&self) -> String {
        format!("select=not(mod(n\\,{}))", self.interval_frames)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// A child process that can be stopped and reaped
trait Reap {
    fn kill(&mut self) -> io::Result<()>;
    fn wait(&mut self) -> io::Result<ExitStatus>;
}

impl Reap for FfmpegChild {
    fn kill(&mut self) -> io::Result<()> {
        FfmpegChild::kill(self)
    }

    fn wait(&mut self) -> io::Result<ExitStatus> {
        FfmpegChild::wait(self)
    }
}

/// Kills and reaps the decoder on drop unless it was waited on
struct ReapGuard<C: Reap> {
    child: C,
    reaped: bool,
}

impl<C: Reap> ReapGuard<C> {
    fn new(child: C) -> Self {
        Self { child, reaped: false }
    }

    fn wait(&mut self) -> io::Result<ExitStatus> {
        let status = self.child.wait();
        self.reaped = true;
        status
    }
}

impl<C: Reap> Drop for ReapGuard<C> {
    fn drop(&mut self) {
        if self.reaped {
            return;
        }
        if let Err(e) = self.child.kill() {
            log::debug!("Failed to kill ffmpeg: {}", e);
        }
        if let Err(e) = self.child.wait() {
            log::warn!("Failed to reap ffmpeg: {}", e);
        }
    }
}

/// Decode `video_path` and call `on_frame` for every sampled frame, in order.
/// Returns how many frames were sampled.
pub fn sample_video<F>(video_path: &Path, plan: &SamplingPlan, mut on_frame: F) -> Result<u64>
where
    F: FnMut(u64, Frame) -> Result<()>,
{
    log::debug!(
        "Sampling {} every {} frames ({:.3} fps)",
        video_path.display(), plan.interval_frames, plan.fps
    );

    let mut cmd = FfmpegCommand::new_with_path(crate::tools::ffmpeg_path());
    cmd.hide_banner()
        .input(video_path)
        .args(["-an", "-sn", "-dn"])
        .args(["-vf", &plan.select_filter()])
        .args(["-fps_mode", "passthrough"])
        .rawvideo();

    let child = cmd
        .spawn()
        .map_err(|e| VidSearchError::FFmpeg(format!("Failed to start ffmpeg: {}", e)))?;
    // Every early return below stops and reaps ffmpeg
    let mut child = ReapGuard::new(child);

    let events = child
        .child
        .iter()
        .map_err(|e| VidSearchError::FFmpeg(format!("Failed to read ffmpeg output: {}", e)))?;

    let mut sampled = 0u64;
    let mut errors: Vec<String> = Vec::new();

    for event in events {
        match event {
            FfmpegEvent::OutputFrame(raw) => {
                let frame_number = plan.source_frame(raw.frame_num as u64);
                let frame = Frame::new(raw.width, raw.height, raw.data)?;
                on_frame(frame_number, frame)?;
                sampled += 1;
            }
            FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, line) | FfmpegEvent::Error(line) => {
                log::trace!("ffmpeg: {}", line);
                errors.push(line);
            }
            _ => {}
        }
    }

    let status = child
        .wait()
        .map_err(|e| VidSearchError::FFmpeg(format!("ffmpeg did not exit cleanly: {}", e)))?;

    if !status.success() {
        return Err(VidSearchError::FFmpeg(format!(
            "ffmpeg exited with {}: {}",
            status,
            errors.last().map(String::as_str).unwrap_or("no error output")
        )));
    }

    Ok(sampled)
}
