// FFprobe wrapper for video stream properties

use std::path::Path;
use std::process::Command;
use serde::Deserialize;

use crate::error::{Result, VidSearchError};
use crate::metadata::VideoInfo;

#[derive(Debug, Deserialize)]
struct FFprobeOutput {
    streams: Option<Vec<FFprobeStream>>,
    format: Option<FFprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FFprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<i32>,
    height: Option<i32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FFprobeFormat {
    duration: Option<String>,
}

/// Run ffprobe on a file and read its first video stream
pub fn probe(path: &Path) -> Result<VideoInfo> {
    if !path.exists() {
        return Err(VidSearchError::FileNotFound(path.display().to_string()));
    }

    let output = Command::new(crate::tools::ffprobe_path())
        .args([
            "-v", "quiet",
            "-print_format", "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .map_err(|e| VidSearchError::FFprobe(format!("Failed to run ffprobe: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VidSearchError::FFprobe(format!("ffprobe failed: {}", stderr)));
    }

    parse_probe_output(&output.stdout)
}

fn parse_probe_output(stdout: &[u8]) -> Result<VideoInfo> {
    let probe_output: FFprobeOutput = serde_json::from_slice(stdout)
        .map_err(|e| VidSearchError::FFprobe(format!("Failed to parse ffprobe output: {}", e)))?;

    let stream = probe_output.streams
        .unwrap_or_default()
        .into_iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| VidSearchError::FFprobe("No video stream found".to_string()))?;

    // r_frame_rate is 0/0 for some containers; avg_frame_rate is usually set then
    let fps = parse_frame_rate(stream.r_frame_rate.as_deref())
        .or_else(|| parse_frame_rate(stream.avg_frame_rate.as_deref()));

    let duration_ms = parse_duration_ms(stream.duration.as_deref())
        .or_else(|| {
            probe_output.format
                .as_ref()
                .and_then(|f| parse_duration_ms(f.duration.as_deref()))
        });

    Ok(VideoInfo {
        fps,
        duration_ms,
        width: stream.width,
        height: stream.height,
        codec: stream.codec_name,
    })
}

/// Parse frame rate string like "30000/1001" to f64
fn parse_frame_rate(rate_str: Option<&str>) -> Option<f64> {
    let rate_str = rate_str?;
    let rate = if let Some((num, den)) = rate_str.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den <= 0.0 {
            return None;
        }
        num / den
    } else {
        rate_str.parse().ok()?
    };

    (rate.is_finite() && rate > 0.0).then_some(rate)
}

/// Parse duration string to milliseconds
fn parse_duration_ms(duration_str: Option<&str>) -> Option<i64> {
    let seconds: f64 = duration_str?.parse().ok()?;
    Some((seconds * 1000.0) as i64)
}

/// Check if ffprobe is available
pub fn is_available() -> bool {
    crate::tools::is_tool_available("ffprobe")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate(Some("30/1")), Some(30.0));
        assert!((parse_frame_rate(Some("30000/1001")).unwrap() - 29.97).abs() < 0.01);
        assert_eq!(parse_frame_rate(Some("25")), Some(25.0));
        assert_eq!(parse_frame_rate(Some("0/0")), None);
        assert_eq!(parse_frame_rate(Some("garbage")), None);
        assert_eq!(parse_frame_rate(None), None);
    }

    #[test]
    fn test_parse_probe_output_picks_video_stream() {
        let json = br#"{
            "streams": [
                {"codec_type": "audio", "codec_name": "aac"},
                {"codec_type": "video", "codec_name": "h264", "width": 1280, "height": 720,
                 "r_frame_rate": "25/1", "duration": "12.5"}
            ],
            "format": {"duration": "12.6"}
        }"#;

        let info = parse_probe_output(json).unwrap();
        assert_eq!(info.fps, Some(25.0));
        assert_eq!(info.duration_ms, Some(12500));
        assert_eq!(info.width, Some(1280));
        assert_eq!(info.codec.as_deref(), Some("h264"));
    }

    #[test]
    fn test_parse_probe_output_falls_back_to_avg_rate_and_format_duration() {
        let json = br#"{
            "streams": [
                {"codec_type": "video", "r_frame_rate": "0/0", "avg_frame_rate": "24/1"}
            ],
            "format": {"duration": "3.0"}
        }"#;

        let info = parse_probe_output(json).unwrap();
        assert_eq!(info.fps, Some(24.0));
        assert_eq!(info.duration_ms, Some(3000));
    }

    #[test]
    fn test_parse_probe_output_without_video() {
        let json = br#"{"streams": [{"codec_type": "audio"}]}"#;
        let err = parse_probe_output(json).unwrap_err();
        assert!(matches!(err, VidSearchError::FFprobe(_)));
    }

    #[test]
    fn test_probe_missing_file() {
        let err = probe(Path::new("/no/such/video.mp4")).unwrap_err();
        assert!(matches!(err, VidSearchError::FileNotFound(_)));
    }
}
