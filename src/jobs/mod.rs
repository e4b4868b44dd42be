// Analysis jobs
//
// An upload becomes one job: sample + detect the stored video, then append
// its detections to the database. Jobs run on the blocking pool so decoding
// and inference never stall the HTTP runtime.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::analysis::{self, Analysis};
use crate::db::{self, schema};
use crate::detector::Detector;
use crate::error::{Result, VidSearchError};

/// Analyze a stored video and persist its detections
pub fn run_analysis_job(
    db_path: &Path,
    detector: &dyn Detector,
    interval_secs: f64,
    video_path: &Path,
    video_name: &str,
) -> Result<Analysis> {
    log::info!("Analysis job started: {}", video_name);

    let analysis = analysis::analyze_video(video_path, detector, interval_secs)?;

    let conn = db::open_db(db_path)?;
    let inserted = schema::insert_detections(&conn, Some(video_name), &analysis.detections)?;

    log::info!("Analysis job finished: {} ({} detections stored)", video_name, inserted);
    Ok(analysis)
}

/// Run an analysis job in the background. Failures and panics are logged,
/// never propagated, so one bad upload cannot take down the server.
pub fn spawn_analysis_job(
    db_path: PathBuf,
    detector: Arc<dyn Detector>,
    interval_secs: f64,
    video_path: PathBuf,
    video_name: String,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let name = video_name.clone();
        let result = tokio::task::spawn_blocking(move || {
            run_analysis_job(&db_path, detector.as_ref(), interval_secs, &video_path, &video_name)
        })
        .await;

        match result {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => log::error!("Analysis job failed for {}: {}", name, e),
            Err(e) if e.is_panic() => log::error!("Analysis job panicked for {} (recovered)", name),
            Err(e) => log::error!("Analysis job for {} was cancelled: {}", name, e),
        }
    })
}

/// Await a job inline, surfacing its error instead of logging it
pub async fn run_analysis_job_async(
    db_path: PathBuf,
    detector: Arc<dyn Detector>,
    interval_secs: f64,
    video_path: PathBuf,
    video_name: String,
) -> Result<Analysis> {
    tokio::task::spawn_blocking(move || {
        run_analysis_job(&db_path, detector.as_ref(), interval_secs, &video_path, &video_name)
    })
    .await
    .map_err(|e| VidSearchError::Other(format!("analysis task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::mock::StaticDetector;
    use crate::detector::{DetectedObject, Frame};
    use tempfile::TempDir;

    struct PanickingDetector;

    impl Detector for PanickingDetector {
        fn detect(&self, _frame: &Frame) -> Result<Vec<DetectedObject>> {
            panic!("detector bug");
        }
    }

    fn generate_fixture(dir: &Path) -> Option<PathBuf> {
        let path = dir.join("clip.mp4");
        let status = std::process::Command::new(crate::tools::ffmpeg_path())
            .args(["-f", "lavfi", "-i", "testsrc=s=64x48:d=3:r=5", "-c:v", "mpeg4", "-an", "-y"])
            .arg(&path)
            .output()
            .ok()?;
        if !status.status.success() || !crate::metadata::ffprobe::is_available() {
            return None;
        }
        Some(path)
    }

    #[test]
    fn test_missing_video_stores_nothing() {
        let dir = TempDir::new().unwrap();
        let db_path = db::init_data_dir(dir.path()).unwrap();
        let detector = StaticDetector::new(&["person"]);

        let result = run_analysis_job(&db_path, &detector, 2.0, &dir.path().join("gone.mp4"), "gone.mp4");

        assert!(result.is_err());
        let conn = db::open_db(&db_path).unwrap();
        assert_eq!(schema::count_detections(&conn).unwrap(), 0);
    }

    #[test]
    fn test_job_persists_detections() {
        let dir = TempDir::new().unwrap();
        let Some(video) = generate_fixture(dir.path()) else {
            eprintln!("Skipping test - FFmpeg not available");
            return;
        };
        let db_path = db::init_data_dir(&dir.path().join("data")).unwrap();
        let detector = StaticDetector::new(&["cat"]);

        let analysis = run_analysis_job(&db_path, &detector, 2.0, &video, "clip.mp4").unwrap();

        let conn = db::open_db(&db_path).unwrap();
        let rows = schema::find_detections(&conn, "cat").unwrap();
        assert_eq!(rows.len(), analysis.detections.len());
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|r| r.video.as_deref() == Some("clip.mp4")));
    }

    #[tokio::test]
    async fn test_spawned_job_logs_failure() {
        let dir = TempDir::new().unwrap();
        let db_path = db::init_data_dir(dir.path()).unwrap();
        let detector: Arc<dyn Detector> = Arc::new(StaticDetector::new(&["person"]));

        // Failure is swallowed; the handle itself completes cleanly
        spawn_analysis_job(db_path, detector, 2.0, dir.path().join("gone.mp4"), "gone.mp4".into())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_spawned_job_survives_panic() {
        let dir = TempDir::new().unwrap();
        let Some(video) = generate_fixture(dir.path()) else {
            eprintln!("Skipping test - FFmpeg not available");
            return;
        };
        let db_path = db::init_data_dir(&dir.path().join("data")).unwrap();
        let detector: Arc<dyn Detector> = Arc::new(PanickingDetector);

        spawn_analysis_job(db_path.clone(), detector, 2.0, video, "clip.mp4".into())
            .await
            .unwrap();

        let conn = db::open_db(&db_path).unwrap();
        assert_eq!(schema::count_detections(&conn).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_inline_job_returns_error() {
        let dir = TempDir::new().unwrap();
        let db_path = db::init_data_dir(dir.path()).unwrap();
        let detector: Arc<dyn Detector> = Arc::new(StaticDetector::new(&[]));

        let err = run_analysis_job_async(db_path, detector, 2.0, dir.path().join("gone.mp4"), "gone.mp4".into())
            .await
            .unwrap_err();
        assert!(matches!(err, VidSearchError::FileNotFound(_)));
    }
}
