// HTTP handlers

use std::path::{Path, PathBuf};
use axum::extract::{Multipart, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;

use super::error::ApiError;
use super::AppState;
use crate::constants::{ROOT_MESSAGE, UPLOAD_FIELD_NAME};
use crate::ingest;
use crate::jobs;
use crate::search::{self, SearchOutcome};

#[derive(Debug, Default, Deserialize)]
pub struct UploadParams {
    /// Analyze before responding instead of in the background
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub object: Option<String>,
    pub translate: Option<bool>,
}

pub async fn root() -> Json<Value> {
    Json(json!({ "message": ROOT_MESSAGE }))
}

pub async fn upload_video(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let uploads_dir = state.config.uploads_dir();
    let mut stored: Option<PathBuf> = None;

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD_NAME) {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let (path, mut file) = create_upload_file(&uploads_dir, filename.as_deref(), content_type.as_deref()).await?;

        let mut written: u64 = 0;
        let copy = async {
            while let Some(chunk) = field.chunk().await? {
                file.write_all(&chunk).await.map_err(|e| ApiError::Internal(e.to_string()))?;
                written += chunk.len() as u64;
            }
            file.flush().await.map_err(|e| ApiError::Internal(e.to_string()))?;
            Ok::<(), ApiError>(())
        };

        if let Err(e) = copy.await {
            discard(&path).await;
            return Err(e);
        }
        if written == 0 {
            discard(&path).await;
            return Err(ApiError::BadRequest("uploaded file is empty".to_string()));
        }

        log::info!("Stored upload {} ({} bytes)", path.display(), written);
        stored = Some(path);
        break;
    }

    let Some(path) = stored else {
        return Err(ApiError::BadRequest(format!("missing multipart field '{}'", UPLOAD_FIELD_NAME)));
    };
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    let db_path = state.config.db_path();
    let interval = state.config.sample_interval_secs;

    if params.wait {
        let analysis = jobs::run_analysis_job_async(
            db_path, state.detector.clone(), interval, path, filename.clone(),
        ).await?;
        return Ok(Json(json!({
            "filename": filename,
            "status": "completed",
            "analysis": analysis.detections,
        })));
    }

    jobs::spawn_analysis_job(db_path, state.detector.clone(), interval, path, filename.clone());
    Ok(Json(json!({
        "filename": filename,
        "status": "processing",
    })))
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchOutcome>, ApiError> {
    let query = params.object.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(ApiError::BadRequest("query parameter 'object' is required".to_string()));
    }

    let translator = match params.translate {
        Some(false) => None,
        _ => state.translator.as_deref(),
    };

    let outcome = search::search(&state.config.db_path(), translator, &query).await?;
    Ok(Json(outcome))
}

/// Open a fresh file for an upload; never overwrites a stored video
async fn create_upload_file(
    uploads_dir: &Path,
    filename: Option<&str>,
    content_type: Option<&str>,
) -> Result<(PathBuf, tokio::fs::File), ApiError> {
    // A concurrent upload can claim the same name between resolve and open
    for _ in 0..3 {
        let path = ingest::upload_target(uploads_dir, filename, content_type)?;
        match tokio::fs::OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(ApiError::Internal(format!("cannot create {}: {}", path.display(), e))),
        }
    }
    Err(ApiError::Internal("could not allocate an upload filename".to_string()))
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        log::warn!("Failed to remove partial upload {}: {}", path.display(), e);
    }
}
