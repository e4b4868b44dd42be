// vidsearch error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VidSearchError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("FFprobe error: {0}")]
    FFprobe(String),

    #[error("FFmpeg error: {0}")]
    FFmpeg(String),

    #[error("Detector error: {0}")]
    Detector(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for VidSearchError {
    fn from(err: anyhow::Error) -> Self {
        VidSearchError::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, VidSearchError>;
