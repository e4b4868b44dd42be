// Label search over stored detections

use std::path::{Path, PathBuf};
use serde::Serialize;

use crate::db::{self, schema::{self, DetectionRow}};
use crate::error::{Result, VidSearchError};
use crate::translate::{self, Translator};

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    /// What the caller typed
    pub query: String,
    /// The label actually looked up after translation and normalization
    pub term: String,
    pub results: Vec<DetectionRow>,
}

/// Exact-match lookup of an already normalized term
pub fn lookup(db_path: &Path, term: &str) -> Result<Vec<DetectionRow>> {
    let conn = db::open_db(db_path)?;
    schema::find_detections(&conn, term)
}

/// Translate (when a translator is given), normalize and look up a query
pub async fn search(db_path: &Path, translator: Option<&dyn Translator>, query: &str) -> Result<SearchOutcome> {
    if query.trim().is_empty() {
        return Err(VidSearchError::InvalidInput("search term must not be empty".to_string()));
    }

    let term = translate::to_index_term(translator, query).await;

    let db_path: PathBuf = db_path.to_path_buf();
    let lookup_term = term.clone();
    let results = tokio::task::spawn_blocking(move || lookup(&db_path, &lookup_term))
        .await
        .map_err(|e| VidSearchError::Other(format!("search task failed: {}", e)))??;

    log::debug!("Search '{}' -> '{}': {} hits", query, term, results.len());

    Ok(SearchOutcome {
        query: query.to_string(),
        term,
        results,
    })
}
