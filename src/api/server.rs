// HTTP server lifecycle

use std::sync::Arc;

use super::{build_router, AppState};
use crate::config::Config;
use crate::db;
use crate::detector::Detector;
use crate::error::Result;
use crate::metadata::ffprobe;
use crate::tools;
use crate::translate::Translator;

/// Prepare the data directory, bind and serve until Ctrl-C
pub async fn serve(
    config: Config,
    detector: Arc<dyn Detector>,
    translator: Option<Arc<dyn Translator>>,
) -> Result<()> {
    let db_path = db::init_data_dir(&config.data_dir)?;
    log::info!("Database ready at {}", db_path.display());

    if !ffprobe::is_available() {
        log::warn!("ffprobe not found; uploads cannot be analyzed");
    }
    if !tools::is_tool_available("ffmpeg") {
        log::warn!("ffmpeg not found; uploads cannot be analyzed");
    }
    if translator.is_none() {
        log::info!("Query translation disabled");
    }

    let bind = config.bind;
    let state = AppState {
        config: Arc::new(config),
        detector,
        translator,
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        // Without a signal handler, run until the process is killed
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown requested");
}
