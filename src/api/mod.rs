// HTTP API module

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;

use std::sync::Arc;

use crate::config::Config;
use crate::detector::Detector;
use crate::translate::Translator;

pub use router::build_router;
pub use server::serve;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub detector: Arc<dyn Detector>,
    /// None disables query translation
    pub translator: Option<Arc<dyn Translator>>,
}
