// vidsearch - index the objects in uploaded videos and search them by name

pub mod constants;
pub mod error;
pub mod tools;
pub mod config;
pub mod db;
pub mod metadata;
pub mod ingest;
pub mod detector;
pub mod analysis;
pub mod translate;
pub mod search;
pub mod jobs;
pub mod api;

pub use config::Config;
pub use error::{Result, VidSearchError};
