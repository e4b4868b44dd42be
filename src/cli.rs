// vidsearch CLI binary

use std::path::{Path, PathBuf};
use std::sync::Arc;
use clap::{Parser, Subcommand};
use anyhow::{Context, Result};

use vidsearch_lib::analysis;
use vidsearch_lib::api;
use vidsearch_lib::config::Config;
use vidsearch_lib::constants::CONFIG_FILENAME;
use vidsearch_lib::db::{self, schema};
use vidsearch_lib::detector::{self, Detector};
use vidsearch_lib::search;
use vidsearch_lib::translate::{GoogleTranslator, Translator};

#[derive(Parser)]
#[command(name = "vidsearch")]
#[command(about = "Index the objects in videos and search them by name", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON config file (defaults to <data-dir>/vidsearch.json when present)
    #[arg(long, global = true, env = "VIDSEARCH_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the database and uploads
    #[arg(long, global = true, env = "VIDSEARCH_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// ONNX detection model
    #[arg(long, global = true, env = "VIDSEARCH_MODEL")]
    model: Option<PathBuf>,

    /// Seconds between sampled frames
    #[arg(long, global = true, env = "VIDSEARCH_INTERVAL")]
    interval: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API (needs a build with `--features onnx-detector`)
    Serve {
        /// Address to listen on
        #[arg(long, env = "VIDSEARCH_BIND")]
        bind: Option<std::net::SocketAddr>,
    },

    /// Analyze a local video and print its detections (needs a build with `--features onnx-detector`)
    Analyze {
        /// Video file
        video: PathBuf,
        /// Print only, do not store in the database
        #[arg(long)]
        no_save: bool,
    },

    /// Search stored detections by object name
    Search {
        /// Object name, in any language
        term: String,
        /// Look the term up as typed
        #[arg(long)]
        no_translate: bool,
    },

    /// Create the data directory and database
    Init,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = load_config(&cli)?;

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.bind = bind;
            }
            cmd_serve(config)
        }
        Commands::Analyze { video, no_save } => cmd_analyze(config, &video, no_save),
        Commands::Search { term, no_translate } => cmd_search(config, &term, no_translate),
        Commands::Init => cmd_init(config),
    }
}

/// Config file first, then flag overrides
fn load_config(cli: &Cli) -> Result<Config> {
    let implicit = cli
        .data_dir
        .as_deref()
        .unwrap_or(Path::new("."))
        .join(CONFIG_FILENAME);

    let path = match &cli.config {
        Some(path) => Some(path.clone()),
        None if implicit.exists() => Some(implicit),
        None => None,
    };

    let mut config = Config::load(path.as_deref())
        .with_context(|| format!("failed to load config{}", path.map(|p| format!(" from {}", p.display())).unwrap_or_default()))?;

    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(model) = &cli.model {
        config.model_path = model.clone();
    }
    if let Some(interval) = cli.interval {
        config.sample_interval_secs = interval;
    }
    config.validate()?;

    Ok(config)
}

fn build_translator(config: &Config) -> Result<Option<Arc<dyn Translator>>> {
    if !config.translate {
        return Ok(None);
    }
    let translator = GoogleTranslator::from_config(config)?;
    Ok(Some(Arc::new(translator)))
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

fn cmd_serve(config: Config) -> Result<()> {
    let detector: Arc<dyn Detector> = Arc::from(detector::load_detector(&config)?);
    let translator = build_translator(&config)?;

    runtime()?.block_on(api::serve(config, detector, translator))?;
    Ok(())
}

fn cmd_analyze(config: Config, video: &Path, no_save: bool) -> Result<()> {
    let detector = detector::load_detector(&config)?;
    let analysis = analysis::analyze_video(video, detector.as_ref(), config.sample_interval_secs)?;

    if !no_save {
        let db_path = db::init_data_dir(&config.data_dir)?;
        let conn = db::open_db(&db_path)?;
        let name = video.file_name().map(|n| n.to_string_lossy().to_string());
        let stored = schema::insert_detections(&conn, name.as_deref(), &analysis.detections)?;
        log::info!("Stored {} detections in {}", stored, db_path.display());
    }

    println!("{}", serde_json::to_string_pretty(&analysis.detections)?);
    Ok(())
}

fn cmd_search(config: Config, term: &str, no_translate: bool) -> Result<()> {
    let db_path = config.db_path();
    if !db_path.exists() {
        anyhow::bail!("No database at {}. Run 'vidsearch init' or analyze a video first.", db_path.display());
    }

    let translator = if no_translate { None } else { build_translator(&config)? };

    let outcome = runtime()?.block_on(search::search(&db_path, translator.as_deref(), term))?;

    if outcome.results.is_empty() {
        println!("No matches for '{}'", outcome.term);
        return Ok(());
    }

    println!("{:>8}  {:<20}  {}", "Time", "Object", "Video");
    for row in &outcome.results {
        println!(
            "{:>8.2}  {:<20}  {}",
            row.time,
            row.object,
            row.video.as_deref().unwrap_or("-")
        );
    }
    println!();
    println!("{} matches for '{}'", outcome.results.len(), outcome.term);

    Ok(())
}

fn cmd_init(config: Config) -> Result<()> {
    let db_path = db::init_data_dir(&config.data_dir)?;

    println!("Initialized vidsearch data at {}", config.data_dir.display());
    println!("  {}  - Database", db_path.display());
    println!("  {}  - Uploaded videos", config.uploads_dir().display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_detector_commands_mention_feature() {
        let cmd = Cli::command();
        for name in ["serve", "analyze"] {
            let about = cmd
                .find_subcommand(name)
                .and_then(|c| c.get_about())
                .map(|a| a.to_string())
                .unwrap_or_default();
            assert!(about.contains("onnx-detector"), "{name}: {about}");
        }
        let search_about = cmd.find_subcommand("search").and_then(|c| c.get_about()).unwrap().to_string();
        assert!(!search_about.contains("onnx-detector"));
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "vidsearch", "--interval", "0.5", "--model", "m.onnx", "search", "dog",
        ]).unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.sample_interval_secs, 0.5);
        assert_eq!(config.model_path, PathBuf::from("m.onnx"));
    }
}
