//! Editor Uploadr - upload backend for rich-text editors
//!
//! Stores a local file, a base64 payload, or a remote image according to
//! the configured upload policy and prints the editor response as JSON.

use anyhow::Context;
use clap::{Parser, Subcommand};
use editor_uploadr::config::Config;
use editor_uploadr::upload::{IncomingFile, UploadHandler, UploadState, Uploader};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// Editor Uploadr - store editor uploads under a templated path
#[derive(Parser, Debug)]
#[command(name = "editor-uploadr")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long, value_parser = ["trace", "debug", "info", "warn", "error"])]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a local file as if it came from a multipart form
    File {
        /// File to upload
        path: PathBuf,
    },
    /// Upload a base64-encoded image
    Base64 {
        /// Original file name (its extension is validated)
        #[arg(short, long)]
        name: String,

        /// Base64 payload
        #[arg(long, conflicts_with = "data_file", required_unless_present = "data_file")]
        data: Option<String>,

        /// File containing the base64 payload
        #[arg(long)]
        data_file: Option<PathBuf>,
    },
    /// Fetch and store a remote image
    Remote {
        /// http(s) URL of the image
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("Failed to load configuration from {:?}", args.config))?;
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    editor_uploadr::logging::init(&config.logging)?;
    info!("Starting Editor Uploadr v{}", editor_uploadr::VERSION);

    let uploader = Uploader::new(config.uploader)?.with_metrics(config.metrics.enabled);

    let outcome = match args.command {
        Command::File { path } => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("Failed to open {:?}", path))?;
            let size = file.metadata().await?.len();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            uploader
                .upload_file(Some(IncomingFile::new(file, size, name)))
                .await
        }
        Command::Base64 {
            name,
            data,
            data_file,
        } => {
            let payload = match (data, data_file) {
                (Some(data), _) => data,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read {:?}", path))?,
                (None, None) => anyhow::bail!("either --data or --data-file is required"),
            };
            uploader.upload_base64(&name, payload.trim()).await
        }
        Command::Remote { url } => uploader.save_remote(&url).await,
    };

    let state = UploadState::from_outcome(&outcome);
    println!("{}", serde_json::to_string(&state)?);

    Ok(if state.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
