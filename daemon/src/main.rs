//! presence: command-line entry point for attendance presence verification.

mod config;
mod request;

use anyhow::Context;
use clap::Parser;
use config::PresenceConfig;
use presence_services::{ChatCompletionsExtractor, IpApiClient, IpGeolocator, RemoteFaceMatcher};
use presence_store::MemoryBeaconRegistry;
use presence_utils::{init_logging, LogFormat};
use presence_verification::{DocumentExtractor, ThresholdMode, VerificationPipeline};
use request::RequestFile;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "presence", about = "Multi-signal attendance presence verification")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "PRESENCE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "PRESENCE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "PRESENCE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Base URL of the face matching service.
    #[arg(long, env = "PRESENCE_FACE_MATCH_URL")]
    face_match_url: Option<String>,

    /// Identity strictness: "strict", "normal", "lenient", "very_lenient".
    #[arg(long, env = "PRESENCE_THRESHOLD_MODE")]
    threshold_mode: Option<ThresholdMode>,

    /// API key for the document extraction endpoint. Never read from the config file.
    #[arg(long, env = "PRESENCE_EXTRACTION_API_KEY", hide_env_values = true)]
    extraction_api_key: Option<String>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Verify one attendance claim and print the verdict as JSON.
    Verify {
        /// JSON request file: a verification request plus an optional `beacon`.
        #[arg(long)]
        request: PathBuf,
    },
    /// Print this host's approximate location, looked up by public IP.
    Locate,
    /// Read the identity fields off a document image.
    Extract {
        #[arg(long)]
        image: PathBuf,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PresenceConfig::from_toml_file(path)?,
        None => PresenceConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Some(url) = cli.face_match_url {
        config.face_match_url = Some(url);
    }
    if let Some(mode) = cli.threshold_mode {
        config.threshold_mode = mode;
    }

    init_logging(config.log_format, &config.log_level)?;
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    match cli.command {
        Command::Verify { request } => verify(&config, cli.extraction_api_key, &request).await,
        Command::Locate => locate(&config).await,
        Command::Extract { image } => extract(&config, cli.extraction_api_key, &image).await,
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

async fn verify(
    config: &PresenceConfig,
    api_key: Option<String>,
    request_path: &Path,
) -> anyhow::Result<()> {
    let file = RequestFile::from_json_file(request_path)?;

    let registry = Arc::new(MemoryBeaconRegistry::new());
    file.apply_beacon(registry.as_ref(), config.default_rssi_threshold)
        .context("failed to register beacon")?;

    let face_matcher = Arc::new(RemoteFaceMatcher::with_timeout(
        config.face_match_url.clone(),
        config.http_timeout(),
    ));
    if !face_matcher.is_configured() {
        tracing::warn!("no face_match_url configured, identity stage cannot verify");
    }

    let mut pipeline = VerificationPipeline::new(config.pipeline_config(), registry, face_matcher);
    let document_extractor = extractor(config, api_key);
    if document_extractor.is_configured() {
        pipeline = pipeline.with_extractor(Arc::new(document_extractor));
    }

    let verdict = pipeline.verify(&file.request).await;
    print_json(&verdict)
}

async fn locate(config: &PresenceConfig) -> anyhow::Result<()> {
    let client = IpApiClient::with_timeout(config.geolocation_url.clone(), config.http_timeout());
    let location = client.locate().await?;
    print_json(&location)
}

async fn extract(
    config: &PresenceConfig,
    api_key: Option<String>,
    image: &Path,
) -> anyhow::Result<()> {
    let fields = extractor(config, api_key).extract(image).await?;
    print_json(&fields)
}

fn extractor(config: &PresenceConfig, api_key: Option<String>) -> ChatCompletionsExtractor {
    ChatCompletionsExtractor::with_timeout(
        config.extraction_url.clone(),
        config.extraction_model.clone(),
        api_key,
        config.http_timeout(),
    )
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
