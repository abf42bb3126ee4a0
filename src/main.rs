//! tunedrop - scheduled audio delivery to a Telegram channel
//!
//! One invocation performs one run: scan the watched directory, deliver every
//! file not yet in the delivery record, and exit. Partial success is a
//! successful run; only configuration or delivery-record faults abort.

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tunedrop::config::Config;
use tunedrop::pipeline::Pipeline;
use tunedrop::services::caption_generator::OpenAiCaptioner;
use tunedrop::services::telegram_client::TelegramClient;
use tunedrop::services::uploader::Uploader;
use tunedrop::types::CaptionSource;
use tunedrop::{cli, db};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = cli::Args::parse();
    let config = Config::resolve(&args)?;

    info!("Starting tunedrop v{}", env!("CARGO_PKG_VERSION"));
    info!("Music directory: {}", config.music_dir.display());
    info!("Database: {}", config.database_path.display());

    let db_pool = db::init_database_pool(&config.database_path).await?;

    let transport = TelegramClient::new(&config.telegram)?;
    let captioner: Option<Box<dyn CaptionSource>> = match &config.caption {
        Some(caption_config) => Some(Box::new(OpenAiCaptioner::new(caption_config)?)),
        None => None,
    };
    let uploader = Uploader::new(Box::new(transport), config.retry.clone());

    let pipeline = Pipeline::new(
        db_pool,
        config.music_dir.clone(),
        uploader,
        captioner,
        config.tag_line.clone(),
    );

    let summary = pipeline.run().await?;

    // Failed items are left for the next scheduled invocation
    info!(
        discovered = summary.discovered,
        delivered = summary.delivered,
        skipped_duplicates = summary.skipped_duplicates,
        failed = summary.failed,
        "tunedrop finished"
    );

    Ok(())
}
