//! gamescout CLI — presentation glue around the recommendation pipeline.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gamescout::cache::FileCache;
use gamescout::config::{FetchStrategy, OwnershipFilter, PipelineConfig, PromptVariant};
use gamescout::pipeline::{Pipeline, PipelineParams};
use gamescout::progress::LogProgress;
use gamescout::recommend::PromptParams;

#[derive(Parser, Debug)]
#[command(name = "gamescout", version, about = "Board-game recommendations from your collection")]
struct Cli {
    /// Collection user id to fetch games for
    #[arg(short, long)]
    user: String,

    /// Completion API key (falls back to OPENAI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Completion model override
    #[arg(short, long)]
    model: Option<String>,

    /// Free-text focus for the recommendations
    #[arg(short, long, default_value = "")]
    focus: String,

    /// Player count (simple variant only)
    #[arg(short, long)]
    players: Option<u32>,

    /// Recommend games the user does not own yet
    #[arg(long)]
    unowned: bool,

    /// Serve a stored collection when present instead of always fetching
    #[arg(long)]
    cached: bool,

    /// Use the compact prompt variant (1-4 suggestions, no retry)
    #[arg(long)]
    simple: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let credential = match cli.api_key {
        Some(key) => key,
        None => std::env::var("OPENAI_API_KEY")
            .context("no API key: pass --api-key or set OPENAI_API_KEY")?,
    };

    let mut config = if cli.simple {
        PipelineConfig::simple()
    } else {
        PipelineConfig::default()
    };
    if cli.unowned {
        config.ownership = OwnershipFilter::Unowned;
    }
    if cli.cached {
        config.strategy = FetchStrategy::Cached;
    }

    let params = PipelineParams {
        user_id: cli.user,
        credential,
        model: cli.model,
        prompt: PromptParams {
            focus: cli.focus,
            players: cli.players.filter(|_| config.variant == PromptVariant::Simple),
        },
    };

    let cache = Arc::new(FileCache::open_default());
    let pipeline = Pipeline::new(cache, config);
    let rendered = pipeline.run(&params, &LogProgress).await?;
    println!("{rendered}");

    Ok(())
}
