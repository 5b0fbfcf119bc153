mod api;
mod cli;
mod middleware;
mod orchestrator;
mod scheduler;
mod server;
#[cfg(test)]
mod testing;

use std::sync::Arc;

use clap::Parser;
use dinnerbot_gemini::GeminiRecommender;
use dinnerbot_telegram::TelegramNotifier;
use tracing_subscriber::EnvFilter;

use crate::{
    cli::{Cli, InvocationMode},
    orchestrator::Orchestrator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Arc::new(dinnerbot_core::load_app_config()?);
    let level = dinnerbot_core::log_level_directive(&config.log_level);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.unwrap_or("info")))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    if level.is_none() && std::env::var_os("RUST_LOG").is_none() {
        tracing::warn!(
            log_level = %config.log_level,
            "dinnerbot: unrecognised LOG_LEVEL, using info"
        );
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        send_time = %config.send_time_label(),
        timezone = %config.timezone,
        "dinnerbot: daily dinner recommendations"
    );
    tracing::debug!(?config, "dinnerbot: configuration loaded");

    let recommender = GeminiRecommender::new(&config)?;
    let notifier = TelegramNotifier::new(&config);
    let orchestrator = Arc::new(Orchestrator::new(
        Arc::clone(&config),
        recommender,
        notifier,
    ));

    match cli.mode() {
        InvocationMode::OneShot(job) => {
            cli::run_one_shot(&orchestrator, job, &mut std::io::stdout()).await?;
        }
        InvocationMode::Server => {
            let port_override = std::env::var("PORT").ok();
            let port = dinnerbot_core::resolve_port(&config, port_override.as_deref());
            server::serve(orchestrator, port).await?;
        }
    }
    Ok(())
}
