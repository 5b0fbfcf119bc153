//! Invocation mode parsing and one-shot runs.

use std::io::Write;

use clap::Parser;
use dinnerbot_core::{Notifier, Recommender};

use crate::orchestrator::Orchestrator;

#[derive(Debug, Parser)]
#[command(name = "dinnerbot")]
#[command(version, about = "Daily dinner recommendation bot")]
pub struct Cli {
    /// Send one recommendation now and exit.
    #[arg(long)]
    test: bool,

    /// Send one recommendation built from LEFTOVER_INGREDIENTS and exit.
    #[arg(long)]
    leftover: bool,

    /// Bare `test` / `leftover` words, equivalent to the flags.
    #[arg(value_parser = ["test", "leftover"], hide = true)]
    words: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneShotJob {
    Test,
    Leftover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationMode {
    Server,
    OneShot(OneShotJob),
}

impl Cli {
    /// `test` wins over `leftover` when both are given.
    pub fn mode(&self) -> InvocationMode {
        let has = |word: &str| self.words.iter().any(|w| w == word);
        if self.test || has("test") {
            InvocationMode::OneShot(OneShotJob::Test)
        } else if self.leftover || has("leftover") {
            InvocationMode::OneShot(OneShotJob::Leftover)
        } else {
            InvocationMode::Server
        }
    }
}

/// Run `job` once without the scheduler, write a result line to `out`, and
/// release the notifier. Returns whether the recommendation was delivered.
///
/// # Errors
///
/// Returns an error only if writing the result line fails.
pub async fn run_one_shot<R, N, W>(
    orchestrator: &Orchestrator<R, N>,
    job: OneShotJob,
    out: &mut W,
) -> anyhow::Result<bool>
where
    R: Recommender,
    N: Notifier,
    W: Write,
{
    let delivered = match orchestrator.start_notifier().await {
        Ok(()) => match job {
            OneShotJob::Test => {
                tracing::info!("cli: test mode, sending a recommendation now");
                orchestrator.run_test_job().await
            }
            OneShotJob::Leftover => {
                tracing::info!("cli: leftover mode, sending a leftover recommendation now");
                orchestrator.run_configured_leftover_job().await
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "cli: could not open notification channel");
            false
        }
    };

    let label = match job {
        OneShotJob::Test => "test result",
        OneShotJob::Leftover => "leftover result",
    };
    let verdict = if delivered {
        "[OK] success"
    } else {
        "[FAIL] failure"
    };
    let written = writeln!(out, "\n{label}: {verdict}");

    orchestrator.stop().await;
    written?;
    Ok(delivered)
}
