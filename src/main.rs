//! subtrans - context-aware SRT subtitle translation
//!
//! Entry point for the command line tool and the HTTP service.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::{Level, error, info, warn};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use subtrans::cli::{Args, Commands};
use subtrans::config::Config;
use subtrans::job::JobStatus;
use subtrans::server;
use subtrans::workflow::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load config.toml from current directory first
            if Path::new("config.toml").exists() {
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };
    config.apply_env_overrides()?;

    // Setup logging to both console and file
    setup_logging(args.verbose, &config.logging.log_dir)?;

    info!("Starting subtrans - context-aware subtitle translation");

    match args.command {
        Commands::Translate {
            input,
            output,
            source,
            target,
        } => {
            info!("Translating {} ({} -> {})", input.display(), source, target);

            let workflow = Workflow::new(&config)?;
            let job = workflow.translate_file(&input, &output, &source, &target).await?;

            println!("{}", serde_json::to_string_pretty(&job.stats.report())?);

            match job.status {
                JobStatus::Success => info!("Translated subtitles written to {}", output.display()),
                JobStatus::Partial => warn!(
                    "Partially translated subtitles written to {} ({} sentences untranslated)",
                    output.display(),
                    job.stats.failed_sentences
                ),
                JobStatus::Failure => {
                    let reason = job.error.unwrap_or_else(|| "Translation failed".to_string());
                    error!("Translation failed: {}", reason);
                    anyhow::bail!("Translation failed: {}", reason);
                }
            }
        }
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let workflow = Arc::new(Workflow::new(&config)?);
            server::serve(workflow, &bind).await?;
        }
        Commands::Check => {
            let workflow = Workflow::new(&config)?;
            let mut all_healthy = true;

            println!("{:<10} {:<10} {:<10}", "Role", "Backend", "Status");
            println!("{}", "-".repeat(30));
            for (role, (backend, healthy)) in ["primary", "fallback"].iter().zip(workflow.health_check().await) {
                println!("{:<10} {:<10} {:<10}", role, backend, if healthy { "OK" } else { "UNAVAILABLE" });
                all_healthy &= healthy;
            }

            if !all_healthy {
                warn!("At least one translation backend is unavailable");
            }
        }
        Commands::Init { output } => {
            if output.exists() {
                anyhow::bail!("{} already exists", output.display());
            }
            Config::default().save_to_file(&output)?;
            info!("Default configuration written to {}", output.display());
        }
    }

    Ok(())
}

fn setup_logging(verbose: bool, log_dir: &str) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(log_dir);
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "subtrans.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("subtrans.log").display());

    Ok(())
}
