//! GovWatch CLI
//!
//! Command-line interface for the GovWatch alert monitoring engine.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;

use govwatch::channels::{HttpEmailGateway, HttpSmsGateway};
use govwatch::models::ThresholdRule;
use govwatch::monitoring::{Monitor, MonitorSettings, NotificationDispatcher};
use govwatch::providers::HttpMetricsProvider;
use govwatch::Config;

/// GovWatch - Alert monitoring for AI model governance
#[derive(Parser)]
#[command(name = "govwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the periodic monitoring loop
    Serve {
        /// Polling interval in minutes
        #[arg(long, env = "GOVWATCH_POLL_INTERVAL_MINUTES")]
        interval: Option<u32>,
    },

    /// Pull one snapshot and print the conditions it would raise
    Check,

    /// Send an immediate test alert, bypassing the cooldown
    TestAlert {
        /// Email recipient override
        #[arg(long)]
        email: Option<String>,

        /// Phone number override
        #[arg(long)]
        phone: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Serve { interval } => run_serve(config, interval).await,
        Commands::Check => run_check(config).await,
        Commands::TestAlert { email, phone } => run_test_alert(config, email, phone).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn build_monitor(config: &Config) -> anyhow::Result<Monitor> {
    let provider = Arc::new(HttpMetricsProvider::from_config(&config.metrics)?);

    let email = HttpEmailGateway::from_config(&config.notifications)
        .map(|gateway| Arc::new(gateway) as Arc<dyn govwatch::channels::EmailTransport>)
        .map_err(|e| anyhow::anyhow!("email gateway: {e}"))?;
    let sms = HttpSmsGateway::from_config(&config.notifications)
        .map(|gateway| Arc::new(gateway) as Arc<dyn govwatch::channels::SmsTransport>)
        .map_err(|e| anyhow::anyhow!("sms gateway: {e}"))?;

    let dispatcher = NotificationDispatcher::new(
        Some(email),
        Some(sms),
        Duration::from_secs(config.monitor.send_timeout_secs),
    );

    let rules = ThresholdRule::defaults(&config.thresholds);
    let monitor = Monitor::new(
        MonitorSettings::from_config(config),
        rules,
        provider,
        dispatcher,
    )?;

    Ok(monitor)
}

async fn run_serve(config: Config, interval: Option<u32>) -> anyhow::Result<()> {
    let interval = interval.unwrap_or(config.monitor.poll_interval_minutes);
    let monitor = build_monitor(&config)?;

    monitor.start_monitoring(interval)?;
    info!(interval, "GovWatch monitoring started, press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;
    monitor.stop();
    info!("Shutting down");

    Ok(())
}

async fn run_check(config: Config) -> anyhow::Result<()> {
    let monitor = build_monitor(&config)?;
    let (snapshot, conditions) = monitor.evaluate_once().await?;

    println!("Snapshot captured at {}", snapshot.captured_at);
    if conditions.is_empty() {
        println!("All thresholds healthy");
        return Ok(());
    }

    for condition in conditions {
        println!(
            "[{}] {}: {}",
            condition.severity.label(),
            condition.key,
            condition.message
        );
    }

    Ok(())
}

async fn run_test_alert(
    config: Config,
    email: Option<String>,
    phone: Option<String>,
) -> anyhow::Result<()> {
    let monitor = build_monitor(&config)?;
    let report = monitor.send_test_alert(email, phone).await;

    for result in &report.results {
        match &result.error {
            None => println!("{}: delivered", result.channel.name()),
            Some(error) => println!("{}: failed ({error})", result.channel.name()),
        }
    }

    if let Some(error) = report.error {
        anyhow::bail!(error);
    }
    if !report.success {
        anyhow::bail!("test alert failed on every channel");
    }

    println!("Test alert delivered");
    Ok(())
}
