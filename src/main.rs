//! GuardianAI - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use guardian::{
    bootstrap,
    cli::{Args, Commands, Verbosity},
    config::Config,
    doctor::{Doctor, HealthStatus},
    service::ComplianceService,
    telemetry,
    types::{ComplianceQuery, ComplianceReport},
};

fn main() -> Result<()> {
    let args = Args::parse();
    let verbosity = args.verbosity();
    telemetry::init_logging(verbosity.log_level());

    let config_path = args.config.as_deref();

    match args.command {
        Commands::Config { init: true } => init_config(config_path),
        Commands::Config { init: false } => {
            let config = Config::read(config_path).context("Failed to read configuration")?;
            show_config(&config)
        }
        Commands::Doctor => {
            let config = Config::read(config_path).context("Failed to read configuration")?;
            let runtime = bootstrap::build_runtime(&config)?;
            runtime.block_on(run_doctor(config))
        }
        Commands::Ask {
            text,
            user,
            json,
            deadline_secs,
        } => {
            let config = Config::load_from(config_path).context("Invalid configuration")?;
            let runtime = bootstrap::build_runtime(&config)?;
            let query = ComplianceQuery { text, user_id: user };
            runtime.block_on(run_ask(
                config,
                query,
                json,
                deadline_secs.map(Duration::from_secs),
                verbosity,
            ))
        }
    }
}

/// Run a single compliance check
async fn run_ask(
    config: Config,
    query: ComplianceQuery,
    json: bool,
    deadline: Option<Duration>,
    verbosity: Verbosity,
) -> Result<()> {
    let pipeline = bootstrap::build_pipeline(&config).await?;
    let mut service = ComplianceService::new(Arc::new(pipeline));
    if let Some(deadline) = deadline {
        service = service.with_deadline(deadline);
    }

    let spinner = if verbosity.show_progress() && !json {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .context("Invalid spinner template")?,
        );
        pb.set_message("Analizando consulta...");
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let outcome = service.check_compliance(query).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    match outcome {
        Ok(report) if json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(failure) => {
            eprintln!("{} {}", "✗".red().bold(), failure);
            std::process::exit(if failure.is_client_error() { 2 } else { 1 });
        }
    }
}

fn print_report(report: &ComplianceReport) {
    println!("{}", "Análisis".bold().underline());
    println!("{}\n", report.analysis);

    println!("{}", "Fuentes".bold().underline());
    for (idx, source) in report.sources.iter().enumerate() {
        println!(
            "  {}. {} (Artículo {})",
            idx + 1,
            source.source_document.cyan(),
            source.article_number
        );
    }

    let usage = &report.token_usage;
    println!(
        "\n{} prompt={} completion={} total={}",
        "Tokens:".dimmed(),
        usage.prompt_tokens,
        usage.completion_tokens,
        usage.total_tokens
    );
    println!("{} {}", "Trace ID:".dimmed(), report.trace_id);
}

/// Run diagnostics
async fn run_doctor(config: Config) -> Result<()> {
    println!("{}", "GuardianAI diagnostics".bold());
    let checks = Doctor::new(config).run_diagnostics().await;

    for check in &checks {
        match &check.status {
            HealthStatus::Pass => println!("  {} {}", "✓".green(), check.name),
            HealthStatus::Warn(msg) => println!("  {} {}: {}", "!".yellow(), check.name, msg),
            HealthStatus::Fail(msg) => println!("  {} {}: {}", "✗".red(), check.name, msg),
        }
    }

    if Doctor::all_passed(&checks) {
        println!("\n{}", "All checks passed".green());
        Ok(())
    } else {
        anyhow::bail!("one or more health checks failed")
    }
}

/// Write a default config file
fn init_config(path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => Config::config_path()?,
    };
    if Config::write_default(&path)? {
        println!("{} Wrote default configuration to {}", "✓".green(), path.display());
    } else {
        println!("{} {} already exists; left unchanged", "!".yellow(), path.display());
    }
    Ok(())
}

/// Display configuration
fn show_config(config: &Config) -> Result<()> {
    let rendered = toml::to_string_pretty(&config.redacted()).context("Failed to render configuration")?;
    println!("{}", rendered);
    Ok(())
}
