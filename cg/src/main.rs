//! Calgen - content calendar generator
//!
//! CLI entry point: decode captured replies or call the LLM service and
//! decode what it returns.

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use calgen::cli::{Cli, Command, OutputFormat};
use calgen::config::Config;
use calgen::decoder::{decode_schedule_with_report, DecodeContext, DecodeReport};
use calgen::generator::{generate_schedule, GenerateRequest};
use calgen::llm::create_client;
use calgen::schedule::Schedule;

fn setup_logging(cli_log_level: Option<&str>) -> Result<()> {
    let level = match cli_log_level.map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    // A one-shot CLI logs to stderr; stdout is reserved for the calendar
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Decode {
            input,
            project,
            period_start,
            format,
        } => cmd_decode(input, &project, period_start, &format),
        Command::Generate {
            project,
            period_start,
            weeks,
            format,
        } => cmd_generate(cli.config.as_ref(), &project, period_start, weeks, &format).await,
    }
}

fn cmd_decode(
    input: Option<PathBuf>,
    project: &str,
    period_start: Option<String>,
    format: &OutputFormat,
) -> Result<()> {
    let raw = match &input {
        Some(path) => std::fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let ctx = DecodeContext::new(project, period_start.unwrap_or_else(today));
    let (schedule, report) = decode_schedule_with_report(&raw, &ctx);

    print_schedule(&schedule, &report, format)
}

async fn cmd_generate(
    config_path: Option<&PathBuf>,
    project: &str,
    period_start: Option<String>,
    weeks: Option<u32>,
    format: &OutputFormat,
) -> Result<()> {
    let config = Config::load(config_path).context("Failed to load configuration")?;
    config.validate()?;

    let llm = create_client(&config.llm).context("Failed to create LLM client")?;

    let start = period_start.unwrap_or_else(today);
    let end = period_end(&start, weeks.unwrap_or(config.generation.period_weeks))?;

    let request = GenerateRequest {
        project_name: project.to_string(),
        period_start: start,
        period_end: end,
        platforms: config.generation.platforms.clone(),
        posts_per_week: config.generation.posts_per_week,
    };

    let (schedule, report) = match generate_schedule(&llm, &request).await {
        Ok(result) => result,
        Err(e) => return Err(eyre::eyre!("Calendar generation failed ({}): {}", e.category(), e)),
    };

    print_schedule(&schedule, &report, format)
}

fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

fn period_end(start: &str, weeks: u32) -> Result<String> {
    let start_date = chrono::NaiveDate::parse_from_str(start, "%Y-%m-%d")
        .context(format!("Invalid period start date: {start}"))?;
    let end = start_date
        .checked_add_days(chrono::Days::new((u64::from(weeks) * 7).saturating_sub(1)))
        .ok_or_else(|| eyre::eyre!("Period end out of range"))?;
    Ok(end.format("%Y-%m-%d").to_string())
}

fn print_schedule(schedule: &Schedule, report: &DecodeReport, format: &OutputFormat) -> Result<()> {
    info!(
        strategy = report.winner.name(),
        degraded = report.degraded,
        entries = schedule.entries.len(),
        "decode finished"
    );

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(schedule).context("Failed to serialize schedule")?;
            println!("{json}");
        }
        OutputFormat::Text => {
            println!("{}", schedule.name.bold());
            if report.degraded {
                println!("{}", "(respuesta ilegible: calendario de relleno)".yellow());
            }
            for entry in &schedule.entries {
                println!(
                    "  {} {}  {:<10} {}",
                    entry.post_date.green(),
                    entry.post_time.dimmed(),
                    entry.platform.cyan(),
                    entry.title
                );
                if !entry.description.is_empty() {
                    println!("      {}", entry.description.dimmed());
                }
                if !entry.hashtags.is_empty() {
                    println!("      {}", entry.hashtags.blue());
                }
            }
        }
    }
    Ok(())
}
