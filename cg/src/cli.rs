//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// Calgen - content calendar generator
#[derive(Parser)]
#[command(
    name = "cg",
    about = "Generate social-media content calendars from LLM replies, however broken",
    version = env!("GIT_DESCRIBE"),
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decode a captured model reply into a calendar
    Decode {
        /// File with the raw reply text (stdin when omitted)
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        /// Project name used for default-filling
        #[arg(short, long, default_value = "proyecto")]
        project: String,

        /// Period start date (YYYY-MM-DD), defaults to today
        #[arg(long = "period-start")]
        period_start: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Call the LLM service and decode its reply
    Generate {
        /// Project name
        #[arg(short, long)]
        project: String,

        /// Period start date (YYYY-MM-DD), defaults to today
        #[arg(long = "period-start")]
        period_start: Option<String>,

        /// Period length in weeks (config default when omitted)
        #[arg(short, long)]
        weeks: Option<u32>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Output format for decoded calendars
#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}
