//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Honeylens -- honeypot log analysis.
///
/// Use `honeylens <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "honeylens", version, about, long_about = None)]
pub struct Cli {
    /// Path to the honeylens.toml configuration file (defaults apply if missing).
    #[arg(short, long, global = true, default_value = "honeylens.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse, label, classify and aggregate honeypot log files.
    Analyze(AnalyzeArgs),

    /// Inspect and test label rule sets.
    Rules(RulesArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- analyze ----

/// Run the full analysis over one or more log files.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Log files to analyze, processed in the given order.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Vectorizer artifact (overrides `artifacts.vectorizer_path`).
    #[arg(long)]
    pub vectorizer: Option<PathBuf>,

    /// Classifier artifact (overrides `artifacts.model_path`).
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// YAML label rule set (overrides `analysis.rules_path`).
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Also print every labeled record.
    #[arg(long)]
    pub records: bool,
}

// ---- rules ----

/// Inspect and test label rule sets.
#[derive(Args, Debug)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub action: RulesAction,
}

#[derive(Subcommand, Debug)]
pub enum RulesAction {
    /// List the effective label cascade in priority order.
    List {
        /// YAML rule set (default: `analysis.rules_path`, then the built-in cascade).
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// Validate a YAML rule set file.
    Check {
        /// Rule set file to validate.
        path: PathBuf,
    },
    /// Label one ad-hoc record and show which rule matched.
    Label {
        /// Service token (e.g. `httpd`).
        #[arg(long)]
        service: String,

        /// Message text (e.g. `/dionaea/login?id=1`).
        #[arg(long)]
        message: String,

        /// YAML rule set (default: `analysis.rules_path`, then the built-in cascade).
        #[arg(long)]
        rules: Option<PathBuf>,
    },
}

// ---- config ----

/// Manage honeylens configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, analysis, artifacts).
        #[arg(long)]
        section: Option<String>,
    },
}
