//! Command-line interface definition for SheetChat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, one-shot questions, and
//! session creation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SheetChat - ask questions about your spreadsheets
///
/// Upload Excel workbooks to a financial data assistant and get text or
/// chart answers back.
#[derive(Parser, Debug, Clone)]
#[command(name = "sheetchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Backend base URL (overrides config and SHEETCHAT_API_URL)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Directory chart payloads are written to
    #[arg(long)]
    pub charts_dir: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for SheetChat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat
    Chat {
        /// Spreadsheets to upload before the first prompt
        #[arg(short, long = "upload", num_args = 1..)]
        upload: Vec<PathBuf>,

        /// Write chart payloads to the default data directory when no
        /// charts directory is configured
        #[arg(long)]
        export_charts: bool,
    },

    /// Upload spreadsheets and ask a single question
    Ask {
        /// Spreadsheet to upload before asking (repeat for several)
        #[arg(short, long = "file", required = true)]
        files: Vec<PathBuf>,

        /// The question to ask
        question: String,
    },

    /// Create a backend session and print its id
    Session,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
