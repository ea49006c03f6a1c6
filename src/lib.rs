//! SheetChat - chat client for a spreadsheet data assistant
//!
//! This library provides the client side of a financial data assistant:
//! users upload Excel workbooks to a backend service and ask questions about
//! them in natural language, getting text or chart answers back.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `api`: Backend abstraction, HTTP client, and the explicit session context
//! - `upload`: File-type validation and the upload widget
//! - `chat`: Transcript, chat window orchestration, and terminal rendering
//! - `commands`: Handlers for the CLI subcommands
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sheetchat::{ApiClient, ChatWindow, Config};
//! use sheetchat::upload::FileBlob;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let backend = Arc::new(ApiClient::new(&config.api)?);
//!     let mut window = ChatWindow::new(backend, &config.chat.welcome_message);
//!     window
//!         .upload(vec![FileBlob::from_path("Q1.xlsx".as_ref()).await?])
//!         .await;
//!     window.submit("What was total revenue?").await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod upload;

// Re-export commonly used types
pub use api::{ApiClient, Backend, SessionContext};
pub use chat::{ChatPhase, ChatWindow};
pub use config::Config;
pub use error::{Result, SheetchatError};

#[cfg(test)]
pub mod test_utils;
