/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `chat`:    Interactive chat over uploaded spreadsheets
- `ask`:     Upload spreadsheets and ask a single question
- `session`: Create a backend session and print its id

Every handler builds an [`ApiClient`] from the configuration and drives a
[`ChatWindow`] (or the backend directly) with it.
*/

use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;

use crate::api::{ApiClient, Backend};
use crate::chat::{ChartExporter, ChatWindow, EntryKind, MessageList};
use crate::config::{default_charts_dir, Config};
use crate::error::Result;
use crate::upload::load_files;

// Special commands parser for the interactive loop
pub mod special_commands;

/// Build the backend client for `config`
fn connect(config: &Config) -> Result<Arc<dyn Backend>> {
    Ok(Arc::new(ApiClient::new(&config.api)?))
}

/// Chart export target: the configured directory, else the default one
/// when `export_charts` is set
fn chart_exporter(config: &Config, export_charts: bool) -> Option<ChartExporter> {
    config
        .chat
        .charts_dir
        .clone()
        .or_else(|| export_charts.then(default_charts_dir).flatten())
        .map(ChartExporter::new)
}

fn message_list(exporter: Option<ChartExporter>) -> MessageList {
    match exporter {
        Some(exporter) => MessageList::new().with_exporter(exporter),
        None => MessageList::new(),
    }
}

/// Print whatever the window appended since the last call
fn print_new(list: &mut MessageList, window: &ChatWindow) {
    for block in list.render_new(window.transcript()) {
        println!("{}\n", block);
    }
}

/// Read `paths` and hand them to the window's upload widget
///
/// Read failures are reported on stderr and upload nothing.
async fn upload_paths(window: &mut ChatWindow, paths: &[PathBuf]) {
    match load_files(paths).await {
        Ok(files) => {
            window.upload(files).await;
        }
        Err(e) => {
            eprintln!("{} {:#}\n", "Error:".red().bold(), e);
        }
    }
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Creates a `ChatWindow` over the HTTP backend and runs a
    //! readline-based loop. Plain lines are questions; lines starting with
    //! `/` are special commands.

    use super::*;
    use crate::chat::ChatPhase;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `upload` - Spreadsheets to upload before the first prompt
    /// * `export_charts` - Export charts to the default directory when none is configured
    ///
    /// # Errors
    ///
    /// Returns error if the backend client or the line editor cannot be created
    pub async fn run_chat(config: Config, upload: Vec<PathBuf>, export_charts: bool) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let backend = connect(&config)?;
        let mut window = ChatWindow::new(backend, &config.chat.welcome_message);

        let exporter = chart_exporter(&config, export_charts);
        if let Some(exporter) = &exporter {
            tracing::info!(dir = %exporter.dir().display(), "Exporting charts");
        }
        let mut list = message_list(exporter);

        // Create readline instance
        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&config);
        print_new(&mut list, &window);

        if !upload.is_empty() {
            upload_paths(&mut window, &upload).await;
            print_new(&mut list, &window);
        }

        loop {
            let prompt = format!("{} ❯ ", window.phase().colored_tag());
            match rl.readline(&prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    if config.chat.input_history {
                        let _ = rl.add_history_entry(line.as_str());
                    }

                    // Check for special commands first
                    match parse_special_command(&line) {
                        Ok(SpecialCommand::Upload(paths)) => {
                            upload_paths(&mut window, &paths).await;
                        }
                        Ok(SpecialCommand::Chart(request)) => {
                            window.request_chart(&request).await;
                        }
                        Ok(SpecialCommand::Reset) => {
                            window.reset_session().await;
                            println!(
                                "{}\n",
                                "Session cleared; the next request starts a new one.".yellow()
                            );
                        }
                        Ok(SpecialCommand::ShowStatus) => {
                            print_status_display(&window, &config).await;
                        }
                        Ok(SpecialCommand::Help) => {
                            print_help();
                        }
                        Ok(SpecialCommand::Exit) => break,
                        Ok(SpecialCommand::None) => {
                            window.submit(&line).await;
                        }
                        Err(e) => {
                            eprintln!("{}\n", e.to_string().red());
                        }
                    }

                    print_new(&mut list, &window);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Display welcome banner at the start of interactive chat mode
    fn print_welcome_banner(config: &Config) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║            SheetChat Financial Data Assistant                ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Backend: {}", config.api.base_url.cyan());
        println!(
            "Status:  {} (upload a spreadsheet with /upload to begin)\n",
            ChatPhase::AwaitingUpload.colored_tag()
        );
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

    /// Display detailed status information about the current session
    async fn print_status_display(window: &ChatWindow, config: &Config) {
        let session = window
            .session()
            .current()
            .await
            .unwrap_or_else(|| "(none yet)".to_string());

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    SheetChat Session Status                  ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Status:        {}", window.phase().colored_tag());
        println!("Session:       {}", session);
        println!("Backend:       {}", config.api.base_url);
        println!("Files loaded:  {}", window.has_uploaded_files());
        println!("Upload:        {}", window.upload_state());
        println!("Messages:      {}", window.transcript().len());
        println!();
    }
}

// One-shot question handler
pub mod ask {
    //! Upload spreadsheets, ask one question, print the answer.

    use super::*;

    /// Upload `files`, ask `question`, and print the resulting entries
    ///
    /// # Errors
    ///
    /// Returns error if the backend client cannot be created, no file could
    /// be uploaded, or the question ended in an error entry
    pub async fn run_ask(config: Config, files: Vec<PathBuf>, question: String) -> Result<()> {
        tracing::info!(files = files.len(), "Asking a single question");

        let backend = connect(&config)?;
        let mut window = ChatWindow::new(backend, &config.chat.welcome_message);
        let mut list = message_list(chart_exporter(&config, false));

        // The welcome text is for interactive use only
        list.render_new(window.transcript());

        let blobs = load_files(&files).await?;
        window.upload(blobs).await;
        print_new(&mut list, &window);

        if !window.has_uploaded_files() {
            anyhow::bail!("No spreadsheet was uploaded; not asking the question");
        }

        window.submit(&question).await;
        print_new(&mut list, &window);

        match window.transcript().last() {
            Some(entry) if entry.kind == EntryKind::Error => anyhow::bail!("{}", entry.text),
            _ => Ok(()),
        }
    }
}

// Session command handler
pub mod session {
    //! Create a backend session and print its id.

    use super::*;
    use crate::api::SessionContext;

    /// Create a session and print its id on stdout
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be reached or refuses the request
    pub async fn run_session(config: Config) -> Result<()> {
        let backend = connect(&config)?;
        let context = SessionContext::new();
        let id = backend.get_session(&context).await?;
        println!("{}", id);
        Ok(())
    }
}
