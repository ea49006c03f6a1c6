//! Terminal rendering of the transcript
//!
//! [`MessageList`] remembers how many entries it has already printed, so
//! each call to [`MessageList::render_new`] yields only what was appended
//! since the last call. Chart entries are summarized as text and can be
//! exported as JSON files for an external plotting tool.

use std::path::{Path, PathBuf};

use colored::Colorize;
use prettytable::{format, Table};
use serde_json::{json, Value};

use crate::api::types::{ChartPayload, UploadedFile};
use crate::chat::transcript::{ChatEntry, EntryKind, Transcript};
use crate::error::{Result, SheetchatError};

/// Renders transcript entries exactly once, in order
#[derive(Debug, Default)]
pub struct MessageList {
    rendered: usize,
    exporter: Option<ChartExporter>,
}

impl MessageList {
    /// Create a list that has rendered nothing yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Also export every chart entry into `exporter`'s directory
    pub fn with_exporter(mut self, exporter: ChartExporter) -> Self {
        self.exporter = Some(exporter);
        self
    }

    /// Number of entries already rendered
    pub fn rendered(&self) -> usize {
        self.rendered
    }

    /// Render the entries appended since the last call
    pub fn render_new(&mut self, transcript: &Transcript) -> Vec<String> {
        let fresh = transcript.since(self.rendered);
        let mut blocks = Vec::with_capacity(fresh.len());

        for entry in fresh {
            blocks.push(render_entry(entry));

            if let (Some(exporter), Some(chart)) = (&self.exporter, &entry.chart) {
                match exporter.export(entry, chart) {
                    Ok(path) => blocks.push(format!(
                        "   {} {}",
                        "Chart saved to".dimmed(),
                        path.display().to_string().cyan()
                    )),
                    Err(e) => tracing::warn!("Failed to export chart {}: {:#}", entry.id, e),
                }
            }
        }

        self.rendered += fresh.len();
        blocks
    }
}

/// Render a single entry as a printable block
pub fn render_entry(entry: &ChatEntry) -> String {
    match entry.kind {
        EntryKind::User => format!("{} {}", "you ›".bold().blue(), entry.text),
        EntryKind::Text => format!("{} {}", "bot ›".bold().green(), entry.text),
        EntryKind::Error => format!("{} {}", "❌".red(), entry.text.red()),
        EntryKind::Upload => {
            let mut block = format!("{} {}", "✅".green(), entry.text.green());
            if !entry.files.is_empty() {
                block.push('\n');
                block.push_str(&file_table(&entry.files));
            }
            block
        }
        EntryKind::Chart => {
            let mut block = format!("{} {}", "📊".bold(), entry.text);
            if let Some(chart) = &entry.chart {
                for line in chart_summary(chart) {
                    block.push_str("\n   ");
                    block.push_str(&line);
                }
            }
            if let Some(description) = entry
                .description
                .as_deref()
                .filter(|d| !d.is_empty() && *d != entry.text)
            {
                block.push_str("\n   ");
                block.push_str(&description.italic().to_string());
            }
            block
        }
    }
}

fn file_table(files: &[UploadedFile]) -> String {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row!["File".bold(), "Sheets".bold()]);
    for file in files {
        table.add_row(prettytable::row![file.filename.cyan(), file.sheet_count]);
    }
    table.to_string()
}

/// Describe a chart's title and traces in plain text
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use sheetchat::api::ChartPayload;
/// use sheetchat::chat::render::chart_summary;
///
/// let chart = ChartPayload {
///     data: json!([{"type": "bar", "name": "2024", "x": ["Jan", "Feb"], "y": [1, 2]}]),
///     layout: json!({"title": {"text": "Revenue"}}),
/// };
/// assert_eq!(
///     chart_summary(&chart),
///     vec!["Revenue".to_string(), "bar \"2024\" (2 points)".to_string()]
/// );
/// ```
pub fn chart_summary(chart: &ChartPayload) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(title) = chart_title(&chart.layout) {
        lines.push(title);
    }

    if let Some(traces) = chart.data.as_array() {
        for trace in traces {
            let kind = trace.get("type").and_then(Value::as_str).unwrap_or("scatter");
            let points = ["x", "y", "values", "labels"]
                .iter()
                .filter_map(|key| trace.get(*key).and_then(Value::as_array))
                .map(Vec::len)
                .max()
                .unwrap_or(0);
            let line = match trace.get("name").and_then(Value::as_str) {
                Some(name) => format!("{} \"{}\" ({} points)", kind, name, points),
                None => format!("{} ({} points)", kind, points),
            };
            lines.push(line);
        }
    }

    lines
}

fn chart_title(layout: &Value) -> Option<String> {
    match layout.get("title")? {
        Value::String(s) => Some(s.clone()),
        other => other
            .get("text")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

/// Writes chart entries as standalone JSON files
#[derive(Debug, Clone)]
pub struct ChartExporter {
    dir: PathBuf,
}

impl ChartExporter {
    /// Export into `dir`, created on first export
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `chart` as `{data, layout, description}` JSON
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be written
    pub fn export(&self, entry: &ChatEntry, chart: &ChartPayload) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir).map_err(SheetchatError::Io)?;

        let name = format!(
            "chart-{}-{}.json",
            entry.created_at.format("%Y%m%dT%H%M%S"),
            entry.id
        );
        let path = self.dir.join(name);
        let body = json!({
            "data": chart.data,
            "layout": chart.layout,
            "description": entry.description.as_deref().unwrap_or(&entry.text),
        });
        let bytes = serde_json::to_vec_pretty(&body).map_err(SheetchatError::Serialization)?;
        std::fs::write(&path, bytes).map_err(SheetchatError::Io)?;

        tracing::debug!(path = %path.display(), "Exported chart");
        Ok(path)
    }
}
