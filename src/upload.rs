//! Spreadsheet upload widget
//!
//! Validates a batch of files against the spreadsheet extension gate and
//! forwards the valid ones to the backend as a single upload. Files that
//! fail the gate never reach the network; their names are reported together
//! in one message.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;

use crate::api::session::SessionContext;
use crate::api::types::UploadResponse;
use crate::api::Backend;
use crate::error::{failure_message, Result, SheetchatError};

/// Extensions accepted by the upload gate (compared lower-cased)
pub const ALLOWED_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// A file ready to be sent as a multipart part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlob {
    /// File name sent to the backend
    pub name: String,
    /// Raw file contents
    pub bytes: Bytes,
}

impl FileBlob {
    /// Create a blob from a name and contents
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, naming the blob after the path's file name
    ///
    /// # Errors
    ///
    /// Returns error if the path has no file name or cannot be read
    pub async fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                SheetchatError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("Not a file: {}", path.display()),
                ))
            })?;
        let bytes = tokio::fs::read(path).await.map_err(SheetchatError::Io)?;
        tracing::debug!(file = %name, size = bytes.len(), "Loaded file for upload");
        Ok(Self::new(name, bytes))
    }

    /// Whether this blob passes the extension gate
    pub fn is_spreadsheet(&self) -> bool {
        is_valid_file_type(&self.name)
    }
}

/// Read several files concurrently, preserving order
///
/// # Errors
///
/// Returns the first read failure
pub async fn load_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<FileBlob>> {
    futures::future::try_join_all(paths.iter().map(|p| FileBlob::from_path(p.as_ref()))).await
}

/// Check a file name against the extension gate
///
/// The extension is the text after the last `.`, compared
/// case-insensitively. A name with no `.` is rejected.
///
/// # Examples
///
/// ```
/// use sheetchat::upload::is_valid_file_type;
///
/// assert!(is_valid_file_type("Q1.XLSX"));
/// assert!(is_valid_file_type("legacy.xls"));
/// assert!(!is_valid_file_type("notes.txt"));
/// assert!(!is_valid_file_type("xlsx"));
/// ```
pub fn is_valid_file_type(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// Split a batch into `(valid, invalid)`, preserving order within each
pub fn partition(files: Vec<FileBlob>) -> (Vec<FileBlob>, Vec<FileBlob>) {
    files.into_iter().partition(FileBlob::is_spreadsheet)
}

/// The single rejection message naming every invalid file
///
/// Returns `None` when nothing was rejected.
pub fn rejection_message(invalid: &[FileBlob]) -> Option<String> {
    if invalid.is_empty() {
        return None;
    }
    let names = invalid
        .iter()
        .map(|f| f.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    Some(SheetchatError::InvalidFileType(names).to_string())
}

/// Transient widget state, informational only
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadState {
    /// No upload in flight
    #[default]
    Idle,
    /// Uploading the named files
    Uploading(Vec<String>),
}

impl std::fmt::Display for UploadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Uploading(names) => write!(f, "uploading {}", names.join(", ")),
        }
    }
}

/// What happened to a submitted batch
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UploadOutcome {
    /// Rejection message for files that failed the gate
    pub rejected: Option<String>,
    /// Upload result, absent when no file passed the gate
    pub result: Option<std::result::Result<UploadResponse, String>>,
}

/// Validates batches and forwards them to the backend
pub struct UploadWidget {
    backend: Arc<dyn Backend>,
    state: UploadState,
}

impl UploadWidget {
    /// Create a widget that uploads through `backend`
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            state: UploadState::Idle,
        }
    }

    /// Current widget state
    pub fn state(&self) -> &UploadState {
        &self.state
    }

    /// Validate `files` and upload the ones that pass
    ///
    /// Rejections and upload failures are reported in the outcome, never as
    /// an `Err`.
    pub async fn submit(&mut self, session: &SessionContext, files: Vec<FileBlob>) -> UploadOutcome {
        let (valid, invalid) = partition(files);
        let rejected = rejection_message(&invalid);
        if let Some(message) = &rejected {
            tracing::info!("{}", message);
        }

        if valid.is_empty() {
            return UploadOutcome {
                rejected,
                result: None,
            };
        }

        self.state = UploadState::Uploading(valid.iter().map(|f| f.name.clone()).collect());
        tracing::info!(count = valid.len(), "Uploading spreadsheets");

        let result = self
            .backend
            .upload_files(session, &valid)
            .await
            .map_err(|e| {
                tracing::warn!("Upload failed: {:#}", e);
                failure_message(&e, "")
            });

        self.state = UploadState::Idle;

        UploadOutcome {
            rejected,
            result: Some(result),
        }
    }
}
