//! Chat window orchestration
//!
//! [`ChatWindow`] owns the transcript and the session context, gates
//! questions behind a successful upload, and turns backend answers into
//! transcript entries.
//!
//! Gating is a single [`ChatPhase`]:
//!
//! ```text
//! AwaitingUpload --upload ok--> Idle --question--> AwaitingAnswer
//!                                 ^                      |
//!                                 +----- answer/error ---+
//! ```
//!
//! Failed uploads leave the phase where it was, so once any upload has
//! succeeded the window never returns to `AwaitingUpload`.

use std::fmt;
use std::sync::Arc;

use colored::Colorize;

use crate::api::session::SessionContext;
use crate::api::Backend;
use crate::chat::transcript::{ChatEntry, Transcript};
use crate::error::failure_message;
use crate::upload::{FileBlob, UploadOutcome, UploadState, UploadWidget};

/// Shown when a question arrives before any successful upload
pub const UPLOAD_FIRST_MESSAGE: &str = "Please upload Excel files first before asking questions.";

/// Fallback for a failed upload with no message
pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload files. Please try again.";

/// Fallback for a failed question with no message
pub const QUERY_FAILED_MESSAGE: &str = "An error occurred. Please try again.";

/// Gating state of the chat window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatPhase {
    /// No upload has succeeded yet; questions are refused
    #[default]
    AwaitingUpload,
    /// Ready for a question
    Idle,
    /// A question is in flight; further input is ignored
    AwaitingAnswer,
}

impl fmt::Display for ChatPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingUpload => write!(f, "AWAITING UPLOAD"),
            Self::Idle => write!(f, "READY"),
            Self::AwaitingAnswer => write!(f, "THINKING"),
        }
    }
}

impl ChatPhase {
    /// A colored tag for the prompt
    pub fn colored_tag(&self) -> String {
        match self {
            Self::AwaitingUpload => format!("[{}]", "NO DATA".yellow()),
            Self::Idle => format!("[{}]", "READY".green()),
            Self::AwaitingAnswer => format!("[{}]", "THINKING".cyan()),
        }
    }
}

/// Result of submitting input to the window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input or a request already in flight; nothing changed
    Ignored,
    /// Refused locally with an error entry; no backend call
    Refused,
    /// Sent to the backend; the answer (or error) has been appended
    Answered,
}

/// Puts the phase back to `Idle` when dropped, so an in-flight question
/// can never leave the window stuck even if its future is abandoned.
struct AnswerGuard<'a> {
    phase: &'a mut ChatPhase,
}

impl<'a> AnswerGuard<'a> {
    fn enter(phase: &'a mut ChatPhase) -> Self {
        *phase = ChatPhase::AwaitingAnswer;
        Self { phase }
    }
}

impl Drop for AnswerGuard<'_> {
    fn drop(&mut self) {
        *self.phase = ChatPhase::Idle;
    }
}

/// The chat orchestrator
pub struct ChatWindow {
    backend: Arc<dyn Backend>,
    session: SessionContext,
    uploader: UploadWidget,
    transcript: Transcript,
    phase: ChatPhase,
}

impl ChatWindow {
    /// Open a window with a fresh session context and a welcome entry
    pub fn new(backend: Arc<dyn Backend>, welcome_message: &str) -> Self {
        Self::with_session(backend, SessionContext::new(), welcome_message)
    }

    /// Open a window over an existing session context
    pub fn with_session(
        backend: Arc<dyn Backend>,
        session: SessionContext,
        welcome_message: &str,
    ) -> Self {
        let mut transcript = Transcript::new();
        transcript.push_text(welcome_message);

        Self {
            uploader: UploadWidget::new(Arc::clone(&backend)),
            backend,
            session,
            transcript,
            phase: ChatPhase::AwaitingUpload,
        }
    }

    /// Current phase
    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    /// Whether any upload has succeeded
    pub fn has_uploaded_files(&self) -> bool {
        self.phase != ChatPhase::AwaitingUpload
    }

    /// Whether a question is in flight
    pub fn is_loading(&self) -> bool {
        self.phase == ChatPhase::AwaitingAnswer
    }

    /// The transcript
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The session context
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Upload widget state
    pub fn upload_state(&self) -> &UploadState {
        self.uploader.state()
    }

    /// Validate and upload a batch, recording the outcome in the transcript
    pub async fn upload(&mut self, files: Vec<FileBlob>) -> UploadOutcome {
        let outcome = self.uploader.submit(&self.session, files).await;

        if let Some(rejected) = &outcome.rejected {
            self.transcript.push_error(rejected.clone());
        }

        match &outcome.result {
            Some(Ok(response)) => {
                if self.phase == ChatPhase::AwaitingUpload {
                    tracing::info!("First upload succeeded; questions enabled");
                    self.phase = ChatPhase::Idle;
                }
                self.transcript
                    .push_upload(response.message.clone(), response.files.clone());
            }
            Some(Err(message)) => {
                let text = if message.trim().is_empty() {
                    UPLOAD_FAILED_MESSAGE.to_string()
                } else {
                    message.clone()
                };
                self.transcript.push_error(text);
            }
            None => {}
        }

        outcome
    }

    /// Submit a question
    ///
    /// Blank input or input while a question is in flight is ignored
    /// without touching the transcript. Before any upload the question is
    /// refused with an error entry. Otherwise the verbatim input is recorded,
    /// the backend is asked, and exactly one answer or error entry follows.
    pub async fn submit(&mut self, input: &str) -> SubmitOutcome {
        match self.admit(input) {
            Some(outcome) => outcome,
            None => {
                self.ask(input).await;
                SubmitOutcome::Answered
            }
        }
    }

    /// Ask the backend for a chart
    ///
    /// Gated exactly like [`ChatWindow::submit`].
    pub async fn request_chart(&mut self, request: &str) -> SubmitOutcome {
        if let Some(outcome) = self.admit(request) {
            return outcome;
        }

        self.transcript.push_user(request);
        let backend = Arc::clone(&self.backend);
        let result = {
            let _guard = AnswerGuard::enter(&mut self.phase);
            backend.visualize(&self.session, request).await
        };

        match result {
            Ok(response) => {
                let text = response.text();
                match response.chart() {
                    Some(chart) => {
                        self.transcript
                            .push_chart(text.clone(), chart.clone(), text);
                    }
                    None => {
                        self.transcript.push_text(text);
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Visualization failed: {:#}", e);
                self.transcript
                    .push_error(failure_message(&e, QUERY_FAILED_MESSAGE));
            }
        }

        SubmitOutcome::Answered
    }

    /// Forget the backend session; the next call creates a new one
    pub async fn reset_session(&self) {
        self.backend.reset_session(&self.session).await;
    }

    /// Entries appended after the first `offset`
    pub fn entries_since(&self, offset: usize) -> &[ChatEntry] {
        self.transcript.since(offset)
    }

    /// Decide whether input may go to the backend
    ///
    /// Returns the final outcome when it may not.
    fn admit(&mut self, input: &str) -> Option<SubmitOutcome> {
        if input.trim().is_empty() || self.is_loading() {
            return Some(SubmitOutcome::Ignored);
        }

        if !self.has_uploaded_files() {
            self.transcript.push_error(UPLOAD_FIRST_MESSAGE);
            return Some(SubmitOutcome::Refused);
        }

        None
    }

    async fn ask(&mut self, question: &str) {
        self.transcript.push_user(question);

        let backend = Arc::clone(&self.backend);
        let result = {
            let _guard = AnswerGuard::enter(&mut self.phase);
            backend.query(&self.session, question).await
        };

        match result {
            Ok(response) => {
                if let Some(query) = &response.query_used {
                    tracing::debug!(query = %query, "Backend query");
                }
                match response.chart() {
                    Some(chart) => {
                        self.transcript.push_chart(
                            response.answer.clone(),
                            chart.clone(),
                            response.answer.clone(),
                        );
                    }
                    None => {
                        self.transcript.push_text(response.answer.clone());
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Question failed: {:#}", e);
                self.transcript
                    .push_error(failure_message(&e, QUERY_FAILED_MESSAGE));
            }
        }
    }
}
