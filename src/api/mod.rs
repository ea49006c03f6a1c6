//! Backend access for SheetChat
//!
//! This module contains the [`Backend`] abstraction the chat window talks
//! to, the HTTP implementation ([`ApiClient`]), the explicit session context
//! threaded through every call, and the wire types.

pub mod client;
pub mod metrics;
pub mod session;
pub mod types;

pub use client::ApiClient;
pub use session::SessionContext;
pub use types::{
    AnswerData, ChartPayload, QueryResponse, SessionResponse, UploadResponse, UploadedFile,
    VisualizeResponse,
};

use async_trait::async_trait;

use crate::error::Result;
use crate::upload::FileBlob;

/// Operations the assistant backend offers
///
/// Every data operation takes the [`SessionContext`] it runs in. An
/// implementation ensures the context holds a session before sending its own
/// request, and adopts any session id the backend returns.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Return the context's session id, creating a session if there is none
    async fn get_session(&self, session: &SessionContext) -> Result<String>;

    /// Upload a non-empty batch of spreadsheets
    async fn upload_files(
        &self,
        session: &SessionContext,
        files: &[FileBlob],
    ) -> Result<UploadResponse>;

    /// Ask a natural-language question about the uploaded data
    async fn query(&self, session: &SessionContext, question: &str) -> Result<QueryResponse>;

    /// Ask explicitly for a chart
    async fn visualize(&self, session: &SessionContext, request: &str)
        -> Result<VisualizeResponse>;

    /// Forget the context's session so the next call creates a new one
    async fn reset_session(&self, session: &SessionContext) {
        session.reset().await;
    }
}
