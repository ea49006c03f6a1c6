//! Test utilities for SheetChat
//!
//! This module provides temporary file helpers, assertion helpers, and
//! [`FakeBackend`], an in-process [`Backend`] that records what the chat
//! window asked for and answers with canned responses.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tempfile::TempDir;

use crate::api::session::SessionContext;
use crate::api::types::{QueryResponse, UploadResponse, UploadedFile, VisualizeResponse};
use crate::api::Backend;
use crate::error::{Result, SheetchatError};
use crate::upload::FileBlob;

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = format!("{:#}", e);
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Create a test configuration YAML string
pub fn test_config_yaml() -> String {
    r#"
api:
  base_url: http://backend.internal:9000
  timeout_seconds: 30

chat:
  welcome_message: Hello from the test config
  input_history: false
"#
    .to_string()
}

/// A backend call recorded by [`FakeBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
    /// Upload with the given file names
    Upload(Vec<String>),
    /// Question text
    Query(String),
    /// Chart request text
    Visualize(String),
}

#[derive(Debug, Clone)]
struct Failure {
    status: u16,
    detail: Option<String>,
}

impl Failure {
    fn to_error(&self) -> anyhow::Error {
        SheetchatError::Api {
            status: self.status,
            detail: self.detail.clone(),
        }
        .into()
    }
}

#[derive(Debug, Default)]
struct FakeState {
    calls: Vec<FakeCall>,
    answer: Option<Value>,
    chart: Option<Value>,
    upload_failure: Option<Failure>,
    query_failure: Option<Failure>,
    hang_queries: bool,
}

/// In-process [`Backend`] for unit tests
///
/// Sessions are created through the real [`SessionContext`] logic with ids
/// `fake-session-1`, `fake-session-2`, ...
#[derive(Debug, Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
    sessions_created: AtomicUsize,
}

impl FakeBackend {
    /// Create a backend that accepts every upload and answers "ok"
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer questions with this query-shaped JSON body
    pub fn answer_with(&self, body: Value) {
        self.lock().answer = Some(body);
    }

    /// Answer chart requests with this JSON body
    pub fn visualize_with(&self, body: Value) {
        self.lock().chart = Some(body);
    }

    /// Fail every upload with an API error
    pub fn fail_uploads_with(&self, status: u16, detail: Option<&str>) {
        self.lock().upload_failure = Some(Failure {
            status,
            detail: detail.map(str::to_string),
        });
    }

    /// Fail every question and chart request with an API error
    pub fn fail_queries_with(&self, status: u16, detail: Option<&str>) {
        self.lock().query_failure = Some(Failure {
            status,
            detail: detail.map(str::to_string),
        });
    }

    /// Never answer questions
    pub fn hang_queries(&self) {
        self.lock().hang_queries = true;
    }

    /// Every data call, oldest first
    pub fn calls(&self) -> Vec<FakeCall> {
        self.lock().calls.clone()
    }

    /// Number of data calls (uploads, questions, chart requests)
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// File names of each upload, oldest first
    pub fn uploaded_batches(&self) -> Vec<Vec<String>> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                FakeCall::Upload(names) => Some(names.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of sessions created
    pub fn sessions_created(&self) -> usize {
        self.sessions_created.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake backend state poisoned")
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn get_session(&self, session: &SessionContext) -> Result<String> {
        session
            .get_or_create(|| async {
                let n = self.sessions_created.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(format!("fake-session-{}", n))
            })
            .await
    }

    async fn upload_files(
        &self,
        session: &SessionContext,
        files: &[FileBlob],
    ) -> Result<UploadResponse> {
        if files.is_empty() {
            return Err(SheetchatError::EmptyUpload.into());
        }
        let names: Vec<String> = files.iter().map(|f| f.name.clone()).collect();
        let failure = {
            let mut state = self.lock();
            state.calls.push(FakeCall::Upload(names.clone()));
            state.upload_failure.clone()
        };

        let session_id = self.get_session(session).await?;
        if let Some(failure) = failure {
            return Err(failure.to_error());
        }

        Ok(UploadResponse {
            message: format!("Successfully uploaded {} file(s)", names.len()),
            files: names
                .into_iter()
                .map(|filename| UploadedFile {
                    filename,
                    sheet_count: 1,
                    sheets: Vec::new(),
                })
                .collect(),
            session_id: Some(session_id),
            total_sheets: Some(files.len() as u32),
            all_sheets: Vec::new(),
        })
    }

    async fn query(&self, session: &SessionContext, question: &str) -> Result<QueryResponse> {
        let (failure, answer, hang) = {
            let mut state = self.lock();
            state.calls.push(FakeCall::Query(question.to_string()));
            (
                state.query_failure.clone(),
                state.answer.clone(),
                state.hang_queries,
            )
        };

        if hang {
            futures::future::pending::<()>().await;
        }

        self.get_session(session).await?;
        if let Some(failure) = failure {
            return Err(failure.to_error());
        }

        let body = answer.unwrap_or_else(|| serde_json::json!({"answer": "ok"}));
        Ok(serde_json::from_value(body)?)
    }

    async fn visualize(
        &self,
        session: &SessionContext,
        request: &str,
    ) -> Result<VisualizeResponse> {
        let (failure, chart) = {
            let mut state = self.lock();
            state.calls.push(FakeCall::Visualize(request.to_string()));
            (state.query_failure.clone(), state.chart.clone())
        };

        self.get_session(session).await?;
        if let Some(failure) = failure {
            return Err(failure.to_error());
        }

        let body = chart.unwrap_or_else(|| serde_json::json!({"description": "ok"}));
        Ok(serde_json::from_value(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "Q1.xlsx", b"PK");
        assert_eq!(std::fs::read(&path).unwrap(), b"PK");
    }

    #[test]
    #[should_panic(expected = "does not contain")]
    fn test_assert_error_contains_wrong_message() {
        let result: Result<()> = Err(SheetchatError::Config("different".to_string()).into());
        assert_error_contains(result, "not present");
    }

    #[test]
    fn test_test_config_yaml_parses() {
        let config: Config = serde_yaml::from_str(&test_config_yaml()).unwrap();
        assert_eq!(config.api.base_url, "http://backend.internal:9000");
        assert!(!config.chat.input_history);
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_fake_backend_reuses_session() {
        let backend = FakeBackend::new();
        let session = SessionContext::new();
        backend.query(&session, "a").await.unwrap();
        backend.query(&session, "b").await.unwrap();
        assert_eq!(backend.sessions_created(), 1);
        assert_eq!(session.current().await.as_deref(), Some("fake-session-1"));
    }
}
