//! HTTP client for the assistant backend
//!
//! [`ApiClient`] implements [`Backend`] over reqwest. Each data call takes
//! the session context's call gate, makes sure a session exists (creating
//! one with `GET /api/session` on first use), sends its own request, and
//! adopts any session id the backend hands back.
//!
//! Non-success responses become [`SheetchatError::Api`] carrying the body's
//! `detail` field when there is one; connection and decoding failures become
//! [`SheetchatError::Transport`]. Nothing is retried.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::metrics::RequestMetrics;
use crate::api::session::SessionContext;
use crate::api::types::{
    QueryRequest, QueryResponse, SessionResponse, UploadResponse, VisualizeRequest,
    VisualizeResponse,
};
use crate::api::Backend;
use crate::config::ApiConfig;
use crate::error::{Result, SheetchatError};
use crate::upload::FileBlob;

const SESSION_PATH: &str = "/api/session";
const UPLOAD_PATH: &str = "/api/upload";
const QUERY_PATH: &str = "/api/query";
const VISUALIZE_PATH: &str = "/api/visualize";

/// HTTP implementation of [`Backend`]
///
/// # Examples
///
/// ```
/// use sheetchat::api::ApiClient;
/// use sheetchat::config::ApiConfig;
///
/// let client = ApiClient::new(&ApiConfig::default()).unwrap();
/// assert_eq!(client.base_url().as_str(), "http://localhost:8000/");
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Build a client for the configured backend
    ///
    /// No network I/O happens here.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL does not parse or the HTTP client
    /// cannot be constructed
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            SheetchatError::Config(format!("Invalid api.base_url '{}': {}", config.base_url, e))
        })?;

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(SheetchatError::Http)?;

        tracing::info!(base_url = %base_url, "Initialized backend client");

        Ok(Self { client, base_url })
    }

    /// Backend base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for an `/api/...` path
    ///
    /// The path is appended to the base URL, so a base with a path prefix
    /// keeps it.
    fn endpoint(&self, path: &str) -> Result<Url> {
        let joined = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        Url::parse(&joined)
            .map_err(|e| SheetchatError::Config(format!("Invalid endpoint {}: {}", joined, e)).into())
    }

    async fn create_session(&self) -> Result<String> {
        let url = self.endpoint(SESSION_PATH)?;
        tracing::debug!(url = %url, "Creating backend session");

        let response: SessionResponse = self
            .execute("session", self.client.get(url))
            .await
            .map_err(|e| {
                tracing::error!("Error creating session: {:#}", e);
                e
            })?;

        tracing::info!(session_id = %response.session_id, "Created backend session");
        Ok(response.session_id)
    }

    /// Send a request and decode a JSON success body
    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> Result<T> {
        let metrics = RequestMetrics::start(endpoint);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                metrics.record_error("transport");
                tracing::warn!(endpoint, "Request failed: {}", e);
                return Err(SheetchatError::Transport(format!(
                    "Failed to reach backend: {}",
                    e
                ))
                .into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            metrics.record_error("status");
            let detail = read_error_detail(response).await;
            tracing::warn!(
                endpoint,
                status = status.as_u16(),
                detail = detail.as_deref().unwrap_or("-"),
                "Backend returned error"
            );
            return Err(SheetchatError::Api {
                status: status.as_u16(),
                detail,
            }
            .into());
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                metrics.record_error("transport");
                return Err(SheetchatError::Transport(format!(
                    "Failed to read backend response: {}",
                    e
                ))
                .into());
            }
        };

        match serde_json::from_slice::<T>(&body) {
            Ok(decoded) => {
                metrics.record_success();
                Ok(decoded)
            }
            Err(e) => {
                metrics.record_error("decode");
                tracing::error!(endpoint, "Failed to parse backend response: {}", e);
                Err(SheetchatError::Transport(format!(
                    "Failed to parse backend response: {}",
                    e
                ))
                .into())
            }
        }
    }
}

/// Pull the `detail` field out of an error body
///
/// A string detail is used verbatim; any other JSON value is rendered
/// compactly. Bodies that are not JSON objects yield `None`.
async fn read_error_detail(response: Response) -> Option<String> {
    let text = response.text().await.ok()?;
    extract_detail(&text)
}

fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn spreadsheet_part(file: &FileBlob) -> Result<Part> {
    let mime = if file.name.to_lowercase().ends_with(".xls") {
        "application/vnd.ms-excel"
    } else {
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    };
    Part::bytes(file.bytes.to_vec())
        .file_name(file.name.clone())
        .mime_str(mime)
        .map_err(|e| SheetchatError::Http(e).into())
}

#[async_trait]
impl Backend for ApiClient {
    async fn get_session(&self, session: &SessionContext) -> Result<String> {
        session.get_or_create(|| self.create_session()).await
    }

    async fn upload_files(
        &self,
        session: &SessionContext,
        files: &[FileBlob],
    ) -> Result<UploadResponse> {
        if files.is_empty() {
            return Err(SheetchatError::EmptyUpload.into());
        }

        let _turn = session.begin_call().await;
        let session_id = self.get_session(session).await?;

        let mut form = Form::new().text("session_id", session_id);
        for file in files {
            form = form.part("file", spreadsheet_part(file)?);
        }

        let url = self.endpoint(UPLOAD_PATH)?;
        tracing::debug!(url = %url, files = files.len(), "Uploading files");

        let response: UploadResponse = self
            .execute("upload", self.client.post(url).multipart(form))
            .await
            .map_err(|e| {
                tracing::error!("Error uploading files: {:#}", e);
                e
            })?;

        session.adopt(response.session_id.as_deref()).await;
        Ok(response)
    }

    async fn query(&self, session: &SessionContext, question: &str) -> Result<QueryResponse> {
        let _turn = session.begin_call().await;
        let session_id = self.get_session(session).await?;

        let url = self.endpoint(QUERY_PATH)?;
        tracing::debug!(url = %url, "Sending question");

        let body = QueryRequest {
            session_id: &session_id,
            question,
        };
        let response: QueryResponse = self
            .execute("query", self.client.post(url).json(&body))
            .await
            .map_err(|e| {
                tracing::error!("Error querying: {:#}", e);
                e
            })?;

        session.adopt(response.session_id.as_deref()).await;
        Ok(response)
    }

    async fn visualize(
        &self,
        session: &SessionContext,
        request: &str,
    ) -> Result<VisualizeResponse> {
        let _turn = session.begin_call().await;
        let session_id = self.get_session(session).await?;

        let url = self.endpoint(VISUALIZE_PATH)?;
        tracing::debug!(url = %url, "Requesting visualization");

        let body = VisualizeRequest {
            session_id: &session_id,
            request,
        };
        let response: VisualizeResponse = self
            .execute("visualize", self.client.post(url).json(&body))
            .await
            .map_err(|e| {
                tracing::error!("Error generating visualization: {:#}", e);
                e
            })?;

        session.adopt(response.session_id.as_deref()).await;
        Ok(response)
    }
}
