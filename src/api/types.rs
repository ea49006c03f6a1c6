//! Wire types for the assistant backend
//!
//! Request bodies are serialized exactly as the backend expects them;
//! response bodies only name the fields this client consumes and tolerate
//! everything else.

use serde::{Deserialize, Serialize};

/// Response of `GET /api/session`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Newly created session identifier
    pub session_id: String,
}

/// One uploaded workbook as summarized by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Original file name
    pub filename: String,
    /// Number of sheets parsed from the workbook
    #[serde(default)]
    pub sheet_count: u32,
    /// Sheet names, when the backend lists them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sheets: Vec<String>,
}

/// Response of `POST /api/upload`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Human-readable summary of the upload
    pub message: String,
    /// Per-file summaries, in upload order
    #[serde(default)]
    pub files: Vec<UploadedFile>,
    /// Session the files were attached to
    #[serde(default)]
    pub session_id: Option<String>,
    /// Total sheet count across the session
    #[serde(default)]
    pub total_sheets: Option<u32>,
    /// Every sheet name known to the session
    #[serde(default)]
    pub all_sheets: Vec<String>,
}

/// Chart description produced by the backend
///
/// Both members are opaque plotting-library JSON and are passed through
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPayload {
    /// Trace list
    #[serde(default)]
    pub data: serde_json::Value,
    /// Layout object
    #[serde(default)]
    pub layout: serde_json::Value,
}

/// Structured part of an answer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnswerData {
    /// Whether the backend classified the question as a chart request
    #[serde(default)]
    pub is_visualization: bool,
    /// Chart to render when `is_visualization` is set
    #[serde(default)]
    pub chart_data: Option<ChartPayload>,
}

/// Response of `POST /api/query`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Natural-language answer
    #[serde(default)]
    pub answer: String,
    /// Structured data; `null`, absent, or any non-object is treated as none
    #[serde(default, deserialize_with = "lenient_answer_data")]
    pub data: Option<AnswerData>,
    /// Session the question was answered in
    #[serde(default)]
    pub session_id: Option<String>,
    /// Query the backend ran to produce the answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_used: Option<String>,
}

impl QueryResponse {
    /// The chart to render, if this answer is a visualization
    pub fn chart(&self) -> Option<&ChartPayload> {
        self.data
            .as_ref()
            .filter(|data| data.is_visualization)
            .and_then(|data| data.chart_data.as_ref())
    }
}

/// Response of `POST /api/visualize`
///
/// Accepts both the query-shaped body and the dedicated
/// `{chart_type, chart_data, description}` body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VisualizeResponse {
    /// Natural-language answer (query-shaped bodies)
    #[serde(default)]
    pub answer: Option<String>,
    /// Nested structured data (query-shaped bodies)
    #[serde(default, deserialize_with = "lenient_answer_data")]
    pub data: Option<AnswerData>,
    /// Chart kind, e.g. `bar` or `line`
    #[serde(default)]
    pub chart_type: Option<String>,
    /// Top-level chart payload (dedicated bodies)
    #[serde(default)]
    pub chart_data: Option<ChartPayload>,
    /// Chart description (dedicated bodies)
    #[serde(default)]
    pub description: Option<String>,
    /// Session the chart was generated in
    #[serde(default)]
    pub session_id: Option<String>,
}

impl VisualizeResponse {
    /// The chart to render, from either body shape
    pub fn chart(&self) -> Option<&ChartPayload> {
        self.data
            .as_ref()
            .filter(|data| data.is_visualization)
            .and_then(|data| data.chart_data.as_ref())
            .or(self.chart_data.as_ref())
    }

    /// Text accompanying the chart: the description, else the answer
    pub fn text(&self) -> String {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .or(self.answer.as_deref())
            .unwrap_or_default()
            .to_string()
    }
}

/// Body of `POST /api/query`
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest<'a> {
    pub session_id: &'a str,
    pub question: &'a str,
}

/// Body of `POST /api/visualize`
#[derive(Debug, Clone, Serialize)]
pub struct VisualizeRequest<'a> {
    pub session_id: &'a str,
    pub request: &'a str,
}

/// The query endpoint may return arbitrary JSON in `data`; anything that is
/// not an answer-data object counts as no data.
fn lenient_answer_data<'de, D>(deserializer: D) -> std::result::Result<Option<AnswerData>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .filter(serde_json::Value::is_object)
        .and_then(|v| serde_json::from_value(v).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_answer_has_no_chart() {
        let response: QueryResponse = serde_json::from_value(json!({
            "answer": "Revenue is $5M",
            "data": {"is_visualization": false},
            "session_id": "abc"
        }))
        .unwrap();
        assert_eq!(response.answer, "Revenue is $5M");
        assert!(response.chart().is_none());
        assert!(response.query_used.is_none());
        assert_eq!(response.session_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_visualization_answer_exposes_chart() {
        let response: QueryResponse = serde_json::from_value(json!({
            "answer": "Monthly revenue",
            "data": {
                "is_visualization": true,
                "chart_data": {"data": [{"type": "bar", "x": [1, 2], "y": [3, 4]}], "layout": {"title": "Revenue"}}
            }
        }))
        .unwrap();
        let chart = response.chart().unwrap();
        assert_eq!(chart.layout["title"], "Revenue");
        assert_eq!(chart.data[0]["type"], "bar");
    }

    #[test]
    fn test_visualization_flag_without_chart_data() {
        let response: QueryResponse = serde_json::from_value(json!({
            "answer": "Could not chart that",
            "data": {"is_visualization": true, "chart_data": null}
        }))
        .unwrap();
        assert!(response.chart().is_none());
    }

    #[test]
    fn test_chart_data_without_visualization_flag_is_ignored() {
        let response: QueryResponse = serde_json::from_value(json!({
            "answer": "Here",
            "data": {"chart_data": {"data": [], "layout": {}}}
        }))
        .unwrap();
        assert!(response.chart().is_none());
    }

    #[test]
    fn test_non_object_data_is_treated_as_absent() {
        let response: QueryResponse = serde_json::from_value(json!({
            "answer": "42 rows",
            "data": [1, 2, 3]
        }))
        .unwrap();
        assert!(response.data.is_none());
    }

    #[test]
    fn test_upload_response_extra_fields() {
        let response: UploadResponse = serde_json::from_value(json!({
            "session_id": "s-1",
            "message": "Successfully uploaded 1 file(s)",
            "files": [{"filename": "Q1.xlsx", "sheets": ["Jan", "Feb"], "sheet_count": 2}],
            "total_sheets": 2,
            "all_sheets": ["Q1_Jan", "Q1_Feb"],
            "schema": {"Q1_Jan": {"columns": []}}
        }))
        .unwrap();
        assert_eq!(response.files[0].filename, "Q1.xlsx");
        assert_eq!(response.files[0].sheet_count, 2);
        assert_eq!(response.files[0].sheets, vec!["Jan", "Feb"]);
        assert_eq!(response.total_sheets, Some(2));
    }

    #[test]
    fn test_visualize_dedicated_shape() {
        let response: VisualizeResponse = serde_json::from_value(json!({
            "session_id": "s-1",
            "chart_type": "line",
            "chart_data": {"data": [{"type": "scatter"}], "layout": {}},
            "description": "Revenue trend"
        }))
        .unwrap();
        assert!(response.chart().is_some());
        assert_eq!(response.text(), "Revenue trend");
        assert_eq!(response.chart_type.as_deref(), Some("line"));
    }

    #[test]
    fn test_visualize_query_shape() {
        let response: VisualizeResponse = serde_json::from_value(json!({
            "answer": "Expenses by category",
            "data": {"is_visualization": true, "chart_data": {"data": [], "layout": {}}}
        }))
        .unwrap();
        assert!(response.chart().is_some());
        assert_eq!(response.text(), "Expenses by category");
    }

    #[test]
    fn test_query_request_serialization() {
        let body = serde_json::to_value(QueryRequest {
            session_id: "s-1",
            question: "Total revenue?",
        })
        .unwrap();
        assert_eq!(body, json!({"session_id": "s-1", "question": "Total revenue?"}));
    }
}
