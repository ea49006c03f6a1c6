use std::fs;
use std::path::PathBuf;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sheetchat::api::ApiClient;
use sheetchat::config::ApiConfig;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

#[allow(dead_code)]
pub fn temp_spreadsheet(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, b"PK\x03\x04workbook").expect("failed to write spreadsheet");
    path
}

#[allow(dead_code)]
pub fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&ApiConfig {
        base_url: server.uri(),
        timeout_seconds: 5,
        ..Default::default()
    })
    .expect("failed to build client")
}

/// Mount `GET /api/session` answering with `id`, expected exactly once
#[allow(dead_code)]
pub async fn mount_session(server: &MockServer, id: &str) {
    Mock::given(method("GET"))
        .and(path("/api/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "session_id": id })))
        .expect(1)
        .mount(server)
        .await;
}

/// Paths of every request the server saw, in order
#[allow(dead_code)]
pub async fn request_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect()
}
