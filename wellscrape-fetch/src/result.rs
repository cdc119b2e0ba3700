use reqwest::header::HeaderMap;
use serde::Serialize;

/// A successful GET. Failures never produce one; they surface as `FetchError`.
#[derive(Debug, Clone, Serialize)]
pub struct FetchResult {
    pub url: String,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchResult {
    pub fn new(url: String, status_code: u16, headers: &HeaderMap, body: Vec<u8>) -> Self {
        let content_type = headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        Self {
            url,
            status_code,
            content_type,
            body,
        }
    }
}
