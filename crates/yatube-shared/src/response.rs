//! JSON bodies: health probe and RFC 7807 problem details.

use serde::{Deserialize, Serialize};

/// Liveness probe body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

impl HealthResponse {
    pub fn ok(version: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            version: version.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// RFC 7807 Problem Details, used where a response is not an HTML page
/// (throttled requests).
///
/// See: https://datatracker.ietf.org/doc/html/rfc7807
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub error_type: String,
    pub title: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    pub fn new(status: u16, title: impl Into<String>) -> Self {
        Self {
            error_type: "about:blank".to_string(),
            title: title.into(),
            status,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn too_many_requests(retry_after_secs: u64) -> Self {
        Self::new(429, "Too Many Requests").with_detail(format!(
            "Rate limit exceeded. Try again in {} seconds.",
            retry_after_secs
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_details_shape() {
        let body = serde_json::to_value(ErrorResponse::too_many_requests(30)).unwrap();

        assert_eq!(body["type"], "about:blank");
        assert_eq!(body["status"], 429);
        assert_eq!(
            body["detail"],
            "Rate limit exceeded. Try again in 30 seconds."
        );
    }

    #[test]
    fn test_detail_omitted_when_absent() {
        let body = serde_json::to_value(ErrorResponse::new(400, "Bad Request")).unwrap();
        assert!(body.get("detail").is_none());
    }
}
