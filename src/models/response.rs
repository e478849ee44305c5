//! JSON response envelope shared by every `/api` endpoint.
//!
//! The envelope is the format automation tools (n8n and similar) expect:
//!
//! ```json
//! {
//!   "success": true,
//!   "data": { "...": "..." },
//!   "url": "https://example.com/p/my-article-1735689600"
//! }
//! ```
//!
//! `data` is typed per endpoint through the generic parameter.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Public link of a published article.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            url: None,
        }
    }

    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.url = url;
        self
    }
}

impl ApiResponse<()> {
    /// Successful response without payload (e.g. after a delete).
    pub fn empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            url: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            url: None,
        }
    }
}
