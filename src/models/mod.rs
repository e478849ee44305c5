//! Data models representing database entities and API payloads.

/// API key authentication model
pub mod api_key;
/// Article entity, lifecycle status and request types
pub mod article;
/// JSON response envelope
pub mod response;
