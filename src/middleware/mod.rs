//! HTTP middleware components.
//!
//! Middleware are functions that run before route handlers.
//! They can:
//! - Authenticate requests
//! - Short-circuit requests (reject or redirect)
//! - Attach the caller's identity to the request

/// API key and admin session authentication
pub mod auth;
