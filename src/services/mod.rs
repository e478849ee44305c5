//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They own the store handles and the static publisher.

pub mod article_service;
pub mod auth_service;
pub mod publisher;
pub mod slug;
