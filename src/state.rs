//! Shared application state handed to every handler.
//!
//! Built once in `main` and cloned per request by axum; every field is a
//! cheap handle.

use std::sync::Arc;

use crate::{
    config::Config,
    services::{
        article_service::ArticleService, auth_service::AuthService, publisher::StaticPublisher,
    },
    store::{ApiKeyStore, ArticleStore},
    templates::Templates,
};

#[derive(Clone)]
pub struct AppState {
    pub articles: ArticleService,
    pub auth: AuthService,
    pub templates: Templates,
}

impl AppState {
    pub fn new(
        config: &Config,
        article_store: Arc<dyn ArticleStore>,
        key_store: Arc<dyn ApiKeyStore>,
        templates: Templates,
    ) -> Self {
        let publisher =
            StaticPublisher::new(&config.static_path, config.domain.clone(), templates.clone());

        Self {
            articles: ArticleService::new(article_store, publisher, config.domain.clone()),
            auth: AuthService::new(
                key_store,
                config.api_keys.clone(),
                config.admin_username.clone(),
                config.admin_password.clone(),
            ),
            templates,
        }
    }
}
