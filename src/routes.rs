//! Route table.
//!
//! Three groups share one router:
//! - `/api/*` behind `api_key_middleware`
//! - `/admin/*` pages behind `admin_session_middleware` (login and logout
//!   stay public)
//! - public routes: `/health`, `/p/{slug}` and the snapshot files under
//!   `/static`

use std::{path::Path, time::Duration};

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post},
};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, api_keys, articles, health, public},
    middleware,
    state::AppState,
};

pub fn build_router(state: AppState, static_path: &Path, request_timeout: Duration) -> Router {
    let api_routes = Router::new()
        .route(
            "/api/articles",
            post(articles::create_article).get(articles::list_articles),
        )
        .route(
            "/api/articles/{id}",
            get(articles::get_article)
                .put(articles::update_article)
                .delete(articles::delete_article),
        )
        .route(
            "/api/keys",
            post(api_keys::create_api_key).get(api_keys::list_api_keys),
        )
        .route("/api/keys/{id}", delete(api_keys::delete_api_key))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::api_key_middleware,
        ));

    let admin_routes = Router::new()
        .route("/admin", get(admin::dashboard))
        .route("/admin/dashboard", get(admin::dashboard))
        .route(
            "/admin/articles",
            get(admin::articles_list).post(admin::create_article),
        )
        .route("/admin/articles/new", get(admin::new_article_page))
        .route("/admin/articles/{id}", post(admin::update_article))
        .route("/admin/articles/{id}/edit", get(admin::edit_article_page))
        .route("/admin/articles/{id}/delete", post(admin::delete_article))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::admin_session_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/p/{slug}", get(public::show_article))
        .route("/admin/login", get(admin::login_page).post(admin::login))
        .route("/admin/logout", post(admin::logout))
        .merge(api_routes)
        .merge(admin_routes)
        .nest_service("/static", ServeDir::new(static_path))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .with_state(state)
}
