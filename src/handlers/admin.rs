//! Admin panel: server-rendered pages and HTML form posts.
//!
//! Everything except login and logout sits behind
//! `admin_session_middleware`. Successful posts answer with a 302 redirect.

use axum::{
    Form,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tera::Context;

use crate::{
    error::AppError,
    handlers::{error_page, found, render_page},
    middleware::auth::{removal_cookie, session_cookie},
    models::article::{Article, ArticleChanges, CreateArticle, Pagination, parse_status},
    state::AppState,
    templates::{ARTICLE_FORM, ARTICLES_LIST, DASHBOARD, LOGIN},
};

const ADMIN_PAGE_SIZE: i64 = 20;

/// Value format of `<input type="datetime-local">`.
const FORM_DATETIME: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminListQuery {
    pub page: Option<String>,
    pub status: Option<String>,
}

/// Fields of the create/edit form, kept as raw strings so a rejected
/// submission can be shown again exactly as typed.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ArticleForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub expires_at: String,
}

impl ArticleForm {
    fn from_article(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            slug: article.slug.clone(),
            content: article.content.clone(),
            status: article.status.to_string(),
            expires_at: article
                .expires_at
                .map(|t| t.format(FORM_DATETIME).to_string())
                .unwrap_or_default(),
        }
    }

    fn to_create(&self) -> Result<CreateArticle, AppError> {
        Ok(CreateArticle {
            title: self.title.trim().to_string(),
            content: self.content.clone(),
            slug: Some(self.slug.trim().to_string()).filter(|s| !s.is_empty()),
            status: parse_status(Some(self.status.clone()))?,
            expires_at: parse_form_datetime(&self.expires_at),
        })
    }

    fn to_changes(&self) -> Result<ArticleChanges, AppError> {
        let non_empty = |v: &str| Some(v.to_string()).filter(|s| !s.trim().is_empty());
        Ok(ArticleChanges {
            title: non_empty(self.title.trim()),
            content: non_empty(&self.content),
            status: parse_status(Some(self.status.clone()))?,
            expires_at: parse_form_datetime(&self.expires_at),
        })
    }
}

/// `datetime-local` value read as UTC; anything unparsable is ignored.
fn parse_form_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(value, FORM_DATETIME)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .map(|naive| naive.and_utc())
}

fn login_form(state: &AppState, status: StatusCode, error: &str) -> Response {
    let mut context = Context::new();
    context.insert("error", error);
    render_page(&state.templates, status, LOGIN, &context)
}

/// `GET /admin/login`
pub async fn login_page(State(state): State<AppState>) -> Response {
    login_form(&state, StatusCode::OK, "")
}

/// `POST /admin/login`: on success sets the session cookie and redirects to
/// the dashboard; otherwise shows the form again.
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    if !state
        .auth
        .validate_admin_credentials(&form.username, &form.password)
    {
        tracing::warn!(username = %form.username, "Failed admin login");
        return login_form(&state, StatusCode::OK, "Invalid username or password");
    }

    tracing::info!(username = %form.username, "Admin logged in");
    (
        [(header::SET_COOKIE, session_cookie())],
        found("/admin/dashboard"),
    )
        .into_response()
}

/// `POST /admin/logout`
pub async fn logout() -> Response {
    (
        [(header::SET_COOKIE, removal_cookie())],
        found("/admin/login"),
    )
        .into_response()
}

/// `GET /admin` and `GET /admin/dashboard`
pub async fn dashboard(State(state): State<AppState>) -> Response {
    match state.articles.stats().await {
        Ok(stats) => {
            let mut context = Context::new();
            context.insert("stats", &stats);
            render_page(&state.templates, StatusCode::OK, DASHBOARD, &context)
        }
        Err(e) => error_page(&state.templates, e),
    }
}

/// `GET /admin/articles?page=N&status=S`
pub async fn articles_list(
    State(state): State<AppState>,
    Query(query): Query<AdminListQuery>,
) -> Response {
    let pagination = Pagination::from_query(query.page.as_deref(), None, ADMIN_PAGE_SIZE);
    let status = match parse_status(query.status) {
        Ok(status) => status,
        Err(e) => return error_page(&state.templates, e),
    };

    let page = match state.articles.list(pagination, status).await {
        Ok(page) => page,
        Err(e) => return error_page(&state.templates, e),
    };

    let mut context = Context::new();
    context.insert("articles", &page.articles);
    context.insert("total", &page.total);
    context.insert("page", &page.page);
    context.insert("page_count", &pagination.page_count(page.total));
    context.insert("status", status.map(|s| s.as_str()).unwrap_or(""));
    render_page(&state.templates, StatusCode::OK, ARTICLES_LIST, &context)
}

fn article_form(
    state: &AppState,
    status: StatusCode,
    editing: Option<&str>,
    form: &ArticleForm,
    error: &str,
) -> Response {
    let mut context = Context::new();
    match editing {
        Some(id) => {
            context.insert("heading", "Edit article");
            context.insert("action", &format!("/admin/articles/{id}"));
        }
        None => {
            context.insert("heading", "New article");
            context.insert("action", "/admin/articles");
        }
    }
    context.insert("editing", &editing.is_some());
    context.insert("form", form);
    context.insert("error", error);
    render_page(&state.templates, status, ARTICLE_FORM, &context)
}

/// `GET /admin/articles/new`
pub async fn new_article_page(State(state): State<AppState>) -> Response {
    let form = ArticleForm {
        status: "draft".to_string(),
        ..ArticleForm::default()
    };
    article_form(&state, StatusCode::OK, None, &form, "")
}

/// `POST /admin/articles`
pub async fn create_article(
    State(state): State<AppState>,
    Form(form): Form<ArticleForm>,
) -> Response {
    let result = match form.to_create() {
        Ok(input) => state.articles.create(input).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(article) => {
            tracing::info!(article_id = %article.id, "Article created from admin panel");
            found("/admin/articles")
        }
        Err(e) if e.status_code().is_client_error() => article_form(
            &state,
            e.status_code(),
            None,
            &form,
            &e.public_message(),
        ),
        Err(e) => error_page(&state.templates, e),
    }
}

/// `GET /admin/articles/{id}/edit`
pub async fn edit_article_page(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.articles.get_by_raw_id(&id).await {
        Ok(article) => article_form(
            &state,
            StatusCode::OK,
            Some(&id),
            &ArticleForm::from_article(&article),
            "",
        ),
        Err(e) => error_page(&state.templates, e),
    }
}

/// `POST /admin/articles/{id}`
pub async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ArticleForm>,
) -> Response {
    let result = match form.to_changes() {
        Ok(changes) => state.articles.update_raw(&id, changes).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(article) => {
            tracing::info!(article_id = %article.id, "Article updated from admin panel");
            found("/admin/articles")
        }
        Err(e @ AppError::Validation(_)) => article_form(
            &state,
            StatusCode::BAD_REQUEST,
            Some(&id),
            &form,
            &e.public_message(),
        ),
        Err(e) => error_page(&state.templates, e),
    }
}

/// `POST /admin/articles/{id}/delete`
pub async fn delete_article(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.articles.delete_raw(&id).await {
        Ok(()) => {
            tracing::info!(article_id = %id, "Article deleted from admin panel");
            found("/admin/articles")
        }
        Err(e) => error_page(&state.templates, e),
    }
}
