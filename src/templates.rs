//! HTML page rendering.
//!
//! Templates live in `templates/` and are compiled into the binary, so the
//! server does not depend on its working directory to find them.

use std::sync::Arc;

use tera::{Context, Tera};

use crate::error::AppError;

pub const ARTICLE: &str = "article.html";
pub const NOT_FOUND: &str = "not_found.html";
pub const EXPIRED: &str = "expired.html";
pub const ERROR: &str = "error.html";
pub const LOGIN: &str = "login.html";
pub const DASHBOARD: &str = "dashboard.html";
pub const ARTICLES_LIST: &str = "articles_list.html";
pub const ARTICLE_FORM: &str = "article_form.html";

/// Shared, cheaply clonable template set.
#[derive(Debug, Clone)]
pub struct Templates {
    tera: Arc<Tera>,
}

impl Templates {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", include_str!("../templates/base.html")),
            ("admin_base.html", include_str!("../templates/admin_base.html")),
            (ARTICLE, include_str!("../templates/article.html")),
            (NOT_FOUND, include_str!("../templates/not_found.html")),
            (EXPIRED, include_str!("../templates/expired.html")),
            (ERROR, include_str!("../templates/error.html")),
            (LOGIN, include_str!("../templates/login.html")),
            (DASHBOARD, include_str!("../templates/dashboard.html")),
            (ARTICLES_LIST, include_str!("../templates/articles_list.html")),
            (ARTICLE_FORM, include_str!("../templates/article_form.html")),
        ])?;

        Ok(Self {
            tera: Arc::new(tera),
        })
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<String, AppError> {
        Ok(self.tera.render(name, context)?)
    }

    /// Standalone message page (404, 410 and generic errors).
    pub fn render_message(&self, name: &str, message: &str) -> Result<String, AppError> {
        let mut context = Context::new();
        context.insert("message", message);
        self.render(name, &context)
    }
}
