//! Static snapshot publisher.
//!
//! Every published article has a rendered copy on disk at
//! `<static_path>/articles/<slug>/index.html`, served under `/static`. The
//! article service keeps the snapshot in step with the article status; the
//! database row stays authoritative and snapshot failures are only logged.

use std::{
    io,
    path::{Path, PathBuf},
};

use tera::Context;

use crate::{
    error::AppError,
    models::article::Article,
    services::slug::is_valid_slug,
    templates::{self, Templates},
};

const SNAPSHOT_FILE: &str = "index.html";

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("refusing to publish unsafe slug '{0}'")]
    InvalidSlug(String),

    #[error("failed to render article: {0}")]
    Render(#[from] AppError),

    #[error("snapshot I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct StaticPublisher {
    /// `<static_path>/articles`
    root: PathBuf,
    domain: String,
    templates: Templates,
}

impl StaticPublisher {
    pub fn new(static_path: &Path, domain: impl Into<String>, templates: Templates) -> Self {
        Self {
            root: static_path.join("articles"),
            domain: domain.into(),
            templates,
        }
    }

    /// Directory holding the snapshot of `slug`.
    pub fn article_dir(&self, slug: &str) -> Result<PathBuf, PublishError> {
        if !is_valid_slug(slug) {
            return Err(PublishError::InvalidSlug(slug.to_string()));
        }
        Ok(self.root.join(slug))
    }

    /// Render the public page of `article`. Shared with the `/p/{slug}` route
    /// so both always show the same markup.
    pub fn render(&self, article: &Article) -> Result<String, AppError> {
        let mut context = Context::new();
        context.insert("article", article);
        context.insert(
            "url",
            &format!("{}/p/{}", self.domain.trim_end_matches('/'), article.slug),
        );
        self.templates.render(templates::ARTICLE, &context)
    }

    /// Write (or overwrite) the snapshot of `article`.
    pub async fn publish(&self, article: &Article) -> Result<PathBuf, PublishError> {
        let dir = self.article_dir(&article.slug)?;
        let html = self.render(article)?;

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| PublishError::Io {
                path: dir.clone(),
                source,
            })?;

        let path = dir.join(SNAPSHOT_FILE);
        tokio::fs::write(&path, html)
            .await
            .map_err(|source| PublishError::Io {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(slug = %article.slug, path = %path.display(), "Snapshot written");
        Ok(path)
    }

    /// Remove the snapshot directory of `slug`. A missing directory is not an
    /// error.
    pub async fn unpublish(&self, slug: &str) -> Result<(), PublishError> {
        let dir = self.article_dir(slug)?;
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {
                tracing::debug!(slug, "Snapshot removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PublishError::Io { path: dir, source }),
        }
    }
}
