//! Handlebars-backed [`SignatureRenderer`]

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dirsync_core::{RenderError, SignatureRenderer, UserProfile};
use handlebars::Handlebars;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

pub const TEMPLATE_EXTENSION: &str = "hbs";

/// Errors while preloading a template folder
#[derive(Debug, Error)]
pub enum TemplateLoadError {
    #[error("Cannot read template folder {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid template '{name}': {message}")]
    Syntax { name: String, message: String },
}

/// Values a signature template can reference
#[derive(Debug, Clone, Serialize)]
pub struct SignatureContext<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub title: &'a str,
    pub phone: Option<&'a str>,
}

impl<'a> From<&'a UserProfile> for SignatureContext<'a> {
    fn from(profile: &'a UserProfile) -> Self {
        Self {
            email: &profile.email,
            name: &profile.full_name,
            title: &profile.title,
            phone: profile.phone.as_deref(),
        }
    }
}

/// Renders signatures from `<folder>/<style>.hbs`, compiling each template
/// once on first use
///
/// Field values are HTML-escaped; template markup is emitted as written.
pub struct HandlebarsSignatureRenderer {
    folder: PathBuf,
    registry: RwLock<Handlebars<'static>>,
}

impl HandlebarsSignatureRenderer {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        Self {
            folder: folder.into(),
            registry: RwLock::new(registry),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Register a template from memory under `style`
    pub async fn register(&self, style: &str, source: &str) -> Result<(), TemplateLoadError> {
        self.registry
            .write()
            .await
            .register_template_string(style, source)
            .map_err(|e| TemplateLoadError::Syntax {
                name: style.to_string(),
                message: e.to_string(),
            })
    }

    /// Compile every `.hbs` file in the folder up front, returning the
    /// number of templates loaded
    pub async fn preload(&self) -> Result<usize, TemplateLoadError> {
        let io_error = |source: std::io::Error| TemplateLoadError::Io {
            path: self.folder.clone(),
            source,
        };

        let mut entries = tokio::fs::read_dir(&self.folder).await.map_err(io_error)?;
        let mut loaded = 0;
        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(TEMPLATE_EXTENSION) {
                continue;
            }
            let Some(style) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let source = tokio::fs::read_to_string(&path).await.map_err(io_error)?;
            self.register(style, &source).await?;
            loaded += 1;
        }

        debug!(folder = %self.folder.display(), loaded, "Preloaded signature templates");
        Ok(loaded)
    }

    /// Make sure `style` is registered, reading it from disk if needed
    async fn ensure_loaded(&self, style: &str) -> Result<(), RenderError> {
        if !is_plain_name(style) {
            return Err(RenderError::TemplateNotFound(style.to_string()));
        }
        if self.registry.read().await.has_template(style) {
            return Ok(());
        }

        let path = self.folder.join(format!("{}.{}", style, TEMPLATE_EXTENSION));
        let source = match tokio::fs::read_to_string(&path).await {
            Ok(source) => source,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(RenderError::TemplateNotFound(style.to_string()));
            }
            Err(e) => {
                return Err(RenderError::Render(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        self.register(style, &source)
            .await
            .map_err(|e| RenderError::Render(e.to_string()))
    }
}

/// Style keys name a file directly inside the folder
fn is_plain_name(style: &str) -> bool {
    !style.is_empty() && style != "." && style != ".." && !style.contains('/') && !style.contains('\\')
}

#[async_trait]
impl SignatureRenderer for HandlebarsSignatureRenderer {
    async fn render(&self, profile: &UserProfile) -> Result<String, RenderError> {
        self.ensure_loaded(&profile.style_key).await?;

        let context = SignatureContext::from(profile);
        self.registry
            .read()
            .await
            .render(&profile.style_key, &context)
            .map_err(|e| {
                warn!(user = %profile.email, style = %profile.style_key, error = %e, "Signature render failed");
                RenderError::Render(e.to_string())
            })
    }
}
