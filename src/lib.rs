//! codecraft: the CodeCraft Weekly blog, rendered on request from a headless CMS
//!
//! Content is read through [`content::ContentClient`] and kept in a
//! [`cache::QueryCache`]; [`pages::Pages`] composes it into HTML with the
//! embedded Tera templates and [`server`] serves the result.

pub mod cache;
pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;
pub mod pages;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cache::QueryCache;
use config::SiteConfig;
use content::{ContentClient, ContentSource, SanityClient};
use pages::Pages;

/// The main site application
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: Arc<SiteConfig>,
    /// Base directory
    pub base_dir: PathBuf,
    client: ContentClient,
    cache: QueryCache,
}

impl Site {
    /// Create a site from a directory, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            SiteConfig::load(&config_path)?
        } else {
            SiteConfig::default()
        };
        config.apply_env();

        if !config.cms.is_configured() {
            tracing::warn!(
                "No CMS project configured; set cms.project_id in _config.yml or SANITY_PROJECT_ID"
            );
        }

        let source = SanityClient::new(&config.cms)?;
        if let Some(endpoint) = source.endpoint() {
            tracing::debug!(endpoint, "Using content endpoint");
        }

        Ok(Self::with_source(config, base_dir, Arc::new(source)))
    }

    /// Create a site over any content source
    pub fn with_source(
        config: SiteConfig,
        base_dir: PathBuf,
        source: Arc<dyn ContentSource>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            base_dir,
            client: ContentClient::new(source),
            cache: QueryCache::new(),
        }
    }

    pub fn client(&self) -> &ContentClient {
        &self.client
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Page renderer sharing this site's client and cache
    pub fn pages(&self) -> Result<Pages> {
        Pages::new(
            Arc::clone(&self.config),
            self.client.clone(),
            self.cache.clone(),
        )
    }

    /// Serve the site until the process is stopped
    pub async fn serve(&self, ip: &str, port: u16, open: bool) -> Result<()> {
        server::start(self.pages()?, ip, port, open).await
    }
}
