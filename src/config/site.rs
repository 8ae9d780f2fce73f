//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Listing sizes
    pub recent_posts: usize,
    pub related_posts: usize,
    pub footer_posts: usize,

    // Static page content
    #[serde(default)]
    pub contact: ContactConfig,
    #[serde(default)]
    pub social: Vec<SocialLink>,

    // Content source
    #[serde(default)]
    pub cms: CmsConfig,

    // HTTP server
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "CodeCraft Weekly".to_string(),
            subtitle: "Craft Your Digital Story".to_string(),
            description: "Sharing insights on technology, design, and modern development practices."
                .to_string(),
            author: "CodeCraft Team".to_string(),
            language: "en".to_string(),

            url: "http://localhost:4000".to_string(),
            root: "/".to_string(),

            recent_posts: 6,
            related_posts: 3,
            footer_posts: 5,

            contact: ContactConfig::default(),
            social: vec![
                SocialLink::new("Twitter", "https://twitter.com"),
                SocialLink::new("GitHub", "https://github.com"),
                SocialLink::new("LinkedIn", "https://linkedin.com"),
            ],

            cms: CmsConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("failed to read {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse {:?}", path))?;
        Ok(config)
    }

    /// Apply `SANITY_*` environment overrides on top of the file values
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(project_id) = non_empty("SANITY_PROJECT_ID") {
            self.cms.project_id = project_id;
        }
        if let Some(dataset) = non_empty("SANITY_DATASET") {
            self.cms.dataset = dataset;
        }
        if let Some(token) = non_empty("SANITY_TOKEN") {
            tracing::debug!("Using read token from SANITY_TOKEN");
            self.cms.token = Some(token);
        }
    }
}

/// Headless CMS connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    pub project_id: String,
    pub dataset: String,
    pub api_version: String,
    pub use_cdn: bool,
    /// Read-only API token. Never a write token.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Query endpoint override, e.g. a self-hosted proxy
    pub endpoint: Option<String>,
    /// Authoring studio opened from the admin dashboard
    pub studio_url: String,
    /// Request timeout in seconds, 0 disables it
    pub timeout_secs: u64,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            dataset: "production".to_string(),
            api_version: "2023-05-03".to_string(),
            use_cdn: true,
            token: None,
            endpoint: None,
            studio_url: "https://your-project-id.sanity.studio".to_string(),
            timeout_secs: 0,
        }
    }
}

impl CmsConfig {
    /// Whether enough is configured to reach a content source
    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some() || !self.project_id.trim().is_empty()
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
    /// How long a page waits for a first result before rendering its loading state
    pub render_wait_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 4000,
            render_wait_ms: 3000,
        }
    }
}

/// Contact details shown on the contact page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub email: String,
    pub phone: String,
    pub office: String,
    pub hours: Vec<String>,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            email: "hello@codecraftweekly.com".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            office: "123 Innovation Street, San Francisco, CA 94107".to_string(),
            hours: vec![
                "Monday - Friday: 9:00 AM - 6:00 PM".to_string(),
                "Saturday: 10:00 AM - 4:00 PM".to_string(),
                "Sunday: Closed".to_string(),
            ],
        }
    }
}

/// A social profile link for the footer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialLink {
    pub name: String,
    pub url: String,
}

impl SocialLink {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}
