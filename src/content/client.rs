//! Content client - the site's only way of reading content
//!
//! [`ContentClient`] exposes the three reads the site needs. The `try_*`
//! methods report failures; the plain methods degrade to an empty or absent
//! result and log the error, so pages never see a failure. A missing record
//! and a failed lookup are therefore indistinguishable to pages.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use super::{groq, Category, ContentError, Post};

/// A read-only query endpoint of a content source
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Run a GROQ query with string parameters and return its `result`
    async fn query(
        &self,
        query: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, ContentError>;
}

/// Typed reads over a [`ContentSource`]
#[derive(Clone)]
pub struct ContentClient {
    source: Arc<dyn ContentSource>,
}

impl ContentClient {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }

    /// Published posts, newest first
    pub async fn try_list_posts(&self) -> Result<Vec<Post>, ContentError> {
        let result = self.source.query(groq::POSTS, &[]).await?;
        let mut posts: Vec<Post> = decode_list(result, "post")?
            .into_iter()
            .filter(Post::is_published)
            .collect();

        // Stable, so equal dates keep the source's order
        posts.sort_by(|a, b| b.display_date().cmp(&a.display_date()));
        Ok(posts)
    }

    /// The post with the given slug, with its body
    pub async fn try_get_post_by_slug(&self, slug: &str) -> Result<Option<Post>, ContentError> {
        let result = self
            .source
            .query(groq::POST_BY_SLUG, &[("slug", slug)])
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(result)?))
    }

    /// All categories ordered by title
    pub async fn try_list_categories(&self) -> Result<Vec<Category>, ContentError> {
        let result = self.source.query(groq::CATEGORIES, &[]).await?;
        let mut categories: Vec<Category> = decode_list(result, "category")?;
        categories.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(categories)
    }

    /// Published posts, or an empty list if the source could not be read
    pub async fn list_posts(&self) -> Vec<Post> {
        self.try_list_posts().await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Error fetching posts");
            Vec::new()
        })
    }

    /// The post with the given slug, or `None` if missing or unreadable
    pub async fn get_post_by_slug(&self, slug: &str) -> Option<Post> {
        self.try_get_post_by_slug(slug).await.unwrap_or_else(|e| {
            tracing::error!(error = %e, slug, "Error fetching post");
            None
        })
    }

    /// All categories, or an empty list if the source could not be read
    pub async fn list_categories(&self) -> Vec<Category> {
        self.try_list_categories().await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Error fetching categories");
            Vec::new()
        })
    }
}

/// Decode an array result record by record, skipping malformed records
fn decode_list<T: DeserializeOwned>(
    result: serde_json::Value,
    kind: &str,
) -> Result<Vec<T>, ContentError> {
    let records: Option<Vec<serde_json::Value>> = serde_json::from_value(result)?;
    let records = records.unwrap_or_default();

    let mut items = Vec::with_capacity(records.len());
    for record in records {
        match serde_json::from_value(record) {
            Ok(item) => items.push(item),
            Err(e) => tracing::warn!("Skipping malformed {} record: {}", kind, e),
        }
    }
    Ok(items)
}
