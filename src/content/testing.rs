//! In-memory content source for tests

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{groq, ContentError, ContentSource};

/// Answers the site's three queries from fixed documents and counts calls
#[derive(Default)]
pub struct FakeSource {
    posts: Mutex<Vec<Value>>,
    categories: Mutex<Vec<Value>>,
    calls: Mutex<HashMap<String, usize>>,
    failing: bool,
    hanging: bool,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(self, posts: Vec<Value>) -> Self {
        *self.posts.lock().unwrap() = posts;
        self
    }

    pub fn with_categories(self, categories: Vec<Value>) -> Self {
        *self.categories.lock().unwrap() = categories;
        self
    }

    /// Every query fails with a server error
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Every query never resolves
    pub fn hanging(mut self) -> Self {
        self.hanging = true;
        self
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn replace_posts(&self, posts: Vec<Value>) {
        *self.posts.lock().unwrap() = posts;
    }

    /// Number of times `query` was issued
    pub fn calls(&self, query: &str) -> usize {
        self.calls.lock().unwrap().get(query).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl ContentSource for FakeSource {
    async fn query(&self, query: &str, params: &[(&str, &str)]) -> Result<Value, ContentError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(query.to_string())
            .or_insert(0) += 1;

        if self.hanging {
            std::future::pending::<()>().await;
        }
        if self.failing {
            return Err(ContentError::Status {
                status: 500,
                message: "backend unavailable".to_string(),
            });
        }

        match query {
            groq::POSTS => Ok(Value::Array(self.posts.lock().unwrap().clone())),
            groq::CATEGORIES => Ok(Value::Array(self.categories.lock().unwrap().clone())),
            groq::POST_BY_SLUG => {
                let slug = params
                    .iter()
                    .find(|(name, _)| *name == "slug")
                    .map(|(_, value)| *value)
                    .unwrap_or_default();
                let post = self
                    .posts
                    .lock()
                    .unwrap()
                    .iter()
                    .find(|p| p["slug"]["current"] == slug)
                    .cloned();
                Ok(post.unwrap_or(Value::Null))
            }
            other => panic!("unexpected query: {}", other),
        }
    }
}

/// A post document in the source's shape
pub fn post_json(slug: &str, title: &str, published_at: Option<&str>) -> Value {
    json!({
        "_id": format!("post-{}", slug),
        "title": title,
        "slug": { "current": slug },
        "excerpt": format!("About {}", title),
        "content": format!("<p>{} body</p>", title),
        "publishedAt": published_at,
        "categories": [],
        "author": { "_id": "author-1", "name": "Alex Johnson", "slug": { "current": "alex" } },
        "_createdAt": "2023-12-01T00:00:00Z",
        "_updatedAt": "2023-12-01T00:00:00Z"
    })
}

/// A category document in the source's shape
pub fn category_json(id: &str, title: &str, slug: &str) -> Value {
    json!({
        "_id": id,
        "title": title,
        "slug": { "current": slug },
        "description": format!("All about {}", title)
    })
}
