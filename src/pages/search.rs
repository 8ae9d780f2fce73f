use anyhow::Result;
use axum::http::StatusCode;
use chrono::Utc;

use super::{Page, Pages};
use crate::helpers::{filter_categories, filter_posts, url_for};
use crate::templates::CategoryData;

impl Pages {
    /// Title search over the cached posts and categories
    pub async fn search(&self, term: &str) -> Result<Page> {
        let term = term.trim();
        let path = url_for(&self.config, "/search");
        let (posts, categories) = self.query_listings().await;
        let mut context = self.context_with_footer(&path, term, &posts, &categories);

        if posts.is_pending() {
            return self.loading(&mut context);
        }

        let (results, matching_categories) = if term.is_empty() {
            (Vec::new(), Vec::new())
        } else {
            let now = Utc::now();
            let posts = posts.value().map(Vec::as_slice).unwrap_or_default();
            let categories = categories.value().map(Vec::as_slice).unwrap_or_default();
            (
                self.post_cards(filter_posts(posts, term), &now),
                filter_categories(categories, term)
                    .into_iter()
                    .map(|c| CategoryData::new(c, &self.config, 0))
                    .collect(),
            )
        };

        tracing::debug!(term, results = results.len(), "Search");
        context.insert("results", &results);
        context.insert("matching_categories", &matching_categories);
        self.render("search.html", &context, StatusCode::OK)
    }
}
