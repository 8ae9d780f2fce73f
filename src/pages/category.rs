use anyhow::Result;
use axum::http::StatusCode;
use chrono::Utc;

use super::{Page, Pages};
use crate::helpers::category_path;
use crate::templates::CategoryData;

impl Pages {
    /// Posts filed under one category, filtered from the cached post list
    pub async fn category(&self, slug: &str) -> Result<Page> {
        let path = category_path(&self.config, slug);
        let (posts, categories) = self.query_listings().await;
        let mut context = self.context_with_footer(&path, "", &posts, &categories);

        if posts.is_pending() {
            return self.loading(&mut context);
        }

        let posts: Vec<_> = posts
            .value()
            .into_iter()
            .flatten()
            .filter(|p| p.in_category(slug))
            .collect();

        // Fall back to the reference embedded in a post when the category
        // list is unavailable
        let category = categories
            .value()
            .into_iter()
            .flatten()
            .find(|c| c.slug == slug)
            .or_else(|| {
                posts
                    .iter()
                    .copied()
                    .flat_map(|p| p.categories.iter())
                    .find(|c| c.slug == slug)
            });

        let Some(category) = category else {
            context.insert("heading", "Category Not Found");
            context.insert("message", "There is no category with that name.");
            return self.render("not_found.html", &context, StatusCode::NOT_FOUND);
        };

        let now = Utc::now();
        context.insert(
            "category",
            &CategoryData::new(category, &self.config, posts.len()),
        );
        context.insert("posts", &self.post_cards(posts.iter().copied(), &now));
        self.render("category.html", &context, StatusCode::OK)
    }
}
