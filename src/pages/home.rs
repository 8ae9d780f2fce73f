use anyhow::Result;
use axum::http::StatusCode;
use chrono::Utc;

use super::{Page, Pages};
use crate::helpers::url_for;
use crate::templates::{CategoryData, PostData};

impl Pages {
    /// Home page: newest post featured, the next few as latest articles
    pub async fn home(&self) -> Result<Page> {
        let path = url_for(&self.config, "/");
        let (posts, categories) = self.query_listings().await;
        let mut context = self.context_with_footer(&path, "", &posts, &categories);

        if posts.is_pending() {
            return self.loading(&mut context);
        }

        let now = Utc::now();
        let posts = posts.value().map(Vec::as_slice).unwrap_or_default();
        let featured = posts
            .first()
            .map(|post| PostData::new(post, &self.config, &now));
        let recent = self.post_cards(posts.iter().skip(1).take(self.config.recent_posts), &now);
        let categories: Vec<CategoryData> = categories
            .value()
            .map(|categories| {
                categories
                    .iter()
                    .map(|c| CategoryData::new(c, &self.config, 0))
                    .collect()
            })
            .unwrap_or_default();

        context.insert("posts_count", &posts.len());
        context.insert("featured", &featured);
        context.insert("recent", &recent);
        context.insert("categories", &categories);
        self.render("home.html", &context, StatusCode::OK)
    }
}
