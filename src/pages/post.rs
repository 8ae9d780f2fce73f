use anyhow::Result;
use axum::http::StatusCode;
use chrono::Utc;

use super::{Page, Pages};
use crate::helpers::post_path;
use crate::templates::PostData;

impl Pages {
    /// Post detail page
    ///
    /// A post that does not exist and a post that could not be fetched render
    /// the same not-found page.
    pub async fn post(&self, slug: &str) -> Result<Page> {
        let path = post_path(&self.config, slug);
        let (post, posts) = tokio::join!(self.query_post(slug), self.query_posts());
        let categories = self.observe_categories();
        let mut context = self.context_with_footer(&path, "", &posts, &categories);

        if post.is_pending() {
            return self.loading(&mut context);
        }

        let Some(post) = post.value().and_then(Option::as_ref) else {
            context.insert("heading", "Post Not Found");
            context.insert(
                "message",
                "The post you're looking for doesn't exist or has been removed.",
            );
            return self.render("not_found.html", &context, StatusCode::NOT_FOUND);
        };

        let now = Utc::now();
        let related = self.post_cards(
            posts
                .value()
                .into_iter()
                .flatten()
                .filter(|p| p.id != post.id)
                .take(self.config.related_posts),
            &now,
        );

        context.insert("post", &PostData::with_body(post, &self.config, &now));
        context.insert("related", &related);
        self.render("post.html", &context, StatusCode::OK)
    }
}
