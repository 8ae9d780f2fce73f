//! Page composition
//!
//! Each page declares the queries it needs, reads them through the
//! [`QueryCache`] and renders one of three states: a loading page while its
//! main query has no value yet, an empty or not-found state, or the full
//! content. Pages never fail because content could not be read; the only
//! error a page returns is a template failure.

mod about;
mod admin;
mod category;
mod contact;
mod home;
mod post;
mod search;

pub use admin::AdminTab;
pub use contact::ContactForm;

use anyhow::Result;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use chrono::{DateTime, Utc};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tera::Context;

use crate::cache::{QueryCache, QueryKey, QueryState};
use crate::config::SiteConfig;
use crate::content::{Category, ContentClient, Post};
use crate::helpers::{post_path, url_for};
use crate::templates::{
    CategoryData, FooterData, NavItem, NavPost, PostData, SiteData, TemplateRenderer,
};

/// Seconds between reloads of the loading page
const LOADING_REFRESH_SECS: u64 = 2;

/// A rendered page
#[derive(Debug)]
pub struct Page {
    pub status: StatusCode,
    pub html: String,
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        (self.status, Html(self.html)).into_response()
    }
}

/// Renders the site's pages from cached content
#[derive(Clone)]
pub struct Pages {
    config: Arc<SiteConfig>,
    client: ContentClient,
    cache: QueryCache,
    renderer: Arc<TemplateRenderer>,
    render_wait: Duration,
}

impl Pages {
    pub fn new(config: Arc<SiteConfig>, client: ContentClient, cache: QueryCache) -> Result<Self> {
        let render_wait = Duration::from_millis(config.server.render_wait_ms);
        Ok(Self {
            config,
            client,
            cache,
            renderer: Arc::new(TemplateRenderer::new()?),
            render_wait,
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Rendered for any path without a route
    pub fn not_found(&self, path: &str) -> Result<Page> {
        let mut context = self.context(path, "");
        context.insert("heading", "Page Not Found");
        context.insert(
            "message",
            "The page you're looking for doesn't exist or has been moved.",
        );
        self.render("not_found.html", &context, StatusCode::NOT_FOUND)
    }

    // Queries

    fn posts_key() -> QueryKey {
        QueryKey::new("posts")
    }

    fn categories_key() -> QueryKey {
        QueryKey::new("categories")
    }

    fn post_key(slug: &str) -> QueryKey {
        QueryKey::new("post").param(slug)
    }

    async fn query_posts(&self) -> QueryState<Vec<Post>> {
        let client = self.client.clone();
        self.cache
            .query(
                &Self::posts_key(),
                move || async move { Ok::<_, Infallible>(client.list_posts().await) },
                self.render_wait,
            )
            .await
    }

    async fn query_categories(&self) -> QueryState<Vec<Category>> {
        let client = self.client.clone();
        self.cache
            .query(
                &Self::categories_key(),
                move || async move { Ok::<_, Infallible>(client.list_categories().await) },
                self.render_wait,
            )
            .await
    }

    async fn query_post(&self, slug: &str) -> QueryState<Option<Post>> {
        let client = self.client.clone();
        let slug = slug.to_string();
        self.cache
            .query(
                &Self::post_key(&slug),
                move || async move { Ok::<_, Infallible>(client.get_post_by_slug(&slug).await) },
                self.render_wait,
            )
            .await
    }

    /// Posts and categories, both mounted before either is awaited
    async fn query_listings(&self) -> (QueryState<Vec<Post>>, QueryState<Vec<Category>>) {
        tokio::join!(self.query_posts(), self.query_categories())
    }

    /// Mounts the posts query without waiting, for pages that only show
    /// posts in the footer
    fn observe_posts(&self) -> QueryState<Vec<Post>> {
        let client = self.client.clone();
        self.cache.observe(&Self::posts_key(), move || async move {
            Ok::<_, Infallible>(client.list_posts().await)
        })
    }

    fn observe_categories(&self) -> QueryState<Vec<Category>> {
        let client = self.client.clone();
        self.cache.observe(&Self::categories_key(), move || async move {
            Ok::<_, Infallible>(client.list_categories().await)
        })
    }

    // Rendering

    /// Context shared by every page
    fn context(&self, path: &str, search_term: &str) -> Context {
        let mut context = Context::new();
        context.insert("site", &SiteData::new(&self.config, &Utc::now()));
        context.insert("nav", &self.nav(path));
        context.insert("search_term", search_term);
        context.insert("footer", &FooterData::default());
        context
    }

    /// Context with the footer filled from the given query states
    fn context_with_footer(
        &self,
        path: &str,
        search_term: &str,
        posts: &QueryState<Vec<Post>>,
        categories: &QueryState<Vec<Category>>,
    ) -> Context {
        let mut context = self.context(path, search_term);
        context.insert("footer", &self.footer(posts, categories));
        context
    }

    fn nav(&self, path: &str) -> Vec<NavItem> {
        [("Home", "/"), ("About", "/about"), ("Contact", "/contact")]
            .into_iter()
            .map(|(name, route)| {
                let route = url_for(&self.config, route);
                NavItem {
                    name: name.to_string(),
                    active: route == path,
                    path: route,
                }
            })
            .collect()
    }

    fn footer(
        &self,
        posts: &QueryState<Vec<Post>>,
        categories: &QueryState<Vec<Category>>,
    ) -> FooterData {
        let posts = posts
            .value()
            .map(|posts| {
                posts
                    .iter()
                    .take(self.config.footer_posts)
                    .map(|post| NavPost {
                        title: post.title.clone(),
                        path: post_path(&self.config, &post.slug),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let categories = categories
            .value()
            .map(|categories| {
                categories
                    .iter()
                    .map(|c| CategoryData::new(c, &self.config, 0))
                    .collect()
            })
            .unwrap_or_default();

        FooterData { posts, categories }
    }

    fn post_cards<'a>(
        &self,
        posts: impl IntoIterator<Item = &'a Post>,
        now: &DateTime<Utc>,
    ) -> Vec<PostData> {
        posts
            .into_iter()
            .map(|post| PostData::new(post, &self.config, now))
            .collect()
    }

    /// Page shown while a page's main query has no value yet
    fn loading(&self, context: &mut Context) -> Result<Page> {
        context.insert("refresh_secs", &LOADING_REFRESH_SECS);
        self.render("loading.html", context, StatusCode::OK)
    }

    fn render(&self, template: &str, context: &Context, status: StatusCode) -> Result<Page> {
        let html = self.renderer.render(template, context)?;
        Ok(Page { status, html })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::content::testing::{category_json, post_json, FakeSource};

    /// Pages over a fake source with a short render wait
    pub(crate) fn pages_with(source: Arc<FakeSource>) -> Pages {
        let mut config = SiteConfig::default();
        config.server.render_wait_ms = 2000;
        Pages::new(
            Arc::new(config),
            ContentClient::new(source),
            QueryCache::new(),
        )
        .unwrap()
    }

    pub(crate) fn sample_source() -> FakeSource {
        let mut featured = post_json("hello-world", "Hello World", Some("2024-03-01T09:00:00Z"));
        featured["categories"] = serde_json::json!([category_json("tech", "Technology", "tech")]);
        FakeSource::new()
            .with_posts(vec![
                featured,
                post_json("second-post", "Second Post", Some("2024-02-01T09:00:00Z")),
                post_json("unpublished", "Unpublished Draft", None),
            ])
            .with_categories(vec![
                category_json("tech", "Technology", "tech"),
                category_json("design", "Design", "design"),
            ])
    }

    #[tokio::test]
    async fn test_not_found_page() {
        let pages = pages_with(FakeSource::new().into_shared());
        let page = pages.not_found("/nope").unwrap();
        assert_eq!(page.status, StatusCode::NOT_FOUND);
        assert!(page.html.contains("Page Not Found"));
    }

    #[tokio::test]
    async fn test_nav_marks_active_route() {
        let pages = pages_with(FakeSource::new().into_shared());
        let nav = pages.nav("/about");
        let active: Vec<_> = nav.iter().filter(|n| n.active).map(|n| n.name.as_str()).collect();
        assert_eq!(active, vec!["About"]);
    }

    #[tokio::test]
    async fn test_footer_limits_recent_posts() {
        let source = FakeSource::new()
            .with_posts(
                (0..8)
                    .map(|i| {
                        post_json(
                            &format!("post-{}", i),
                            &format!("Post {}", i),
                            Some("2024-01-01T00:00:00Z"),
                        )
                    })
                    .collect(),
            )
            .into_shared();
        let pages = pages_with(source);

        let posts = pages.query_posts().await;
        let footer = pages.footer(&posts, &QueryState::Pending);
        assert_eq!(footer.posts.len(), pages.config().footer_posts);
        assert!(footer.categories.is_empty());
    }
}
