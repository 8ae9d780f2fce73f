//! Built-in site templates using the Tera template engine
//!
//! All templates are embedded in the binary. Autoescaping stays on for
//! every template; the only unescaped output is a post body, which is
//! trusted markup from the content source (see [`TrustedHtml`]).
//!
//! [`TrustedHtml`]: crate::content::TrustedHtml

use anyhow::Result;
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::{ContactConfig, SiteConfig, SocialLink};
use crate::content::{Author, Category, Post};
use crate::helpers::{
    category_path, date_iso, full_date, initial, post_path, time_ago, truncate, url_for,
};

/// Stylesheet served at `/assets/site.css`
pub const STYLESHEET: &str = include_str!("site/site.css");

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all site templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("home.html", include_str!("site/home.html")),
            ("post.html", include_str!("site/post.html")),
            ("category.html", include_str!("site/category.html")),
            ("search.html", include_str!("site/search.html")),
            ("about.html", include_str!("site/about.html")),
            ("contact.html", include_str!("site/contact.html")),
            ("admin.html", include_str!("site/admin.html")),
            ("loading.html", include_str!("site/loading.html")),
            ("not_found.html", include_str!("site/not_found.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("site/partials/header.html"),
            ),
            (
                "partials/footer.html",
                include_str!("site/partials/footer.html"),
            ),
            (
                "partials/post_card.html",
                include_str!("site/partials/post_card.html"),
            ),
            (
                "partials/featured_card.html",
                include_str!("site/partials/featured_card.html"),
            ),
        ])?;

        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    Ok(tera::Value::String(truncate(&s, length, Some(&omission))))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub root: String,
    pub studio_url: String,
    pub contact: ContactConfig,
    pub social: Vec<SocialLink>,
    pub links: SiteLinks,
    pub current_year: i32,
}

/// Fixed routes used by the layout and partials
#[derive(Debug, Clone, Serialize)]
pub struct SiteLinks {
    pub home: String,
    pub about: String,
    pub contact: String,
    pub admin: String,
    pub search: String,
    pub stylesheet: String,
}

impl SiteData {
    pub fn new(config: &SiteConfig, now: &DateTime<Utc>) -> Self {
        Self {
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            root: config.root.clone(),
            studio_url: config.cms.studio_url.clone(),
            contact: config.contact.clone(),
            social: config.social.clone(),
            links: SiteLinks {
                home: url_for(config, "/"),
                about: url_for(config, "/about"),
                contact: url_for(config, "/contact"),
                admin: url_for(config, "/admin"),
                search: url_for(config, "/search"),
                stylesheet: url_for(config, "/assets/site.css"),
            },
            current_year: now.year(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NavItem {
    pub name: String,
    pub path: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryData {
    pub title: String,
    pub slug: String,
    pub path: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub count: usize,
}

impl CategoryData {
    pub fn new(category: &Category, config: &SiteConfig, count: usize) -> Self {
        Self {
            title: category.title.clone(),
            slug: category.slug.clone(),
            path: category_path(config, &category.slug),
            description: category.description.clone(),
            color: category.color.clone(),
            count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorData {
    pub name: String,
    pub initial: String,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

impl AuthorData {
    pub fn new(author: &Author) -> Self {
        Self {
            name: author.name.clone(),
            initial: initial(&author.name, 'A'),
            image_url: author.image_url().map(str::to_string),
            bio: author.bio.clone().filter(|b| !b.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub id: String,
    pub title: String,
    pub path: String,
    pub initial: String,
    pub excerpt: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<CategoryData>,
    pub categories: Vec<CategoryData>,
    pub author: Option<AuthorData>,
    pub author_name: String,
    pub author_initial: String,
    pub published: bool,
    pub date_relative: String,
    pub date_iso: String,
    pub date_full: String,
    pub reading_minutes: usize,
    /// Trusted body markup, only set on the post page
    pub content: Option<String>,
}

impl PostData {
    /// Card data; relative dates are computed against `now`
    pub fn new(post: &Post, config: &SiteConfig, now: &DateTime<Utc>) -> Self {
        let date = post.display_date();
        let categories: Vec<CategoryData> = post
            .categories
            .iter()
            .map(|c| CategoryData::new(c, config, 0))
            .collect();
        let author = post.author.as_ref().map(AuthorData::new);
        let author_name = author
            .as_ref()
            .map(|a| a.name.clone())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "Anonymous".to_string());

        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            path: post_path(config, &post.slug),
            initial: initial(&post.title, '#'),
            excerpt: post.excerpt.clone().filter(|e| !e.trim().is_empty()),
            image_url: post.cover_url().map(str::to_string),
            category: post
                .primary_category()
                .map(|c| CategoryData::new(c, config, 0)),
            categories,
            author_initial: initial(&author_name, 'A'),
            author,
            author_name,
            published: post.is_published(),
            date_relative: time_ago(&date, now),
            date_iso: date_iso(&date),
            date_full: full_date(&date),
            reading_minutes: post.reading_minutes(),
            content: None,
        }
    }

    /// Page data including the body
    pub fn with_body(post: &Post, config: &SiteConfig, now: &DateTime<Utc>) -> Self {
        let mut data = Self::new(post, config, now);
        data.content = post
            .content
            .as_ref()
            .filter(|body| !body.is_empty())
            .map(|body| body.as_str().to_string());
        data
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FooterData {
    pub posts: Vec<NavPost>,
    pub categories: Vec<CategoryData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_renderer_loads_templates() {
        assert!(TemplateRenderer::new().is_ok());
    }

    #[test]
    fn test_truncate_chars_filter() {
        let mut args = HashMap::new();
        args.insert("length".to_string(), tera::Value::from(5));
        let out = truncate_chars_filter(&tera::Value::from("Hello World"), &args).unwrap();
        assert_eq!(out, tera::Value::from("Hello..."));
    }

    #[test]
    fn test_post_data_relative_dates() {
        let config = SiteConfig::default();
        let published: Post = serde_json::from_value(json!({
            "_id": "p1",
            "title": "Two days",
            "slug": { "current": "two-days" },
            "publishedAt": "2024-06-13T12:00:00Z",
            "_createdAt": "2024-06-01T00:00:00Z"
        }))
        .unwrap();
        let draft: Post = serde_json::from_value(json!({
            "_id": "p2",
            "title": "draft",
            "slug": { "current": "draft" },
            "_createdAt": "2024-06-15T11:00:00Z"
        }))
        .unwrap();

        let data = PostData::new(&published, &config, &now());
        assert_eq!(data.date_relative, "2 days ago");
        assert_eq!(data.path, "/post/two-days");
        assert_eq!(data.author_name, "Anonymous");
        assert!(data.content.is_none());

        let data = PostData::new(&draft, &config, &now());
        assert_eq!(data.date_relative, "1 hour ago");
        assert_eq!(data.initial, "D");
        assert!(!data.published);
    }
}
