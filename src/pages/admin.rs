use anyhow::Result;
use axum::http::StatusCode;
use chrono::Utc;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::{Page, Pages};
use crate::helpers::{author_count, category_counts, filter_posts, popular_categories, url_for};
use crate::templates::{CategoryData, NavItem};

/// Number of entries in the popular categories panel
const POPULAR_CATEGORIES: usize = 5;

/// Dashboard tab, selected with `?tab=`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdminTab {
    #[default]
    Posts,
    Categories,
    Analytics,
    Settings,
}

impl AdminTab {
    pub const ALL: [AdminTab; 4] = [
        AdminTab::Posts,
        AdminTab::Categories,
        AdminTab::Analytics,
        AdminTab::Settings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdminTab::Posts => "posts",
            AdminTab::Categories => "categories",
            AdminTab::Analytics => "analytics",
            AdminTab::Settings => "settings",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AdminTab::Posts => "Posts",
            AdminTab::Categories => "Categories",
            AdminTab::Analytics => "Analytics",
            AdminTab::Settings => "Settings",
        }
    }
}

impl FromStr for AdminTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdminTab::ALL
            .into_iter()
            .find(|tab| tab.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown tab: {}", s))
    }
}

impl fmt::Display for AdminTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Serialize)]
struct AdminStats {
    total_posts: usize,
    categories: usize,
    published: usize,
    authors: usize,
}

#[derive(Debug, Serialize)]
struct CmsData<'a> {
    project_id: &'a str,
    dataset: &'a str,
    api_version: &'a str,
}

impl Pages {
    /// Content dashboard with read-only stats and links to the studio
    pub async fn admin(&self, tab: AdminTab, filter: &str) -> Result<Page> {
        let filter = filter.trim();
        let path = url_for(&self.config, "/admin");
        let (posts, categories) = self.query_listings().await;
        let mut context = self.context_with_footer(&path, "", &posts, &categories);

        if posts.is_pending() {
            return self.loading(&mut context);
        }

        let now = Utc::now();
        let posts = posts.value().map(Vec::as_slice).unwrap_or_default();
        let categories = categories.value().map(Vec::as_slice).unwrap_or_default();

        let stats = AdminStats {
            total_posts: posts.len(),
            categories: categories.len(),
            published: posts.iter().filter(|p| p.is_published()).count(),
            authors: author_count(posts),
        };

        let tabs: Vec<NavItem> = AdminTab::ALL
            .iter()
            .map(|t| NavItem {
                name: t.label().to_string(),
                path: format!("{}?tab={}", path, t),
                active: *t == tab,
            })
            .collect();

        let counts = category_counts(posts);
        let category_rows: Vec<CategoryData> = categories
            .iter()
            .map(|c| {
                let count = counts.get(c.id.as_str()).copied().unwrap_or(0);
                CategoryData::new(c, &self.config, count)
            })
            .collect();
        let popular: Vec<CategoryData> = popular_categories(categories, posts, POPULAR_CATEGORIES)
            .into_iter()
            .map(|(c, count)| CategoryData::new(c, &self.config, count))
            .collect();

        let cms = &self.config.cms;
        context.insert("tab", tab.as_str());
        context.insert("tabs", &tabs);
        context.insert("admin_path", &path);
        context.insert("filter", filter);
        context.insert("stats", &stats);
        context.insert("posts", &self.post_cards(filter_posts(posts, filter), &now));
        context.insert("categories", &category_rows);
        context.insert("popular", &popular);
        context.insert(
            "cms",
            &CmsData {
                project_id: &cms.project_id,
                dataset: &cms.dataset,
                api_version: &cms.api_version,
            },
        );
        self.render("admin.html", &context, StatusCode::OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::FakeSource;
    use crate::pages::tests::{pages_with, sample_source};

    #[test]
    fn test_parse_tab() {
        assert_eq!("analytics".parse::<AdminTab>(), Ok(AdminTab::Analytics));
        assert_eq!("Settings".parse::<AdminTab>(), Ok(AdminTab::Settings));
        assert!("billing".parse::<AdminTab>().is_err());
        assert_eq!(AdminTab::default(), AdminTab::Posts);
        assert_eq!(AdminTab::Categories.to_string(), "categories");
    }

    #[tokio::test]
    async fn test_admin_posts_tab() {
        let pages = pages_with(sample_source().into_shared());

        let html = pages.admin(AdminTab::Posts, "").await.unwrap().html;
        assert!(html.contains("Admin Dashboard"));
        assert!(html.contains("Hello World"));
        assert!(html.contains("Second Post"));
        assert!(html.contains("Uncategorized"));
        assert!(html.contains("Edit in Sanity"));
    }

    #[tokio::test]
    async fn test_admin_filter_messages_differ() {
        let pages = pages_with(sample_source().into_shared());
        let html = pages.admin(AdminTab::Posts, "zzz").await.unwrap().html;
        assert!(html.contains("No posts found matching your search."));
        assert!(!html.contains("No posts yet."));

        let pages = pages_with(FakeSource::new().into_shared());
        let html = pages.admin(AdminTab::Posts, "").await.unwrap().html;
        assert!(html.contains("No posts yet. Create your first post in Sanity!"));
        assert!(!html.contains("No posts found matching your search."));
    }

    #[tokio::test]
    async fn test_admin_category_counts() {
        let pages = pages_with(sample_source().into_shared());

        let html = pages.admin(AdminTab::Categories, "").await.unwrap().html;
        assert!(html.contains("1 post<"));
        assert!(html.contains("0 posts"));

        let html = pages.admin(AdminTab::Analytics, "").await.unwrap().html;
        assert!(html.contains("Popular Categories"));
        assert!(html.contains("Content Overview"));
    }

    #[tokio::test]
    async fn test_admin_settings_without_project() {
        let pages = pages_with(FakeSource::new().into_shared());

        let html = pages.admin(AdminTab::Settings, "").await.unwrap().html;
        assert!(html.contains("CMS Settings"));
        assert!(html.contains("not configured"));
        assert!(html.contains("production"));
    }
}
