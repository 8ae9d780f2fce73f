//! List site content

use anyhow::{Context, Result};
use std::fmt::Write;

use crate::content::ContentClient;
use crate::helpers::category_counts;
use crate::Site;

/// List site content by type
pub async fn run(site: &Site, content_type: &str) -> Result<()> {
    print!("{}", listing(site.client(), content_type).await?);
    Ok(())
}

/// Render the listing for `content_type`; read failures are reported
pub async fn listing(client: &ContentClient, content_type: &str) -> Result<String> {
    let mut out = String::new();

    match content_type {
        "post" | "posts" => {
            let posts = client
                .try_list_posts()
                .await
                .context("failed to list posts")?;
            writeln!(out, "Posts ({}):", posts.len())?;
            for post in posts {
                writeln!(
                    out,
                    "  {} - {} [{}]",
                    post.display_date().format("%Y-%m-%d"),
                    post.title,
                    post.slug
                )?;
            }
        }
        "category" | "categories" => {
            let categories = client
                .try_list_categories()
                .await
                .context("failed to list categories")?;
            let posts = client
                .try_list_posts()
                .await
                .context("failed to list posts")?;
            let counts = category_counts(&posts);

            writeln!(out, "Categories ({}):", categories.len())?;
            for category in &categories {
                let count = counts.get(category.id.as_str()).copied().unwrap_or(0);
                writeln!(out, "  {} ({}) [{}]", category.title, count, category.slug)?;
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, category",
                content_type
            );
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::{category_json, post_json, FakeSource};

    fn client(source: FakeSource) -> ContentClient {
        ContentClient::new(source.into_shared())
    }

    #[tokio::test]
    async fn test_list_posts() {
        let source = FakeSource::new().with_posts(vec![
            post_json("older", "Older", Some("2024-01-01T00:00:00Z")),
            post_json("newer", "Newer", Some("2024-02-01T00:00:00Z")),
            post_json("draft", "Draft", None),
        ]);

        let out = listing(&client(source), "posts").await.unwrap();
        assert_eq!(
            out,
            "Posts (2):\n  2024-02-01 - Newer [newer]\n  2024-01-01 - Older [older]\n"
        );
    }

    #[tokio::test]
    async fn test_list_categories_with_counts() {
        let mut post = post_json("p", "P", Some("2024-01-01T00:00:00Z"));
        post["categories"] = serde_json::json!([category_json("tech", "Technology", "tech")]);
        let source = FakeSource::new()
            .with_posts(vec![post])
            .with_categories(vec![
                category_json("tech", "Technology", "tech"),
                category_json("design", "Design", "design"),
            ]);

        let out = listing(&client(source), "category").await.unwrap();
        assert_eq!(
            out,
            "Categories (2):\n  Design (0) [design]\n  Technology (1) [tech]\n"
        );
    }

    #[tokio::test]
    async fn test_list_fails_loudly() {
        let err = listing(&client(FakeSource::new().failing()), "posts")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to list posts"));

        let err = listing(&client(FakeSource::new()), "tags")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unknown type: tags"));
    }
}
