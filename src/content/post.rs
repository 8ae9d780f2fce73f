//! Post, Category and Author models
//!
//! These are read-only snapshots of records owned by the content source.
//! Field names follow the source's document shape on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use super::TrustedHtml;
use crate::helpers::strip_html;

/// Reading time shown when a post's body was not fetched
const DEFAULT_READING_MINUTES: usize = 5;

/// Words per minute used for reading time estimates
const WORDS_PER_MINUTE: usize = 200;

/// A blog post
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,

    /// Post title
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,

    /// URL slug
    #[serde(default, deserialize_with = "slug_current")]
    pub slug: String,

    /// Rich body, only present on single-post lookups
    #[serde(default)]
    pub content: Option<TrustedHtml>,

    #[serde(default)]
    pub excerpt: Option<String>,

    /// Cover image
    #[serde(default)]
    pub main_image: Option<Image>,

    /// Publication date, absent for drafts
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "present_only")]
    pub categories: Vec<Category>,

    #[serde(default)]
    pub author: Option<Author>,

    #[serde(rename = "_createdAt")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "_updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Date used for ordering and display: publication date, else creation date
    pub fn display_date(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(self.created_at)
    }

    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }

    /// Cover image URL if the asset was resolved
    pub fn cover_url(&self) -> Option<&str> {
        self.main_image.as_ref().and_then(Image::url)
    }

    /// First category, used for badges
    pub fn primary_category(&self) -> Option<&Category> {
        self.categories.first()
    }

    pub fn in_category(&self, slug: &str) -> bool {
        self.categories.iter().any(|c| c.slug == slug)
    }

    /// Estimated minutes to read the body
    pub fn reading_minutes(&self) -> usize {
        match &self.content {
            Some(body) if !body.is_empty() => {
                let words = strip_html(body.as_str()).split_whitespace().count();
                words.div_ceil(WORDS_PER_MINUTE).max(1)
            }
            _ => DEFAULT_READING_MINUTES,
        }
    }
}

/// A post category
#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,

    /// Display name
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,

    #[serde(default, deserialize_with = "slug_current")]
    pub slug: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Badge color, e.g. `#3B82F6`
    #[serde(default)]
    pub color: Option<String>,
}

/// A post author
#[derive(Debug, Clone, Deserialize)]
pub struct Author {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default, deserialize_with = "null_default")]
    pub name: String,

    #[serde(default, deserialize_with = "slug_current")]
    pub slug: String,

    #[serde(default)]
    pub image: Option<Image>,

    #[serde(default)]
    pub bio: Option<String>,
}

impl Author {
    pub fn image_url(&self) -> Option<&str> {
        self.image.as_ref().and_then(Image::url)
    }
}

/// An image reference with its resolved asset
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub asset: Option<ImageAsset>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageAsset {
    #[serde(default)]
    pub url: Option<String>,
}

impl Image {
    pub fn url(&self) -> Option<&str> {
        self.asset
            .as_ref()
            .and_then(|a| a.url.as_deref())
            .filter(|u| !u.is_empty())
    }
}

/// Slugs arrive as `{ "current": "..." }`; plain strings are accepted too
fn slug_current<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Document { current: Option<String> },
        Plain(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Document { current }) => current.unwrap_or_default(),
        Some(Raw::Plain(slug)) => slug,
        None => String::new(),
    })
}

fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Dereferenced arrays hold `null` for dangling references
fn present_only<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items = Option::<Vec<Option<T>>>::deserialize(deserializer)?;
    Ok(items.unwrap_or_default().into_iter().flatten().collect())
}
