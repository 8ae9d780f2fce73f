//! List helpers for category tallies and author counts

use std::collections::{HashMap, HashSet};

use crate::content::{Category, Post};

/// Number of posts in each category, keyed by category id
pub fn category_counts(posts: &[Post]) -> HashMap<&str, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for post in posts {
        // A post listing a category twice still counts once
        let ids: HashSet<&str> = post.categories.iter().map(|c| c.id.as_str()).collect();
        for id in ids {
            *counts.entry(id).or_insert(0) += 1;
        }
    }

    counts
}

/// Categories with their post counts, most used first, ties by title
pub fn popular_categories<'a>(
    categories: &'a [Category],
    posts: &[Post],
    limit: usize,
) -> Vec<(&'a Category, usize)> {
    let counts = category_counts(posts);

    let mut ranked: Vec<_> = categories
        .iter()
        .map(|c| (c, counts.get(c.id.as_str()).copied().unwrap_or(0)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.title.cmp(&b.0.title)));
    ranked.truncate(limit);
    ranked
}

/// Number of distinct authors across posts
pub fn author_count(posts: &[Post]) -> usize {
    posts
        .iter()
        .filter_map(|p| p.author.as_ref())
        .map(|a| a.id.as_str())
        .collect::<HashSet<_>>()
        .len()
}
