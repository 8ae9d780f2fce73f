//! Client-side title search over already fetched content

use crate::content::{Category, Post};

/// Case-insensitive substring match; an empty term matches everything
pub fn matches_term(text: &str, term: &str) -> bool {
    let term = term.trim();
    term.is_empty() || text.to_lowercase().contains(&term.to_lowercase())
}

/// Posts whose title contains `term`
pub fn filter_posts<'a>(posts: &'a [Post], term: &str) -> Vec<&'a Post> {
    posts.iter().filter(|p| matches_term(&p.title, term)).collect()
}

/// Categories whose title contains `term`
pub fn filter_categories<'a>(categories: &'a [Category], term: &str) -> Vec<&'a Category> {
    categories
        .iter()
        .filter(|c| matches_term(&c.title, term))
        .collect()
}
