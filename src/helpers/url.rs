//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

/// Characters left alone in a path segment
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Generate a URL with the root path
///
/// The root itself has no trailing slash unless it is `/`.
///
/// # Examples
/// ```ignore
/// url_for(&config, "/about") // -> "/blog/about"
/// url_for(&config, "/") // -> "/blog"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        if root.is_empty() {
            "/".to_string()
        } else {
            root.to_string()
        }
    } else {
        format!("{}/{}", root, path)
    }
}

/// Encode a single path segment
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Path of a post detail page
pub fn post_path(config: &SiteConfig, slug: &str) -> String {
    url_for(config, &format!("post/{}", encode_segment(slug)))
}

/// Path of a category listing
pub fn category_path(config: &SiteConfig, slug: &str) -> String {
    url_for(config, &format!("category/{}", encode_segment(slug)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.root = "/blog/".to_string();
        config
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/about"), "/blog/about");
        assert_eq!(url_for(&config, ""), "/blog");
        assert_eq!(url_for(&config, "/"), "/blog");
        assert_eq!(url_for(&SiteConfig::default(), "/"), "/");
    }

    #[test]
    fn test_content_paths() {
        let config = SiteConfig::default();
        assert_eq!(post_path(&config, "hello-world"), "/post/hello-world");
        assert_eq!(post_path(&config, "a b/c"), "/post/a%20b%2Fc");
        assert_eq!(category_path(&config, "ui-ux"), "/category/ui-ux");
    }
}
