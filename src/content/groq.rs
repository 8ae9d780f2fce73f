//! GROQ queries issued against the content source
//!
//! These three queries are the only reads the site performs.

/// Published posts, newest first, without bodies
pub const POSTS: &str = r#"*[_type == "post" && defined(publishedAt)] | order(publishedAt desc) {
  _id,
  title,
  slug,
  excerpt,
  mainImage { asset-> { url } },
  publishedAt,
  categories[]-> { _id, title, slug, description, color },
  author-> { _id, name, slug, image { asset-> { url } } },
  _createdAt,
  _updatedAt
}"#;

/// A single post by slug, including its body and the author's bio.
/// Takes the `$slug` parameter.
pub const POST_BY_SLUG: &str = r#"*[_type == "post" && slug.current == $slug][0] {
  _id,
  title,
  slug,
  content,
  excerpt,
  mainImage { asset-> { url } },
  publishedAt,
  categories[]-> { _id, title, slug, description, color },
  author-> { _id, name, slug, image { asset-> { url } }, bio },
  _createdAt,
  _updatedAt
}"#;

/// All categories by title
pub const CATEGORIES: &str = r#"*[_type == "category"] | order(title asc) {
  _id,
  title,
  slug,
  description,
  color
}"#;
