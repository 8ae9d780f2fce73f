//! Content module - models and the read-only client for the content source

mod body;
mod client;
mod error;
pub mod groq;
mod post;
mod sanity;

#[cfg(test)]
pub(crate) mod testing;

pub use body::TrustedHtml;
pub use client::{ContentClient, ContentSource};
pub use error::ContentError;
pub use post::{Author, Category, Image, ImageAsset, Post};
pub use sanity::SanityClient;
