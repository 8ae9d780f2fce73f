//! Helper functions for pages and templates

mod date;
mod html;
mod list;
mod search;
mod url;

pub use date::*;
pub use html::*;
pub use list::*;
pub use search::*;
pub use url::*;
