use anyhow::Result;
use axum::http::StatusCode;
use serde::Serialize;

use super::{Page, Pages};
use crate::helpers::url_for;

#[derive(Serialize)]
struct CoreValue {
    title: &'static str,
    text: &'static str,
}

const VALUES: [CoreValue; 4] = [
    CoreValue {
        title: "Quality First",
        text: "We prioritize depth and accuracy over quantity, ensuring every piece meets our high standards.",
    },
    CoreValue {
        title: "Reader-Centric",
        text: "Every article is crafted with our readers in mind, focusing on practical value and clarity.",
    },
    CoreValue {
        title: "Innovation",
        text: "We stay ahead of trends and explore emerging topics to keep our content fresh and relevant.",
    },
    CoreValue {
        title: "Community",
        text: "We believe in fostering a supportive community of learners and knowledge sharers.",
    },
];

const TOPICS: [&str; 10] = [
    "Technology",
    "Web Development",
    "Design",
    "Productivity",
    "Entrepreneurship",
    "Digital Marketing",
    "AI & Machine Learning",
    "Career Growth",
    "Innovation",
    "Best Practices",
];

impl Pages {
    pub async fn about(&self) -> Result<Page> {
        let path = url_for(&self.config, "/about");
        let posts = self.observe_posts();
        let categories = self.observe_categories();
        let mut context = self.context_with_footer(&path, "", &posts, &categories);

        context.insert("values", &VALUES);
        context.insert("topics", &TOPICS);
        self.render("about.html", &context, StatusCode::OK)
    }
}
