//! Rich post bodies

use serde::{Deserialize, Deserializer};

use crate::helpers::html_escape;

/// Markup supplied by the content source and emitted verbatim.
///
/// The content source is the single, trusted author of post bodies, so no
/// sanitization happens anywhere on this path. If authoring is ever opened
/// to untrusted parties the markup must be sanitized before it reaches this
/// type.
///
/// The source may deliver a body either as a markup string or as an array
/// of portable-text blocks. Blocks are flattened to markup on
/// deserialization; block types other than text blocks are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedHtml(String);

impl TrustedHtml {
    /// Wrap markup that is known to come from the trusted content source
    pub fn from_trusted(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl<'de> Deserialize<'de> for TrustedHtml {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Markup(String),
            Blocks(Vec<Block>),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Markup(markup) => Self(markup),
            Raw::Blocks(blocks) => Self(render_blocks(&blocks)),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Block {
    #[serde(rename = "_type")]
    kind: String,
    style: Option<String>,
    list_item: Option<String>,
    children: Vec<Span>,
    mark_defs: Vec<MarkDef>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Span {
    text: String,
    marks: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MarkDef {
    #[serde(rename = "_key")]
    key: String,
    #[serde(rename = "_type")]
    kind: String,
    href: Option<String>,
}

fn render_blocks(blocks: &[Block]) -> String {
    let mut html = String::new();
    let mut open_list: Option<&'static str> = None;

    for block in blocks.iter().filter(|b| b.kind == "block") {
        let list_tag = match block.list_item.as_deref() {
            Some("number") => Some("ol"),
            Some(_) => Some("ul"),
            None => None,
        };

        if open_list != list_tag {
            if let Some(tag) = open_list {
                html.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list_tag {
                html.push_str(&format!("<{}>", tag));
            }
            open_list = list_tag;
        }

        let inner = render_spans(block);
        if list_tag.is_some() {
            html.push_str(&format!("<li>{}</li>", inner));
            continue;
        }

        let tag = match block.style.as_deref() {
            Some(style @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote")) => style,
            _ => "p",
        };
        html.push_str(&format!("<{tag}>{inner}</{tag}>"));
    }

    if let Some(tag) = open_list {
        html.push_str(&format!("</{}>", tag));
    }

    html
}

fn render_spans(block: &Block) -> String {
    let mut html = String::new();

    for span in &block.children {
        let mut text = html_escape(&span.text);
        for mark in &span.marks {
            text = match mark.as_str() {
                "strong" => format!("<strong>{}</strong>", text),
                "em" => format!("<em>{}</em>", text),
                "code" => format!("<code>{}</code>", text),
                "underline" => format!("<u>{}</u>", text),
                "strike-through" => format!("<s>{}</s>", text),
                key => match block
                    .mark_defs
                    .iter()
                    .find(|def| def.key == key && def.kind == "link")
                    .and_then(|def| def.href.as_deref())
                {
                    Some(href) => format!(r#"<a href="{}">{}</a>"#, html_escape(href), text),
                    None => text,
                },
            };
        }
        html.push_str(&text);
    }

    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_markup_string_is_kept_verbatim() {
        let body: TrustedHtml =
            serde_json::from_value(json!("<h2>Intro</h2><script>x()</script>")).unwrap();
        assert_eq!(body.as_str(), "<h2>Intro</h2><script>x()</script>");
    }

    #[test]
    fn test_blocks_are_flattened() {
        let body: TrustedHtml = serde_json::from_value(json!([
            {
                "_type": "block",
                "style": "h2",
                "children": [{ "_type": "span", "text": "Introduction", "marks": [] }]
            },
            {
                "_type": "block",
                "style": "normal",
                "markDefs": [{ "_key": "k1", "_type": "link", "href": "https://example.com" }],
                "children": [
                    { "_type": "span", "text": "Read ", "marks": [] },
                    { "_type": "span", "text": "this", "marks": ["strong", "k1"] }
                ]
            }
        ]))
        .unwrap();

        assert_eq!(
            body.as_str(),
            r#"<h2>Introduction</h2><p>Read <a href="https://example.com"><strong>this</strong></a></p>"#
        );
    }

    #[test]
    fn test_list_items_are_grouped() {
        let body: TrustedHtml = serde_json::from_value(json!([
            { "_type": "block", "listItem": "bullet", "children": [{ "text": "one" }] },
            { "_type": "block", "listItem": "bullet", "children": [{ "text": "two" }] },
            { "_type": "block", "listItem": "number", "children": [{ "text": "first" }] },
            { "_type": "block", "children": [{ "text": "after" }] }
        ]))
        .unwrap();

        assert_eq!(
            body.as_str(),
            "<ul><li>one</li><li>two</li></ul><ol><li>first</li></ol><p>after</p>"
        );
    }

    #[test]
    fn test_span_text_is_escaped_and_unknown_blocks_dropped() {
        let body: TrustedHtml = serde_json::from_value(json!([
            { "_type": "image", "asset": { "_ref": "image-1" } },
            { "_type": "block", "children": [{ "text": "a < b & c" }] }
        ]))
        .unwrap();

        assert_eq!(body.as_str(), "<p>a &lt; b &amp; c</p>");
    }
}
