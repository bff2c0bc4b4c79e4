//! Conversions from the domain types into template [`Value`]s, including
//! the derived display fields (formatted dates, rendered rich text, and
//! the reading-time estimate).

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use gtmpl_value::Value;
use url::Url;

use crate::post::{self, ContentBlock, PostDetail, PostSummary};
use crate::readtime;
use crate::richtext;

/// Builds the template object for one entry on an index page. `posts_url`
/// is the base URL the entry's link is joined against.
pub fn summary_value(summary: &PostSummary, posts_url: &Url) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("uid".to_owned(), Value::String(summary.uid.clone()));
    m.insert(
        "url".to_owned(),
        Value::String(post::page_url(posts_url, &summary.uid).to_string()),
    );
    m.insert("title".to_owned(), Value::String(summary.title.clone()));
    m.insert(
        "subtitle".to_owned(),
        Value::String(summary.subtitle.clone()),
    );
    m.insert("author".to_owned(), Value::String(summary.author.clone()));
    m.insert("date".to_owned(), date_value(summary.published_at.as_ref()));
    Value::Object(m)
}

/// Builds the template object for a post page.
pub fn detail_value(post: &PostDetail) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("uid".to_owned(), Value::String(post.uid.clone()));
    m.insert("title".to_owned(), Value::String(post.title.clone()));
    m.insert(
        "banner_url".to_owned(),
        Value::String(post.banner_url.clone()),
    );
    m.insert("author".to_owned(), Value::String(post.author.clone()));
    m.insert("date".to_owned(), date_value(post.published_at.as_ref()));
    m.insert(
        "reading_time".to_owned(),
        Value::from(readtime::estimate(&post.content)),
    );
    m.insert(
        "content".to_owned(),
        Value::Array(post.content.iter().map(block_value).collect()),
    );
    Value::Object(m)
}

fn block_value(block: &ContentBlock) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("heading".to_owned(), Value::String(block.heading.clone()));
    m.insert(
        "body".to_owned(),
        Value::String(richtext::render_rich_text(&block.body)),
    );
    Value::Object(m)
}

/// Posts without a publication date render [`Value::Nil`], which
/// templates can branch on.
fn date_value(published_at: Option<&DateTime<FixedOffset>>) -> Value {
    match published_at {
        Some(date) => Value::String(richtext::format_date(date)),
        None => Value::Nil,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::Segment;

    #[test]
    fn test_detail_value_carries_derived_fields() {
        let post = PostDetail {
            uid: "primeiro-post".to_owned(),
            published_at: Some(
                DateTime::parse_from_rfc3339("2021-04-15T19:25:28+00:00")
                    .unwrap(),
            ),
            title: "Primeiro post".to_owned(),
            banner_url: "https://images.example.org/banner.png".to_owned(),
            author: "Ana Clara".to_owned(),
            content: vec![ContentBlock {
                heading: "Abertura".to_owned(),
                body: vec![Segment {
                    text: "Bem-vindo.".to_owned(),
                }],
            }],
        };

        let value = detail_value(&post);
        let obj = match value {
            Value::Object(obj) => obj,
            _ => panic!("detail value should be an object"),
        };
        assert_eq!(
            Some(&Value::String("15 abr 2021".to_owned())),
            obj.get("date")
        );
        assert_eq!(Some(&Value::from(1u64)), obj.get("reading_time"));
    }

    #[test]
    fn test_summary_value_links_to_the_post_page() {
        let summary = PostSummary {
            uid: "primeiro-post".to_owned(),
            published_at: None,
            title: "Primeiro post".to_owned(),
            subtitle: "Uma abertura".to_owned(),
            author: "Ana Clara".to_owned(),
        };
        let posts_url = Url::parse("https://example.org/posts/").unwrap();

        let obj = match summary_value(&summary, &posts_url) {
            Value::Object(obj) => obj,
            _ => panic!("summary value should be an object"),
        };
        assert_eq!(
            Some(&Value::String(
                "https://example.org/posts/primeiro-post.html".to_owned()
            )),
            obj.get("url")
        );
        assert_eq!(Some(&Value::Nil), obj.get("date"));
    }
}
