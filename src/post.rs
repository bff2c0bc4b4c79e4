//! Defines the domain types for posts: the summaries that make up the
//! paginated listing, the structured rich-text content of a single post,
//! and the listing state itself. See [`crate::cms`] for how these are
//! fetched and [`crate::page`] for how [`PostListPage`] values grow.

use chrono::{DateTime, FixedOffset};
use url::Url;

/// A single entry in the post listing: the projection of a post document
/// that index pages need. Immutable once fetched; identity is `uid`.
#[derive(Clone, Debug, PartialEq)]
pub struct PostSummary {
    /// The document's unique identifier, used as the post's URL slug.
    pub uid: String,

    /// When the post was first published. `None` for unpublished drafts.
    pub published_at: Option<DateTime<FixedOffset>>,

    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// An opaque token addressing the next page of a paginated listing. The
/// content source issues it and later consumes it; nothing in between
/// inspects it.
#[derive(Clone, Debug, PartialEq)]
pub struct Cursor(pub String);

impl Cursor {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The accumulated state of the post listing: every summary loaded so
/// far, in fetch order, plus the cursor for the next page. A `None`
/// cursor means the listing is complete.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PostListPage {
    pub cursor: Option<Cursor>,
    pub items: Vec<PostSummary>,
}

/// One page of results from the content source: the summaries it
/// returned and the cursor addressing the page after it, if any.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchedPage {
    pub cursor: Option<Cursor>,
    pub items: Vec<PostSummary>,
}

/// One segment of a rich-text block body.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub text: String,
}

/// A structured content unit: a heading followed by text segments.
#[derive(Clone, Debug, PartialEq)]
pub struct ContentBlock {
    pub heading: String,
    pub body: Vec<Segment>,
}

/// The full post document backing a post page. Fetched once per page
/// build; never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct PostDetail {
    pub uid: String,
    pub published_at: Option<DateTime<FixedOffset>>,
    pub title: String,
    pub banner_url: String,
    pub author: String,
    pub content: Vec<ContentBlock>,
}

/// The output URL for the page of the post with `uid`, relative to the
/// posts base URL (which must end in a trailing slash).
pub fn page_url(base: &Url, uid: &str) -> Url {
    // uids are slugs issued by the content source, so the join can't fail
    base.join(&format!("{}.html", uid)).unwrap()
}
