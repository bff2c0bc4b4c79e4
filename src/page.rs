//! Incremental loading of the post listing. The content source pages its
//! results behind an opaque cursor; this module accumulates summaries
//! page by page and threads the cursor between fetches.
//!
//! Growing the listing is split into a pure reducer ([`append_page`])
//! and the fetch driver ([`Paginator`]) so the accumulation logic can be
//! tested without a content source. As long as the source issues a
//! stable, advancing cursor, the accumulated items never contain
//! duplicates and stay in fetch order.

use std::fmt;

use crate::cms::{self, ContentSource};
use crate::post::{FetchedPage, PostListPage};

/// Appends a freshly fetched page onto the listing state: the fetched
/// items go after the current ones, and the fetched cursor replaces the
/// current cursor. Pure; all I/O stays in [`Paginator`].
pub fn append_page(
    current: PostListPage,
    fetched: FetchedPage,
) -> PostListPage {
    let mut items = current.items;
    items.extend(fetched.items);
    PostListPage {
        cursor: fetched.cursor,
        items,
    }
}

/// Drives a [`ContentSource`] to grow a [`PostListPage`]. Fetches are
/// strictly sequential: at most one is ever in flight.
pub struct Paginator<'a, S> {
    source: &'a S,
}

impl<'a, S: ContentSource> Paginator<'a, S> {
    pub fn new(source: &'a S) -> Paginator<'a, S> {
        Paginator { source }
    }

    /// Fetches the page addressed by `current`'s cursor and returns the
    /// grown listing. Callers must check that a next page exists; a
    /// listing whose cursor is exhausted yields [`Error::NoMorePages`].
    /// On a failed fetch, `current` is left exactly as it was -- the new
    /// state only exists on success.
    pub fn load_next(&self, current: &PostListPage) -> Result<PostListPage> {
        let cursor = current.cursor.as_ref().ok_or(Error::NoMorePages)?;
        let fetched = self.source.query_page(Some(cursor))?;
        Ok(append_page(current.clone(), fetched))
    }

    /// Loads the entire listing: the first page, then every subsequent
    /// page until the source stops issuing cursors.
    pub fn load_all(&self) -> Result<PostListPage> {
        let first = self.source.query_page(None)?;
        let mut page = append_page(PostListPage::default(), first);
        while page.cursor.is_some() {
            page = self.load_next(&page)?;
        }
        Ok(page)
    }
}

/// Represents the result of a listing-growth operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem growing the post listing.
#[derive(Debug)]
pub enum Error {
    /// Returned when [`Paginator::load_next`] is called on a listing
    /// whose cursor is exhausted. Callers are expected to check
    /// [`PostListPage::cursor`] first.
    NoMorePages,

    /// Returned when the underlying fetch fails.
    Source(cms::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NoMorePages => {
                write!(f, "the listing has no further pages")
            }
            Error::Source(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::NoMorePages => None,
            Error::Source(err) => Some(err),
        }
    }
}

impl From<cms::Error> for Error {
    /// Converts a [`cms::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator for fetches against the content source.
    fn from(err: cms::Error) -> Error {
        Error::Source(err)
    }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;
    use crate::post::{Cursor, PostDetail, PostSummary};

    /// A content source that replays a fixed script of responses, one
    /// per `query_page` call.
    struct ScriptedSource {
        responses: RefCell<VecDeque<cms::Result<FetchedPage>>>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<cms::Result<FetchedPage>>) -> ScriptedSource {
            ScriptedSource {
                responses: RefCell::new(responses.into()),
            }
        }
    }

    impl ContentSource for ScriptedSource {
        fn query_page(
            &self,
            _cursor: Option<&Cursor>,
        ) -> cms::Result<FetchedPage> {
            self.responses
                .borrow_mut()
                .pop_front()
                .expect("fetch beyond the scripted responses")
        }

        fn get_by_uid(&self, uid: &str) -> cms::Result<PostDetail> {
            Err(cms::Error::NotFound {
                uid: uid.to_owned(),
            })
        }
    }

    fn summary(uid: &str) -> PostSummary {
        PostSummary {
            uid: uid.to_owned(),
            published_at: None,
            title: uid.to_uppercase(),
            subtitle: String::new(),
            author: "ana".to_owned(),
        }
    }

    fn cursor(token: &str) -> Cursor {
        Cursor(token.to_owned())
    }

    fn page(
        items: &[&str],
        next: Option<&str>,
    ) -> FetchedPage {
        FetchedPage {
            cursor: next.map(cursor),
            items: items.iter().map(|uid| summary(uid)).collect(),
        }
    }

    fn uids(listing: &PostListPage) -> Vec<&str> {
        listing.items.iter().map(|s| s.uid.as_str()).collect()
    }

    #[test]
    fn test_append_page_keeps_fetch_order_and_replaces_cursor() {
        let current = PostListPage {
            cursor: Some(cursor("c1")),
            items: vec![summary("a"), summary("b")],
        };
        let grown = append_page(current, page(&["c", "d"], None));
        assert_eq!(vec!["a", "b", "c", "d"], uids(&grown));
        assert_eq!(None, grown.cursor);
    }

    #[test]
    fn test_load_next_twice_accumulates_both_pages() -> Result<()> {
        let source = ScriptedSource::new(vec![
            Ok(page(&["c"], Some("c2"))),
            Ok(page(&["d"], Some("c3"))),
        ]);
        let paginator = Paginator::new(&source);

        let start = PostListPage {
            cursor: Some(cursor("c1")),
            items: vec![summary("a"), summary("b")],
        };
        let second = paginator.load_next(&start)?;
        let third = paginator.load_next(&second)?;

        assert_eq!(vec!["a", "b", "c", "d"], uids(&third));
        assert_eq!(Some(cursor("c3")), third.cursor);
        Ok(())
    }

    #[test]
    fn test_load_next_without_cursor_is_an_error() {
        let source = ScriptedSource::new(Vec::new());
        let paginator = Paginator::new(&source);

        let exhausted = PostListPage {
            cursor: None,
            items: vec![summary("a")],
        };
        assert!(matches!(
            paginator.load_next(&exhausted),
            Err(Error::NoMorePages)
        ));
    }

    #[test]
    fn test_failed_fetch_leaves_current_untouched() {
        let source = ScriptedSource::new(vec![Err(cms::Error::Status(
            reqwest::StatusCode::BAD_GATEWAY,
        ))]);
        let paginator = Paginator::new(&source);

        let start = PostListPage {
            cursor: Some(cursor("c1")),
            items: vec![summary("a"), summary("b")],
        };
        let before = start.clone();
        assert!(paginator.load_next(&start).is_err());
        assert_eq!(before, start);
    }

    #[test]
    fn test_load_all_runs_until_the_cursor_is_exhausted() -> Result<()> {
        let source = ScriptedSource::new(vec![
            Ok(page(&["a", "b"], Some("c1"))),
            Ok(page(&["c", "d"], None)),
        ]);
        let listing = Paginator::new(&source).load_all()?;

        assert_eq!(vec!["a", "b", "c", "d"], uids(&listing));
        assert_eq!(None, listing.cursor);
        Ok(())
    }
}
