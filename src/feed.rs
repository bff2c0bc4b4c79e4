//! Support for creating an Atom feed from the accumulated post listing.

use std::fmt;
use std::io::Write;

use atom_syndication::{Entry, Error as AtomError, Feed, Link, Person};
use chrono::{FixedOffset, TimeZone, Utc};
use url::Url;

use crate::config::Author;
use crate::post::{self, PostSummary};

/// Bundled configuration for creating a feed.
pub struct FeedConfig {
    pub title: String,
    pub id: String,
    pub author: Option<Author>,
    pub home_page: Url,
}

/// Creates a feed from some configuration ([`FeedConfig`]) and the
/// accumulated summaries and writes the result to a [`std::io::Write`].
/// `posts_url` is the base the entry links are joined against. This
/// function takes ownership of the provided [`FeedConfig`].
pub fn write_feed<W: Write>(
    config: FeedConfig,
    summaries: &[PostSummary],
    posts_url: &Url,
    w: W,
) -> Result<()> {
    feed(config, summaries, posts_url).write_to(w)?;
    Ok(())
}

fn feed(
    config: FeedConfig,
    summaries: &[PostSummary],
    posts_url: &Url,
) -> Feed {
    use std::collections::BTreeMap;
    Feed {
        entries: feed_entries(&config, summaries, posts_url),
        title: config.title.into(),
        id: config.id,
        updated: FixedOffset::east(0).from_utc_datetime(&Utc::now().naive_utc()),
        authors: author_to_people(config.author),
        categories: Vec::new(),
        contributors: Vec::new(),
        generator: None,
        icon: None,
        logo: None,
        rights: None,
        subtitle: None,
        base: None,
        lang: None,
        extensions: BTreeMap::new(),
        namespaces: BTreeMap::new(),
        links: vec![Link {
            href: config.home_page.to_string(),
            rel: "alternate".to_string(),
            title: None,
            hreflang: None,
            mime_type: None,
            length: None,
        }],
    }
}

fn feed_entries(
    config: &FeedConfig,
    summaries: &[PostSummary],
    posts_url: &Url,
) -> Vec<Entry> {
    use std::collections::BTreeMap;
    let mut entries: Vec<Entry> = Vec::with_capacity(summaries.len());

    for summary in summaries {
        // Drafts surface in the listing without a publication date; an
        // Atom entry requires one, so they stay out of the feed.
        let date = match summary.published_at {
            Some(date) => date,
            None => continue,
        };
        let url = post::page_url(posts_url, &summary.uid);

        entries.push(Entry {
            id: url.to_string(),
            title: summary.title.clone().into(),
            updated: date,
            authors: author_to_people(config.author.clone()),
            links: vec![Link {
                href: url.to_string(),
                rel: "alternate".to_owned(),
                title: None,
                mime_type: None,
                hreflang: None,
                length: None,
            }],
            rights: None,
            summary: Some(summary.subtitle.clone().into()),
            categories: Vec::new(),
            contributors: Vec::new(),
            published: Some(date),
            source: None,
            content: None,
            extensions: BTreeMap::new(),
        })
    }
    entries
}

fn author_to_people(author: Option<Author>) -> Vec<Person> {
    match author {
        Some(author) => vec![Person {
            name: author.name,
            email: author.email,
            uri: None,
        }],
        None => Vec::new(),
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    Io(std::io::Error),

    /// Returned when there is an Atom-related error.
    Atom(AtomError),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::Atom(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Atom(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator in fallible feed operations.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<AtomError> for Error {
    /// Converts [`AtomError`]s into [`Error`]. This allows us to use the
    /// `?` operator in fallible feed operations.
    fn from(err: AtomError) -> Error {
        Error::Atom(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_drafts_stay_out_of_the_feed() {
        let posts_url = Url::parse("https://example.org/posts/").unwrap();
        let config = FeedConfig {
            title: "Wayfarer".to_owned(),
            id: "https://example.org/".to_owned(),
            author: None,
            home_page: Url::parse("https://example.org/").unwrap(),
        };

        let summaries = vec![
            PostSummary {
                uid: "publicado".to_owned(),
                published_at: Some(
                    DateTime::parse_from_rfc3339("2021-04-15T19:25:28+00:00")
                        .unwrap(),
                ),
                title: "Publicado".to_owned(),
                subtitle: "Um post".to_owned(),
                author: "ana".to_owned(),
            },
            PostSummary {
                uid: "rascunho".to_owned(),
                published_at: None,
                title: "Rascunho".to_owned(),
                subtitle: String::new(),
                author: "ana".to_owned(),
            },
        ];

        let entries = feed_entries(&config, &summaries, &posts_url);
        assert_eq!(1, entries.len());
        assert_eq!(
            "https://example.org/posts/publicado.html",
            entries[0].id
        );
        assert_eq!(Some("Um post"), entries[0].summary.as_deref());
    }
}
