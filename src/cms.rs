//! The content source adapter: a thin client for the headless CMS that
//! hosts the post documents. It exposes the only two query shapes the
//! site ever issues -- one page of the post listing
//! ([`ContentSource::query_page`]) and a single document by uid
//! ([`ContentSource::get_by_uid`]) -- and converts the wire format into
//! the domain types in [`crate::post`].
//!
//! Failures are terminal for the triggering operation: there are no
//! retries and no backoff. Callers decide whether to re-run.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use log::debug;
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::config::CmsConfig;
use crate::post::{
    ContentBlock, Cursor, FetchedPage, PostDetail, PostSummary, Segment,
};

/// The document type all queries are scoped to.
const DOCUMENT_TYPE: &str = "posts";

/// The projection requested for listing queries. Post bodies stay behind
/// [`ContentSource::get_by_uid`].
const SUMMARY_FIELDS: &str = "title,subtitle,author";

/// Timestamps as the content source emits them (RFC 3339 with either
/// offset spelling).
const WIRE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

const USER_AGENT: &str = concat!("wayfarer/", env!("CARGO_PKG_VERSION"));

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The two query shapes the site issues against the content source. The
/// HTTP client implements this; tests substitute an in-memory source.
pub trait ContentSource {
    /// Fetches one page of post summaries. With no cursor this is the
    /// first page; with a cursor it is the page the cursor addresses.
    fn query_page(&self, cursor: Option<&Cursor>) -> Result<FetchedPage>;

    /// Fetches the full document for a single post by its uid.
    fn get_by_uid(&self, uid: &str) -> Result<PostDetail>;
}

/// The HTTP implementation of [`ContentSource`]. All connection settings
/// arrive through [`CmsConfig`]; nothing is read from process globals.
pub struct CmsClient {
    client: Client,
    endpoint: Url,
    access_token: Option<String>,
    locale: String,
    page_size: usize,
}

impl CmsClient {
    pub fn new(config: &CmsConfig) -> Result<CmsClient> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(CmsClient {
            client,
            endpoint: config.endpoint.clone(),
            access_token: config.access_token.clone(),
            locale: config.locale.clone(),
            page_size: config.page_size,
        })
    }

    /// The URL for the first page of the post listing. Later pages are
    /// addressed by the cursors the source hands back.
    fn first_page_url(&self) -> Result<Url> {
        let mut url = self.endpoint.join("documents")?;
        url.query_pairs_mut()
            .append_pair("type", DOCUMENT_TYPE)
            .append_pair("page_size", &self.page_size.to_string())
            .append_pair("fields", SUMMARY_FIELDS);
        Ok(self.with_token(url))
    }

    fn document_url(&self, uid: &str) -> Result<Url> {
        let mut url = self.endpoint.join(&format!("documents/{}", uid))?;
        url.query_pairs_mut()
            .append_pair("type", DOCUMENT_TYPE)
            .append_pair("locale", &self.locale);
        Ok(self.with_token(url))
    }

    fn with_token(&self, mut url: Url) -> Url {
        if let Some(token) = &self.access_token {
            url.query_pairs_mut().append_pair("access_token", token);
        }
        url
    }

    fn send(&self, url: Url) -> Result<Response> {
        debug!("GET {}", url);
        Ok(self.client.get(url).send()?)
    }
}

impl ContentSource for CmsClient {
    fn query_page(&self, cursor: Option<&Cursor>) -> Result<FetchedPage> {
        let url = match cursor {
            // The cursor is the `next_page` URL the source issued; follow
            // it verbatim rather than reassembling query parameters.
            Some(cursor) => Url::parse(cursor.as_str())?,
            None => self.first_page_url()?,
        };

        let response = self.send(url)?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status));
        }

        let page: SearchResponse = serde_json::from_str(&response.text()?)?;
        let items = page
            .results
            .into_iter()
            .map(Document::into_summary)
            .collect::<Result<Vec<_>>>()?;
        Ok(FetchedPage {
            cursor: page.next_page.map(Cursor),
            items,
        })
    }

    fn get_by_uid(&self, uid: &str) -> Result<PostDetail> {
        let response = self.send(self.document_url(uid)?)?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(Error::NotFound {
                uid: uid.to_owned(),
            }),
            status if !status.is_success() => Err(Error::Status(status)),
            _ => {
                let document: Document =
                    serde_json::from_str(&response.text()?)?;
                document.into_detail()
            }
        }
    }
}

/// A page of the document search endpoint, as it appears on the wire.
#[derive(Deserialize)]
struct SearchResponse {
    next_page: Option<String>,
    results: Vec<Document>,
}

/// A post document as it appears on the wire. Listing queries project a
/// subset of `data`, so the content-only fields default to empty there.
#[derive(Deserialize)]
struct Document {
    uid: String,
    first_publication_date: Option<String>,
    data: DocumentData,
}

#[derive(Deserialize)]
struct DocumentData {
    #[serde(default)]
    title: String,
    #[serde(default)]
    subtitle: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    banner: Banner,
    #[serde(default)]
    content: Vec<BlockData>,
}

#[derive(Default, Deserialize)]
struct Banner {
    #[serde(default)]
    url: String,
}

#[derive(Deserialize)]
struct BlockData {
    #[serde(default)]
    heading: String,
    #[serde(default)]
    body: Vec<SegmentData>,
}

#[derive(Deserialize)]
struct SegmentData {
    text: String,
}

impl Document {
    fn published_at(&self) -> Result<Option<DateTime<FixedOffset>>> {
        self.first_publication_date
            .as_deref()
            .map(|raw| DateTime::parse_from_str(raw, WIRE_DATE_FORMAT))
            .transpose()
            .map_err(Error::from)
    }

    fn into_summary(self) -> Result<PostSummary> {
        Ok(PostSummary {
            published_at: self.published_at()?,
            uid: self.uid,
            title: self.data.title,
            subtitle: self.data.subtitle,
            author: self.data.author,
        })
    }

    fn into_detail(self) -> Result<PostDetail> {
        Ok(PostDetail {
            published_at: self.published_at()?,
            uid: self.uid,
            title: self.data.title,
            banner_url: self.data.banner.url,
            author: self.data.author,
            content: self
                .data
                .content
                .into_iter()
                .map(|block| ContentBlock {
                    heading: block.heading,
                    body: block
                        .body
                        .into_iter()
                        .map(|segment| Segment {
                            text: segment.text,
                        })
                        .collect(),
                })
                .collect(),
        })
    }
}

/// Represents the result of a content-source operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem talking to the content source.
#[derive(Debug)]
pub enum Error {
    /// Returned when the source is unreachable, the request times out,
    /// or transport otherwise fails.
    Http(reqwest::Error),

    /// Returned when the source answers with a non-success status.
    Status(StatusCode),

    /// Returned when no document exists for a requested uid.
    NotFound { uid: String },

    /// Returned when a response body is not the expected document shape.
    Decode(serde_json::Error),

    /// Returned when a document carries an unparseable publication date.
    Date(chrono::ParseError),

    /// Returned when the endpoint or a cursor doesn't form a valid URL.
    Url(url::ParseError),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Http(err) => {
                write!(f, "content source request failed: {}", err)
            }
            Error::Status(status) => {
                write!(f, "content source returned {}", status)
            }
            Error::NotFound { uid } => {
                write!(f, "no post found for slug '{}'", uid)
            }
            Error::Decode(err) => {
                write!(f, "malformed content source response: {}", err)
            }
            Error::Date(err) => {
                write!(f, "invalid publication date: {}", err)
            }
            Error::Url(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(err) => Some(err),
            Error::Status(_) => None,
            Error::NotFound { uid: _ } => None,
            Error::Decode(err) => Some(err),
            Error::Date(err) => Some(err),
            Error::Url(err) => Some(err),
        }
    }
}

impl From<reqwest::Error> for Error {
    /// Converts a [`reqwest::Error`] into an [`Error`]. This allows us to
    /// use the `?` operator for fallible HTTP operations.
    fn from(err: reqwest::Error) -> Error {
        Error::Http(err)
    }
}

impl From<serde_json::Error> for Error {
    /// Converts a [`serde_json::Error`] into an [`Error`]. This allows us
    /// to use the `?` operator when decoding response bodies.
    fn from(err: serde_json::Error) -> Error {
        Error::Decode(err)
    }
}

impl From<chrono::ParseError> for Error {
    fn from(err: chrono::ParseError) -> Error {
        Error::Date(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Error {
        Error::Url(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SEARCH_PAGE: &str = r#"{
        "next_page": "https://cms.example.org/api/documents?type=posts&after=xyz",
        "results": [
            {
                "uid": "como-utilizar-hooks",
                "first_publication_date": "2021-03-15T19:25:28+0000",
                "data": {
                    "title": "Como utilizar Hooks",
                    "subtitle": "Pensando em sincronizacao em vez de ciclos de vida",
                    "author": "Joseph Oliveira"
                }
            },
            {
                "uid": "rascunho",
                "first_publication_date": null,
                "data": {
                    "title": "Rascunho",
                    "subtitle": "",
                    "author": "Ana Clara"
                }
            }
        ]
    }"#;

    const DOCUMENT: &str = r#"{
        "uid": "criando-um-app-cra-do-zero",
        "first_publication_date": "2021-04-02T10:04:01+0000",
        "data": {
            "title": "Criando um app CRA do zero",
            "subtitle": "Tudo sobre como criar a sua primeira aplicacao",
            "author": "Danilo Vieira",
            "banner": {
                "url": "https://images.example.org/banner.png"
            },
            "content": [
                {
                    "heading": "Comecando",
                    "body": [
                        { "text": "Primeiro paragrafo." },
                        { "text": "Segundo paragrafo." }
                    ]
                },
                {
                    "heading": "Continuando",
                    "body": [
                        { "text": "Mais um paragrafo." }
                    ]
                }
            ]
        }
    }"#;

    #[test]
    fn test_decode_search_page() -> Result<()> {
        let page: SearchResponse = serde_json::from_str(SEARCH_PAGE)?;
        assert_eq!(
            Some("https://cms.example.org/api/documents?type=posts&after=xyz"),
            page.next_page.as_deref(),
        );

        let summaries = page
            .results
            .into_iter()
            .map(Document::into_summary)
            .collect::<Result<Vec<_>>>()?;
        assert_eq!(2, summaries.len());
        assert_eq!("como-utilizar-hooks", summaries[0].uid);
        assert_eq!("Joseph Oliveira", summaries[0].author);

        let published =
            summaries[0].published_at.expect("date should be parsed");
        assert_eq!("2021-03-15", published.format("%Y-%m-%d").to_string());
        Ok(())
    }

    #[test]
    fn test_decode_document() -> Result<()> {
        let document: Document = serde_json::from_str(DOCUMENT)?;
        let detail = document.into_detail()?;
        assert_eq!("criando-um-app-cra-do-zero", detail.uid);
        assert_eq!("https://images.example.org/banner.png", detail.banner_url);
        assert_eq!(2, detail.content.len());
        assert_eq!("Comecando", detail.content[0].heading);
        assert_eq!(2, detail.content[0].body.len());
        assert_eq!("Mais um paragrafo.", detail.content[1].body[0].text);
        Ok(())
    }

    #[test]
    fn test_null_publication_date() -> Result<()> {
        let page: SearchResponse = serde_json::from_str(SEARCH_PAGE)?;
        let draft = page.results.into_iter().nth(1).unwrap().into_summary()?;
        assert_eq!(None, draft.published_at);
        Ok(())
    }

    #[test]
    fn test_listing_projection_defaults_content_fields() -> Result<()> {
        // Listing queries project only title/subtitle/author; the
        // remaining data fields decode to their empty defaults.
        let page: SearchResponse = serde_json::from_str(SEARCH_PAGE)?;
        let document = page.results.into_iter().next().unwrap();
        assert!(document.data.banner.url.is_empty());
        assert!(document.data.content.is_empty());
        Ok(())
    }
}
