//! Responsible for templating and writing the output HTML pages: the
//! paginated index of post summaries, one page per post, and the
//! not-found page served for unknown slugs.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use gtmpl::{Template, Value};
use url::Url;

use crate::post::{self, PostDetail, PostSummary};
use crate::value;

/// Renders [`crate::post`] values through the theme templates and writes
/// the resulting HTML pages to disk.
pub struct Writer<'a> {
    /// The template for post pages.
    pub posts_template: &'a Template,

    /// The template for index pages.
    pub index_template: &'a Template,

    /// The template for the not-found page.
    pub not_found_template: &'a Template,

    /// The base URL for index pages. The first index page lives at
    /// `{index_base_url}/index.html`, later ones at
    /// `{index_base_url}/1.html`, etc.
    pub index_base_url: &'a Url,

    /// The base URL for post pages: a post lives at
    /// `{posts_base_url}/{uid}.html`.
    pub posts_base_url: &'a Url,

    /// The directory in which the index HTML files will be written.
    pub index_output_directory: &'a Path,

    /// The directory in which the post HTML files will be written.
    pub posts_output_directory: &'a Path,

    /// The root output directory; the not-found page lands here.
    pub root_output_directory: &'a Path,

    /// The number of summaries per index page.
    pub index_page_size: usize,

    /// The URL for the site's home page. Available to every template,
    /// typically as the destination for the site-header link.
    pub home_page: &'a Url,

    /// The URL for the static assets. Available to every template,
    /// typically for the theme's stylesheet.
    pub static_url: &'a Url,
}

impl<'a> Writer<'a> {
    /// Takes a single [`Page`], templates it, and writes it to disk.
    fn write_page(&self, page: &Page) -> Result<()> {
        let mut value = page.to_value();
        if let Value::Object(obj) = &mut value {
            obj.insert(
                "home_page".to_owned(),
                Value::String(self.home_page.to_string()),
            );
            obj.insert(
                "static_url".to_owned(),
                Value::String(self.static_url.to_string()),
            );
        }
        page.template.execute(
            &mut std::fs::File::create(&page.file_path)?,
            &gtmpl::Context::from(value).unwrap(),
        )?;
        Ok(())
    }

    /// Renders every output page: the paginated index built from the
    /// accumulated summaries, one page per post, and the not-found page.
    pub fn write_pages(
        &self,
        summaries: &[PostSummary],
        posts: &[PostDetail],
    ) -> Result<()> {
        use std::collections::HashSet;

        let mut pages = self.index_pages(summaries);
        pages.extend(self.post_pages(posts));
        pages.push(self.not_found_page());

        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        for page in pages {
            let dir = page.file_path.parent().unwrap(); // output paths always have a dir
            if seen_dirs.insert(dir.to_owned()) {
                std::fs::create_dir_all(dir)?;
            }
            self.write_page(&page)?;
        }
        Ok(())
    }

    /// Creates the index [`Page`]s: the summaries chunked
    /// `index_page_size` at a time, each chunk linking to its neighbors.
    /// This is the static rendering of the listing's "load more" action.
    fn index_pages(&self, summaries: &[PostSummary]) -> Vec<Page<'a>> {
        let chunks: Vec<&[PostSummary]> = match summaries.is_empty() {
            // an empty blog still gets a front page
            true => vec![&[]],
            false => summaries.chunks(self.index_page_size).collect(),
        };
        let total_pages = chunks.len();

        chunks
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| {
                let file_name = match i > 0 {
                    false => String::from("index.html"),
                    true => format!("{}.html", i),
                };

                Page {
                    item: Value::Array(
                        chunk
                            .iter()
                            .map(|s| {
                                value::summary_value(s, self.posts_base_url)
                            })
                            .collect(),
                    ),
                    file_path: self.index_output_directory.join(&file_name),
                    prev: match i {
                        0 => None,
                        1 => Some(self.index_url("index.html")),
                        _ => Some(self.index_url(&format!("{}.html", i - 1))),
                    },
                    next: match i < total_pages - 1 {
                        false => None,
                        true => Some(self.index_url(&format!("{}.html", i + 1))),
                    },
                    template: self.index_template,
                }
            })
            .collect()
    }

    /// Creates one [`Page`] per post, linking chronologically adjacent
    /// posts to each other.
    fn post_pages(&self, posts: &[PostDetail]) -> Vec<Page<'a>> {
        posts
            .iter()
            .enumerate()
            .map(|(i, post)| Page {
                item: value::detail_value(post),
                file_path: self
                    .posts_output_directory
                    .join(format!("{}.html", post.uid)),
                prev: match i < 1 {
                    true => None,
                    false => Some(post::page_url(
                        self.posts_base_url,
                        &posts[i - 1].uid,
                    )),
                },
                next: match i >= posts.len() - 1 {
                    true => None,
                    false => Some(post::page_url(
                        self.posts_base_url,
                        &posts[i + 1].uid,
                    )),
                },
                template: self.posts_template,
            })
            .collect()
    }

    /// The page rendered for slugs that resolve to no document.
    fn not_found_page(&self) -> Page<'a> {
        Page {
            item: Value::Nil,
            file_path: self.root_output_directory.join("404.html"),
            prev: None,
            next: None,
            template: self.not_found_template,
        }
    }

    fn index_url(&self, file_name: &str) -> Url {
        // index file names are fixed-form, so the join can't fail
        self.index_base_url.join(file_name).unwrap()
    }
}

/// An object representing an output HTML file. A [`Page`] can be
/// converted to a [`Value`] and thus rendered in a template via
/// [`Page::to_value`].
struct Page<'a> {
    /// The main item for the page.
    item: Value,

    /// The target location on disk for the output file.
    file_path: PathBuf,

    /// The URL for the previous page, if any.
    prev: Option<Url>,

    /// The URL for the next page, if any.
    next: Option<Url>,

    /// The template with which the page will be rendered.
    template: &'a Template,
}

impl Page<'_> {
    /// Converts a [`Page`] into a [`Value`]. The result is a
    /// [`Value::Object`] with fields `item`, `prev`, and `next` (see
    /// [`Page`] for descriptions).
    fn to_value(&self) -> Value {
        use std::collections::HashMap;

        let option_to_value = |opt: &Option<Url>| match opt {
            Some(url) => Value::String(url.to_string()),
            None => Value::Nil,
        };

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("item".to_owned(), self.item.clone());
        m.insert("prev".to_owned(), option_to_value(&self.prev));
        m.insert("next".to_owned(), option_to_value(&self.next));
        Value::Object(m)
    }
}

/// The result of a fallible page-writing operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(String),

    /// An error writing the output files.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`].
    /// This allows us to use the `?` operator for fallible template
    /// operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}
