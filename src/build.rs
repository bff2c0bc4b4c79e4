//! Exports the [`build_site`] function which stitches together the
//! high-level steps of building the output static site: crawling the
//! post listing out of the content source ([`crate::cms`],
//! [`crate::page`]), rendering index, post, and not-found pages
//! ([`crate::write`]), copying the theme's static assets into the
//! output directory, and generating the Atom feed.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use gtmpl::Template;
use log::info;
use walkdir::WalkDir;

use crate::cms::{CmsClient, ContentSource, Error as CmsError};
use crate::config::Config;
use crate::feed::{write_feed, Error as FeedError, FeedConfig};
use crate::page::{Error as PageError, Paginator};
use crate::write::{Error as WriteError, Writer};

/// Marks the output directory as ours and records the last successful
/// build time via its modification time.
const WATERMARK: &str = ".wayfarer";

/// Builds the site from a [`Config`] object. This calls into
/// [`Paginator::load_all`], [`ContentSource::get_by_uid`], and
/// [`Writer::write_pages`] which do the heavy-lifting. A build whose
/// output is younger than the configured revalidation window is skipped
/// unless `force` is set.
pub fn build_site(config: &Config, force: bool) -> Result<()> {
    if !force {
        if let Some(age) = build_age(&config.root_directory)? {
            if age < config.revalidate {
                info!(
                    "output was built {}s ago, within the {}s revalidation window; skipping",
                    age.as_secs(),
                    config.revalidate.as_secs()
                );
                return Ok(());
            }
        }
    }

    let client = CmsClient::new(&config.cms)?;

    // accumulate the full listing, one page of summaries at a time
    let listing = Paginator::new(&client).load_all()?;
    info!("loaded {} post summaries", listing.items.len());

    // the listing's uids are the set of post pages to build
    let mut posts = Vec::with_capacity(listing.items.len());
    for summary in &listing.items {
        posts.push(client.get_by_uid(&summary.uid)?);
    }

    // Parse the template files.
    let index_template = parse_template(config.index_template.iter())?;
    let posts_template = parse_template(config.posts_template.iter())?;
    let not_found_template = parse_template(config.not_found_template.iter())?;

    std::fs::create_dir_all(&config.root_directory)?;

    // Blow away the old output subdirectories so we don't have any
    // collisions. We don't naively delete the whole root output directory
    // in case the user accidentally passes the wrong directory.
    rmdir(&config.posts_directory)?;
    rmdir(&config.index_directory)?;
    rmdir(&config.static_directory)?;

    // write the index, post, and not-found pages
    let writer = Writer {
        posts_template: &posts_template,
        index_template: &index_template,
        not_found_template: &not_found_template,
        index_base_url: &config.index_url,
        posts_base_url: &config.posts_url,
        index_output_directory: &config.index_directory,
        posts_output_directory: &config.posts_directory,
        root_output_directory: &config.root_directory,
        index_page_size: config.index_page_size,
        home_page: &config.home_page,
        static_url: &config.static_url,
    };
    writer.write_pages(&listing.items, &posts)?;
    info!("wrote {} post pages", posts.len());

    // copy the theme's static assets
    copy_static(
        &config.static_source_directory,
        &config.static_directory,
    )?;

    // copy /pages/index.html to /index.html
    let _ = std::fs::copy(
        &config.index_directory.join("index.html"),
        &config.root_directory.join("index.html"),
    )?;

    // create the atom feed
    write_feed(
        FeedConfig {
            title: config.title.clone(),
            id: config.home_page.to_string(),
            author: config.author.clone(),
            home_page: config.home_page.clone(),
        },
        &listing.items,
        &config.posts_url,
        File::create(config.root_directory.join("feed.atom"))?,
    )?;

    stamp(&config.root_directory)?;
    Ok(())
}

/// The age of the last successful build in this output directory, or
/// `None` if it has never been built.
fn build_age(root: &Path) -> Result<Option<Duration>> {
    match std::fs::metadata(root.join(WATERMARK)) {
        Ok(meta) => Ok(meta.modified()?.elapsed().ok()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::Io(e)),
    }
}

fn stamp(root: &Path) -> Result<()> {
    // truncating refreshes the modification time
    File::create(root.join(WATERMARK))?;
    Ok(())
}

fn copy_static(src: &Path, dst: &Path) -> Result<()> {
    // themes without static assets are fine
    if !src.exists() {
        return Ok(());
    }
    for result in WalkDir::new(src) {
        let entry = result?;
        // strip_prefix can't fail since `src` is always an ancestor
        let target = dst.join(entry.path().strip_prefix(src).unwrap());
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

// Loads the template file contents, appends them to each other, and
// parses the result into a template.
fn parse_template<P: AsRef<Path>>(
    template_files: impl Iterator<Item = P>,
) -> Result<Template> {
    let mut contents = String::new();
    for template_file in template_files {
        use std::io::Read;
        let template_file = template_file.as_ref();
        File::open(&template_file)
            .map_err(|e| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err: e,
            })?
            .read_to_string(&mut contents)?;
        contents.push(' ');
    }

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during fetching,
/// writing pages, cleaning output directories, parsing template files,
/// and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors talking to the content source.
    Cms(CmsError),

    /// Returned for errors growing the post listing.
    Page(PageError),

    /// Returned for errors writing pages to disk as HTML files.
    Write(WriteError),

    /// Returned for errors writing the feed.
    Feed(FeedError),

    /// Returned for I/O problems while cleaning output directories.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned for I/O problems while copying static assets.
    WalkDir(walkdir::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Cms(err) => err.fmt(f),
            Error::Page(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Feed(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Cms(err) => Some(err),
            Error::Page(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Feed(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::WalkDir(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<CmsError> for Error {
    /// Converts [`CmsError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: CmsError) -> Error {
        Error::Cms(err)
    }
}

impl From<PageError> for Error {
    /// Converts [`PageError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: PageError) -> Error {
        Error::Page(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<FeedError> for Error {
    /// Converts [`FeedError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: FeedError) -> Error {
        Error::Feed(err)
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}
