//! Project configuration. A site is described by a `wayfarer.yaml`
//! project file (site metadata plus the content-source connection) and a
//! `theme/theme.yaml` naming the template layers. Everything the rest of
//! the crate needs is resolved up front into an explicit [`Config`]
//! value; nothing reads ambient global state afterwards.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use url::Url;

const PROJECT_FILE: &str = "wayfarer.yaml";

/// Overrides `cms.access_token` from the project file, so credentials
/// can stay out of version control.
const TOKEN_ENV_VAR: &str = "WAYFARER_CMS_TOKEN";

#[derive(Deserialize)]
struct PageSize(usize);
impl Default for PageSize {
    fn default() -> Self {
        PageSize(10)
    }
}

#[derive(Deserialize)]
struct FetchPageSize(usize);
impl Default for FetchPageSize {
    fn default() -> Self {
        FetchPageSize(20)
    }
}

#[derive(Deserialize)]
struct Revalidate(u64);
impl Default for Revalidate {
    fn default() -> Self {
        Revalidate(86_400)
    }
}

/// The site author, as shown in feed metadata.
#[derive(Clone, Debug, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize)]
struct CmsSettings {
    /// Base URL for the content API. Should end in a trailing slash.
    endpoint: Url,

    #[serde(default)]
    access_token: Option<String>,

    #[serde(default = "default_locale")]
    locale: String,

    /// How many summaries each listing fetch asks for.
    #[serde(default)]
    page_size: FetchPageSize,
}

fn default_locale() -> String {
    "pt-br".to_owned()
}

#[derive(Deserialize)]
struct Project {
    title: String,

    #[serde(default)]
    author: Option<Author>,

    site_root: Url,
    home_page: String,

    #[serde(default)]
    index_page_size: PageSize,

    /// Seconds the rendered output stays fresh before a rebuild
    /// re-fetches from the content source.
    #[serde(default)]
    revalidate: Revalidate,

    cms: CmsSettings,
}

#[derive(Deserialize)]
struct Theme {
    index_template: Vec<PathBuf>,
    posts_template: Vec<PathBuf>,
    not_found_template: Vec<PathBuf>,
}

/// Connection settings for the content source, passed explicitly to
/// [`crate::cms::CmsClient::new`].
pub struct CmsConfig {
    pub endpoint: Url,
    pub access_token: Option<String>,
    pub locale: String,
    pub page_size: usize,
}

pub struct Config {
    pub title: String,
    pub author: Option<Author>,
    pub home_page: Url,
    pub index_url: Url,
    pub index_template: Vec<PathBuf>,
    pub index_directory: PathBuf,
    pub index_page_size: usize,
    pub posts_url: Url,
    pub posts_template: Vec<PathBuf>,
    pub posts_directory: PathBuf,
    pub not_found_template: Vec<PathBuf>,
    pub static_url: Url,
    pub static_source_directory: PathBuf,
    pub static_directory: PathBuf,
    pub root_directory: PathBuf,
    pub revalidate: Duration,
    pub cms: CmsConfig,
}

impl Config {
    /// Searches `dir` and its parents for a `wayfarer.yaml` project file
    /// and loads the configuration from the first one found.
    pub fn from_directory(dir: &Path, output_directory: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            match Config::from_project_file(&path, output_directory) {
                Ok(config) => Ok(config),
                Err(e) => Err(anyhow!("Loading configuration: {:?}", e)),
            }
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, output_directory),
                None => Err(anyhow!(
                    "Could not find `wayfarer.yaml` in any parent directory"
                )),
            }
        }
    }

    pub fn from_project_file(
        path: &Path,
        output_directory: &Path,
    ) -> Result<Config> {
        let project: Project = serde_yaml::from_reader(open(path, "project")?)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => {
                let theme_dir = project_root.join("theme");
                let theme_file = open(&theme_dir.join("theme.yaml"), "theme")?;
                let theme: Theme = serde_yaml::from_reader(theme_file)?;

                let mut access_token = project.cms.access_token;
                if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
                    access_token = Some(token);
                }

                Ok(Config {
                    home_page: project.site_root.join(&project.home_page)?,
                    index_url: project.site_root.join("pages/")?,
                    posts_url: project.site_root.join("posts/")?,
                    static_url: project.site_root.join("static/")?,
                    title: project.title,
                    author: project.author,
                    index_template: theme
                        .index_template
                        .iter()
                        .map(|relpath| theme_dir.join(relpath))
                        .collect(),
                    posts_template: theme
                        .posts_template
                        .iter()
                        .map(|relpath| theme_dir.join(relpath))
                        .collect(),
                    not_found_template: theme
                        .not_found_template
                        .iter()
                        .map(|relpath| theme_dir.join(relpath))
                        .collect(),
                    index_directory: output_directory.join("pages"),
                    posts_directory: output_directory.join("posts"),
                    static_source_directory: theme_dir.join("static"),
                    static_directory: output_directory.join("static"),
                    root_directory: output_directory.to_owned(),
                    index_page_size: project.index_page_size.0,
                    revalidate: Duration::from_secs(project.revalidate.0),
                    cms: CmsConfig {
                        endpoint: project.cms.endpoint,
                        access_token,
                        locale: project.cms.locale,
                        page_size: project.cms.page_size.0,
                    },
                })
            }
        }
    }
}

fn open(path: &Path, kind: &str) -> Result<File> {
    match File::open(path) {
        Err(e) => Err(anyhow!(
            "Opening {} file `{}`: {}",
            kind,
            path.display(),
            e
        )),
        Ok(file) => Ok(file),
    }
}
