use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;

use crate::markdown::{RendererRegistry, first_heading};
use crate::model::{Content, Page, Post, permalink};

#[derive(Debug)]
pub enum ScanError {
    Io(std::io::Error),
    InvalidPath(PathBuf),
    FrontMatter(PathBuf, toml::de::Error),
}

impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        ScanError::Io(err)
    }
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::Io(e) => write!(f, "IO error: {}", e),
            ScanError::InvalidPath(p) => write!(f, "Invalid path: {}", p.display()),
            ScanError::FrontMatter(p, e) => {
                write!(f, "Front matter error in {}: {}", p.display(), e)
            }
        }
    }
}

impl std::error::Error for ScanError {}

const FRONT_MATTER_DELIMITER: &str = "+++";

/// Subdirectory whose documents become posts. Everything else is a page.
const POSTS_DIR: &str = "posts";

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct FrontMatter {
    title: Option<String>,
    date: Option<String>,
    tags: Vec<String>,
    categories: Vec<String>,
}

/// Splits leading `+++` TOML front matter from the document body.
fn split_front_matter(raw: &str) -> (Option<&str>, &str) {
    let Some(rest) = raw.strip_prefix(FRONT_MATTER_DELIMITER) else {
        return (None, raw);
    };

    if let Some(end) = rest.find(&format!("\n{}", FRONT_MATTER_DELIMITER)) {
        let body = &rest[end + 1 + FRONT_MATTER_DELIMITER.len()..];
        (Some(&rest[..end]), body.trim_start_matches('\n'))
    } else {
        (None, raw)
    }
}

pub struct ContentScanner {
    source_dir: PathBuf,
}

impl ContentScanner {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            source_dir: path.as_ref().to_path_buf(),
        }
    }

    /// Walk the content directory once and build the immutable snapshot the
    /// generators read from.
    pub fn scan(&self) -> Result<Content, ScanError> {
        let mut posts = Vec::new();
        let mut pages = Vec::new();

        for entry in WalkDir::new(&self.source_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file() && is_markdown(e.path()))
        {
            let path = entry.path();
            let relative = path
                .strip_prefix(&self.source_dir)
                .map_err(|_| ScanError::InvalidPath(path.to_path_buf()))?;
            let relative = relative.to_string_lossy().into_owned();

            let raw = std::fs::read_to_string(path)?;
            let (front, body) = split_front_matter(&raw);
            let front: FrontMatter = match front {
                Some(text) => toml::from_str(text)
                    .map_err(|e| ScanError::FrontMatter(path.to_path_buf(), e))?,
                None => FrontMatter::default(),
            };

            let title = front
                .title
                .or_else(|| first_heading(body))
                .unwrap_or_else(|| file_stem(path));

            if Path::new(&relative).starts_with(POSTS_DIR) {
                posts.push(Post {
                    title,
                    permalink: permalink(&relative),
                    path: relative,
                    date: front.date,
                    tags: front.tags,
                    categories: front.categories,
                    source: body.to_string(),
                });
            } else {
                pages.push(Page {
                    title,
                    permalink: permalink(&relative),
                    path: relative,
                    source: body.to_string(),
                });
            }
        }

        Ok(Content::new(posts, pages))
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|ext| RendererRegistry::is_markdown(&ext.to_string_lossy()))
        .unwrap_or(false)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
