use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::markdown::slugify;

/// A dated document that participates in the tag/category/archive indexes.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub title: String,
    pub path: String,
    pub permalink: String,
    pub date: Option<String>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub source: String,
}

/// A standalone document. Wiki membership is decided by path prefix.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub title: String,
    pub path: String,
    pub permalink: String,
    pub source: String,
}

/// A tag or category as the index templates see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Term {
    pub name: String,
    pub slug: String,
    pub count: usize,
}

/// Site URL for a content path: `guide/setup.md` -> `/guide/setup/`,
/// `wiki/index.md` -> `/wiki/`.
pub fn permalink(path: &str) -> String {
    let path = Path::new(path);
    let base = if path.file_stem().is_some_and(|s| s == "index") {
        path.parent().unwrap_or(Path::new("")).to_path_buf()
    } else {
        path.with_extension("")
    };

    let base = base.to_string_lossy();
    if base.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", base)
    }
}

/// Immutable snapshot of the site's content for one build. Generators only
/// ever read from this.
pub struct Content {
    posts: Vec<Post>,
    pages: Vec<Page>,
}

impl Content {
    pub fn new(mut posts: Vec<Post>, pages: Vec<Page>) -> Self {
        // Newest first; undated posts sink to the end
        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.title.cmp(&b.title)));

        Self { posts, pages }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn tags(&self) -> Vec<Term> {
        aggregate(self.posts.iter().flat_map(|p| p.tags.iter()))
    }

    pub fn categories(&self) -> Vec<Term> {
        aggregate(self.posts.iter().flat_map(|p| p.categories.iter()))
    }

    /// Pages whose path starts with `wiki_dir`, anchored at the start of the
    /// string. A page at exactly `wiki_dir` matches too.
    pub fn wiki_pages(&self, wiki_dir: &str) -> Vec<&Page> {
        self.pages
            .iter()
            .filter(|p| p.path.starts_with(wiki_dir))
            .collect()
    }
}

fn aggregate<'a, I: Iterator<Item = &'a String>>(names: I) -> Vec<Term> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for name in names {
        *counts.entry(name.as_str()).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(name, count)| Term {
            name: name.to_string(),
            slug: slugify(name),
            count,
        })
        .collect()
}
