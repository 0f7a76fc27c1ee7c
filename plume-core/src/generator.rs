use std::fmt;

use serde_json::{Map, Value};

use crate::config::DirsConfig;
use crate::model::Content;

#[derive(Debug)]
pub enum GeneratorError {
    /// A configured output directory resolved to an empty string.
    EmptyDir(&'static str),
    Serialization(serde_json::Error),
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorError::EmptyDir(setting) => {
                write!(f, "Output directory setting '{}' is empty", setting)
            }
            GeneratorError::Serialization(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for GeneratorError {}

impl From<serde_json::Error> for GeneratorError {
    fn from(err: serde_json::Error) -> Self {
        GeneratorError::Serialization(err)
    }
}

/// A render instruction: where the page goes, which templates may render it
/// (first existing name wins), and the data handed to the template.
#[derive(Debug)]
pub struct RenderRequest {
    pub output_path: String,
    pub template_chain: Vec<&'static str>,
    pub data: Map<String, Value>,
}

pub fn tag_index(content: &Content, dirs: &DirsConfig) -> Result<RenderRequest, GeneratorError> {
    let dir = require_dir(&dirs.tag_dir, "tag_dir")?;

    let mut data = Map::new();
    data.insert("tags".to_string(), serde_json::to_value(content.tags())?);
    data.insert("type".to_string(), Value::String("index".to_string()));

    Ok(RenderRequest {
        output_path: dir.to_string(),
        template_chain: vec!["tag", "archive", "index"],
        data,
    })
}

pub fn category_index(
    content: &Content,
    dirs: &DirsConfig,
) -> Result<RenderRequest, GeneratorError> {
    let dir = require_dir(&dirs.category_dir, "category_dir")?;

    let mut data = Map::new();
    data.insert(
        "categories".to_string(),
        serde_json::to_value(content.categories())?,
    );
    data.insert("type".to_string(), Value::String("index".to_string()));

    Ok(RenderRequest {
        output_path: dir.to_string(),
        template_chain: vec!["category", "archive", "index"],
        data,
    })
}

pub fn archive_index(
    content: &Content,
    dirs: &DirsConfig,
) -> Result<RenderRequest, GeneratorError> {
    let dir = require_dir(&dirs.archive_dir, "archive_dir")?;

    let mut data = Map::new();
    data.insert("posts".to_string(), serde_json::to_value(content.posts())?);
    data.insert("type".to_string(), Value::String("index".to_string()));

    Ok(RenderRequest {
        output_path: dir.to_string(),
        template_chain: vec!["archive", "index"],
        data,
    })
}

pub fn wiki_index(content: &Content, dirs: &DirsConfig) -> Result<RenderRequest, GeneratorError> {
    let dir = require_dir(&dirs.wiki_dir, "wiki_dir")?;

    let mut data = Map::new();
    data.insert(
        "pages".to_string(),
        serde_json::to_value(content.wiki_pages(dir))?,
    );
    data.insert("title".to_string(), Value::String("Wiki".to_string()));

    Ok(RenderRequest {
        output_path: dir.to_string(),
        template_chain: vec!["wiki", "index"],
        data,
    })
}

/// Run every index generator once, as the build pipeline does per site build.
pub fn generate_all(
    content: &Content,
    dirs: &DirsConfig,
) -> Result<Vec<RenderRequest>, GeneratorError> {
    Ok(vec![
        tag_index(content, dirs)?,
        category_index(content, dirs)?,
        archive_index(content, dirs)?,
        wiki_index(content, dirs)?,
    ])
}

fn require_dir<'a>(dir: &'a str, setting: &'static str) -> Result<&'a str, GeneratorError> {
    if dir.trim().is_empty() {
        return Err(GeneratorError::EmptyDir(setting));
    }

    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Page, Post, permalink};

    fn fixture() -> Content {
        let posts = vec![
            Post {
                title: "Intro".to_string(),
                path: "posts/intro.md".to_string(),
                permalink: permalink("posts/intro.md"),
                date: Some("2014-05-01".to_string()),
                tags: vec!["basics".to_string(), "Getting Started".to_string()],
                categories: vec!["guides".to_string()],
                source: String::new(),
            },
            Post {
                title: "Types".to_string(),
                path: "posts/types.md".to_string(),
                permalink: permalink("posts/types.md"),
                date: Some("2014-06-01".to_string()),
                tags: vec!["basics".to_string()],
                categories: vec!["reference".to_string()],
                source: String::new(),
            },
        ];
        let pages = vec![
            Page {
                title: "Wiki".to_string(),
                path: "wiki".to_string(),
                permalink: permalink("wiki"),
                source: String::new(),
            },
            Page {
                title: "Setup".to_string(),
                path: "wiki/setup.md".to_string(),
                permalink: permalink("wiki/setup.md"),
                source: String::new(),
            },
            Page {
                title: "About".to_string(),
                path: "about.md".to_string(),
                permalink: permalink("about.md"),
                source: String::new(),
            },
        ];

        Content::new(posts, pages)
    }

    #[test]
    fn tag_index_carries_every_tag_unfiltered() {
        let content = fixture();
        let request = tag_index(&content, &DirsConfig::default()).unwrap();

        assert_eq!(request.output_path, "tags");
        assert_eq!(request.template_chain, vec!["tag", "archive", "index"]);
        assert_eq!(request.data["type"], "index");
        assert_eq!(
            request.data["tags"],
            serde_json::to_value(content.tags()).unwrap()
        );
    }

    #[test]
    fn category_index_mirrors_model_categories() {
        let content = fixture();
        let request = category_index(&content, &DirsConfig::default()).unwrap();

        assert_eq!(request.output_path, "categories");
        assert_eq!(request.template_chain, vec!["category", "archive", "index"]);
        assert_eq!(
            request.data["categories"],
            serde_json::to_value(content.categories()).unwrap()
        );
    }

    #[test]
    fn archive_index_lists_all_posts() {
        let content = fixture();
        let request = archive_index(&content, &DirsConfig::default()).unwrap();

        assert_eq!(request.output_path, "archives");
        assert_eq!(request.template_chain, vec!["archive", "index"]);
        let posts = request.data["posts"].as_array().unwrap();
        assert_eq!(posts.len(), 2);
        // Content sorts newest first
        assert_eq!(posts[0]["title"], "Types");
    }

    #[test]
    fn wiki_index_filters_by_prefix_and_includes_exact_match() {
        let content = fixture();
        let request = wiki_index(&content, &DirsConfig::default()).unwrap();

        assert_eq!(request.output_path, "wiki");
        assert_eq!(request.template_chain, vec!["wiki", "index"]);
        assert_eq!(request.data["title"], "Wiki");

        let pages = request.data["pages"].as_array().unwrap();
        let paths: Vec<&str> = pages.iter().map(|p| p["path"].as_str().unwrap()).collect();
        assert_eq!(paths, vec!["wiki", "wiki/setup.md"]);
    }

    #[test]
    fn empty_dir_setting_is_an_error() {
        let content = fixture();
        let dirs = DirsConfig {
            tag_dir: "  ".to_string(),
            ..DirsConfig::default()
        };

        match tag_index(&content, &dirs) {
            Err(GeneratorError::EmptyDir(setting)) => assert_eq!(setting, "tag_dir"),
            other => panic!("expected EmptyDir, got {:?}", other.map(|r| r.output_path)),
        }
    }

    #[test]
    fn generate_all_runs_each_generator_once() {
        let content = fixture();
        let requests = generate_all(&content, &DirsConfig::default()).unwrap();

        let outputs: Vec<&str> = requests.iter().map(|r| r.output_path.as_str()).collect();
        assert_eq!(outputs, vec!["tags", "categories", "archives", "wiki"]);
    }
}
