use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::config::{DirsConfig, SiteConfig};
use crate::generator::{self, GeneratorError, RenderRequest};
use crate::markdown::{MarkdownRenderer, RendererRegistry};
use crate::model::{Content, Page, Post};
use crate::scanner::{ContentScanner, ScanError};
use crate::shortcode::TagRegistry;
use crate::template::{TemplateError, TemplateRenderer};

#[derive(Debug)]
pub enum BuildError {
    MissingSourceDir,
    Scan(ScanError),
    Template(TemplateError),
    Generator(GeneratorError),
    Serialization(serde_json::Error),
    Io(std::io::Error),
}

impl From<ScanError> for BuildError {
    fn from(err: ScanError) -> Self {
        BuildError::Scan(err)
    }
}

impl From<TemplateError> for BuildError {
    fn from(err: TemplateError) -> Self {
        BuildError::Template(err)
    }
}

impl From<GeneratorError> for BuildError {
    fn from(err: GeneratorError) -> Self {
        BuildError::Generator(err)
    }
}

impl From<serde_json::Error> for BuildError {
    fn from(err: serde_json::Error) -> Self {
        BuildError::Serialization(err)
    }
}

impl From<std::io::Error> for BuildError {
    fn from(err: std::io::Error) -> Self {
        BuildError::Io(err)
    }
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::MissingSourceDir => write!(f, "Source directory not specified"),
            BuildError::Scan(e) => write!(f, "Scan error: {}", e),
            BuildError::Template(e) => write!(f, "Template error: {}", e),
            BuildError::Generator(e) => write!(f, "Generator error: {}", e),
            BuildError::Serialization(e) => write!(f, "Serialization error: {}", e),
            BuildError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for BuildError {}

pub struct SiteBuilder {
    source_dir: Option<PathBuf>,
    output_dir: PathBuf,
    theme_dir: PathBuf,
    syntax_theme: String,
    site: SiteConfig,
    dirs: DirsConfig,
}

impl Default for SiteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteBuilder {
    pub fn new() -> Self {
        Self {
            source_dir: None,
            output_dir: PathBuf::from("./public"),
            theme_dir: PathBuf::from("./theme"),
            syntax_theme: "base16-ocean.dark".to_string(),
            site: SiteConfig::default(),
            dirs: DirsConfig::default(),
        }
    }

    // Required configuration
    pub fn source_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source_dir = Some(path.as_ref().to_path_buf());
        self
    }

    // Optional paths
    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = path.as_ref().to_path_buf();
        self
    }

    pub fn theme_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.theme_dir = path.as_ref().to_path_buf();
        self
    }

    pub fn site_config(mut self, config: SiteConfig) -> Self {
        self.site = config;
        self
    }

    pub fn dirs_config(mut self, config: DirsConfig) -> Self {
        self.dirs = config;
        self
    }

    pub fn syntax_theme<S: Into<String>>(mut self, theme: S) -> Self {
        self.syntax_theme = theme.into();
        self
    }

    pub fn build(self) -> Result<Site, BuildError> {
        let source_dir = self.source_dir.ok_or(BuildError::MissingSourceDir)?;

        let content = ContentScanner::new(&source_dir).scan()?;

        let mut renderer = TemplateRenderer::new(&self.theme_dir)?;
        renderer.set_global("site", &self.site);
        renderer.set_global("dirs", &self.dirs);

        Ok(Site {
            content,
            renderer,
            markdown: RendererRegistry::new(self.syntax_theme.clone()),
            fallback: MarkdownRenderer::new(self.syntax_theme),
            tags: TagRegistry::with_defaults(),
            output_dir: self.output_dir,
            dirs: self.dirs,
        })
    }
}

pub struct Site {
    content: Content,
    renderer: TemplateRenderer,
    markdown: RendererRegistry,
    fallback: MarkdownRenderer,
    tags: TagRegistry,
    output_dir: PathBuf,
    dirs: DirsConfig,
}

impl Site {
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Expand shortcodes, then render markdown with the renderer registered
    /// for the document's extension.
    fn render_document(&self, path: &str, source: &str) -> String {
        let expanded = self.tags.expand(source);
        let extension = Path::new(path)
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        let renderer = self.markdown.get(&extension).unwrap_or(&self.fallback);

        renderer.render(&expanded)
    }

    fn post_request(&self, post: &Post) -> Result<RenderRequest, BuildError> {
        let mut data = Map::new();
        data.insert("post".to_string(), serde_json::to_value(post)?);
        data.insert("title".to_string(), Value::String(post.title.clone()));
        data.insert(
            "content".to_string(),
            Value::String(self.render_document(&post.path, &post.source)),
        );

        Ok(RenderRequest {
            output_path: document_output_path(&post.path),
            template_chain: vec!["post", "page", "index"],
            data,
        })
    }

    fn page_request(&self, page: &Page) -> Result<RenderRequest, BuildError> {
        let mut data = Map::new();
        data.insert("page".to_string(), serde_json::to_value(page)?);
        data.insert("title".to_string(), Value::String(page.title.clone()));
        data.insert(
            "content".to_string(),
            Value::String(self.render_document(&page.path, &page.source)),
        );

        Ok(RenderRequest {
            output_path: document_output_path(&page.path),
            template_chain: vec!["page", "index"],
            data,
        })
    }

    fn write_request(&self, request: &RenderRequest) -> Result<(), BuildError> {
        let html = self.renderer.render_request(request)?;

        let relative = if request.output_path.ends_with(".html") {
            PathBuf::from(&request.output_path)
        } else {
            Path::new(&request.output_path).join("index.html")
        };
        let output_path = self.output_dir.join(relative);
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&output_path, html)?;
        println!("Rendered {}", output_path.display());

        Ok(())
    }

    /// Render every document, then every index page.
    pub fn render_all(&self) -> Result<(), BuildError> {
        std::fs::create_dir_all(&self.output_dir)?;

        for post in self.content.posts() {
            self.write_request(&self.post_request(post)?)?;
        }
        for page in self.content.pages() {
            self.write_request(&self.page_request(page)?)?;
        }
        for request in generator::generate_all(&self.content, &self.dirs)? {
            self.write_request(&request)?;
        }

        Ok(())
    }
}

/// Output file for a content path: `guide/setup.md` -> `guide/setup/index.html`,
/// `wiki/index.md` -> `wiki/index.html`.
fn document_output_path(path: &str) -> String {
    let path = Path::new(path);
    let out = if path.file_stem().is_some_and(|s| s == "index") {
        path.with_file_name("index.html")
    } else {
        path.with_extension("").join("index.html")
    };

    out.to_string_lossy().into_owned()
}
