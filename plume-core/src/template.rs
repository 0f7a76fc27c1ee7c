use std::path::Path;

use serde::Serialize;
use tera::{Context, Tera};

use crate::generator::RenderRequest;

#[derive(Debug)]
pub enum TemplateError {
    Tera(tera::Error),
    Io(std::io::Error),
    /// No template in the fallback chain exists in the theme.
    NoTemplate(Vec<&'static str>),
}

impl From<tera::Error> for TemplateError {
    fn from(err: tera::Error) -> Self {
        TemplateError::Tera(err)
    }
}

impl From<std::io::Error> for TemplateError {
    fn from(err: std::io::Error) -> Self {
        TemplateError::Io(err)
    }
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::Tera(e) => write!(f, "Template error: {}", e),
            TemplateError::Io(e) => write!(f, "IO error: {}", e),
            TemplateError::NoTemplate(chain) => {
                write!(f, "No template found for chain: {}", chain.join(" -> "))
            }
        }
    }
}

impl std::error::Error for TemplateError {}

pub struct TemplateRenderer {
    tera: Tera,
    globals: Context,
}

impl TemplateRenderer {
    pub fn new(theme_dir: &Path) -> Result<Self, TemplateError> {
        let glob = format!("{}/**/*.html", theme_dir.display());
        let tera = Tera::new(&glob)?;

        Ok(Self {
            tera,
            globals: Context::new(),
        })
    }

    /// Add a value visible to every render
    pub fn set_global<T: Serialize>(&mut self, key: &str, value: &T) {
        self.globals.insert(key, value);
    }

    /// First template name in the chain that exists in the theme.
    pub fn resolve(&self, chain: &[&str]) -> Option<String> {
        chain
            .iter()
            .map(|name| format!("{}.html", name))
            .find(|file| self.tera.get_template_names().any(|t| t == file))
    }

    pub fn render(&self, template: &str, context: &Context) -> Result<String, TemplateError> {
        let mut full = self.globals.clone();
        full.extend(context.clone());

        Ok(self.tera.render(template, &full)?)
    }

    /// Resolve a request's template chain and render its data.
    pub fn render_request(&self, request: &RenderRequest) -> Result<String, TemplateError> {
        let template = self
            .resolve(&request.template_chain)
            .ok_or_else(|| TemplateError::NoTemplate(request.template_chain.clone()))?;
        let context = Context::from_serialize(&request.data)?;

        self.render(&template, &context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use std::fs;

    fn theme(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in files {
            fs::write(dir.path().join(name), contents).unwrap();
        }
        dir
    }

    #[test]
    fn resolve_picks_the_first_existing_template() {
        let dir = theme(&[("archive.html", "archive"), ("index.html", "index")]);
        let renderer = TemplateRenderer::new(dir.path()).unwrap();

        assert_eq!(
            renderer.resolve(&["tag", "archive", "index"]).as_deref(),
            Some("archive.html")
        );
        assert_eq!(
            renderer.resolve(&["index", "archive"]).as_deref(),
            Some("index.html")
        );
        assert_eq!(renderer.resolve(&["missing"]), None);
    }

    #[test]
    fn render_request_merges_globals_and_data() {
        let dir = theme(&[("index.html", "{{ site.title }}: {{ title }}")]);
        let mut renderer = TemplateRenderer::new(dir.path()).unwrap();
        renderer.set_global("site", &serde_json::json!({ "title": "Docs" }));

        let mut data = Map::new();
        data.insert("title".to_string(), serde_json::json!("Wiki"));
        let request = RenderRequest {
            output_path: "wiki".to_string(),
            template_chain: vec!["wiki", "index"],
            data,
        };

        assert_eq!(renderer.render_request(&request).unwrap(), "Docs: Wiki");
    }

    #[test]
    fn missing_chain_is_an_explicit_error() {
        let dir = theme(&[]);
        let renderer = TemplateRenderer::new(dir.path()).unwrap();

        let request = RenderRequest {
            output_path: "tags".to_string(),
            template_chain: vec!["tag", "archive", "index"],
            data: Map::new(),
        };

        match renderer.render_request(&request) {
            Err(TemplateError::NoTemplate(chain)) => {
                assert_eq!(chain, vec!["tag", "archive", "index"]);
            }
            other => panic!("expected NoTemplate, got {:?}", other.is_ok()),
        }
    }
}
