use std::collections::HashMap;
use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

// Initialize syntax highlighting resources once
static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const DEFAULT_SYNTAX_THEME: &str = "base16-ocean.dark";

/// Extension aliases the markdown renderer answers for.
pub const MARKDOWN_EXTENSIONS: [&str; 7] =
    ["md", "markdown", "mkd", "mkdn", "mdwn", "mdtxt", "mdtext"];

/// Anchor id for a heading: lowercase, every whitespace run becomes a single
/// hyphen. Duplicate headings keep duplicate ids.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut in_whitespace = false;

    for c in text.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
        } else {
            in_whitespace = false;
            slug.extend(c.to_lowercase());
        }
    }

    slug
}

/// Text of the first heading in a document, used as the title fallback.
pub fn first_heading(source: &str) -> Option<String> {
    let parser = Parser::new_ext(source, Options::all());

    let mut in_heading = false;
    let mut text = String::new();
    for event in parser {
        match event {
            Event::Start(Tag::Heading { .. }) => in_heading = true,
            Event::End(TagEnd::Heading(_)) if in_heading => return Some(text),
            Event::Text(t) | Event::Code(t) if in_heading => text.push_str(&t),
            _ => {}
        }
    }

    None
}

/// Markdown-to-HTML conversion with two rules swapped in over the defaults:
/// headings carry a slugified `id` attribute, and fenced code blocks go
/// through syntect.
pub struct MarkdownRenderer {
    syntax_theme: String,
}

impl MarkdownRenderer {
    pub fn new<S: Into<String>>(syntax_theme: S) -> Self {
        Self {
            syntax_theme: syntax_theme.into(),
        }
    }

    pub fn render(&self, source: &str) -> String {
        let parser = Parser::new_ext(source, Options::all());

        let events: Vec<Event> = parser.collect();
        let mut processed: Vec<Event> = Vec::with_capacity(events.len());
        let mut i = 0;

        while i < events.len() {
            match &events[i] {
                Event::Start(Tag::Heading { level, .. }) => {
                    let level = *level as u32;
                    let mut inner: Vec<Event> = Vec::new();
                    let mut text = String::new();
                    i += 1;

                    while i < events.len() {
                        match &events[i] {
                            Event::End(TagEnd::Heading(_)) => break,
                            Event::Text(t) => {
                                text.push_str(t);
                                inner.push(events[i].clone());
                            }
                            Event::Code(c) => {
                                text.push_str(c);
                                inner.push(events[i].clone());
                            }
                            _ => inner.push(events[i].clone()),
                        }
                        i += 1;
                    }

                    processed.push(Event::Html(
                        format!("<h{} id=\"{}\">", level, slugify(&text)).into(),
                    ));
                    processed.extend(inner);
                    processed.push(Event::Html(format!("</h{}>", level).into()));
                }
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(lang))) => {
                    let lang = lang.to_string();
                    let mut code = String::new();
                    i += 1;

                    while i < events.len() {
                        match &events[i] {
                            Event::End(TagEnd::CodeBlock) => break,
                            Event::Text(t) => code.push_str(t),
                            _ => {}
                        }
                        i += 1;
                    }

                    processed.push(Event::Html(self.highlight(&lang, &code).into()));
                }
                _ => processed.push(events[i].clone()),
            }
            i += 1;
        }

        let mut out = String::new();
        html::push_html(&mut out, processed.into_iter());

        out
    }

    fn highlight(&self, lang: &str, code: &str) -> String {
        let syntax = SYNTAX_SET.find_syntax_by_token(lang).or_else(|| {
            // Fallback mappings for unsupported languages
            match lang {
                "toml" => SYNTAX_SET.find_syntax_by_name("YAML"),
                _ => None,
            }
        });

        match syntax {
            Some(syntax) => {
                let theme = THEME_SET
                    .themes
                    .get(&self.syntax_theme)
                    .unwrap_or(&THEME_SET.themes[DEFAULT_SYNTAX_THEME]);
                highlighted_html_for_string(code, &SYNTAX_SET, syntax, theme)
                    .unwrap_or_else(|_| plain_code_block(code))
            }
            None => plain_code_block(code),
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_SYNTAX_THEME)
    }
}

fn plain_code_block(code: &str) -> String {
    format!("<pre><code>{}</code></pre>", html_escape::encode_text(code))
}

/// One renderer per registered extension. Instances are independent, so a
/// tweak to one registration can never leak into another.
pub struct RendererRegistry {
    renderers: HashMap<String, MarkdownRenderer>,
}

impl RendererRegistry {
    pub fn new<S: Into<String>>(syntax_theme: S) -> Self {
        let syntax_theme = syntax_theme.into();
        let mut renderers = HashMap::new();
        for ext in MARKDOWN_EXTENSIONS {
            renderers.insert(ext.to_string(), MarkdownRenderer::new(syntax_theme.clone()));
        }

        Self { renderers }
    }

    pub fn get(&self, extension: &str) -> Option<&MarkdownRenderer> {
        self.renderers.get(extension)
    }

    pub fn is_markdown(extension: &str) -> bool {
        MARKDOWN_EXTENSIONS.contains(&extension)
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SYNTAX_THEME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_hyphenates() {
        assert_eq!(slugify("Getting Started"), "getting-started");
    }

    #[test]
    fn slugify_collapses_whitespace_runs() {
        assert_eq!(slugify("A  B"), "a-b");
        assert_eq!(slugify("tabs\tand\nnewlines"), "tabs-and-newlines");
    }

    #[test]
    fn headings_get_anchor_ids() {
        let html = MarkdownRenderer::default().render("## Getting Started\n\nBody.\n");
        assert!(html.contains("<h2 id=\"getting-started\">Getting Started</h2>"));
    }

    #[test]
    fn duplicate_headings_keep_duplicate_ids() {
        let html = MarkdownRenderer::default().render("## Setup\n\ntext\n\n## Setup\n");
        assert_eq!(html.matches("id=\"setup\"").count(), 2);
    }

    #[test]
    fn heading_anchor_uses_inline_code_text() {
        let html = MarkdownRenderer::default().render("# The `img` tag\n");
        assert!(html.contains("<h1 id=\"the-img-tag\">"));
        assert!(html.contains("<code>img</code>"));
    }

    #[test]
    fn unfenced_rules_stay_default() {
        let html = MarkdownRenderer::default().render("Some *emphasis* here.\n");
        assert!(html.contains("<em>emphasis</em>"));
    }

    #[test]
    fn unknown_language_falls_back_to_escaped_pre() {
        let html = MarkdownRenderer::default().render("```nosuchlang\na < b\n```\n");
        assert!(html.contains("<pre><code>a &lt; b\n</code></pre>"));
    }

    #[test]
    fn first_heading_text() {
        assert_eq!(
            first_heading("intro\n\n# Getting Started\n\n## Later\n").as_deref(),
            Some("Getting Started")
        );
        assert_eq!(first_heading("no headings here"), None);
    }

    #[test]
    fn registry_covers_every_alias() {
        let registry = RendererRegistry::default();
        for ext in MARKDOWN_EXTENSIONS {
            assert!(registry.get(ext).is_some(), "missing renderer for {ext}");
        }
        assert!(registry.get("txt").is_none());
        assert!(RendererRegistry::is_markdown("mdtext"));
        assert!(!RendererRegistry::is_markdown("rst"));
    }
}
