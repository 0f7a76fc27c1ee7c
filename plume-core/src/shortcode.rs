use std::collections::HashMap;
use std::sync::LazyLock;

use html_escape::{encode_quoted_attribute, encode_text};
use regex::{Captures, Regex};

// Accepts scheme://host, www.-prefixed, and email-like forms, with an
// optional path/query/fragment tail.
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[A-Za-z]{3,9}:(?://)?(?:[-;:&=+$,\w]+@)?[A-Za-z0-9.-]+|(?:www\.|[-;:&=+$,\w]+@)[A-Za-z0-9.-]+)(?:(?:/[+~%/.\w-]*)?\??[-+=&;%@.\w]*#?[.!/\\\w]*)?$",
    )
    .expect("url pattern")
});

// `{% name arg arg ... %}` occurrences in document source.
static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{%\s*([A-Za-z_][\w-]*)((?:[^%]|%[^}])*?)%\}").expect("tag pattern")
});

/// Expand the `img` macro into a lightbox-ready gallery fragment.
///
/// The first argument is the image URL. The second is consumed as a thumbnail
/// only when it looks like a URL; otherwise it starts the title. Everything
/// left joins into the title.
pub fn gallery_image(args: &[&str]) -> String {
    let Some((url, rest)) = args.split_first() else {
        return String::new();
    };

    let (thumbnail, title_args) = match rest.split_first() {
        Some((candidate, tail)) if URL_PATTERN.is_match(candidate) => (Some(*candidate), tail),
        _ => (None, rest),
    };

    let title = title_args.join(" ");
    let src = thumbnail.unwrap_or(url);

    let mut html = format!(
        "<a class=\"fancybox\" href=\"{}\"><img src=\"{}\" alt=\"{}\"></a>",
        encode_quoted_attribute(url),
        encode_quoted_attribute(src),
        encode_quoted_attribute(&title),
    );
    if !title.is_empty() {
        html.push_str(&format!(
            "<span class=\"caption\">{}</span>",
            encode_text(&title)
        ));
    }

    html
}

pub type TagHandler = fn(&[&str]) -> String;

/// Name-to-handler registry for inline content macros. Handlers receive the
/// macro's whitespace-tokenized argument list and return an HTML fragment.
pub struct TagRegistry {
    handlers: HashMap<String, TagHandler>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("img", gallery_image);
        registry
    }

    pub fn register(&mut self, name: &str, handler: TagHandler) {
        self.handlers.insert(name.to_string(), handler);
    }

    /// Replace every registered `{% name ... %}` occurrence in `source`.
    /// Unregistered names are left verbatim.
    pub fn expand(&self, source: &str) -> String {
        TAG_PATTERN
            .replace_all(source, |caps: &Captures| {
                let name = &caps[1];
                match self.handlers.get(name) {
                    Some(handler) => {
                        let args: Vec<&str> = caps[2].split_whitespace().collect();
                        handler(&args)
                    }
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
