//! Structured markup and the minimal selector language.
//!
//! Components describe the nodes they insert as [`Markup`] trees instead of
//! HTML strings. Hosts materialize the tree with real element APIs, so text
//! (for example a stored identifier) is always inserted as text and never
//! parsed as HTML.

use std::fmt::Write as _;

/// A single element with optional text and children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Markup {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, String)>,
    /// Text content, rendered before any children.
    pub text: Option<String>,
    pub children: Vec<Markup>,
}

impl Markup {
    /// Start an element with the given tag name.
    #[must_use]
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a class. Empty names are ignored.
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !class.is_empty() && !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    /// Set an attribute, replacing an earlier value with the same name.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn child(mut self, child: Markup) -> Self {
        self.children.push(child);
        self
    }

    /// Depth-first search for a descendant (or self) with the given id.
    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<&Markup> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_id(id))
    }

    /// Render as escaped HTML. Used for diagnostics and tests; hosts build
    /// nodes directly.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.tag);
        if let Some(id) = &self.id {
            let _ = write!(out, " id=\"{}\"", escape(id));
        }
        if !self.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape(&self.classes.join(" ")));
        }
        for (name, value) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", name, escape(value));
        }
        out.push('>');
        if let Some(text) = &self.text {
            out.push_str(&escape(text));
        }
        for child in &self.children {
            child.write_html(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

/// Escape text for inclusion in HTML content or a quoted attribute.
#[must_use]
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// The subset of CSS selectors the components query with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// `#id`
    Id(String),
    /// `.class`
    Class(String),
    /// `tag[name="value"]`
    Attr {
        tag: String,
        name: String,
        value: String,
    },
    /// `tag[name^="prefix"]`
    AttrPrefix {
        tag: String,
        name: String,
        prefix: String,
    },
}

/// Borrowed view of an element, enough to evaluate a [`Selector`].
#[derive(Debug, Clone, Copy)]
pub struct ElementView<'a> {
    pub tag: &'a str,
    pub id: Option<&'a str>,
    pub classes: &'a [String],
    pub attrs: &'a [(String, String)],
}

impl ElementView<'_> {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

impl Selector {
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    #[must_use]
    pub fn class(class: impl Into<String>) -> Self {
        Self::Class(class.into())
    }

    #[must_use]
    pub fn attr(
        tag: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Attr {
            tag: tag.into(),
            name: name.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn attr_prefix(
        tag: impl Into<String>,
        name: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self::AttrPrefix {
            tag: tag.into(),
            name: name.into(),
            prefix: prefix.into(),
        }
    }

    /// Browser form, for `querySelector`.
    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            Self::Id(id) => format!("#{}", css_ident(id)),
            Self::Class(class) => format!(".{}", css_ident(class)),
            Self::Attr { tag, name, value } => {
                format!("{tag}[{name}=\"{}\"]", css_string(value))
            }
            Self::AttrPrefix { tag, name, prefix } => {
                format!("{tag}[{name}^=\"{}\"]", css_string(prefix))
            }
        }
    }

    /// Evaluate the selector against one element.
    #[must_use]
    pub fn matches(&self, el: &ElementView<'_>) -> bool {
        match self {
            Self::Id(id) => el.id == Some(id.as_str()),
            Self::Class(class) => el.classes.iter().any(|c| c == class),
            Self::Attr { tag, name, value } => {
                el.tag.eq_ignore_ascii_case(tag) && el.attr(name) == Some(value.as_str())
            }
            Self::AttrPrefix { tag, name, prefix } => {
                el.tag.eq_ignore_ascii_case(tag)
                    && el.attr(name).is_some_and(|v| v.starts_with(prefix.as_str()))
            }
        }
    }
}

fn css_ident(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for (i, ch) in raw.chars().enumerate() {
        let plain = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii();
        if plain && !(i == 0 && ch.is_ascii_digit()) {
            out.push(ch);
        } else {
            let _ = write!(out, "\\{:x} ", ch as u32);
        }
    }
    out
}

fn css_string(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}
