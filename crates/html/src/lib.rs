//! # vidextract-html: Document Model
//!
//! A thin, forgiving layer over `scraper` used by the extractors. Every read
//! returns an `Option` (or an empty `Vec`) instead of failing: a selector that
//! matches nothing, an attribute that is not set and a selector that cannot be
//! compiled all look the same to the caller, "not found".

use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::{LazyLock, Mutex};
use tracing::warn;

/// Node selection shared by the whole document and by individual nodes.
///
/// Selecting from a `Node` only searches its descendants, which is what the
/// list extractors rely on when reading one repeated row at a time.
pub trait Selectable {
    /// Returns every element matching `css`, in document order.
    fn select_all(&self, css: &str) -> Vec<Node<'_>>;

    /// Returns the first element matching `css`.
    fn select_first(&self, css: &str) -> Option<Node<'_>>;

    /// Returns `true` when at least one element matches `css`.
    fn exists(&self, css: &str) -> bool {
        self.select_first(css).is_some()
    }

    /// Trimmed text of the first element matching `css`, or `None` when there
    /// is no such element or its text is blank.
    fn text_of(&self, css: &str) -> Option<String> {
        self.select_first(css)
            .map(|node| node.trimmed_text())
            .filter(|text| !text.is_empty())
    }

    /// Value of `attr` on the first element matching `css`.
    fn attr_of(&self, css: &str, attr: &str) -> Option<String> {
        self.select_first(css)
            .and_then(|node| node.attr(attr).map(str::to_string))
    }
}

/// A fully parsed document. Parsing never fails; broken markup is repaired
/// by the HTML5 tree builder the same way a browser would.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// The `<html>` element.
    pub fn root(&self) -> Node<'_> {
        Node {
            element: self.html.root_element(),
        }
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document").finish_non_exhaustive()
    }
}

impl Selectable for Document {
    fn select_all(&self, css: &str) -> Vec<Node<'_>> {
        match compile(css) {
            Some(selector) => self.html.select(&selector).map(Node::from).collect(),
            None => Vec::new(),
        }
    }

    fn select_first(&self, css: &str) -> Option<Node<'_>> {
        let selector = compile(css)?;
        let first = self.html.select(&selector).next();
        first.map(Node::from)
    }
}

/// A single element of a parsed `Document`.
#[derive(Clone, Copy, Debug)]
pub struct Node<'a> {
    element: ElementRef<'a>,
}

impl<'a> From<ElementRef<'a>> for Node<'a> {
    fn from(element: ElementRef<'a>) -> Self {
        Self { element }
    }
}

impl<'a> Node<'a> {
    /// Concatenated text of all descendant text nodes, untouched.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    pub fn trimmed_text(&self) -> String {
        self.text().trim().to_string()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Lower-case tag name.
    pub fn tag(&self) -> &'a str {
        self.element.value().name()
    }

    pub fn inner_html(&self) -> String {
        self.element.inner_html()
    }

    /// Reads one property out of the inline `style` attribute, e.g. the
    /// `width` of `style="width: 42%;"`. Property names compare
    /// case-insensitively; a blank value counts as unset.
    pub fn inline_style(&self, property: &str) -> Option<String> {
        let style = self.attr("style")?;
        style
            .split(';')
            .filter_map(|declaration| declaration.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case(property))
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// The first child node, only when that child is a text node.
    pub fn first_child_text(&self) -> Option<&'a str> {
        let child = self.element.first_child()?;
        child.value().as_text().map(|text| &**text)
    }
}

impl Selectable for Node<'_> {
    fn select_all(&self, css: &str) -> Vec<Node<'_>> {
        match compile(css) {
            Some(selector) => self.element.select(&selector).map(Node::from).collect(),
            None => Vec::new(),
        }
    }

    fn select_first(&self, css: &str) -> Option<Node<'_>> {
        let selector = compile(css)?;
        let first = self.element.select(&selector).next();
        first.map(Node::from)
    }
}

/// Invalid selectors already reported, so a bad configured selector logs once
/// instead of once per row.
static REPORTED_INVALID: LazyLock<Mutex<HashSet<String>>> =
    LazyLock::new(|| Mutex::new(HashSet::new()));

fn compile(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            if first_report(css) {
                warn!(selector = css, "Ignoring invalid CSS selector: {e:?}");
            }
            None
        }
    }
}

/// `true` the first time `css` is seen.
fn first_report(css: &str) -> bool {
    match REPORTED_INVALID.lock() {
        Ok(mut seen) => seen.insert(css.to_string()),
        Err(poisoned) => poisoned.into_inner().insert(css.to_string()),
    }
}
