//! View Nodes
//!
//! A [`View`] is the output of a render pass: a small tree of elements and
//! text that serializes to HTML. Static parts are plain data; a
//! [`View::Dynamic`] node points at a slot that a render effect rewrites
//! whenever the signals it read change.

use std::cell::RefCell;
use std::fmt::{self, Write as _};
use std::rc::Rc;

use smallvec::SmallVec;

use crate::reactive::Effect;

/// Inline capacity for element attributes; most elements carry a class and
/// maybe one data attribute.
type Attrs = SmallVec<[(&'static str, String); 4]>;

/// A renderable tree.
#[derive(Debug, Clone, Default)]
pub enum View {
    /// Renders nothing.
    #[default]
    Empty,
    /// Escaped text.
    Text(String),
    /// An element with attributes and children.
    Element(Element),
    /// A sequence of sibling views.
    Fragment(Vec<View>),
    /// A region kept up to date by a render effect.
    Dynamic(DynamicView),
}

impl View {
    /// Serialize to HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    /// Append this view's HTML to `out`.
    pub fn write_html(&self, out: &mut String) {
        match self {
            View::Empty => {}
            View::Text(text) => escape_into(out, text, false),
            View::Element(element) => element.write_html(out),
            View::Fragment(children) => {
                for child in children {
                    child.write_html(out);
                }
            }
            View::Dynamic(dynamic) => dynamic.slot.borrow().write_html(out),
        }
    }

    /// True for a view that renders no markup at all.
    pub fn is_empty(&self) -> bool {
        match self {
            View::Empty => true,
            View::Text(text) => text.is_empty(),
            View::Element(_) => false,
            View::Fragment(children) => children.iter().all(View::is_empty),
            View::Dynamic(dynamic) => dynamic.slot.borrow().is_empty(),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html())
    }
}

impl From<&str> for View {
    fn from(text: &str) -> Self {
        View::Text(text.to_string())
    }
}

impl From<String> for View {
    fn from(text: String) -> Self {
        View::Text(text)
    }
}

impl From<Element> for View {
    fn from(element: Element) -> Self {
        View::Element(element)
    }
}

impl From<Vec<View>> for View {
    fn from(children: Vec<View>) -> Self {
        View::Fragment(children)
    }
}

impl<T: Into<View>> From<Option<T>> for View {
    fn from(view: Option<T>) -> Self {
        view.map_or(View::Empty, Into::into)
    }
}

/// An HTML element.
#[derive(Debug, Clone)]
pub struct Element {
    tag: &'static str,
    attrs: Attrs,
    children: Vec<View>,
}

/// Elements that never have children or a closing tag.
const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "meta", "link"];

impl Element {
    /// Start building an element.
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: SmallVec::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute, replacing any previous value for the same name.
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    /// Shorthand for the `class` attribute.
    pub fn class(self, value: impl Into<String>) -> Self {
        self.attr("class", value)
    }

    /// Append a child view.
    pub fn child(mut self, child: impl Into<View>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append several child views.
    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<View>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// The element's tag name.
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Look up an attribute value.
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        for (name, value) in &self.attrs {
            let _ = write!(out, " {name}=\"");
            escape_into(out, value, true);
            out.push('"');
        }
        out.push('>');

        if VOID_TAGS.contains(&self.tag) {
            return;
        }
        for child in &self.children {
            child.write_html(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

/// Start building an element.
pub fn el(tag: &'static str) -> Element {
    Element::new(tag)
}

/// A text node.
pub fn text(content: impl Into<String>) -> View {
    View::Text(content.into())
}

/// A handle to a region rendered by an effect.
///
/// Cloning shares the slot; the effect lives as long as any clone.
#[derive(Clone)]
pub struct DynamicView {
    pub(crate) slot: Rc<RefCell<View>>,
    pub(crate) effect: Effect,
}

impl DynamicView {
    /// Number of times the region has rendered.
    pub fn render_count(&self) -> usize {
        self.effect.run_count()
    }
}

impl fmt::Debug for DynamicView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicView")
            .field("html", &self.slot.borrow().to_html())
            .field("render_count", &self.render_count())
            .finish()
    }
}

fn escape_into(out: &mut String, raw: &str, attribute: bool) {
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_elements() {
        let view: View = el("div")
            .class("card")
            .child(el("h2").child("Garden Wedding"))
            .child(text("Up to 120 guests"))
            .into();

        assert_eq!(
            view.to_html(),
            "<div class=\"card\"><h2>Garden Wedding</h2>Up to 120 guests</div>"
        );
    }

    #[test]
    fn escapes_text_and_attributes() {
        let view: View = el("span")
            .attr("title", "\"Tom & Jerry\"")
            .child("<b>")
            .into();

        assert_eq!(
            view.to_html(),
            "<span title=\"&quot;Tom &amp; Jerry&quot;\">&lt;b&gt;</span>"
        );
    }

    #[test]
    fn attr_replaces_existing_value() {
        let element = el("a").attr("href", "/a").attr("href", "/b");
        assert_eq!(element.get_attr("href"), Some("/b"));
        assert_eq!(View::from(element).to_html(), "<a href=\"/b\"></a>");
    }

    #[test]
    fn void_elements_have_no_closing_tag() {
        let view: View = el("img").attr("src", "/logo.png").into();
        assert_eq!(view.to_html(), "<img src=\"/logo.png\">");
    }

    #[test]
    fn empty_views() {
        assert!(View::Empty.is_empty());
        assert!(View::from(vec![View::Empty, text("")]).is_empty());
        assert!(!View::from(el("br")).is_empty());
        assert_eq!(View::from(None::<&str>).to_html(), "");
    }
}
