//! Document tree access
//!
//! Wraps a parsed `scraper::Html` and exposes the handful of operations the
//! evaluator needs: selector queries over a context, text content, inner markup
//! and attributes of an element.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};

/// A parsed HTML document plus the base URI used to resolve relative links.
pub struct Document {
    html: Html,
    base_uri: Option<String>,
}

impl Document {
    /// Parse a complete HTML document
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
            base_uri: None,
        }
    }

    /// Parse an HTML fragment (no implied `<head>`/`<body>`)
    pub fn parse_fragment(html: &str) -> Self {
        Self {
            html: Html::parse_fragment(html),
            base_uri: None,
        }
    }

    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = Some(base_uri.into());
        self
    }

    pub fn base_uri(&self) -> Option<&str> {
        self.base_uri.as_deref()
    }

    /// Context holding just the document root
    pub fn root_context(&self) -> Context<'_> {
        Context {
            document: &self.html,
            elements: vec![self.html.root_element()],
            is_root: true,
            base_uri: self.base_uri.as_deref(),
        }
    }
}

/// The ordered, non-empty list of elements a configuration node is evaluated
/// against.
#[derive(Clone)]
pub struct Context<'a> {
    document: &'a Html,
    elements: Vec<ElementRef<'a>>,
    // The root context queries the whole document, so the root element itself
    // can be matched (`selector: html`).
    is_root: bool,
    base_uri: Option<&'a str>,
}

impl<'a> Context<'a> {
    pub fn elements(&self) -> &[ElementRef<'a>] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Always false for contexts handed out by this module
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn base_uri(&self) -> Option<&'a str> {
        self.base_uri
    }

    /// Run `selector` against every element of the context.
    ///
    /// Matches are descendants of the context elements, deduplicated by node
    /// identity and returned in document order. Returns `None` when nothing
    /// matched, so a `Context` is never empty.
    pub fn select(&self, selector: &Selector) -> Option<Context<'a>> {
        let elements: Vec<ElementRef<'a>> = if self.is_root {
            self.document.select(selector).collect()
        } else if self.elements.len() == 1 {
            self.elements[0].select(selector).collect()
        } else {
            // Context elements are unique and in document order, so a match
            // set in tree order falls out of querying only the outermost ones.
            let mut outermost = HashSet::new();
            let mut found = Vec::new();
            for element in &self.elements {
                if element.ancestors().any(|node| outermost.contains(&node.id())) {
                    continue;
                }
                outermost.insert(element.id());
                found.extend(element.select(selector));
            }
            found
        };

        if elements.is_empty() {
            return None;
        }

        Some(Context {
            document: self.document,
            elements,
            is_root: false,
            base_uri: self.base_uri,
        })
    }
}

/// Concatenated text of all descendant text nodes, untrimmed
pub fn text_content(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Serialized markup of the element's children
pub fn inner_markup(element: &ElementRef<'_>) -> String {
    element.inner_html()
}

/// Attributes in source order
pub fn attributes<'a>(element: &ElementRef<'a>) -> impl Iterator<Item = (&'a str, &'a str)> {
    element.value().attrs()
}

pub fn attribute<'a>(element: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    element.value().attr(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(s: &str) -> Selector {
        Selector::parse(s).unwrap()
    }

    #[test]
    fn test_root_context_text() {
        let doc = Document::parse_fragment(r#"<div class="foo">    Hello World!   </div>"#);
        let root = doc.root_context();
        assert_eq!(root.len(), 1);
        assert_eq!(text_content(&root.elements()[0]), "    Hello World!   ");
    }

    #[test]
    fn test_select_comma_list_in_document_order() {
        let doc = Document::parse_fragment("<span>b</span><div>a</div><span>c</span>");
        let found = doc.root_context().select(&selector("div, span")).unwrap();
        let texts: Vec<String> = found.elements().iter().map(text_content).collect();
        assert_eq!(texts, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_select_dedupes_across_context() {
        let html = r#"
        <section class="outer">
            <section class="inner">
                <p>one</p>
            </section>
            <p>two</p>
        </section>
        "#;
        let doc = Document::parse_fragment(html);
        let sections = doc.root_context().select(&selector("section")).unwrap();
        assert_eq!(sections.len(), 2);

        // "one" is a descendant of both sections but appears once
        let paragraphs = sections.select(&selector("p")).unwrap();
        let texts: Vec<String> = paragraphs.elements().iter().map(text_content).collect();
        assert_eq!(texts, vec!["one", "two"]);
    }

    #[test]
    fn test_select_nested_and_sibling_context() {
        let html = r#"
        <section>
            <section><p>one</p></section>
            <p>two</p>
        </section>
        <section><p>three</p></section>
        "#;
        let doc = Document::parse_fragment(html);
        let sections = doc.root_context().select(&selector("section")).unwrap();
        assert_eq!(sections.len(), 3);

        let paragraphs = sections.select(&selector("p")).unwrap();
        let texts: Vec<String> = paragraphs.elements().iter().map(text_content).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_select_overlapping_patterns_once() {
        let doc = Document::parse_fragment(r#"<div class="a">x</div><p>y</p>"#);
        let found = doc.root_context().select(&selector("div, .a, p")).unwrap();
        let texts: Vec<String> = found.elements().iter().map(text_content).collect();
        assert_eq!(texts, vec!["x", "y"]);

        // same element reached by two patterns below a multi-element context
        let doc = Document::parse_fragment(
            r#"<ul><li><b class="a">x</b></li><li><i>y</i></li></ul>"#,
        );
        let items = doc.root_context().select(&selector("li")).unwrap();
        let found = items.select(&selector("b, .a, i")).unwrap();
        let texts: Vec<String> = found.elements().iter().map(text_content).collect();
        assert_eq!(texts, vec!["x", "y"]);
    }

    #[test]
    fn test_select_excludes_context_element_itself() {
        let doc = Document::parse_fragment("<div class=\"a\"><span>x</span></div>");
        let divs = doc.root_context().select(&selector("div")).unwrap();
        assert!(divs.select(&selector("div")).is_none());
    }

    #[test]
    fn test_select_no_match() {
        let doc = Document::parse_fragment("<div>Hello</div>");
        assert!(doc.root_context().select(&selector("p")).is_none());
    }

    #[test]
    fn test_attributes_and_markup() {
        let doc = Document::parse_fragment(r#"<div foo="aaa" bar="bbb"><b>Hi</b></div>"#);
        let divs = doc.root_context().select(&selector("div")).unwrap();
        let div = &divs.elements()[0];

        assert_eq!(attribute(div, "foo"), Some("aaa"));
        assert_eq!(attribute(div, "missing"), None);
        assert_eq!(attributes(div).count(), 2);
        assert_eq!(inner_markup(div), "<b>Hi</b>");
    }

    #[test]
    fn test_base_uri_propagates() {
        let doc = Document::parse_fragment("<a href=\"/x\">x</a>").with_base_uri("https://example.com/");
        let links = doc.root_context().select(&selector("a")).unwrap();
        assert_eq!(links.base_uri(), Some("https://example.com/"));
    }
}
