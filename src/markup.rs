//! Lenient parsing of a target's original markup into an immutable tree.

use std::borrow::Cow;

use quick_xml::escape::{escape, partial_escape, unescape, EscapeError};
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Elements that never take children in HTML.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text content is never entity-decoded.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// SVG elements whose children are parsed as HTML again.
const SVG_HTML_INTEGRATION_POINTS: &[&str] = &["foreignObject", "desc", "title"];

/// Element namespace, needed to recreate foreign content faithfully.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Namespace {
    #[default]
    Html,
    Svg,
    MathMl,
}

impl Namespace {
    /// Namespace URI as used by `createElementNS`.
    pub fn uri(self) -> &'static str {
        match self {
            Namespace::Html => "http://www.w3.org/1999/xhtml",
            Namespace::Svg => "http://www.w3.org/2000/svg",
            Namespace::MathMl => "http://www.w3.org/1998/Math/MathML",
        }
    }

    /// Whether names keep their source case (SVG and MathML).
    #[inline]
    pub fn is_foreign(self) -> bool {
        self != Namespace::Html
    }
}

/// Error type for markup parsing.
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    /// The tokenizer rejected the input
    #[error("malformed markup: {0}")]
    Syntax(#[from] quick_xml::Error),
    /// An attribute could not be read
    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),
    /// An entity or character reference could not be resolved
    #[error("invalid escape sequence: {0}")]
    Escape(#[from] EscapeError),
    /// Tag or attribute bytes were not UTF-8
    #[error("markup is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// A node in a parsed markup tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with its tag, attributes (in source order) and children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    /// Tag name, lowercased for HTML and as written for foreign content
    pub tag: String,
    pub namespace: Namespace,
    /// Attributes as `(name, value)` pairs, values unescaped
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element with no attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            namespace: Namespace::Html,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Get an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Check whether the `class` attribute lists `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .map(|classes| classes.split_ascii_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Whether this element is an HTML void element.
    #[inline]
    pub fn is_void(&self) -> bool {
        self.namespace == Namespace::Html && is_void(&self.tag)
    }

    /// Whether this element's text is kept verbatim (`script`, `style`).
    #[inline]
    pub fn is_raw_text(&self) -> bool {
        self.namespace == Namespace::Html && is_raw_text(&self.tag)
    }

    /// Namespace that children of this element are parsed in.
    fn child_namespace(&self) -> Namespace {
        if self.namespace == Namespace::Svg && SVG_HTML_INTEGRATION_POINTS.contains(&self.tag.as_str())
        {
            Namespace::Html
        } else {
            self.namespace
        }
    }
}

/// A parsed markup fragment (the content of one element).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Markup {
    pub nodes: Vec<Node>,
}

impl Markup {
    /// Concatenated text of every text node in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.nodes, &mut out);
        out
    }

    /// Serialize the tree back to HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            write_node(node, false, &mut out);
        }
        out
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => collect_text(&element.children, out),
        }
    }
}

fn write_node(node: &Node, raw: bool, out: &mut String) {
    match node {
        Node::Text(text) => write_text(text, raw, out),
        Node::Element(element) => {
            write_open_tag(&element.tag, &element.attributes, out);
            if element.is_void() {
                return;
            }
            for child in &element.children {
                write_node(child, element.is_raw_text(), out);
            }
            write_close_tag(&element.tag, out);
        }
    }
}

/// Write text content, escaping it unless it sits in a raw-text element.
pub(crate) fn write_text(text: &str, raw: bool, out: &mut String) {
    if raw {
        out.push_str(text);
    } else {
        out.push_str(&partial_escape(text));
    }
}

/// Write `<tag a="b">` with escaped attribute values.
pub(crate) fn write_open_tag(tag: &str, attributes: &[(String, String)], out: &mut String) {
    out.push('<');
    out.push_str(tag);
    for (name, value) in attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }
    out.push('>');
}

pub(crate) fn write_close_tag(tag: &str, out: &mut String) {
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// Whether `tag` names an HTML void element.
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Whether `tag` names an HTML element whose text is not entity-decoded.
pub fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

/// Parse an HTML fragment into a [`Markup`] tree.
///
/// Parsing is lenient in the ways browser `innerHTML` content needs:
/// void elements such as `<br>` need no closing tag, attributes may be
/// valueless, stray end tags are ignored and unclosed elements are closed
/// at the end of input. Comments and processing instructions are dropped.
/// Text inside `script` and `style` is kept verbatim. Elements under
/// `<svg>` or `<math>` are placed in that namespace and keep their
/// source case, so `foreignObject` stays `foreignObject`.
///
/// ## Example
///
/// ```rust
/// use typeout_core::{parse_markup, Node};
///
/// let markup = parse_markup("<p class=\"intro\">Hi<br>there</p>").unwrap();
/// assert_eq!(markup.text_content(), "Hithere");
///
/// let Node::Element(p) = &markup.nodes[0] else { panic!() };
/// assert!(p.has_class("intro"));
/// assert_eq!(p.children.len(), 3);
/// ```
pub fn parse_markup(source: &str) -> Result<Markup, MarkupError> {
    let mut reader = Reader::from_str(source);
    reader.trim_text(false);
    reader.check_end_names(false);

    let mut roots: Vec<Node> = Vec::new();
    let mut open: Vec<Element> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let element = element_from_start(&start, context(&open))?;
                if element.is_void() {
                    push_node(&mut open, &mut roots, Node::Element(element));
                } else {
                    open.push(element);
                }
            }
            Event::Empty(start) => {
                let element = element_from_start(&start, context(&open))?;
                push_node(&mut open, &mut roots, Node::Element(element));
            }
            Event::End(end) => {
                let qname = end.name();
                let name = std::str::from_utf8(qname.as_ref())?;
                close_element(&mut open, &mut roots, name);
            }
            Event::Text(text) => {
                let raw = std::str::from_utf8(&text)?;
                let content = match open.last() {
                    Some(parent) if parent.is_raw_text() => Cow::Borrowed(raw),
                    _ => unescape(raw)?,
                };
                push_text(&mut open, &mut roots, content);
            }
            Event::CData(data) => {
                let raw = std::str::from_utf8(&data)?;
                push_text(&mut open, &mut roots, Cow::Borrowed(raw));
            }
            Event::Eof => break,
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }

    while let Some(element) = open.pop() {
        push_node(&mut open, &mut roots, Node::Element(element));
    }

    Ok(Markup { nodes: roots })
}

fn context(open: &[Element]) -> Namespace {
    open.last().map_or(Namespace::Html, Element::child_namespace)
}

fn element_from_start(start: &BytesStart<'_>, context: Namespace) -> Result<Element, MarkupError> {
    let qname = start.name();
    let name = std::str::from_utf8(qname.as_ref())?;
    let lower = name.to_ascii_lowercase();
    let namespace = match (context, lower.as_str()) {
        (Namespace::Html, "svg") => Namespace::Svg,
        (Namespace::Html, "math") => Namespace::MathMl,
        (context, _) => context,
    };
    let tag = if context.is_foreign() {
        name.to_string()
    } else {
        lower
    };
    let mut element = Element::new(tag);
    element.namespace = namespace;
    for attribute in start.html_attributes() {
        let attribute = attribute?;
        let key = std::str::from_utf8(attribute.key.as_ref())?.to_string();
        let raw = std::str::from_utf8(&attribute.value)?;
        let value = unescape(raw)?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn push_node(open: &mut [Element], roots: &mut Vec<Node>, node: Node) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

fn push_text(open: &mut [Element], roots: &mut Vec<Node>, text: Cow<'_, str>) {
    if text.is_empty() {
        return;
    }
    let siblings = match open.last_mut() {
        Some(parent) => &mut parent.children,
        None => roots,
    };
    // Entities and CDATA split a run into several events; keep one node per run
    if let Some(Node::Text(previous)) = siblings.last_mut() {
        previous.push_str(&text);
    } else {
        siblings.push(Node::Text(text.into_owned()));
    }
}

fn close_element(open: &mut Vec<Element>, roots: &mut Vec<Node>, name: &str) {
    let Some(depth) = open
        .iter()
        .rposition(|element| element.tag.eq_ignore_ascii_case(name))
    else {
        return;
    };
    while open.len() > depth {
        if let Some(element) = open.pop() {
            push_node(open, roots, Node::Element(element));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(node: &Node) -> &Element {
        match node {
            Node::Element(element) => element,
            Node::Text(text) => panic!("expected element, got text {:?}", text),
        }
    }

    #[test]
    fn test_parse_nested() {
        let markup = parse_markup("<div id=\"a\"><span>Hi</span> there</div>").unwrap();
        assert_eq!(markup.nodes.len(), 1);

        let div = element(&markup.nodes[0]);
        assert_eq!(div.tag, "div");
        assert_eq!(div.attribute("id"), Some("a"));
        assert_eq!(div.children.len(), 2);
        assert_eq!(element(&div.children[0]).children, vec![Node::Text("Hi".into())]);
        assert_eq!(div.children[1], Node::Text(" there".into()));
    }

    #[test]
    fn test_whitespace_preserved() {
        let markup = parse_markup("\n  <p>a</p>\n").unwrap();
        assert_eq!(markup.nodes.len(), 3);
        assert_eq!(markup.nodes[0], Node::Text("\n  ".into()));
        assert_eq!(markup.text_content(), "\n  a\n");
    }

    #[test]
    fn test_void_elements() {
        let markup = parse_markup("line one<br>line two<img src=\"x.png\">").unwrap();
        assert_eq!(markup.nodes.len(), 4);
        assert!(element(&markup.nodes[1]).children.is_empty());
        assert_eq!(element(&markup.nodes[3]).attribute("src"), Some("x.png"));
    }

    #[test]
    fn test_html_entities() {
        let markup = parse_markup("<p>a&nbsp;&amp;&lt;b&#33;</p>").unwrap();
        assert_eq!(markup.text_content(), "a\u{a0}&<b!");
        // One text node despite the entity boundaries
        assert_eq!(element(&markup.nodes[0]).children.len(), 1);
    }

    #[test]
    fn test_class_lookup() {
        let markup = parse_markup("<pre class=\"big ascii-art\">/\\</pre>").unwrap();
        let pre = element(&markup.nodes[0]);
        assert!(pre.has_class("ascii-art"));
        assert!(pre.has_class("big"));
        assert!(!pre.has_class("ascii"));
    }

    #[test]
    fn test_valueless_attribute() {
        let markup = parse_markup("<details open><summary>s</summary></details>").unwrap();
        let details = element(&markup.nodes[0]);
        assert_eq!(details.attribute("open"), Some(""));
    }

    #[test]
    fn test_unclosed_and_stray_tags() {
        let markup = parse_markup("<p><b>bold</i> text").unwrap();
        let p = element(&markup.nodes[0]);
        let b = element(&p.children[0]);
        assert_eq!(b.tag, "b");
        assert_eq!(markup.text_content(), "bold text");
    }

    #[test]
    fn test_comments_dropped() {
        let markup = parse_markup("a<!-- note -->b").unwrap();
        assert_eq!(markup.nodes, vec![Node::Text("ab".into())]);
    }

    #[test]
    fn test_svg_keeps_namespace_and_case() {
        let source = "<svg viewBox=\"0 0 1 1\"><foreignObject>t</foreignObject></svg>";
        let markup = parse_markup(source).unwrap();
        assert_eq!(markup.to_html(), source);

        let svg = element(&markup.nodes[0]);
        assert_eq!(svg.namespace, Namespace::Svg);
        assert_eq!(svg.attribute("viewBox"), Some("0 0 1 1"));
        let foreign = element(&svg.children[0]);
        assert_eq!(foreign.tag, "foreignObject");
        assert_eq!(foreign.namespace, Namespace::Svg);
    }

    #[test]
    fn test_html_inside_foreign_object() {
        let markup =
            parse_markup("<svg><foreignObject><P>x</P></foreignObject></svg><math><mi>y</mi></math>")
                .unwrap();
        let svg = element(&markup.nodes[0]);
        let p = element(&element(&svg.children[0]).children[0]);
        assert_eq!(p.tag, "p");
        assert_eq!(p.namespace, Namespace::Html);

        let math = element(&markup.nodes[1]);
        assert_eq!(math.namespace, Namespace::MathMl);
        assert_eq!(element(&math.children[0]).namespace, Namespace::MathMl);
    }

    #[test]
    fn test_foreign_elements_are_never_void() {
        let markup = parse_markup("<svg><image href=\"a.png\"></image><br></svg>").unwrap();
        let svg = element(&markup.nodes[0]);
        assert_eq!(svg.children.len(), 2);
        assert!(!element(&svg.children[1]).is_void());
    }

    #[test]
    fn test_raw_text_kept_verbatim() {
        let source = "<script>if (a && b) {}</script><style>a::after { content: \"&amp;\" }</style>";
        let markup = parse_markup(source).unwrap();
        assert_eq!(
            element(&markup.nodes[0]).children,
            vec![Node::Text("if (a && b) {}".into())]
        );
        assert_eq!(
            element(&markup.nodes[1]).children,
            vec![Node::Text("a::after { content: \"&amp;\" }".into())]
        );
        assert_eq!(markup.to_html(), source);
    }

    #[test]
    fn test_round_trip_html() {
        let source = "<a href=\"/x?a=1&amp;b=2\">link</a><br>tail &lt;3";
        let markup = parse_markup(source).unwrap();
        assert_eq!(markup.to_html(), source);
    }
}
