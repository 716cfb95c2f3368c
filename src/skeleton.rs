//! Tag-only skeletons and the ordered text fragments they reveal.

use crate::markup::{Element, Markup, Namespace, Node};

/// One contiguous run of literal text to reveal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextFragment {
    /// Full source text of the run
    pub text: String,
    /// Whether the run lives inside a preformatted-art region
    pub is_art: bool,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, is_art: bool) -> Self {
        Self {
            text: text.into(),
            is_art,
        }
    }

    /// Check if the fragment is non-empty and made only of whitespace.
    #[inline]
    pub fn is_blank(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(char::is_whitespace)
    }

    /// Number of characters (not bytes) in the fragment.
    #[inline]
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// A node in a skeleton: a shallow element clone or an empty text slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkeletonNode {
    Element {
        tag: String,
        namespace: Namespace,
        attributes: Vec<(String, String)>,
        children: Vec<SkeletonNode>,
    },
    /// Output text position, indexing into [`Skeleton::fragments`]
    Slot(usize),
}

/// Structural clone of a target's markup with every text run emptied.
///
/// Each text node of the original becomes a [`SkeletonNode::Slot`] whose
/// index points at the matching [`TextFragment`]. Slots are numbered in
/// depth-first document order, so `fragments[i]` is always the `i`-th
/// text run of the original.
///
/// ## Example
///
/// ```rust
/// use typeout_core::{parse_markup, Skeleton};
///
/// let markup = parse_markup("<p>Hi <pre class=\"ascii-art\">/\\</pre></p>").unwrap();
/// let skeleton = Skeleton::build(&markup, "ascii-art");
///
/// assert_eq!(skeleton.fragments.len(), 2);
/// assert!(!skeleton.fragments[0].is_art);
/// assert!(skeleton.fragments[1].is_art);
/// assert_eq!(skeleton.text_content(), "Hi /\\");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Skeleton {
    pub nodes: Vec<SkeletonNode>,
    pub fragments: Vec<TextFragment>,
}

impl Skeleton {
    /// Build a skeleton from parsed markup, marking text inside any element
    /// carrying `art_class` (at any depth) as art.
    pub fn build(markup: &Markup, art_class: &str) -> Self {
        let mut fragments = Vec::new();
        let nodes = build_nodes(&markup.nodes, art_class, false, &mut fragments);
        Self { nodes, fragments }
    }

    /// Number of text slots.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.fragments.len()
    }

    /// Total characters across every fragment.
    pub fn char_count(&self) -> usize {
        self.fragments.iter().map(TextFragment::char_count).sum()
    }

    /// Full text the skeleton will hold once every slot is revealed.
    pub fn text_content(&self) -> String {
        self.fragments.iter().map(|f| f.text.as_str()).collect()
    }
}

fn build_nodes(
    nodes: &[Node],
    art_class: &str,
    in_art: bool,
    fragments: &mut Vec<TextFragment>,
) -> Vec<SkeletonNode> {
    nodes
        .iter()
        .map(|node| match node {
            Node::Text(text) => {
                fragments.push(TextFragment::new(text.clone(), in_art));
                SkeletonNode::Slot(fragments.len() - 1)
            }
            Node::Element(element) => shallow_clone(element, art_class, in_art, fragments),
        })
        .collect()
}

fn shallow_clone(
    element: &Element,
    art_class: &str,
    in_art: bool,
    fragments: &mut Vec<TextFragment>,
) -> SkeletonNode {
    let in_art = in_art || element.has_class(art_class);
    SkeletonNode::Element {
        tag: element.tag.clone(),
        namespace: element.namespace,
        attributes: element.attributes.clone(),
        children: build_nodes(&element.children, art_class, in_art, fragments),
    }
}
