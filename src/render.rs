//! Headless rendering of a skeleton's reveal progress.

use crate::markup::{is_raw_text, is_void, write_close_tag, write_open_tag, write_text, Namespace};
use crate::skeleton::{Skeleton, SkeletonNode};
use crate::{CaretPlacement, Typewriter};

/// Configuration for rendering progress to HTML.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Class of the caret span
    pub caret_class: String,
    /// Class added to the caret while it retires
    pub caret_retiring_class: String,
}

impl RenderConfig {
    pub fn new(caret_class: impl Into<String>, caret_retiring_class: impl Into<String>) -> Self {
        Self {
            caret_class: caret_class.into(),
            caret_retiring_class: caret_retiring_class.into(),
        }
    }

    fn caret_html(&self, retiring: bool) -> String {
        if retiring {
            format!(
                "<span class=\"{} {}\"></span>",
                self.caret_class, self.caret_retiring_class
            )
        } else {
            format!("<span class=\"{}\"></span>", self.caret_class)
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::new("typing-cursor", "typing-cursor-retire")
    }
}

/// Render the skeleton with each slot filled by `revealed(slot)`.
///
/// A caret span is written right after the slot named by
/// [`CaretPlacement::After`]; `Hidden` and `Retired` write no caret.
///
/// ## Example
///
/// ```rust
/// use typeout_core::render::{render_html, RenderConfig};
/// use typeout_core::{parse_markup, CaretPlacement, Skeleton};
///
/// let skeleton = Skeleton::build(&parse_markup("<b>Hi</b>!").unwrap(), "ascii-art");
/// let html = render_html(
///     &skeleton,
///     |slot| if slot == 0 { "H" } else { "" },
///     CaretPlacement::After(0),
///     &RenderConfig::default(),
/// );
/// assert_eq!(html, "<b>H<span class=\"typing-cursor\"></span></b>");
/// ```
pub fn render_html<'a, F>(
    skeleton: &Skeleton,
    revealed: F,
    caret: CaretPlacement,
    config: &RenderConfig,
) -> String
where
    F: Fn(usize) -> &'a str,
{
    let mut out = String::new();
    let caret_slot = match caret {
        CaretPlacement::After(slot) => Some(slot),
        CaretPlacement::Hidden | CaretPlacement::Retired => None,
    };
    for node in &skeleton.nodes {
        write_skeleton_node(node, &revealed, caret_slot, false, config, &mut out);
    }
    out
}

/// Render the current state of a typewriter over its skeleton.
pub fn render_progress(skeleton: &Skeleton, typewriter: &Typewriter, config: &RenderConfig) -> String {
    render_html(skeleton, |slot| typewriter.revealed(slot), typewriter.caret(), config)
}

fn write_skeleton_node<'a, F>(
    node: &SkeletonNode,
    revealed: &F,
    caret_slot: Option<usize>,
    raw: bool,
    config: &RenderConfig,
    out: &mut String,
) where
    F: Fn(usize) -> &'a str,
{
    match node {
        SkeletonNode::Slot(slot) => {
            write_text(revealed(*slot), raw, out);
            if caret_slot == Some(*slot) {
                out.push_str(&config.caret_html(false));
            }
        }
        SkeletonNode::Element {
            tag,
            namespace,
            attributes,
            children,
        } => {
            let html = *namespace == Namespace::Html;
            write_open_tag(tag, attributes, out);
            if html && is_void(tag) {
                return;
            }
            let raw = html && is_raw_text(tag);
            for child in children {
                write_skeleton_node(child, revealed, caret_slot, raw, config, out);
            }
            write_close_tag(tag, out);
        }
    }
}

/// Render a finished skeleton with a fading caret after its last slot.
///
/// This is the frame shown between the end of the reveal and the moment
/// the caret is removed.
pub fn render_retiring(skeleton: &Skeleton, config: &RenderConfig) -> String {
    let full = |slot: usize| skeleton.fragments.get(slot).map(|f| f.text.as_str()).unwrap_or("");
    let mut html = render_html(skeleton, full, CaretPlacement::Retired, config);
    html.push_str(&config.caret_html(true));
    html
}
