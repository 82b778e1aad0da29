//! Plain-text outline of card trees, for terminals and logs.

use std::fmt::Write;

use crate::card::{BoxNode, CardNode};
use crate::{CardSerializer, Result};

const INDENT: &str = "  ";

/// Serializer producing an indented text outline, one node per line.
///
/// ```
/// use learnbot_report::card::{BoxNode, SeparatorNode, Size, TextNode};
/// use learnbot_report::{CardNode, CardSerializer, OutlineSerializer};
///
/// let card: CardNode = BoxNode::vertical()
///     .background("#ffffff")
///     .child(TextNode::new("hello"))
///     .child(SeparatorNode::with_margin(Size::Md))
///     .into();
///
/// let outline = OutlineSerializer::new().serialize(&card).unwrap();
/// assert_eq!(outline, "box vertical #ffffff\n  \"hello\"\n  ---\n");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineSerializer;

impl OutlineSerializer {
    /// Creates an outline serializer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Renders `card` as an outline string.
    #[must_use]
    pub fn outline(&self, card: &CardNode) -> String {
        let mut out = String::new();
        write_node(&mut out, card, 0);
        out
    }
}

impl CardSerializer for OutlineSerializer {
    type Output = String;

    fn serialize(&self, card: &CardNode) -> Result<String> {
        Ok(self.outline(card))
    }
}

fn write_node(out: &mut String, node: &CardNode, depth: usize) {
    let pad = INDENT.repeat(depth);

    match node {
        CardNode::Bubble(bubble) => {
            let _ = writeln!(out, "{pad}bubble {}", bubble.size.as_str());
            let blocks = [
                ("header", &bubble.header),
                ("body", &bubble.body),
                ("footer", &bubble.footer),
            ];
            for (name, block) in blocks {
                if let Some(block) = block {
                    let _ = writeln!(out, "{pad}{INDENT}[{name}]");
                    write_box(out, block, depth + 2);
                }
            }
        }
        CardNode::Box(node) => write_box(out, node, depth),
        CardNode::Text(text) => {
            let _ = writeln!(out, "{pad}\"{}\"", text.text);
        }
        CardNode::Separator(_) => {
            let _ = writeln!(out, "{pad}---");
        }
        CardNode::Image(image) => {
            let _ = writeln!(out, "{pad}image {}", image.url);
        }
        CardNode::Button(button) => {
            let _ = writeln!(out, "{pad}[{}]", button.action.label());
        }
    }
}

fn write_box(out: &mut String, node: &BoxNode, depth: usize) {
    let pad = INDENT.repeat(depth);
    let _ = write!(out, "{pad}box {}", node.layout.as_str());
    if let Some(color) = &node.background_color {
        let _ = write!(out, " {color}");
    }
    out.push('\n');

    for child in &node.contents {
        write_node(out, child, depth + 1);
    }
}
