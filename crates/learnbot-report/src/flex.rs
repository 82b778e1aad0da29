//! LINE Flex Message serialization of card trees.
//!
//! [`FlexSerializer`] maps a [`CardNode`] tree onto the Flex Message JSON
//! schema: every node becomes an object with a `type` tag and camelCase
//! properties, and unset optional properties are left out.
//!
//! # Example
//!
//! ```rust
//! use learnbot_report::{CardRenderer, FlexSerializer, parse};
//!
//! let report = parse("❶學習態度⭐⭐⭐⭐☆ (85.0分)\n🌟 超棒！");
//! let card = CardRenderer::new().render(&report);
//!
//! let message = FlexSerializer::new().flex_message("學習報告", &card);
//! assert_eq!(message["type"], "flex");
//! assert_eq!(message["contents"]["type"], "bubble");
//! ```

use serde_json::{json, Map, Value};

use crate::card::{Action, BoxNode, Bubble, ButtonNode, CardNode, ImageNode, TextNode};
use crate::card::{SeparatorNode, Weight};
use crate::{ReportError, Result};

/// Turns a card tree into a platform payload.
pub trait CardSerializer {
    /// Serialized form of a card.
    type Output;

    /// Serializes `card`.
    fn serialize(&self, card: &CardNode) -> Result<Self::Output>;
}

/// Serializer producing LINE Flex Message JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlexSerializer;

impl FlexSerializer {
    /// Creates a Flex serializer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Converts `card` into a Flex container or component object.
    #[must_use]
    pub fn to_value(&self, card: &CardNode) -> Value {
        node_value(card)
    }

    /// Wraps `card` in a complete flex message with the given alt text.
    #[must_use]
    pub fn flex_message(&self, alt_text: &str, card: &CardNode) -> Value {
        Self::envelope(alt_text, node_value(card))
    }

    /// Wraps already serialized Flex `contents` in a flex message.
    #[must_use]
    pub fn envelope(alt_text: &str, contents: Value) -> Value {
        json!({
            "type": "flex",
            "altText": alt_text,
            "contents": contents,
        })
    }

    /// Generates compact single-line JSON for `card`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if JSON serialization fails.
    pub fn generate(&self, card: &CardNode) -> Result<String> {
        serde_json::to_string(&node_value(card)).map_err(ReportError::from)
    }

    /// Generates indented JSON for `card`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if JSON serialization fails.
    pub fn generate_pretty(&self, card: &CardNode) -> Result<String> {
        serde_json::to_string_pretty(&node_value(card)).map_err(ReportError::from)
    }
}

impl CardSerializer for FlexSerializer {
    type Output = Value;

    fn serialize(&self, card: &CardNode) -> Result<Value> {
        Ok(node_value(card))
    }
}

// ============================================================================
// Node mapping
// ============================================================================

fn node_value(node: &CardNode) -> Value {
    match node {
        CardNode::Bubble(bubble) => bubble_value(bubble),
        CardNode::Box(node) => box_value(node),
        CardNode::Text(node) => text_value(node),
        CardNode::Separator(node) => separator_value(node),
        CardNode::Image(node) => image_value(node),
        CardNode::Button(node) => button_value(node),
    }
}

/// Object builder that skips unset properties.
struct Props(Map<String, Value>);

impl Props {
    fn typed(kind: &str) -> Self {
        let mut map = Map::new();
        map.insert("type".to_string(), Value::from(kind));
        Self(map)
    }

    fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    fn opt<T: Into<Value>>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.set(key, value),
            None => self,
        }
    }

    fn done(self) -> Value {
        Value::Object(self.0)
    }
}

fn bubble_value(bubble: &Bubble) -> Value {
    Props::typed("bubble")
        .set("size", bubble.size.as_str())
        .set("direction", bubble.direction.as_str())
        .opt("header", bubble.header.as_ref().map(box_value))
        .opt("body", bubble.body.as_ref().map(box_value))
        .opt("footer", bubble.footer.as_ref().map(box_value))
        .done()
}

fn box_value(node: &BoxNode) -> Value {
    let contents: Vec<Value> = node.contents.iter().map(node_value).collect();

    Props::typed("box")
        .set("layout", node.layout.as_str())
        .opt("backgroundColor", node.background_color.as_deref())
        .opt("cornerRadius", node.corner_radius.map(|s| s.as_str()))
        .opt("paddingAll", node.padding_all.as_deref())
        .opt("margin", node.margin.map(|s| s.as_str()))
        .opt("spacing", node.spacing.map(|s| s.as_str()))
        .opt("flex", node.flex)
        .set("contents", contents)
        .done()
}

fn text_value(node: &TextNode) -> Value {
    let weight = (node.weight != Weight::Regular).then(|| node.weight.as_str());

    Props::typed("text")
        .set("text", node.text.as_str())
        .opt("size", node.size.map(|s| s.as_str()))
        .opt("color", node.color.as_deref())
        .opt("weight", weight)
        .opt("wrap", node.wrap.then_some(true))
        .opt("align", node.align.map(|a| a.as_str()))
        .opt("margin", node.margin.map(|s| s.as_str()))
        .opt("flex", node.flex)
        .done()
}

fn separator_value(node: &SeparatorNode) -> Value {
    Props::typed("separator")
        .opt("margin", node.margin.map(|s| s.as_str()))
        .opt("color", node.color.as_deref())
        .done()
}

fn image_value(node: &ImageNode) -> Value {
    Props::typed("image")
        .set("url", node.url.as_str())
        .opt("size", node.size.as_deref())
        .opt("aspectRatio", node.aspect_ratio.as_deref())
        .opt("aspectMode", node.cover.then_some("cover"))
        .opt("margin", node.margin.map(|s| s.as_str()))
        .done()
}

fn button_value(node: &ButtonNode) -> Value {
    let action = match &node.action {
        Action::Message { label, text } => json!({
            "type": "message",
            "label": label,
            "text": text,
        }),
        Action::Uri { label, uri } => json!({
            "type": "uri",
            "label": label,
            "uri": uri,
        }),
    };

    Props::typed("button")
        .set("action", action)
        .set("style", node.style.as_str())
        .opt("color", node.color.as_deref())
        .opt("margin", node.margin.map(|s| s.as_str()))
        .done()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::card::{Align, BubbleSize, ButtonStyle, Size};
    use crate::{compose, parse, CardRenderer, ScoredSession};

    fn sample_card() -> CardNode {
        let session = ScoredSession::builder()
            .attitude_score(85.0)
            .effectiveness_score(92.0)
            .concentration_score(70.0)
            .correct_count(10)
            .wrong_count(2)
            .avg_answer_time(12.0)
            .total_time(1800.0)
            .build();
        CardRenderer::new().render(&parse(&compose(&session, "多做練習題")))
    }

    #[test]
    fn test_text_omits_unset_properties() {
        let node: CardNode = TextNode::new("hello").into();
        let value = FlexSerializer::new().to_value(&node);

        assert_eq!(value, json!({ "type": "text", "text": "hello" }));
    }

    #[test]
    fn test_text_with_all_properties() {
        let node: CardNode = TextNode::new("85.0分")
            .size(Size::Md)
            .bold()
            .color("#FFFFFF")
            .align(Align::End)
            .wrap()
            .margin(Size::Xs)
            .flex(2)
            .into();
        let value = FlexSerializer::new().to_value(&node);

        assert_eq!(
            value,
            json!({
                "type": "text",
                "text": "85.0分",
                "size": "md",
                "color": "#FFFFFF",
                "weight": "bold",
                "wrap": true,
                "align": "end",
                "margin": "xs",
                "flex": 2
            })
        );
    }

    #[test]
    fn test_box_uses_camel_case_keys() {
        let node: CardNode = BoxNode::vertical()
            .background("#f8f9ff")
            .corner_radius(Size::Lg)
            .padding("20px")
            .spacing(Size::Md)
            .child(SeparatorNode::with_margin(Size::Lg))
            .into();
        let value = FlexSerializer::new().to_value(&node);

        assert_eq!(value["backgroundColor"], "#f8f9ff");
        assert_eq!(value["cornerRadius"], "lg");
        assert_eq!(value["paddingAll"], "20px");
        assert_eq!(value["spacing"], "md");
        assert_eq!(
            value["contents"][0],
            json!({ "type": "separator", "margin": "lg" })
        );
        assert!(value.get("margin").is_none());
    }

    #[test]
    fn test_rendered_report_is_a_giga_bubble() {
        let value = FlexSerializer::new().to_value(&sample_card());

        assert_eq!(value["type"], "bubble");
        assert_eq!(value["size"], "giga");
        assert_eq!(value["direction"], "ltr");
        assert_eq!(value["header"]["backgroundColor"], "#667eea");
        assert_eq!(value["body"]["contents"][0]["backgroundColor"], "#4ade80");
        assert!(value.get("footer").is_none());
    }

    #[test]
    fn test_flex_message_envelope() {
        let message = FlexSerializer::new().flex_message("學習報告", &sample_card());

        assert_eq!(message["type"], "flex");
        assert_eq!(message["altText"], "學習報告");
        assert_eq!(message["contents"]["type"], "bubble");
    }

    #[test]
    fn test_generate_compact_and_pretty() {
        let serializer = FlexSerializer::new();
        let card = sample_card();

        let compact = serializer.generate(&card).unwrap();
        assert!(!compact.contains('\n'));
        assert!(compact.contains(r#""type":"bubble""#));

        let pretty = serializer.generate_pretty(&card).unwrap();
        assert!(pretty.contains('\n'));

        let a: Value = serde_json::from_str(&compact).unwrap();
        let b: Value = serde_json::from_str(&pretty).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_trait_output_matches_to_value() {
        let serializer = FlexSerializer::new();
        let card = sample_card();

        assert_eq!(serializer.serialize(&card).unwrap(), serializer.to_value(&card));
    }

    #[test]
    fn test_button_and_image() {
        let card: CardNode = Bubble::new(BubbleSize::Kilo)
            .body(
                BoxNode::vertical()
                    .child(ImageNode {
                        size: Some("full".to_string()),
                        aspect_ratio: Some("20:13".to_string()),
                        cover: true,
                        ..ImageNode::new("https://example.com/a.png")
                    })
                    .child(
                        ButtonNode::new(Action::Message {
                            label: "再測一次".to_string(),
                            text: "test".to_string(),
                        })
                        .style(ButtonStyle::Primary),
                    ),
            )
            .into();
        let value = FlexSerializer::new().to_value(&card);
        let contents = &value["body"]["contents"];

        assert_eq!(
            contents[0],
            json!({
                "type": "image",
                "url": "https://example.com/a.png",
                "size": "full",
                "aspectRatio": "20:13",
                "aspectMode": "cover"
            })
        );
        assert_eq!(
            contents[1],
            json!({
                "type": "button",
                "action": { "type": "message", "label": "再測一次", "text": "test" },
                "style": "primary"
            })
        );
    }
}
