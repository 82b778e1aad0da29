//! Rendering parsed reports into card trees.
//!
//! The renderer only knows about [`CardNode`]; turning the tree into a
//! platform payload is the job of a [`crate::CardSerializer`].

use crate::card::{
    Align, BoxNode, Bubble, BubbleSize, CardNode, Direction, SeparatorNode, Size, TextNode,
};
use crate::parse::{ParsedReport, ParsedSection};

const WHITE: &str = "#FFFFFF";
const HEADER_BACKGROUND: &str = "#667eea";
const HEADER_SUBTITLE: &str = "#E8EAFF";
const BODY_BACKGROUND: &str = "#f8f9ff";
const CONTENT_TEXT: &str = "#374151";
const STAT_BACKGROUND: &str = "#ffffff";
const ADVICE_BACKGROUND: &str = "#1e293b";
const ADVICE_TEXT: &str = "#cbd5e1";

/// Colors of one section: title card, content card, and accent text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionColors {
    /// Title card background.
    pub background: &'static str,
    /// Content card background.
    pub light: &'static str,
    /// Dark accent matching the background, used for stat rows.
    pub text: &'static str,
}

/// Section colors, cycled by section position.
pub const PALETTE: [SectionColors; 3] = [
    SectionColors {
        background: "#4ade80",
        light: "#dcfce7",
        text: "#166534",
    },
    SectionColors {
        background: "#fbbf24",
        light: "#fef3c7",
        text: "#92400e",
    },
    SectionColors {
        background: "#f87171",
        light: "#fee2e2",
        text: "#991b1b",
    },
];

/// Returns the palette entry for the section at `index`.
#[must_use]
pub const fn section_colors(index: usize) -> SectionColors {
    PALETTE[index % PALETTE.len()]
}

/// Builds report cards from [`ParsedReport`]s.
///
/// Rendering is pure: the same report always yields an identical tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct CardRenderer;

impl CardRenderer {
    /// Creates a renderer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Renders `report` into a giga-sized bubble.
    ///
    /// The motivation line and orphan lines are not rendered.
    #[must_use]
    pub fn render(&self, report: &ParsedReport) -> CardNode {
        Bubble::new(BubbleSize::Giga)
            .direction(Direction::Ltr)
            .header(Self::header())
            .body(Self::body(report))
            .into()
    }

    fn header() -> BoxNode {
        BoxNode::vertical()
            .background(HEADER_BACKGROUND)
            .padding("20px")
            .child(
                BoxNode::horizontal()
                    .child(TextNode::new("📊").size(Size::Xxl).color(WHITE).flex(1))
                    .child(
                        BoxNode::vertical()
                            .flex(4)
                            .child(TextNode::new("學習成果報告").bold().size(Size::Xl).color(WHITE))
                            .child(
                                TextNode::new("Learning Report")
                                    .size(Size::Sm)
                                    .color(HEADER_SUBTITLE)
                                    .margin(Size::Xs),
                            ),
                    ),
            )
    }

    fn body(report: &ParsedReport) -> BoxNode {
        let mut body = BoxNode::vertical()
            .padding("20px")
            .background(BODY_BACKGROUND)
            .spacing(Size::Md);

        for (index, section) in report.sections.iter().enumerate() {
            if index > 0 {
                body = body.child(SeparatorNode::with_margin(Size::Lg));
            }
            body = body.children(Self::section(section, index));
        }

        if !report.ai_advice.is_empty() {
            body = body
                .child(SeparatorNode::with_margin(Size::Xl))
                .child(Self::advice(&report.ai_advice));
        }

        body
    }

    /// Title card, plus a content card when the section has a body.
    fn section(section: &ParsedSection, index: usize) -> Vec<CardNode> {
        let colors = section_colors(index);
        let mut nodes = vec![Self::title_card(section, colors).into()];

        if section.has_body() {
            nodes.push(Self::content_card(section, colors).into());
        }

        nodes
    }

    fn title_card(section: &ParsedSection, colors: SectionColors) -> BoxNode {
        let rating_row = BoxNode::horizontal()
            .margin(Size::Sm)
            .child(
                TextNode::new(section.stars.as_str())
                    .size(Size::Md)
                    .color(WHITE)
                    .flex(3),
            )
            .child(
                TextNode::new(section.score.as_str())
                    .size(Size::Md)
                    .bold()
                    .color(WHITE)
                    .align(Align::End)
                    .flex(2),
            );

        BoxNode::vertical()
            .background(colors.background)
            .corner_radius(Size::Lg)
            .padding("16px")
            .child(
                BoxNode::horizontal()
                    .child(
                        TextNode::new(section.marker.as_str())
                            .size(Size::Xl)
                            .bold()
                            .color(WHITE)
                            .flex(1),
                    )
                    .child(
                        BoxNode::vertical()
                            .flex(5)
                            .child(
                                TextNode::new(section.title.as_str())
                                    .bold()
                                    .size(Size::Lg)
                                    .color(WHITE)
                                    .wrap(),
                            )
                            .child(rating_row),
                    ),
            )
    }

    fn content_card(section: &ParsedSection, colors: SectionColors) -> BoxNode {
        let mut card = BoxNode::vertical()
            .background(colors.light)
            .corner_radius(Size::Md)
            .padding("16px")
            .margin(Size::Sm);

        for line in &section.content {
            card = card.child(
                TextNode::new(line.as_str())
                    .size(Size::Sm)
                    .color(CONTENT_TEXT)
                    .wrap()
                    .margin(Size::Sm),
            );
        }

        if !section.stats.is_empty() {
            if !section.content.is_empty() {
                card = card.child(SeparatorNode::with_margin(Size::Md));
            }

            let stats = section.stats.iter().fold(
                BoxNode::vertical()
                    .background(STAT_BACKGROUND)
                    .corner_radius(Size::Md)
                    .padding("12px")
                    .margin(Size::Sm),
                |stats, line| {
                    stats.child(
                        TextNode::new(line.as_str())
                            .size(Size::Sm)
                            .color(colors.text)
                            .margin(Size::Xs),
                    )
                },
            );
            card = card.child(stats);
        }

        card
    }

    fn advice(advice: &str) -> BoxNode {
        BoxNode::vertical()
            .background(ADVICE_BACKGROUND)
            .corner_radius(Size::Lg)
            .padding("20px")
            .child(
                BoxNode::horizontal()
                    .child(TextNode::new("🤖").size(Size::Lg).color(WHITE))
                    .child(
                        BoxNode::vertical()
                            .flex(5)
                            .margin(Size::Sm)
                            .child(TextNode::new("AI 專屬建議").bold().size(Size::Md).color(WHITE))
                            .child(
                                TextNode::new(advice)
                                    .size(Size::Sm)
                                    .color(ADVICE_TEXT)
                                    .margin(Size::Xs)
                                    .wrap(),
                            ),
                    ),
            )
    }
}
