//! Platform-agnostic card tree.
//!
//! [`CardNode`] is the output of the renderer and the input of every card
//! serializer. It mirrors the usual chat-card primitives (bubble, box, text,
//! separator, image, button) without depending on any messaging SDK. Each
//! node owns its children exclusively.

// ============================================================================
// Style Enums
// ============================================================================

/// Direction in which a box lays out its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Children stacked top to bottom.
    #[default]
    Vertical,
    /// Children side by side.
    Horizontal,
    /// Side by side, aligned on the text baseline.
    Baseline,
}

impl Layout {
    /// Returns the wire name of the layout.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Vertical => "vertical",
            Self::Horizontal => "horizontal",
            Self::Baseline => "baseline",
        }
    }
}

/// Keyword sizes shared by text size, margins, spacing and corner radii.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    /// No spacing.
    None,
    /// Extra-extra-small.
    Xxs,
    /// Extra-small.
    Xs,
    /// Small.
    Sm,
    /// Medium.
    Md,
    /// Large.
    Lg,
    /// Extra-large.
    Xl,
    /// Extra-extra-large.
    Xxl,
}

impl Size {
    /// Returns the wire name of the size.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Xxs => "xxs",
            Self::Xs => "xs",
            Self::Sm => "sm",
            Self::Md => "md",
            Self::Lg => "lg",
            Self::Xl => "xl",
            Self::Xxl => "xxl",
        }
    }
}

/// Width class of a bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BubbleSize {
    /// Narrowest bubble.
    Nano,
    /// Small bubble.
    Micro,
    /// Medium bubble.
    Kilo,
    /// Default bubble width.
    #[default]
    Mega,
    /// Widest bubble.
    Giga,
}

impl BubbleSize {
    /// Returns the wire name of the bubble size.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Nano => "nano",
            Self::Micro => "micro",
            Self::Kilo => "kilo",
            Self::Mega => "mega",
            Self::Giga => "giga",
        }
    }
}

/// Text direction of a bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Left to right.
    #[default]
    Ltr,
    /// Right to left.
    Rtl,
}

impl Direction {
    /// Returns the wire name of the direction.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        }
    }
}

/// Font weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Weight {
    /// Normal weight.
    #[default]
    Regular,
    /// Bold weight.
    Bold,
}

impl Weight {
    /// Returns the wire name of the weight.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Bold => "bold",
        }
    }
}

/// Horizontal alignment of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// Align to the start edge.
    Start,
    /// Center.
    Center,
    /// Align to the end edge.
    End,
}

impl Align {
    /// Returns the wire name of the alignment.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Center => "center",
            Self::End => "end",
        }
    }
}

// ============================================================================
// CardNode
// ============================================================================

/// A node of the card tree.
#[derive(Debug, Clone, PartialEq)]
pub enum CardNode {
    /// Root card with header and body blocks.
    Bubble(Bubble),
    /// Container laying out child nodes.
    Box(BoxNode),
    /// Line of text.
    Text(TextNode),
    /// Horizontal rule.
    Separator(SeparatorNode),
    /// Image loaded from a URL.
    Image(ImageNode),
    /// Tappable button.
    Button(ButtonNode),
}

impl CardNode {
    /// Returns the node's children, or an empty slice for leaves.
    ///
    /// A bubble's blocks are not children in this sense; use
    /// [`Bubble::blocks`] for those.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Box(node) => &node.contents,
            _ => &[],
        }
    }

    /// Collects every text string in the tree, depth first.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_texts(&mut out);
        out
    }

    fn collect_texts<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Bubble(bubble) => {
                for block in bubble.blocks() {
                    for child in &block.contents {
                        child.collect_texts(out);
                    }
                }
            }
            Self::Box(node) => {
                for child in &node.contents {
                    child.collect_texts(out);
                }
            }
            Self::Text(text) => out.push(&text.text),
            Self::Button(button) => out.push(button.action.label()),
            Self::Separator(_) | Self::Image(_) => {}
        }
    }
}

impl From<Bubble> for CardNode {
    fn from(node: Bubble) -> Self {
        Self::Bubble(node)
    }
}

impl From<BoxNode> for CardNode {
    fn from(node: BoxNode) -> Self {
        Self::Box(node)
    }
}

impl From<TextNode> for CardNode {
    fn from(node: TextNode) -> Self {
        Self::Text(node)
    }
}

impl From<SeparatorNode> for CardNode {
    fn from(node: SeparatorNode) -> Self {
        Self::Separator(node)
    }
}

impl From<ImageNode> for CardNode {
    fn from(node: ImageNode) -> Self {
        Self::Image(node)
    }
}

impl From<ButtonNode> for CardNode {
    fn from(node: ButtonNode) -> Self {
        Self::Button(node)
    }
}

// ============================================================================
// Bubble
// ============================================================================

/// Root card made of optional header, body and footer blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bubble {
    /// Width class.
    pub size: BubbleSize,
    /// Text direction.
    pub direction: Direction,
    /// Header block.
    pub header: Option<BoxNode>,
    /// Body block.
    pub body: Option<BoxNode>,
    /// Footer block.
    pub footer: Option<BoxNode>,
}

impl Bubble {
    /// Creates an empty bubble of the given size.
    #[must_use]
    pub fn new(size: BubbleSize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Sets the text direction.
    #[must_use]
    pub const fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Sets the header block.
    #[must_use]
    pub fn header(mut self, header: BoxNode) -> Self {
        self.header = Some(header);
        self
    }

    /// Sets the body block.
    #[must_use]
    pub fn body(mut self, body: BoxNode) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets the footer block.
    #[must_use]
    pub fn footer(mut self, footer: BoxNode) -> Self {
        self.footer = Some(footer);
        self
    }

    /// Returns the present blocks in header, body, footer order.
    pub fn blocks(&self) -> impl Iterator<Item = &BoxNode> {
        [&self.header, &self.body, &self.footer]
            .into_iter()
            .flatten()
    }
}

// ============================================================================
// BoxNode
// ============================================================================

/// Container node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxNode {
    /// Layout direction.
    pub layout: Layout,
    /// Background color as `#rrggbb`.
    pub background_color: Option<String>,
    /// Corner radius.
    pub corner_radius: Option<Size>,
    /// Padding on all sides, e.g. `20px`.
    pub padding_all: Option<String>,
    /// Space before this node inside its parent.
    pub margin: Option<Size>,
    /// Space between children.
    pub spacing: Option<Size>,
    /// Flex ratio inside a horizontal parent.
    pub flex: Option<u32>,
    /// Child nodes in order.
    pub contents: Vec<CardNode>,
}

impl BoxNode {
    /// Creates an empty box with the given layout.
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    /// Creates an empty vertical box.
    #[must_use]
    pub fn vertical() -> Self {
        Self::new(Layout::Vertical)
    }

    /// Creates an empty horizontal box.
    #[must_use]
    pub fn horizontal() -> Self {
        Self::new(Layout::Horizontal)
    }

    /// Sets the background color.
    #[must_use]
    pub fn background(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    /// Sets the corner radius.
    #[must_use]
    pub const fn corner_radius(mut self, radius: Size) -> Self {
        self.corner_radius = Some(radius);
        self
    }

    /// Sets the padding on all sides.
    #[must_use]
    pub fn padding(mut self, padding: impl Into<String>) -> Self {
        self.padding_all = Some(padding.into());
        self
    }

    /// Sets the margin.
    #[must_use]
    pub const fn margin(mut self, margin: Size) -> Self {
        self.margin = Some(margin);
        self
    }

    /// Sets the spacing between children.
    #[must_use]
    pub const fn spacing(mut self, spacing: Size) -> Self {
        self.spacing = Some(spacing);
        self
    }

    /// Sets the flex ratio.
    #[must_use]
    pub const fn flex(mut self, flex: u32) -> Self {
        self.flex = Some(flex);
        self
    }

    /// Appends a child node.
    #[must_use]
    pub fn child(mut self, node: impl Into<CardNode>) -> Self {
        self.contents.push(node.into());
        self
    }

    /// Appends several child nodes.
    #[must_use]
    pub fn children(mut self, nodes: impl IntoIterator<Item = CardNode>) -> Self {
        self.contents.extend(nodes);
        self
    }
}

// ============================================================================
// Leaves
// ============================================================================

/// Text node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextNode {
    /// The text itself.
    pub text: String,
    /// Font size.
    pub size: Option<Size>,
    /// Text color as `#rrggbb`.
    pub color: Option<String>,
    /// Font weight.
    pub weight: Weight,
    /// Whether long text wraps instead of being truncated.
    pub wrap: bool,
    /// Horizontal alignment.
    pub align: Option<Align>,
    /// Space before this node inside its parent.
    pub margin: Option<Size>,
    /// Flex ratio inside a horizontal parent.
    pub flex: Option<u32>,
}

impl TextNode {
    /// Creates a text node.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Sets the font size.
    #[must_use]
    pub const fn size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets the text color.
    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Makes the text bold.
    #[must_use]
    pub const fn bold(mut self) -> Self {
        self.weight = Weight::Bold;
        self
    }

    /// Lets the text wrap.
    #[must_use]
    pub const fn wrap(mut self) -> Self {
        self.wrap = true;
        self
    }

    /// Sets the alignment.
    #[must_use]
    pub const fn align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    /// Sets the margin.
    #[must_use]
    pub const fn margin(mut self, margin: Size) -> Self {
        self.margin = Some(margin);
        self
    }

    /// Sets the flex ratio.
    #[must_use]
    pub const fn flex(mut self, flex: u32) -> Self {
        self.flex = Some(flex);
        self
    }
}

/// Horizontal rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeparatorNode {
    /// Space before the rule.
    pub margin: Option<Size>,
    /// Rule color as `#rrggbb`.
    pub color: Option<String>,
}

impl SeparatorNode {
    /// Creates a separator with the given margin.
    #[must_use]
    pub const fn with_margin(margin: Size) -> Self {
        Self {
            margin: Some(margin),
            color: None,
        }
    }
}

/// Image node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageNode {
    /// HTTPS URL of the image.
    pub url: String,
    /// Size keyword or percentage, e.g. `full`.
    pub size: Option<String>,
    /// Aspect ratio as `width:height`.
    pub aspect_ratio: Option<String>,
    /// Whether the image covers its area instead of fitting inside it.
    pub cover: bool,
    /// Space before this node inside its parent.
    pub margin: Option<Size>,
}

impl ImageNode {
    /// Creates an image node.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// What a button does when tapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Sends `text` as a message from the user.
    Message {
        /// Button label.
        label: String,
        /// Message text.
        text: String,
    },
    /// Opens `uri`.
    Uri {
        /// Button label.
        label: String,
        /// Target URI.
        uri: String,
    },
}

impl Action {
    /// Returns the button label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Message { label, .. } | Self::Uri { label, .. } => label,
        }
    }
}

/// Visual style of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonStyle {
    /// Text-only button.
    #[default]
    Link,
    /// Filled button.
    Primary,
    /// Outlined button.
    Secondary,
}

impl ButtonStyle {
    /// Returns the wire name of the style.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

/// Button node.
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonNode {
    /// Tap action.
    pub action: Action,
    /// Visual style.
    pub style: ButtonStyle,
    /// Button color as `#rrggbb`.
    pub color: Option<String>,
    /// Space before this node inside its parent.
    pub margin: Option<Size>,
}

impl ButtonNode {
    /// Creates a link-style button.
    #[must_use]
    pub const fn new(action: Action) -> Self {
        Self {
            action,
            style: ButtonStyle::Link,
            color: None,
            margin: None,
        }
    }

    /// Sets the style.
    #[must_use]
    pub const fn style(mut self, style: ButtonStyle) -> Self {
        self.style = style;
        self
    }
}
