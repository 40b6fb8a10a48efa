//! Canvas element definitions.

use crate::widget::HandleKind;
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Footprint used when a palette item carries an unrecognized type tag.
pub const FALLBACK_FOOTPRINT: Size = Size::new(100.0, 100.0);

/// Height of a text block that has never been resized. Palette drags probe
/// the same band, so an accepted drop never lays out over a sibling.
pub const TEXT_PROBE_HEIGHT: f64 = 40.0;

/// Identifier of an element on a canvas.
///
/// Ids are a numeric sequence but travel as strings (`"0"`, `"1"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ElementId(u64);

impl ElementId {
    /// Create an id from its numeric value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The numeric value of this id.
    pub fn value(self) -> u64 {
        self.0
    }

    /// The id following this one in the sequence, or `None` at the end of it.
    pub fn successor(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ElementId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<ElementId> for String {
    fn from(id: ElementId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for ElementId {
    type Error = ParseIntError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The kinds of block a page can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Header,
    Footer,
    TextContent,
    Card,
    Slider,
}

/// Handles accepted by cards: every direction plus the legacy aliases.
const CARD_HANDLES: [HandleKind; 11] = [
    HandleKind::Top,
    HandleKind::Bottom,
    HandleKind::Left,
    HandleKind::Right,
    HandleKind::TopLeft,
    HandleKind::TopRight,
    HandleKind::BottomLeft,
    HandleKind::BottomRight,
    HandleKind::Horizontal,
    HandleKind::Vertical,
    HandleKind::Both,
];

/// Text blocks only stretch sideways.
const TEXT_HANDLES: [HandleKind; 2] = [HandleKind::Right, HandleKind::Left];

impl ElementKind {
    /// All kinds, in palette order.
    pub const ALL: [ElementKind; 5] = [
        ElementKind::Header,
        ElementKind::Footer,
        ElementKind::TextContent,
        ElementKind::Card,
        ElementKind::Slider,
    ];

    /// The type tag carried by palette items and surface children.
    pub fn tag(self) -> &'static str {
        match self {
            ElementKind::Header => "header",
            ElementKind::Footer => "footer",
            ElementKind::TextContent => "text-content",
            ElementKind::Card => "card",
            ElementKind::Slider => "slider",
        }
    }

    /// Parse a type tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Whether the block always spans the full canvas width.
    pub fn is_full_width(self) -> bool {
        matches!(self, ElementKind::Header | ElementKind::Footer | ElementKind::Slider)
    }

    /// Fixed height of full-width blocks.
    pub fn fixed_height(self) -> Option<f64> {
        match self {
            ElementKind::Header => Some(80.0),
            ElementKind::Footer => Some(60.0),
            ElementKind::Slider => Some(400.0),
            ElementKind::TextContent | ElementKind::Card => None,
        }
    }

    /// Size used to probe for overlap while this kind is dragged from the palette.
    pub fn footprint(self, canvas_width: f64) -> Size {
        match self {
            ElementKind::Header | ElementKind::Footer | ElementKind::Slider => {
                Size::new(canvas_width, self.fixed_height().unwrap_or_default())
            }
            ElementKind::Card => Size::new(300.0, 200.0),
            // Text sizes itself to its content, so probe a thin full-width band.
            ElementKind::TextContent => Size::new(canvas_width, TEXT_PROBE_HEIGHT),
        }
    }

    /// Resize handles this kind accepts. Empty for blocks that cannot be resized.
    pub fn resize_handles(self) -> &'static [HandleKind] {
        match self {
            ElementKind::Card => &CARD_HANDLES,
            ElementKind::TextContent => &TEXT_HANDLES,
            ElementKind::Header | ElementKind::Footer | ElementKind::Slider => &[],
        }
    }

    /// Whether blocks of this kind can be resized at all.
    pub fn is_resizable(self) -> bool {
        !self.resize_handles().is_empty()
    }

    /// Whether the given handle starts a resize on this kind.
    pub fn accepts_handle(self, handle: HandleKind) -> bool {
        self.resize_handles().contains(&handle)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Probe footprint for a raw palette tag, tolerating unknown tags.
pub fn palette_footprint(tag: &str, canvas_width: f64) -> Size {
    ElementKind::from_tag(tag)
        .map(|kind| kind.footprint(canvas_width))
        .unwrap_or(FALLBACK_FOOTPRINT)
}

/// Header content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderContent {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

/// Footer content.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FooterContent {
    pub copyright: String,
    #[serde(default)]
    pub links: Vec<String>,
}

/// Rich text block content.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlockContent {
    pub html: String,
    pub plain_text: String,
}

/// Card content.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CardContent {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Image slider content.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SliderContent {
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// Content of an element. The variant determines the element's kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "kebab-case")]
pub enum ElementContent {
    Header(HeaderContent),
    Footer(FooterContent),
    TextContent(TextBlockContent),
    Card(CardContent),
    Slider(SliderContent),
}

impl ElementContent {
    /// Placeholder content for a freshly dropped block.
    pub fn default_for(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Header => ElementContent::Header(HeaderContent {
                text: "Header".to_string(),
                style: None,
            }),
            ElementKind::Footer => ElementContent::Footer(FooterContent::default()),
            ElementKind::TextContent => ElementContent::TextContent(TextBlockContent::default()),
            ElementKind::Card => ElementContent::Card(CardContent::default()),
            ElementKind::Slider => ElementContent::Slider(SliderContent::default()),
        }
    }

    /// The kind this content belongs to.
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementContent::Header(_) => ElementKind::Header,
            ElementContent::Footer(_) => ElementKind::Footer,
            ElementContent::TextContent(_) => ElementKind::TextContent,
            ElementContent::Card(_) => ElementKind::Card,
            ElementContent::Slider(_) => ElementKind::Slider,
        }
    }
}

/// Horizontal placement of an element relative to the canvas's left edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "lowercase")]
pub enum HorizontalOffset {
    /// Absolute offset in pixels.
    Pixels(f64),
    /// Percentage of the canvas width, so placement follows canvas resizes.
    Percent(f64),
}

impl HorizontalOffset {
    /// Express a pixel offset as a percentage of `canvas_width`.
    pub fn percent_of(pixels: f64, canvas_width: f64) -> Self {
        if canvas_width > 0.0 {
            HorizontalOffset::Percent(pixels * 100.0 / canvas_width)
        } else {
            HorizontalOffset::Percent(0.0)
        }
    }

    /// Offset in pixels for a canvas of the given width.
    pub fn resolve(self, canvas_width: f64) -> f64 {
        match self {
            HorizontalOffset::Pixels(px) => px,
            HorizontalOffset::Percent(pct) => pct * canvas_width / 100.0,
        }
    }

    /// Same unit as `self`, re-expressed for a new pixel offset.
    pub fn with_pixels(self, pixels: f64, canvas_width: f64) -> Self {
        match self {
            HorizontalOffset::Pixels(_) => HorizontalOffset::Pixels(pixels),
            HorizontalOffset::Percent(_) => Self::percent_of(pixels, canvas_width),
        }
    }
}

/// Position of an element inside the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementPosition {
    pub left: HorizontalOffset,
    /// Pixels from the canvas top.
    pub top: f64,
}

impl ElementPosition {
    pub fn new(left: HorizontalOffset, top: f64) -> Self {
        Self { left, top }
    }

    /// Top-left corner of the canvas.
    pub fn origin() -> Self {
        Self::new(HorizontalOffset::Percent(0.0), 0.0)
    }
}

/// A block placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasElement {
    pub(crate) id: ElementId,
    pub content: ElementContent,
    pub position: ElementPosition,
    /// Size committed by a resize. `None` means the kind's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    pub(crate) z_index: i64,
}

impl CanvasElement {
    pub(crate) fn new(id: ElementId, content: ElementContent, position: ElementPosition, z_index: i64) -> Self {
        Self {
            id,
            content,
            position,
            size: None,
            z_index,
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.content.kind()
    }

    pub fn z_index(&self) -> i64 {
        self.z_index
    }

    /// Bounding rectangle of this element laid out inside `canvas`.
    ///
    /// Full-width blocks are pinned to the canvas's left edge; text fills the
    /// remaining width until it is resized.
    pub fn layout_rect(&self, canvas: Rect) -> Rect {
        let kind = self.kind();
        let left = if kind.is_full_width() {
            0.0
        } else {
            self.position.left.resolve(canvas.width())
        };
        let size = match (kind, self.size) {
            (_, Some(size)) if kind.is_resizable() => size,
            (ElementKind::Card, _) => kind.footprint(canvas.width()),
            (ElementKind::TextContent, _) => {
                Size::new((canvas.width() - left).max(0.0), TEXT_PROBE_HEIGHT)
            }
            (ElementKind::Header | ElementKind::Footer | ElementKind::Slider, _) => {
                kind.footprint(canvas.width())
            }
        };
        Rect::from_origin_size(Point::new(canvas.x0 + left, canvas.y0 + self.position.top), size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_string_form() {
        let id = ElementId::new(7);
        assert_eq!(id.to_string(), "7");
        assert_eq!("7".parse::<ElementId>().unwrap(), id);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"7\"");
        assert_eq!(serde_json::from_str::<ElementId>("\"12\"").unwrap(), ElementId::new(12));
        assert!(serde_json::from_str::<ElementId>("\"abc\"").is_err());
    }

    #[test]
    fn test_kind_tags() {
        for kind in ElementKind::ALL {
            assert_eq!(ElementKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(ElementKind::from_tag("carousel"), None);
        assert_eq!(
            serde_json::to_string(&ElementKind::TextContent).unwrap(),
            "\"text-content\""
        );
    }

    #[test]
    fn test_palette_footprints() {
        assert_eq!(palette_footprint("header", 1000.0), Size::new(1000.0, 80.0));
        assert_eq!(palette_footprint("footer", 1000.0), Size::new(1000.0, 60.0));
        assert_eq!(palette_footprint("slider", 1000.0), Size::new(1000.0, 400.0));
        assert_eq!(palette_footprint("card", 1000.0), Size::new(300.0, 200.0));
        assert_eq!(palette_footprint("text-content", 1000.0), Size::new(1000.0, 40.0));
        assert_eq!(palette_footprint("mystery", 1000.0), FALLBACK_FOOTPRINT);
    }

    #[test]
    fn test_resize_handles_per_kind() {
        assert!(ElementKind::Card.accepts_handle(HandleKind::Both));
        assert!(ElementKind::TextContent.accepts_handle(HandleKind::Left));
        assert!(!ElementKind::TextContent.accepts_handle(HandleKind::Bottom));
        assert!(!ElementKind::Header.is_resizable());
    }

    #[test]
    fn test_percent_offset_round_trip() {
        let offset = HorizontalOffset::percent_of(250.0, 1000.0);
        assert_eq!(offset, HorizontalOffset::Percent(25.0));
        assert_eq!(offset.resolve(1000.0), 250.0);
        // Proportional placement follows the canvas width.
        assert_eq!(offset.resolve(400.0), 100.0);
        assert_eq!(HorizontalOffset::percent_of(10.0, 0.0), HorizontalOffset::Percent(0.0));
    }

    #[test]
    fn test_layout_rect() {
        let canvas = Rect::new(50.0, 20.0, 1050.0, 820.0);
        let header = CanvasElement::new(
            ElementId::new(0),
            ElementContent::default_for(ElementKind::Header),
            ElementPosition::new(HorizontalOffset::Percent(30.0), 10.0),
            0,
        );
        assert_eq!(header.layout_rect(canvas), Rect::new(50.0, 30.0, 1050.0, 110.0));

        let mut card = CanvasElement::new(
            ElementId::new(1),
            ElementContent::default_for(ElementKind::Card),
            ElementPosition::new(HorizontalOffset::Percent(10.0), 100.0),
            1,
        );
        assert_eq!(card.layout_rect(canvas), Rect::new(150.0, 120.0, 450.0, 320.0));

        card.size = Some(Size::new(360.0, 240.0));
        assert_eq!(card.layout_rect(canvas), Rect::new(150.0, 120.0, 510.0, 360.0));
    }

    #[test]
    fn test_unresized_text_matches_probe_band() {
        let canvas = Rect::new(0.0, 0.0, 1000.0, 800.0);
        let text = CanvasElement::new(
            ElementId::new(0),
            ElementContent::default_for(ElementKind::TextContent),
            ElementPosition::new(HorizontalOffset::Pixels(200.0), 0.0),
            0,
        );
        let layout = text.layout_rect(canvas);
        assert_eq!(layout, Rect::new(200.0, 0.0, 1000.0, TEXT_PROBE_HEIGHT));
        assert_eq!(layout.height(), palette_footprint("text-content", 1000.0).height);
    }

    #[test]
    fn test_id_successor_stops_at_max() {
        assert_eq!(ElementId::new(4).successor(), Some(ElementId::new(5)));
        assert_eq!(ElementId::new(u64::MAX).successor(), None);
    }

    #[test]
    fn test_content_serialization_shape() {
        let content = ElementContent::Slider(SliderContent {
            image_urls: vec!["a.png".to_string()],
        });
        let value = serde_json::to_value(&content).unwrap();
        assert_eq!(value["type"], "slider");
        assert_eq!(value["content"]["image_urls"][0], "a.png");

        let text = ElementContent::TextContent(TextBlockContent {
            html: "<p>hi</p>".to_string(),
            plain_text: "hi".to_string(),
        });
        let value = serde_json::to_value(&text).unwrap();
        assert_eq!(value["type"], "text-content");
        assert_eq!(value["content"]["plainText"], "hi");
    }
}
