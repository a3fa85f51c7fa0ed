//! # Document Model
//!
//! The input representation for the layout engine. A document is a tree of
//! nodes, each with a kind, style properties, and (for containers) children.
//! The model is pure data: it is easily produced by JSON deserialization or
//! direct construction, and the engine never mutates it — one source tree can
//! be shared across concurrent layouts.
//!
//! All geometry is in integer device dots at 360 dots per inch. One text line
//! occupies 60 dots (6 lines per inch).

use crate::data::Condition;
use crate::style::Style;
use serde::{Deserialize, Serialize};

/// Horizontal device resolution base: dots per inch.
pub const DOTS_PER_INCH: i32 = 360;

/// Default vertical line density: lines per inch.
pub const LINES_PER_INCH: i32 = 6;

/// Height of one text line in dots.
pub const LINE_UNIT: i32 = DOTS_PER_INCH / LINES_PER_INCH;

/// A complete document ready for layout: a fixed-size page and a root node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Page dimensions in dots.
    #[serde(default)]
    pub page: PageSpec,

    /// The root node of the document tree.
    pub root: Node,
}

/// Page dimensions in device dots.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageSpec {
    pub width: i32,
    pub height: i32,
}

impl Default for PageSpec {
    fn default() -> Self {
        // 8" carriage × 11" form at 360 dpi.
        Self {
            width: 8 * DOTS_PER_INCH,
            height: 11 * DOTS_PER_INCH,
        }
    }
}

/// A node in the document tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// What kind of node this is.
    #[serde(flatten)]
    pub kind: NodeKind,

    /// Box model, positioning, and text-style overrides.
    #[serde(default)]
    pub style: Style,

    /// Visibility predicate, evaluated against the data context at
    /// measurement time. When false, `fallback` (or nothing) takes this
    /// node's place.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<Condition>,

    /// Subtree rendered instead of this node when `when` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Box<Node>>,

    /// A unique identifier for this node (optional, useful for debugging).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// The different kinds of nodes in the document tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    /// A sequential container: children flow down (column) or across (row).
    Stack {
        #[serde(default)]
        direction: Direction,
        /// Cross-axis (column) or run (row) horizontal alignment.
        #[serde(default)]
        align: HAlign,
        /// Vertical alignment of the content block (column) or of each
        /// child within the run (row).
        #[serde(default)]
        v_align: VAlign,
        #[serde(default)]
        children: Vec<Node>,
    },

    /// A row container with justify distribution and optional wrapping.
    Flex {
        #[serde(default)]
        justify: Justify,
        #[serde(default)]
        align_items: VAlign,
        #[serde(default)]
        wrap: FlexWrap,
        /// Gap between wrapped lines, in dots.
        #[serde(default)]
        row_gap: i32,
        #[serde(default)]
        children: Vec<Node>,
    },

    /// A table-like container with resolved column tracks and ordered rows.
    Grid {
        columns: Vec<ColumnSpec>,
        #[serde(default)]
        column_gap: i32,
        #[serde(default)]
        row_gap: i32,
        #[serde(default)]
        rows: Vec<GridRow>,
    },

    /// A run of text. Content may contain `{path}` placeholders resolved
    /// against the data context at measurement time.
    Text {
        content: String,
        #[serde(default)]
        align: HAlign,
        #[serde(default)]
        overflow: Overflow,
    },

    /// Empty space. Size comes from the style's explicit width/height;
    /// without one, a spacer has zero minimum size.
    Spacer,

    /// A horizontal or vertical rule drawn with a fill character.
    Line {
        #[serde(default)]
        direction: Direction,
        /// Character repeated along the rule.
        #[serde(default = "default_fill_char")]
        fill: char,
        /// Rule length along its axis; defaults to filling available space.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<Dimension>,
    },

    /// Rebinds the data-context root to `source` for the child subtree.
    Template { source: String, child: Box<Node> },

    /// Renders `children` when the condition holds, else `fallback`.
    Conditional {
        condition: Condition,
        #[serde(default)]
        children: Vec<Node>,
        /// The false branch. Serialized as `else`: the flattened node-level
        /// `fallback` key (the `when` fallback) claims `fallback` first, so
        /// the branch needs its own name in JSON.
        #[serde(default, rename = "else")]
        fallback: Vec<Node>,
    },

    /// Repeats `item` once per element of the array at `source`, binding
    /// each element into scope. `empty` renders for a missing/empty array.
    Each {
        source: String,
        /// Scope name for the element; defaults to `item`. The zero-based
        /// position is always bound as `index`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bind: Option<String>,
        item: Box<Node>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        empty: Option<Box<Node>>,
    },
}

impl Default for NodeKind {
    fn default() -> Self {
        NodeKind::Spacer
    }
}

fn default_fill_char() -> char {
    '-'
}

/// Flow direction for stacks and rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Column,
    Row,
}

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

/// Main-axis distribution for flex rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Justify {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// Whether flex items wrap onto new lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlexWrap {
    #[default]
    NoWrap,
    Wrap,
}

/// What to do with text wider than its boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    /// Stop emitting characters at the boundary.
    #[default]
    Clip,
    /// Replace trailing characters with a `...` continuation marker.
    Ellipsis,
}

/// A dimension in device dots, a percentage of available space, all of the
/// available space, or content-determined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Dots(i32),
    Percent(f64),
    Fill,
    Auto,
}

impl Dimension {
    /// Resolve this dimension given the available span on its axis.
    /// Returns None for Auto.
    pub fn resolve(&self, available: i32) -> Option<i32> {
        match self {
            Dimension::Dots(v) => Some(*v),
            Dimension::Percent(p) => Some(((available as f64) * p / 100.0).floor() as i32),
            Dimension::Fill => Some(available),
            Dimension::Auto => None,
        }
    }
}

/// Edge values (top, right, bottom, left) in dots, used for padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edges {
    #[serde(default)]
    pub top: i32,
    #[serde(default)]
    pub right: i32,
    #[serde(default)]
    pub bottom: i32,
    #[serde(default)]
    pub left: i32,
}

impl Edges {
    pub fn uniform(v: i32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: i32, horizontal: i32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> i32 {
        self.top + self.bottom
    }
}

/// One margin side: a fixed dot count or the `auto` keyword.
///
/// Auto only triggers centering when both opposing sides are auto; a single
/// auto side resolves to 0, deliberately.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginValue {
    Auto,
    #[serde(untagged)]
    Dots(i32),
}

impl MarginValue {
    /// The numeric contribution of this side; auto counts as 0.
    pub fn dots(&self) -> i32 {
        match self {
            MarginValue::Dots(v) => *v,
            MarginValue::Auto => 0,
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, MarginValue::Auto)
    }
}

impl Default for MarginValue {
    fn default() -> Self {
        MarginValue::Dots(0)
    }
}

/// Per-side margins. Outermost layer of the box model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    #[serde(default)]
    pub top: MarginValue,
    #[serde(default)]
    pub right: MarginValue,
    #[serde(default)]
    pub bottom: MarginValue,
    #[serde(default)]
    pub left: MarginValue,
}

impl Margin {
    pub fn uniform(v: i32) -> Self {
        Self {
            top: MarginValue::Dots(v),
            right: MarginValue::Dots(v),
            bottom: MarginValue::Dots(v),
            left: MarginValue::Dots(v),
        }
    }

    /// Both horizontal margins auto centers the box in its container.
    pub fn centers_horizontally(&self) -> bool {
        self.left.is_auto() && self.right.is_auto()
    }

    pub fn centers_vertically(&self) -> bool {
        self.top.is_auto() && self.bottom.is_auto()
    }

    pub fn horizontal(&self) -> i32 {
        self.left.dots() + self.right.dots()
    }

    pub fn vertical(&self) -> i32 {
        self.top.dots() + self.bottom.dots()
    }
}

/// Positioning mode for a node.
///
/// The Relative variant carries its visual offset here, never in the computed
/// x/y: flow position and visual displacement are kept apart by construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Position {
    #[default]
    Static,

    /// Out of flow; placed at (x ?? 0, y ?? 0) relative to the nearest
    /// containing block (an ancestor with an explicit size, or the page).
    Absolute {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        x: Option<i32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        y: Option<i32>,
    },

    /// In flow exactly like Static; the offset is recorded on the layout
    /// result and applied only when render items are emitted.
    Relative {
        #[serde(default)]
        dx: i32,
        #[serde(default)]
        dy: i32,
    },
}

/// Column definition for grids.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    /// Track width: fixed dots, percent of available width, an even share
    /// of the remaining width (fill), or the widest cell (auto).
    pub width: Dimension,
    /// Horizontal alignment for cells in this column. A Text cell's own
    /// alignment is used when this is left at the default.
    #[serde(default)]
    pub align: HAlign,
}

impl ColumnSpec {
    pub fn dots(v: i32) -> Self {
        Self {
            width: Dimension::Dots(v),
            align: HAlign::Left,
        }
    }

    pub fn fill() -> Self {
        Self {
            width: Dimension::Fill,
            align: HAlign::Left,
        }
    }

    pub fn auto() -> Self {
        Self {
            width: Dimension::Auto,
            align: HAlign::Left,
        }
    }
}

/// A row inside a Grid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRow {
    pub cells: Vec<Node>,
    /// Explicit row height in dots; defaults to the tallest cell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    /// Marks a heading row (metadata for downstream encoders).
    #[serde(default)]
    pub header: bool,
    /// Style applied between the grid's and each cell's own style.
    #[serde(default)]
    pub style: Style,
}

impl GridRow {
    pub fn new(cells: Vec<Node>) -> Self {
        Self {
            cells,
            ..Default::default()
        }
    }

    pub fn header(cells: Vec<Node>) -> Self {
        Self {
            cells,
            header: true,
            ..Default::default()
        }
    }
}

impl Node {
    /// Create a Text node.
    pub fn text(content: &str) -> Self {
        Self {
            kind: NodeKind::Text {
                content: content.to_string(),
                align: HAlign::Left,
                overflow: Overflow::Clip,
            },
            ..Default::default()
        }
    }

    /// Create a column Stack with children.
    pub fn stack(children: Vec<Node>) -> Self {
        Self {
            kind: NodeKind::Stack {
                direction: Direction::Column,
                align: HAlign::Left,
                v_align: VAlign::Top,
                children,
            },
            ..Default::default()
        }
    }

    /// Create a row Stack with children.
    pub fn row(children: Vec<Node>) -> Self {
        Self {
            kind: NodeKind::Stack {
                direction: Direction::Row,
                align: HAlign::Left,
                v_align: VAlign::Top,
                children,
            },
            ..Default::default()
        }
    }

    /// Create a non-wrapping Flex row with children.
    pub fn flex(children: Vec<Node>) -> Self {
        Self {
            kind: NodeKind::Flex {
                justify: Justify::Start,
                align_items: VAlign::Top,
                wrap: FlexWrap::NoWrap,
                row_gap: 0,
                children,
            },
            ..Default::default()
        }
    }

    /// Create a Grid from column specs and rows.
    pub fn grid(columns: Vec<ColumnSpec>, rows: Vec<GridRow>) -> Self {
        Self {
            kind: NodeKind::Grid {
                columns,
                column_gap: 0,
                row_gap: 0,
                rows,
            },
            ..Default::default()
        }
    }

    /// Create a Spacer node.
    pub fn spacer() -> Self {
        Self {
            kind: NodeKind::Spacer,
            ..Default::default()
        }
    }

    /// Create a horizontal rule that fills available width.
    pub fn rule() -> Self {
        Self {
            kind: NodeKind::Line {
                direction: Direction::Row,
                fill: '-',
                length: None,
            },
            ..Default::default()
        }
    }

    /// Replace this node's style.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dimension_resolution() {
        assert_eq!(Dimension::Dots(120).resolve(500), Some(120));
        assert_eq!(Dimension::Percent(50.0).resolve(501), Some(250));
        assert_eq!(Dimension::Fill.resolve(720), Some(720));
        assert_eq!(Dimension::Auto.resolve(720), None);
    }

    #[test]
    fn margin_auto_detection() {
        let both = Margin {
            left: MarginValue::Auto,
            right: MarginValue::Auto,
            ..Default::default()
        };
        assert!(both.centers_horizontally());
        assert_eq!(both.horizontal(), 0);

        let one = Margin {
            left: MarginValue::Auto,
            right: MarginValue::Dots(40),
            ..Default::default()
        };
        assert!(!one.centers_horizontally());
        assert_eq!(one.horizontal(), 40);
    }

    #[test]
    fn node_deserializes_from_json() {
        let node: Node = serde_json::from_value(json!({
            "type": "Stack",
            "direction": "column",
            "children": [
                { "type": "Text", "content": "INVOICE", "align": "center" },
                { "type": "Spacer" }
            ]
        }))
        .unwrap();

        match node.kind {
            NodeKind::Stack { children, .. } => assert_eq!(children.len(), 2),
            other => panic!("expected stack, got {other:?}"),
        }
    }

    #[test]
    fn margin_value_accepts_auto_and_dots() {
        let m: Margin = serde_json::from_value(json!({
            "left": "auto",
            "right": "auto",
            "top": 30
        }))
        .unwrap();
        assert!(m.centers_horizontally());
        assert_eq!(m.top, MarginValue::Dots(30));
    }

    #[test]
    fn conditional_else_branch_parses_alongside_when_fallback() {
        let node: Node = serde_json::from_value(json!({
            "type": "Conditional",
            "condition": { "op": "truthy", "path": "paid" },
            "children": [ { "type": "Text", "content": "PAID" } ],
            "else": [
                { "type": "Text", "content": "BALANCE" },
                { "type": "Text", "content": "DUE" }
            ],
            "when": { "op": "exists", "path": "totals" },
            "fallback": { "type": "Spacer" }
        }))
        .unwrap();

        match &node.kind {
            NodeKind::Conditional {
                children, fallback, ..
            } => {
                assert_eq!(children.len(), 1);
                assert_eq!(fallback.len(), 2);
            }
            other => panic!("expected conditional, got {other:?}"),
        }
        // The node-level fallback key still belongs to `when`.
        assert!(node.when.is_some());
        assert!(matches!(node.fallback.as_deref(), Some(n) if matches!(n.kind, NodeKind::Spacer)));
    }

    #[test]
    fn position_round_trips() {
        let p: Position = serde_json::from_value(json!({
            "mode": "relative", "dx": 12, "dy": -4
        }))
        .unwrap();
        assert_eq!(p, Position::Relative { dx: 12, dy: -4 });
    }
}
