//! # Two-Pass Layout Engine
//!
//! The heart of platen. Layout runs in two strict passes over the tree:
//!
//! 1. **Measurement** (bottom-up): every node computes its minimum content
//!    size and its preferred size under the available space, resolving
//!    explicit dimensions, padding, margins, and the inherited text style.
//!    Data-driven nodes (Conditional, Each, Template, `when` predicates,
//!    `{path}` interpolation) are evaluated here, once — the layout pass
//!    never sees the data context.
//! 2. **Layout** (top-down): given the measured tree and a page rectangle,
//!    every node receives a final border-box position per its container's
//!    algorithm: sequential stack flow with additive sibling margins, flex
//!    distribution with wrapping, grid track placement.
//!
//! Both passes are pure: the source tree is never mutated, and two runs over
//! the same inputs produce identical results. The flatten pass
//! (`crate::render`) then turns the positioned tree into render items.
//!
//! ## Box model
//!
//! Margin is always outermost, then padding, then content; explicit sizes fix
//! the padding-inclusive box. Relative offsets are carried as data on the
//! result, never folded into flow positions — a historically bug-prone spot
//! that the `Position` type now rules out.

pub mod flex;
pub mod grid;

use serde::Serialize;

use crate::data::{DataContext, PredicateScope};
use crate::error::LayoutError;
use crate::model::*;
use crate::style::ResolvedStyle;
use crate::text::TextMetrics;

use flex::{justify_offsets, partition_into_lines, WrapLine};
use grid::{resolve_columns, track_offset, track_span};

/// An axis-aligned rectangle in device dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A measured node: preferred and minimum sizes plus everything the layout
/// pass needs to position it without re-touching the data context.
///
/// References the immutable source node; owns its measured children. Built
/// fresh per layout invocation and discarded after the layout pass.
#[derive(Debug)]
pub struct MeasuredNode<'a> {
    pub node: &'a Node,
    /// Minimum content size (border-box).
    pub min_width: i32,
    pub min_height: i32,
    /// Preferred border-box size after explicit-size resolution and clamping.
    pub width: i32,
    pub height: i32,
    pub padding: Edges,
    /// Resolved margin; auto sides keep their marker rather than reading 0.
    pub margin: Margin,
    pub style: ResolvedStyle,
    pub children: Vec<MeasuredNode<'a>>,
    pub detail: MeasuredDetail,
}

/// Per-kind measurement extras.
#[derive(Debug)]
pub enum MeasuredDetail {
    None,
    /// `when` evaluated false and no fallback exists; occupies no space.
    Hidden,
    /// Interpolated text and its natural width.
    Text { content: String, content_width: i32 },
    /// Resolved rule length along its axis.
    Rule { length: i32 },
    /// Wrap-line partition over this node's flow children.
    Flex { lines: Vec<WrapLine> },
    /// Resolved column tracks and row heights.
    Grid {
        col_widths: Vec<i32>,
        row_heights: Vec<i32>,
    },
}

impl MeasuredNode<'_> {
    pub fn is_hidden(&self) -> bool {
        matches!(self.detail, MeasuredDetail::Hidden)
    }

    pub fn position(&self) -> Position {
        self.node.style.position.unwrap_or_default()
    }

    pub fn is_absolute(&self) -> bool {
        matches!(self.position(), Position::Absolute { .. })
    }

    /// Border-box width plus numeric margins (auto counts as 0).
    pub fn outer_width(&self) -> i32 {
        self.width + self.margin.horizontal()
    }

    pub fn outer_height(&self) -> i32 {
        self.height + self.margin.vertical()
    }
}

/// Truncation boundary for a flattened text run: the width the content must
/// fit inside and the alignment to apply within it. Set for grid cells and
/// for text nodes with an explicit width; absent for auto-width text, which
/// is never truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderConstraints {
    pub width: i32,
    pub h_align: HAlign,
}

/// What the flatten pass emits for a positioned node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RenderContent {
    /// Pure layout container or spacer; nothing to draw.
    None,
    Text {
        content: String,
        content_width: i32,
        align: HAlign,
        overflow: Overflow,
    },
    Rule {
        ch: char,
        direction: Direction,
        length: i32,
    },
}

/// A positioned node. `x`/`y` are always the normal-flow position;
/// `relative_offset` is a sidecar applied only when render items are
/// emitted, so it can never perturb sibling layout or ancestor bounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutResult {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub relative_offset: (i32, i32),
    pub constraints: Option<RenderConstraints>,
    pub padding: Edges,
    pub style: ResolvedStyle,
    pub content: RenderContent,
    pub children: Vec<LayoutResult>,
}

/// The layout engine. Holds only a borrowed metrics provider; a single
/// engine may serve concurrent layouts over shared trees.
pub struct LayoutEngine<'m> {
    pub(crate) metrics: &'m dyn TextMetrics,
}

impl<'m> LayoutEngine<'m> {
    pub fn new(metrics: &'m dyn TextMetrics) -> Self {
        Self { metrics }
    }

    /// Measure, then lay out, against the given page rectangle.
    pub fn perform_layout(
        &self,
        node: &Node,
        rect: Rect,
        ctx: &DataContext,
    ) -> Result<LayoutResult, LayoutError> {
        let measured = self.measure(node, rect.width, rect.height, ctx)?;
        Ok(self.layout(&measured, rect))
    }

    /// Full pipeline: measure, lay out, and flatten into render items.
    pub fn render(
        &self,
        node: &Node,
        rect: Rect,
        ctx: &DataContext,
    ) -> Result<Vec<crate::render::RenderItem>, LayoutError> {
        let result = self.perform_layout(node, rect, ctx)?;
        Ok(self.flatten(&result))
    }

    // ── Measurement pass ────────────────────────────────────────

    /// Measure a tree bottom-up under the given available space.
    pub fn measure<'a>(
        &self,
        node: &'a Node,
        avail_w: i32,
        avail_h: i32,
        ctx: &DataContext,
    ) -> Result<MeasuredNode<'a>, LayoutError> {
        self.measure_node(node, avail_w, avail_h, &ResolvedStyle::default(), ctx, "root")
    }

    fn measure_node<'a>(
        &self,
        node: &'a Node,
        avail_w: i32,
        avail_h: i32,
        inherited: &ResolvedStyle,
        ctx: &DataContext,
        path: &str,
    ) -> Result<MeasuredNode<'a>, LayoutError> {
        validate_node(node, path)?;

        if let Some(cond) = &node.when {
            let scope = PredicateScope {
                ctx,
                available_width: avail_w,
                available_height: avail_h,
            };
            if !cond.evaluate(&scope) {
                return match &node.fallback {
                    Some(fb) => self.measure_node(fb, avail_w, avail_h, inherited, ctx, path),
                    None => Ok(hidden(node)),
                };
            }
        }

        let style = node.style.resolve(inherited);
        let padding = node.style.padding.unwrap_or_default();
        let margin = node.style.margin.unwrap_or_default();

        // Space the box itself may occupy, then the space its content gets.
        let slot_w = (avail_w - margin.horizontal()).max(0);
        let slot_h = (avail_h - margin.vertical()).max(0);
        let explicit_w = node.style.width.and_then(|d| d.resolve(slot_w));
        let explicit_h = node.style.height.and_then(|d| d.resolve(slot_h));
        let inner_w = (explicit_w.unwrap_or(slot_w) - padding.horizontal()).max(0);
        let inner_h = (explicit_h.unwrap_or(slot_h) - padding.vertical()).max(0);

        let mut children = Vec::new();
        let mut detail = MeasuredDetail::None;

        // Content size and minimum content size, excluding padding.
        let (content, min_content): ((i32, i32), (i32, i32)) = match &node.kind {
            NodeKind::Text { content, .. } => {
                let text = crate::data::interpolate(content, ctx);
                let pitch = style.pitch();
                let width = self
                    .metrics
                    .text_width(&text, &pitch, style.letter_spacing.max(0) as u32)
                    as i32;
                let height = LINE_UNIT * if style.double_height { 2 } else { 1 };
                detail = MeasuredDetail::Text {
                    content: text,
                    content_width: width,
                };
                ((width, height), (width, height))
            }

            NodeKind::Spacer => ((0, 0), (0, 0)),

            NodeKind::Line {
                direction,
                fill,
                length,
            } => {
                let along = match direction {
                    Direction::Row => inner_w,
                    Direction::Column => inner_h,
                };
                let len = length.and_then(|d| d.resolve(along)).unwrap_or(along).max(0);
                detail = MeasuredDetail::Rule { length: len };
                let min_len = match length {
                    Some(Dimension::Dots(v)) => (*v).max(0),
                    _ => 0,
                };
                match direction {
                    Direction::Row => ((len, LINE_UNIT), (min_len, LINE_UNIT)),
                    Direction::Column => {
                        let cell = self.metrics.char_width(*fill, &style.pitch()) as i32;
                        ((cell, len), (cell, min_len))
                    }
                }
            }

            NodeKind::Stack {
                direction,
                children: kids,
                ..
            } => {
                children = self.measure_children(kids, inner_w, inner_h, &style, ctx, path)?;
                let gap = node.style.gap.unwrap_or(0);
                (
                    stack_content_size(&children, *direction, gap, false),
                    stack_content_size(&children, *direction, gap, true),
                )
            }

            NodeKind::Flex {
                wrap,
                row_gap,
                children: kids,
                ..
            } => {
                children = self.measure_children(kids, inner_w, inner_h, &style, ctx, path)?;
                let gap = node.style.gap.unwrap_or(0);
                let flow: Vec<&MeasuredNode<'_>> = flow_children(&children).collect();
                let outer_widths: Vec<i32> = flow.iter().map(|c| c.outer_width()).collect();

                let lines = match wrap {
                    FlexWrap::Wrap => partition_into_lines(&outer_widths, gap, inner_w),
                    FlexWrap::NoWrap if flow.is_empty() => vec![],
                    FlexWrap::NoWrap => vec![WrapLine {
                        start: 0,
                        end: flow.len(),
                    }],
                };

                let mut width = 0;
                let mut height = 0;
                for line in &lines {
                    let items = &flow[line.start..line.end];
                    let line_w: i32 = items.iter().map(|c| c.outer_width()).sum::<i32>()
                        + gap * (line.len() as i32 - 1);
                    let line_h = items.iter().map(|c| c.outer_height()).max().unwrap_or(0);
                    width = width.max(line_w);
                    height += line_h;
                }
                if lines.len() > 1 {
                    height += row_gap * (lines.len() as i32 - 1);
                }

                let min_w = flow.iter().map(|c| c.min_width + c.margin.horizontal()).max();
                let min = match wrap {
                    FlexWrap::Wrap => (min_w.unwrap_or(0), height),
                    FlexWrap::NoWrap => (width, height),
                };
                detail = MeasuredDetail::Flex { lines };
                ((width, height), min)
            }

            NodeKind::Grid {
                columns,
                column_gap,
                row_gap,
                rows,
            } => {
                let mut content_widths = vec![0i32; columns.len()];
                let mut cell_heights: Vec<Vec<i32>> = Vec::with_capacity(rows.len());

                for (r, row) in rows.iter().enumerate() {
                    let row_style = row.style.resolve(&style);
                    let mut heights = Vec::with_capacity(row.cells.len());
                    for (c, cell) in row.cells.iter().enumerate() {
                        let cell_path = format!("{path}/row[{r}]/cell[{c}]");
                        let measured =
                            self.measure_node(cell, inner_w, inner_h, &row_style, ctx, &cell_path)?;
                        if !measured.is_hidden() && !measured.is_absolute() {
                            content_widths[c] = content_widths[c].max(measured.outer_width());
                            heights.push(measured.outer_height());
                        }
                        children.push(measured);
                    }
                    cell_heights.push(heights);
                }

                let col_widths = resolve_columns(columns, inner_w, *column_gap, &content_widths);
                let row_heights: Vec<i32> = rows
                    .iter()
                    .zip(&cell_heights)
                    .map(|(row, heights)| {
                        row.height
                            .unwrap_or_else(|| heights.iter().copied().max().unwrap_or(0))
                    })
                    .collect();

                let width = track_span(&col_widths, *column_gap);
                let height = track_span(&row_heights, *row_gap);
                detail = MeasuredDetail::Grid {
                    col_widths,
                    row_heights,
                };
                ((width, height), (width, height))
            }

            NodeKind::Template { source, child } => {
                let value = ctx.lookup(source).cloned().unwrap_or_default();
                let scoped = ctx.with_root(value);
                let child_path = format!("{path}/template");
                children.push(self.measure_node(
                    child,
                    inner_w,
                    inner_h,
                    &style,
                    &scoped,
                    &child_path,
                )?);
                let gap = node.style.gap.unwrap_or(0);
                (
                    stack_content_size(&children, Direction::Column, gap, false),
                    stack_content_size(&children, Direction::Column, gap, true),
                )
            }

            NodeKind::Conditional {
                condition,
                children: primary,
                fallback,
            } => {
                let scope = PredicateScope {
                    ctx,
                    available_width: inner_w,
                    available_height: inner_h,
                };
                let branch = if condition.evaluate(&scope) {
                    primary
                } else {
                    fallback
                };
                children = self.measure_children(branch, inner_w, inner_h, &style, ctx, path)?;
                let gap = node.style.gap.unwrap_or(0);
                (
                    stack_content_size(&children, Direction::Column, gap, false),
                    stack_content_size(&children, Direction::Column, gap, true),
                )
            }

            NodeKind::Each {
                source,
                bind,
                item,
                empty,
            } => {
                let items = match ctx.lookup(source) {
                    Some(serde_json::Value::Array(arr)) => arr.clone(),
                    _ => vec![],
                };
                if items.is_empty() {
                    if let Some(node) = empty {
                        let child_path = format!("{path}/empty");
                        children.push(self.measure_node(
                            node, inner_w, inner_h, &style, ctx, &child_path,
                        )?);
                    }
                } else {
                    let name = bind.as_deref().unwrap_or("item");
                    for (i, value) in items.into_iter().enumerate() {
                        let scoped = ctx
                            .with_binding(name, value)
                            .with_binding("index", serde_json::Value::from(i));
                        let child_path = format!("{path}/each[{i}]");
                        children.push(self.measure_node(
                            item, inner_w, inner_h, &style, &scoped, &child_path,
                        )?);
                    }
                }
                let gap = node.style.gap.unwrap_or(0);
                (
                    stack_content_size(&children, Direction::Column, gap, false),
                    stack_content_size(&children, Direction::Column, gap, true),
                )
            }
        };

        let (content_w, content_h) = content;
        let (min_content_w, min_content_h) = min_content;

        let min_w_limit = node.style.min_width.and_then(|d| d.resolve(slot_w)).unwrap_or(0);
        let min_h_limit = node.style.min_height.and_then(|d| d.resolve(slot_h)).unwrap_or(0);
        let max_w_limit = node
            .style
            .max_width
            .and_then(|d| d.resolve(slot_w))
            .unwrap_or(i32::MAX);
        let max_h_limit = node
            .style
            .max_height
            .and_then(|d| d.resolve(slot_h))
            .unwrap_or(i32::MAX);

        let width = explicit_w
            .unwrap_or(content_w + padding.horizontal())
            .clamp(min_w_limit, max_w_limit.max(min_w_limit));
        let height = explicit_h
            .unwrap_or(content_h + padding.vertical())
            .clamp(min_h_limit, max_h_limit.max(min_h_limit));

        Ok(MeasuredNode {
            node,
            min_width: (min_content_w + padding.horizontal()).max(min_w_limit),
            min_height: (min_content_h + padding.vertical()).max(min_h_limit),
            width,
            height,
            padding,
            margin,
            style,
            children,
            detail,
        })
    }

    fn measure_children<'a>(
        &self,
        nodes: &'a [Node],
        avail_w: i32,
        avail_h: i32,
        inherited: &ResolvedStyle,
        ctx: &DataContext,
        path: &str,
    ) -> Result<Vec<MeasuredNode<'a>>, LayoutError> {
        let mut out = Vec::with_capacity(nodes.len());
        for (i, child) in nodes.iter().enumerate() {
            let child_path = format!("{path}/{}[{i}]", kind_name(&child.kind));
            out.push(self.measure_node(child, avail_w, avail_h, inherited, ctx, &child_path)?);
        }
        Ok(out)
    }

    // ── Layout pass ─────────────────────────────────────────────

    /// Assign final positions to a measured tree within the page rectangle.
    /// The page rect is the root containing block.
    pub fn layout(&self, measured: &MeasuredNode<'_>, rect: Rect) -> LayoutResult {
        if measured.is_hidden() {
            return empty_result(rect.x, rect.y);
        }
        let x = rect.x
            + if measured.margin.centers_horizontally() {
                (rect.width - measured.outer_width()).div_euclid(2)
            } else {
                measured.margin.left.dots()
            };
        let y = rect.y
            + if measured.margin.centers_vertically() {
                (rect.height - measured.outer_height()).div_euclid(2)
            } else {
                measured.margin.top.dots()
            };
        self.place(measured, x, y, rect)
    }

    /// Position a node at a final border-box origin and recurse into its
    /// children. `cb` is the containing block for absolute descendants.
    fn place(&self, m: &MeasuredNode<'_>, x: i32, y: i32, cb: Rect) -> LayoutResult {
        let content_box = Rect::new(
            x + m.padding.left,
            y + m.padding.top,
            (m.width - m.padding.horizontal()).max(0),
            (m.height - m.padding.vertical()).max(0),
        );
        let child_cb = if establishes_containing_block(m.node) {
            content_box
        } else {
            cb
        };

        let relative_offset = match m.position() {
            Position::Relative { dx, dy } => (dx, dy),
            _ => (0, 0),
        };

        let mut result = LayoutResult {
            x,
            y,
            width: m.width,
            height: m.height,
            relative_offset,
            constraints: None,
            padding: m.padding,
            style: m.style.clone(),
            content: RenderContent::None,
            children: Vec::new(),
        };

        match &m.node.kind {
            NodeKind::Text {
                align, overflow, ..
            } => {
                if let MeasuredDetail::Text {
                    content,
                    content_width,
                } = &m.detail
                {
                    result.content = RenderContent::Text {
                        content: content.clone(),
                        content_width: *content_width,
                        align: *align,
                        overflow: *overflow,
                    };
                }
                // An explicit width is its own truncation boundary.
                if m.node.style.width.is_some() {
                    result.constraints = Some(RenderConstraints {
                        width: content_box.width,
                        h_align: *align,
                    });
                }
            }

            NodeKind::Line {
                direction, fill, ..
            } => {
                if let MeasuredDetail::Rule { length } = &m.detail {
                    result.content = RenderContent::Rule {
                        ch: *fill,
                        direction: *direction,
                        length: *length,
                    };
                }
            }

            NodeKind::Spacer => {}

            NodeKind::Stack {
                direction,
                align,
                v_align,
                ..
            } => {
                result.children = match direction {
                    Direction::Column => {
                        self.layout_column(m, *align, *v_align, content_box, child_cb)
                    }
                    Direction::Row => self.layout_row(m, *align, *v_align, content_box, child_cb),
                };
            }

            NodeKind::Flex {
                justify,
                align_items,
                row_gap,
                ..
            } => {
                result.children =
                    self.layout_flex(m, *justify, *align_items, *row_gap, content_box, child_cb);
            }

            NodeKind::Grid {
                columns,
                column_gap,
                row_gap,
                rows,
            } => {
                result.children =
                    self.layout_grid(m, columns, *column_gap, *row_gap, rows, content_box, child_cb);
            }

            NodeKind::Template { .. } | NodeKind::Conditional { .. } | NodeKind::Each { .. } => {
                result.children =
                    self.layout_column(m, HAlign::Left, VAlign::Top, content_box, child_cb);
            }
        }

        result
    }

    /// Sequential column flow. Inter-sibling spacing is additive:
    /// `gap + previous.margin_bottom + next.margin_top`.
    fn layout_column(
        &self,
        m: &MeasuredNode<'_>,
        align: HAlign,
        v_align: VAlign,
        content: Rect,
        child_cb: Rect,
    ) -> Vec<LayoutResult> {
        let gap = m.node.style.gap.unwrap_or(0);
        let flow_h = stack_content_size(&m.children, Direction::Column, gap, false).1;
        let free = (content.height - flow_h).max(0);
        let mut cursor = content.y
            + match v_align {
                VAlign::Top => 0,
                VAlign::Center => free.div_euclid(2),
                VAlign::Bottom => free,
            };

        let mut out = Vec::with_capacity(m.children.len());
        for child in &m.children {
            if child.is_hidden() {
                continue;
            }
            if child.is_absolute() {
                out.push(self.place_absolute(child, child_cb));
                continue;
            }
            let outer_w = child.outer_width();
            let x_off = if child.margin.centers_horizontally() {
                (content.width - outer_w).div_euclid(2)
            } else {
                match align {
                    HAlign::Left => 0,
                    HAlign::Center => (content.width - outer_w).div_euclid(2),
                    HAlign::Right => content.width - outer_w,
                }
            };
            let child_x = content.x + x_off + child.margin.left.dots();
            let child_y = cursor + child.margin.top.dots();
            out.push(self.place(child, child_x, child_y, child_cb));
            cursor = child_y + child.height + child.margin.bottom.dots() + gap;
        }
        out
    }

    /// Sequential row flow. The row's height is the tallest child's outer
    /// height; vertical alignment offsets shorter children within it, and a
    /// child's own top margin adds on top of that offset.
    fn layout_row(
        &self,
        m: &MeasuredNode<'_>,
        align: HAlign,
        v_align: VAlign,
        content: Rect,
        child_cb: Rect,
    ) -> Vec<LayoutResult> {
        let gap = m.node.style.gap.unwrap_or(0);
        let (run_w, row_h) = stack_content_size(&m.children, Direction::Row, gap, false);
        let free = (content.width - run_w).max(0);
        let mut cursor = content.x
            + match align {
                HAlign::Left => 0,
                HAlign::Center => free.div_euclid(2),
                HAlign::Right => free,
            };

        let mut out = Vec::with_capacity(m.children.len());
        for child in &m.children {
            if child.is_hidden() {
                continue;
            }
            if child.is_absolute() {
                out.push(self.place_absolute(child, child_cb));
                continue;
            }
            let y_off = cross_offset(child, v_align, row_h);
            let child_x = cursor + child.margin.left.dots();
            let child_y = content.y + y_off + child.margin.top.dots();
            out.push(self.place(child, child_x, child_y, child_cb));
            cursor = child_x + child.width + child.margin.right.dots() + gap;
        }
        out
    }

    /// Flex distribution: each measured wrap line is laid out independently
    /// with the container's justify mode; lines stack with `row_gap` between
    /// them and never influence each other's vertical placement.
    fn layout_flex(
        &self,
        m: &MeasuredNode<'_>,
        justify: Justify,
        align_items: VAlign,
        row_gap: i32,
        content: Rect,
        child_cb: Rect,
    ) -> Vec<LayoutResult> {
        let gap = m.node.style.gap.unwrap_or(0);
        let lines = match &m.detail {
            MeasuredDetail::Flex { lines } => lines,
            _ => return Vec::new(),
        };

        let flow_indices: Vec<usize> = m
            .children
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_hidden() && !c.is_absolute())
            .map(|(i, _)| i)
            .collect();

        let mut placed: Vec<Option<LayoutResult>> = Vec::with_capacity(m.children.len());
        placed.resize_with(m.children.len(), || None);

        let mut line_y = content.y;
        for line in lines {
            let items = &flow_indices[line.start..line.end];
            let line_h = items
                .iter()
                .map(|&i| m.children[i].outer_height())
                .max()
                .unwrap_or(0);
            let total: i32 = items
                .iter()
                .map(|&i| m.children[i].outer_width())
                .sum::<i32>()
                + gap * (items.len() as i32 - 1);
            let (lead, extra) = justify_offsets(justify, content.width - total, items.len());

            let mut cursor = content.x + lead;
            for &i in items {
                let child = &m.children[i];
                // Auto-margin children center against the full container
                // width, not the space left between siblings. Deliberate
                // deviation from CSS flexbox, kept for compatibility.
                let child_x = if child.margin.centers_horizontally() {
                    content.x + (content.width - child.outer_width()).div_euclid(2)
                } else {
                    cursor + child.margin.left.dots()
                };
                let y_off = cross_offset(child, align_items, line_h);
                let child_y = line_y + y_off + child.margin.top.dots();
                placed[i] = Some(self.place(child, child_x, child_y, child_cb));
                cursor = child_x + child.width + child.margin.right.dots() + gap + extra;
            }
            line_y += line_h + row_gap;
        }

        for (i, child) in m.children.iter().enumerate() {
            if child.is_absolute() && !child.is_hidden() {
                placed[i] = Some(self.place_absolute(child, child_cb));
            }
        }

        placed.into_iter().flatten().collect()
    }

    /// Grid cell placement: cumulative track offsets, and a per-cell
    /// truncation boundary equal to its column's resolved width.
    #[allow(clippy::too_many_arguments)]
    fn layout_grid(
        &self,
        m: &MeasuredNode<'_>,
        columns: &[ColumnSpec],
        column_gap: i32,
        row_gap: i32,
        rows: &[GridRow],
        content: Rect,
        child_cb: Rect,
    ) -> Vec<LayoutResult> {
        let (col_widths, row_heights) = match &m.detail {
            MeasuredDetail::Grid {
                col_widths,
                row_heights,
            } => (col_widths, row_heights),
            _ => return Vec::new(),
        };

        let mut out = Vec::new();
        let mut idx = 0;
        for (r, row) in rows.iter().enumerate() {
            let row_y = content.y + track_offset(r, row_heights, row_gap);
            for (c, _) in row.cells.iter().enumerate() {
                let child = &m.children[idx];
                idx += 1;
                if child.is_hidden() {
                    continue;
                }
                if child.is_absolute() {
                    out.push(self.place_absolute(child, child_cb));
                    continue;
                }
                let col_x = content.x + track_offset(c, col_widths, column_gap);
                let child_x = col_x + child.margin.left.dots();
                let child_y = row_y + child.margin.top.dots();
                let mut placed = self.place(child, child_x, child_y, child_cb);
                if placed.constraints.is_none() {
                    let boundary = (col_widths[c]
                        - child.margin.horizontal()
                        - child.padding.horizontal())
                    .max(0);
                    placed.constraints = Some(RenderConstraints {
                        width: boundary,
                        h_align: columns[c].align,
                    });
                }
                out.push(placed);
            }
        }
        out
    }

    /// Absolute children sit outside flow: they consume no space, shift no
    /// siblings, and their border box lands exactly at the given coordinates
    /// relative to the containing block's content origin. Margins play no
    /// part; absolute placement is coordinate-exact.
    fn place_absolute(&self, child: &MeasuredNode<'_>, cb: Rect) -> LayoutResult {
        let (px, py) = match child.position() {
            Position::Absolute { x, y } => (x.unwrap_or(0), y.unwrap_or(0)),
            _ => (0, 0),
        };
        self.place(child, cb.x + px, cb.y + py, cb)
    }
}

/// Cross-axis offset of a child within a row of height `row_h`. Both
/// vertical margins auto centers; otherwise the row's alignment applies.
fn cross_offset(child: &MeasuredNode<'_>, v_align: VAlign, row_h: i32) -> i32 {
    let outer_h = child.outer_height();
    if child.margin.centers_vertically() {
        (row_h - outer_h).div_euclid(2)
    } else {
        match v_align {
            VAlign::Top => 0,
            VAlign::Center => (row_h - outer_h).div_euclid(2),
            VAlign::Bottom => row_h - outer_h,
        }
    }
}

/// Content size of a sequential container: main-axis sum plus gaps, cross
/// axis max, over flow children only. `minimum` selects min content sizes.
fn stack_content_size(
    children: &[MeasuredNode<'_>],
    direction: Direction,
    gap: i32,
    minimum: bool,
) -> (i32, i32) {
    let mut main = 0i32;
    let mut cross = 0i32;
    let mut count = 0i32;
    for child in flow_children(children) {
        let (w, h) = if minimum {
            (
                child.min_width + child.margin.horizontal(),
                child.min_height + child.margin.vertical(),
            )
        } else {
            (child.outer_width(), child.outer_height())
        };
        match direction {
            Direction::Column => {
                main += h;
                cross = cross.max(w);
            }
            Direction::Row => {
                main += w;
                cross = cross.max(h);
            }
        }
        count += 1;
    }
    if count > 1 {
        main += gap * (count - 1);
    }
    match direction {
        Direction::Column => (cross, main),
        Direction::Row => (main, cross),
    }
}

fn flow_children<'b, 'a>(
    children: &'b [MeasuredNode<'a>],
) -> impl Iterator<Item = &'b MeasuredNode<'a>> {
    children
        .iter()
        .filter(|c| !c.is_hidden() && !c.is_absolute())
}

fn establishes_containing_block(node: &Node) -> bool {
    node.style.width.is_some() || node.style.height.is_some()
}

fn hidden(node: &Node) -> MeasuredNode<'_> {
    MeasuredNode {
        node,
        min_width: 0,
        min_height: 0,
        width: 0,
        height: 0,
        padding: Edges::default(),
        margin: Margin::default(),
        style: ResolvedStyle::default(),
        children: Vec::new(),
        detail: MeasuredDetail::Hidden,
    }
}

fn empty_result(x: i32, y: i32) -> LayoutResult {
    LayoutResult {
        x,
        y,
        width: 0,
        height: 0,
        relative_offset: (0, 0),
        constraints: None,
        padding: Edges::default(),
        style: ResolvedStyle::default(),
        content: RenderContent::None,
        children: Vec::new(),
    }
}

fn kind_name(kind: &NodeKind) -> &'static str {
    match kind {
        NodeKind::Stack { .. } => "stack",
        NodeKind::Flex { .. } => "flex",
        NodeKind::Grid { .. } => "grid",
        NodeKind::Text { .. } => "text",
        NodeKind::Spacer => "spacer",
        NodeKind::Line { .. } => "line",
        NodeKind::Template { .. } => "template",
        NodeKind::Conditional { .. } => "conditional",
        NodeKind::Each { .. } => "each",
    }
}

// ── Validation ──────────────────────────────────────────────────

fn validate_node(node: &Node, path: &str) -> Result<(), LayoutError> {
    check_dim(node.style.width, "width", path)?;
    check_dim(node.style.height, "height", path)?;
    check_dim(node.style.min_width, "min width", path)?;
    check_dim(node.style.min_height, "min height", path)?;
    check_dim(node.style.max_width, "max width", path)?;
    check_dim(node.style.max_height, "max height", path)?;
    if let Some(gap) = node.style.gap {
        if gap < 0 {
            return Err(LayoutError::NegativeGap {
                path: path.to_string(),
                value: gap,
            });
        }
    }

    match &node.kind {
        NodeKind::Grid {
            columns,
            column_gap,
            row_gap,
            rows,
        } => {
            let cells: usize = rows.iter().map(|r| r.cells.len()).sum();
            if columns.is_empty() && cells > 0 {
                return Err(LayoutError::GridWithoutColumns {
                    path: path.to_string(),
                    cells,
                });
            }
            for (i, row) in rows.iter().enumerate() {
                if row.cells.len() > columns.len() {
                    return Err(LayoutError::RowOverflowsColumns {
                        path: path.to_string(),
                        row: i,
                        cells: row.cells.len(),
                        columns: columns.len(),
                    });
                }
                if let Some(h) = row.height {
                    if h < 0 {
                        return Err(LayoutError::NegativeDimension {
                            path: format!("{path}/row[{i}]"),
                            what: "row height",
                            value: h,
                        });
                    }
                }
            }
            for (i, col) in columns.iter().enumerate() {
                if let Dimension::Dots(v) = col.width {
                    if v < 0 {
                        return Err(LayoutError::NegativeDimension {
                            path: format!("{path}/column[{i}]"),
                            what: "column width",
                            value: v,
                        });
                    }
                }
            }
            for gap in [*column_gap, *row_gap] {
                if gap < 0 {
                    return Err(LayoutError::NegativeGap {
                        path: path.to_string(),
                        value: gap,
                    });
                }
            }
        }
        NodeKind::Flex { row_gap, .. } => {
            if *row_gap < 0 {
                return Err(LayoutError::NegativeGap {
                    path: path.to_string(),
                    value: *row_gap,
                });
            }
        }
        NodeKind::Line { length, .. } => {
            if let Some(Dimension::Dots(v)) = length {
                if *v < 0 {
                    return Err(LayoutError::NegativeDimension {
                        path: path.to_string(),
                        what: "line length",
                        value: *v,
                    });
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn check_dim(dim: Option<Dimension>, what: &'static str, path: &str) -> Result<(), LayoutError> {
    match dim {
        Some(Dimension::Dots(v)) if v < 0 => Err(LayoutError::NegativeDimension {
            path: path.to_string(),
            what,
            value: v,
        }),
        Some(Dimension::Percent(p)) if p < 0.0 => Err(LayoutError::NegativeDimension {
            path: path.to_string(),
            what,
            value: p as i32,
        }),
        _ => Ok(()),
    }
}
