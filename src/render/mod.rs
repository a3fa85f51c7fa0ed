//! # Flatten Pass
//!
//! Walks a positioned layout tree and emits the flat list of render items a
//! downstream encoder consumes. This is the only place relative offsets are
//! applied, and the only place truncation happens: both are presentation
//! concerns that must never feed back into layout geometry.
//!
//! Items come out in document order (parent content before children, children
//! in source order), which matches the top-to-bottom, left-to-right sweep a
//! line printer wants.

use serde::Serialize;

use crate::layout::{LayoutEngine, LayoutResult, RenderContent};
use crate::model::{Direction, HAlign, Overflow};
use crate::style::{Pitch, ResolvedStyle};

/// Continuation marker appended by `Overflow::Ellipsis`. Plain ASCII; the
/// device character generators have no single-glyph ellipsis.
const ELLIPSIS: &str = "...";

/// One drawable item at an absolute page position, in device dots.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RenderItem {
    /// A run of text in a single resolved style.
    Text {
        x: i32,
        y: i32,
        content: String,
        /// True when the content was cut to fit its boundary.
        truncated: bool,
        style: ResolvedStyle,
    },
    /// A repeated-character rule.
    Rule {
        x: i32,
        y: i32,
        length: i32,
        ch: char,
        direction: Direction,
    },
}

impl LayoutEngine<'_> {
    /// Flatten a positioned tree into render items.
    pub fn flatten(&self, root: &LayoutResult) -> Vec<RenderItem> {
        let mut out = Vec::new();
        self.flatten_into(root, 0, 0, &mut out);
        out
    }

    fn flatten_into(&self, r: &LayoutResult, ox: i32, oy: i32, out: &mut Vec<RenderItem>) {
        // Relative offsets displace this node and its whole subtree.
        let ox = ox + r.relative_offset.0;
        let oy = oy + r.relative_offset.1;

        match &r.content {
            RenderContent::None => {}
            RenderContent::Rule {
                ch,
                direction,
                length,
            } => {
                out.push(RenderItem::Rule {
                    x: r.x + r.padding.left + ox,
                    y: r.y + r.padding.top + oy,
                    length: *length,
                    ch: *ch,
                    direction: *direction,
                });
            }
            RenderContent::Text {
                content,
                content_width,
                align,
                overflow,
            } => {
                if !content.is_empty() {
                    out.push(self.text_item(r, ox, oy, content, *content_width, *align, *overflow));
                }
            }
        }

        for child in &r.children {
            self.flatten_into(child, ox, oy, out);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn text_item(
        &self,
        r: &LayoutResult,
        ox: i32,
        oy: i32,
        content: &str,
        content_width: i32,
        align: HAlign,
        overflow: Overflow,
    ) -> RenderItem {
        let bx = r.x + r.padding.left;
        let by = r.y + r.padding.top;

        let Some(c) = r.constraints else {
            // Auto-width text: the box is exactly the content, nothing to
            // truncate or align against.
            return RenderItem::Text {
                x: bx + ox,
                y: by + oy,
                content: content.to_string(),
                truncated: false,
                style: r.style.clone(),
            };
        };

        // A column that leaves alignment at the default defers to the text's
        // own alignment.
        let align = match c.h_align {
            HAlign::Left => align,
            other => other,
        };

        let pitch = r.style.pitch();
        let spacing = r.style.letter_spacing.max(0) as u32;
        let (text, width, truncated) = if content_width <= c.width {
            (content.to_string(), content_width, false)
        } else {
            match overflow {
                Overflow::Clip => self.clip(content, c.width, &pitch, spacing),
                Overflow::Ellipsis => self.ellipsize(content, c.width, &pitch, spacing),
            }
        };

        let x_off = match align {
            HAlign::Left => 0,
            HAlign::Center => (c.width - width).div_euclid(2),
            HAlign::Right => c.width - width,
        };

        RenderItem::Text {
            x: bx + x_off.max(0) + ox,
            y: by + oy,
            content: text,
            truncated,
            style: r.style.clone(),
        }
    }

    /// Keep leading characters that fit within `boundary`. Non-empty input
    /// always yields at least one character, even past the boundary.
    fn clip(&self, text: &str, boundary: i32, pitch: &Pitch, spacing: u32) -> (String, i32, bool) {
        let mut kept = String::new();
        let mut width = 0i32;
        for ch in text.chars() {
            let cw = self.metrics.char_width(ch, pitch) as i32;
            let next = if kept.is_empty() {
                cw
            } else {
                width + spacing as i32 + cw
            };
            if next > boundary {
                if kept.is_empty() {
                    kept.push(ch);
                    width = cw;
                }
                break;
            }
            kept.push(ch);
            width = next;
        }
        (kept, width, true)
    }

    /// Clip with a trailing continuation marker. When the marker itself (or
    /// the marker plus any content) cannot fit, degrades to a plain clip.
    fn ellipsize(
        &self,
        text: &str,
        boundary: i32,
        pitch: &Pitch,
        spacing: u32,
    ) -> (String, i32, bool) {
        let marker_width = self.metrics.text_width(ELLIPSIS, pitch, spacing) as i32;
        if marker_width >= boundary {
            return self.clip(text, boundary, pitch, spacing);
        }

        let mut kept = String::new();
        let mut width = 0i32;
        for ch in text.chars() {
            let cw = self.metrics.char_width(ch, pitch) as i32;
            let next = if kept.is_empty() {
                cw
            } else {
                width + spacing as i32 + cw
            };
            if next + spacing as i32 + marker_width > boundary {
                break;
            }
            kept.push(ch);
            width = next;
        }
        if kept.is_empty() {
            return self.clip(text, boundary, pitch, spacing);
        }

        kept.push_str(ELLIPSIS);
        let width = self.metrics.text_width(&kept, pitch, spacing) as i32;
        (kept, width, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataContext;
    use crate::layout::{LayoutEngine, Rect};
    use crate::model::*;
    use crate::style::Style;
    use crate::text::FixedPitchMetrics;

    fn items(node: &Node) -> Vec<RenderItem> {
        LayoutEngine::new(&FixedPitchMetrics)
            .render(node, Rect::new(0, 0, 2880, 3960), &DataContext::empty())
            .unwrap()
    }

    fn ellipsis_text(content: &str) -> Node {
        Node {
            kind: NodeKind::Text {
                content: content.into(),
                align: HAlign::Left,
                overflow: Overflow::Ellipsis,
            },
            ..Default::default()
        }
    }

    fn text_content(item: &RenderItem) -> (&str, bool) {
        match item {
            RenderItem::Text {
                content, truncated, ..
            } => (content, *truncated),
            other => panic!("expected text item, got {other:?}"),
        }
    }

    #[test]
    fn explicit_width_clips_at_cell_boundary() {
        // 100 dots holds two 36-dot cells at pica.
        let node = Node::text("ABCDEF").with_style(Style {
            width: Some(Dimension::Dots(100)),
            ..Default::default()
        });
        let out = items(&node);
        assert_eq!(text_content(&out[0]), ("AB", true));
    }

    #[test]
    fn content_within_boundary_is_untruncated() {
        let node = Node::text("AB").with_style(Style {
            width: Some(Dimension::Dots(100)),
            ..Default::default()
        });
        let out = items(&node);
        assert_eq!(text_content(&out[0]), ("AB", false));
    }

    #[test]
    fn ellipsis_keeps_room_for_marker() {
        // Boundary 200, marker is 108: two characters (72 + 108 = 180) fit,
        // a third (108 + 108 = 216) does not.
        let node = ellipsis_text("ABCDEFGH").with_style(Style {
            width: Some(Dimension::Dots(200)),
            ..Default::default()
        });
        let out = items(&node);
        assert_eq!(text_content(&out[0]), ("AB...", true));
    }

    #[test]
    fn ellipsis_degrades_to_clip_when_marker_cannot_fit() {
        let node = ellipsis_text("ABCDEF").with_style(Style {
            width: Some(Dimension::Dots(72)),
            ..Default::default()
        });
        let out = items(&node);
        assert_eq!(text_content(&out[0]), ("AB", true));
    }

    #[test]
    fn zero_width_boundary_still_emits_first_character() {
        let node = Node::text("ABC").with_style(Style {
            width: Some(Dimension::Dots(0)),
            ..Default::default()
        });
        let out = items(&node);
        assert_eq!(text_content(&out[0]), ("A", true));
    }

    #[test]
    fn grid_column_alignment_positions_within_track() {
        let node = Node::grid(
            vec![
                ColumnSpec::dots(200),
                ColumnSpec {
                    width: Dimension::Dots(200),
                    align: HAlign::Right,
                },
            ],
            vec![GridRow::new(vec![Node::text("A"), Node::text("OK")])],
        );
        let out = items(&node);
        match (&out[0], &out[1]) {
            (RenderItem::Text { x: x0, .. }, RenderItem::Text { x: x1, .. }) => {
                assert_eq!(*x0, 0);
                // Track starts at 200; "OK" is 72 wide, right-aligned.
                assert_eq!(*x1, 200 + 200 - 72);
            }
            other => panic!("expected two text items, got {other:?}"),
        }
    }

    #[test]
    fn relative_offset_moves_items_not_boxes() {
        let shifted = Node::text("HI").with_style(Style {
            position: Some(Position::Relative { dx: 15, dy: -5 }),
            ..Default::default()
        });
        let node = Node::stack(vec![shifted, Node::text("LO")]);
        let out = items(&node);
        match (&out[0], &out[1]) {
            (RenderItem::Text { x, y, .. }, RenderItem::Text { y: y1, .. }) => {
                assert_eq!((*x, *y), (15, -5));
                // The sibling flows as if the offset did not exist.
                assert_eq!(*y1, 60);
            }
            other => panic!("expected two text items, got {other:?}"),
        }
    }

    #[test]
    fn spacers_and_empty_text_emit_nothing() {
        let node = Node::stack(vec![
            Node::spacer().with_style(Style {
                height: Some(Dimension::Dots(120)),
                ..Default::default()
            }),
            Node::text(""),
            Node::text("X"),
        ]);
        let out = items(&node);
        assert_eq!(out.len(), 1);
        match &out[0] {
            // Empty text emits no item but still occupies its line unit:
            // 120 for the spacer plus 60 for the blank line.
            RenderItem::Text { y, .. } => assert_eq!(*y, 180),
            other => panic!("expected text item, got {other:?}"),
        }
    }

    #[test]
    fn rule_flattens_with_resolved_length() {
        let node = Node::rule().with_style(Style {
            width: Some(Dimension::Dots(500)),
            ..Default::default()
        });
        let out = items(&node);
        assert_eq!(
            out[0],
            RenderItem::Rule {
                x: 0,
                y: 0,
                length: 500,
                ch: '-',
                direction: Direction::Row,
            }
        );
    }

    #[test]
    fn items_come_out_in_document_order() {
        let node = Node::stack(vec![
            Node::text("ONE"),
            Node::row(vec![Node::text("TWO"), Node::text("THREE")]),
        ]);
        let out = items(&node);
        let texts: Vec<&str> = out.iter().map(|i| text_content(i).0).collect();
        assert_eq!(texts, ["ONE", "TWO", "THREE"]);
    }
}
