//! End-to-end layout tests: full documents through measurement, layout, and
//! flattening, asserting on final geometry and emitted items.

use platen::data::DataContext;
use platen::layout::{LayoutEngine, LayoutResult, Rect};
use platen::model::*;
use platen::render::RenderItem;
use platen::style::Style;
use platen::text::FixedPitchMetrics;

fn layout(node: &Node) -> LayoutResult {
    LayoutEngine::new(&FixedPitchMetrics)
        .perform_layout(node, Rect::new(0, 0, 2880, 3960), &DataContext::empty())
        .unwrap()
}

fn render(node: &Node, ctx: &DataContext) -> Vec<RenderItem> {
    LayoutEngine::new(&FixedPitchMetrics)
        .render(node, Rect::new(0, 0, 2880, 3960), ctx)
        .unwrap()
}

fn sized(w: i32, h: i32) -> Node {
    Node::spacer().with_style(Style {
        width: Some(Dimension::Dots(w)),
        height: Some(Dimension::Dots(h)),
        ..Default::default()
    })
}

fn with_margin(mut node: Node, margin: Margin) -> Node {
    node.style.margin = Some(margin);
    node
}

#[test]
fn column_siblings_never_overlap() {
    let node = Node::stack(vec![
        Node::text("ONE"),
        sized(400, 90),
        Node::text("TWO"),
        sized(200, 30),
    ]);
    let result = layout(&node);
    let mut previous_bottom = i32::MIN;
    for child in &result.children {
        assert!(child.y >= previous_bottom, "child at y {} overlaps", child.y);
        previous_bottom = child.y + child.height;
    }
}

#[test]
fn row_and_flex_siblings_never_overlap_horizontally() {
    fn assert_disjoint_x(children: &[LayoutResult]) {
        let mut previous_right = i32::MIN;
        for child in children {
            assert!(
                child.x >= previous_right,
                "child at x {} overlaps previous right edge {previous_right}",
                child.x
            );
            previous_right = child.x + child.width;
        }
    }

    let node = Node::row(vec![
        Node::text("A"),
        Node::flex(vec![sized(100, 60), sized(150, 60), Node::text("MID")]),
        sized(80, 30),
    ]);
    let result = layout(&node);
    assert_disjoint_x(&result.children);
    // The invariant holds recursively inside the nested flex.
    assert_disjoint_x(&result.children[1].children);
}

#[test]
fn absolute_sibling_leaves_static_flow_untouched() {
    let base = Node::stack(vec![sized(100, 60), sized(100, 90)]);
    let with_abs = Node::stack(vec![
        sized(100, 60),
        sized(300, 300).with_style(Style {
            width: Some(Dimension::Dots(300)),
            height: Some(Dimension::Dots(300)),
            position: Some(Position::Absolute {
                x: Some(500),
                y: Some(500),
            }),
            ..Default::default()
        }),
        sized(100, 90),
    ]);

    let plain = layout(&base);
    let mixed = layout(&with_abs);
    assert_eq!(plain.children[0].y, mixed.children[0].y);
    assert_eq!(plain.children[1].y, mixed.children[2].y);
    // The container sizes as if the absolute child were not there.
    assert_eq!(plain.height, mixed.height);
}

#[test]
fn relative_offset_leaves_static_flow_untouched() {
    let offset = |dx, dy| {
        Node::stack(vec![
            sized(100, 60),
            sized(100, 60).with_style(Style {
                width: Some(Dimension::Dots(100)),
                height: Some(Dimension::Dots(60)),
                position: Some(Position::Relative { dx, dy }),
                ..Default::default()
            }),
            sized(100, 90),
        ])
    };
    let zero = layout(&offset(0, 0));
    let shifted = layout(&offset(80, -40));
    assert_eq!(zero.children[0].y, shifted.children[0].y);
    assert_eq!(zero.children[1].y, shifted.children[1].y);
    assert_eq!(zero.children[2].y, shifted.children[2].y);
    assert_eq!(shifted.children[1].relative_offset, (80, -40));
}

#[test]
fn auto_margins_center_with_floor_division() {
    for (container, child, expected) in [(1000, 200, 400), (800, 300, 250), (500, 500, 0)] {
        let inner = with_margin(
            sized(child, 60),
            Margin {
                left: MarginValue::Auto,
                right: MarginValue::Auto,
                ..Default::default()
            },
        );
        let outer = Node::stack(vec![inner]).with_style(Style {
            width: Some(Dimension::Dots(container)),
            ..Default::default()
        });
        let result = layout(&outer);
        assert_eq!(
            result.children[0].x, expected,
            "child {child} in container {container}"
        );
    }
}

#[test]
fn sibling_margins_accumulate() {
    let first = with_margin(
        sized(100, 60),
        Margin {
            bottom: MarginValue::Dots(100),
            ..Default::default()
        },
    );
    let plain_second = sized(100, 60);
    let result = layout(&Node::stack(vec![first.clone(), plain_second]));
    assert_eq!(result.children[1].y, 60 + 100);

    let margined_second = with_margin(
        sized(100, 60),
        Margin {
            top: MarginValue::Dots(50),
            ..Default::default()
        },
    );
    let result = layout(&Node::stack(vec![first, margined_second]));
    assert_eq!(result.children[1].y, 60 + 100 + 50);
}

#[test]
fn flex_wrap_places_oversized_items_one_per_line() {
    let node = Node {
        kind: NodeKind::Flex {
            justify: Justify::Start,
            align_items: VAlign::Top,
            wrap: FlexWrap::Wrap,
            row_gap: 0,
            children: vec![sized(300, 60), sized(300, 60), sized(300, 60)],
        },
        style: Style {
            width: Some(Dimension::Dots(500)),
            ..Default::default()
        },
        ..Default::default()
    };
    let result = layout(&node);
    let ys: Vec<i32> = result.children.iter().map(|c| c.y).collect();
    assert_eq!(ys, [0, 60, 120]);
    assert!(result.children.iter().all(|c| c.x == 0));
}

#[test]
fn grid_tracks_and_header_rows_round_trip() {
    let doc = Node {
        kind: NodeKind::Grid {
            columns: vec![ColumnSpec::dots(300), ColumnSpec::dots(300)],
            column_gap: 50,
            row_gap: 0,
            rows: vec![
                GridRow::header(vec![Node::text("SKU"), Node::text("QTY")]),
                GridRow::new(vec![Node::text("A-100"), Node::text("3")]),
                GridRow::new(vec![Node::text("B-200"), Node::text("12")]),
            ],
        },
        ..Default::default()
    };

    let result = layout(&doc);
    assert_eq!(result.children.len(), 6);
    let xs: Vec<i32> = result.children.iter().map(|c| c.x).collect();
    assert_eq!(xs, [0, 350, 0, 350, 0, 350]);
    let ys: Vec<i32> = result.children.iter().map(|c| c.y).collect();
    assert_eq!(ys, [0, 0, 60, 60, 120, 120]);
    // Grid box spans its tracks.
    assert_eq!(result.width, 300 + 50 + 300);
    assert_eq!(result.height, 180);
}

#[test]
fn grid_cells_truncate_at_their_column_only() {
    // At pica each cell is 36 dots: "Short" (180) fits a 200-dot column,
    // while the middle 100-dot column holds only two characters.
    let node = Node::grid(
        vec![
            ColumnSpec::dots(200),
            ColumnSpec::dots(100),
            ColumnSpec::dots(200),
        ],
        vec![GridRow::new(vec![
            Node::text("Short"),
            Node::text("Overflowing"),
            Node::text("Ok"),
        ])],
    );
    let out = render(&node, &DataContext::empty());
    let texts: Vec<(&str, bool)> = out
        .iter()
        .map(|item| match item {
            RenderItem::Text {
                content, truncated, ..
            } => (content.as_str(), *truncated),
            other => panic!("unexpected item {other:?}"),
        })
        .collect();
    assert_eq!(texts, [("Short", false), ("Ov", true), ("Ok", false)]);
}

#[test]
fn layout_is_deterministic_and_idempotent() {
    let node = Node::stack(vec![
        Node::text("STATEMENT {account.number}"),
        Node::flex(vec![sized(200, 60), sized(300, 90)]),
        Node::grid(
            vec![ColumnSpec::auto(), ColumnSpec::fill()],
            vec![GridRow::new(vec![Node::text("Total"), Node::text("{total}")])],
        ),
    ]);
    let ctx = DataContext::new(serde_json::json!({
        "account": { "number": "77-1204" },
        "total": "1,533.00"
    }));
    let engine = LayoutEngine::new(&FixedPitchMetrics);
    let rect = Rect::new(0, 0, 2880, 3960);
    let first = engine.perform_layout(&node, rect, &ctx).unwrap();
    let second = engine.perform_layout(&node, rect, &ctx).unwrap();
    assert_eq!(first, second);
    assert_eq!(engine.flatten(&first), engine.flatten(&second));
}

#[test]
fn json_document_renders_against_data() {
    let document = r##"{
        "page": { "width": 2880, "height": 3960 },
        "root": {
            "type": "Stack",
            "children": [
                { "type": "Text", "content": "INVOICE {number}" },
                {
                    "type": "Each",
                    "source": "lines",
                    "item": { "type": "Text", "content": "{item.sku} x{item.qty}" }
                },
                {
                    "type": "Conditional",
                    "condition": { "op": "truthy", "path": "paid" },
                    "children": [ { "type": "Text", "content": "PAID" } ],
                    "else": [ { "type": "Text", "content": "BALANCE DUE" } ]
                }
            ]
        }
    }"##;
    let data = r##"{
        "number": "0042",
        "paid": false,
        "lines": [
            { "sku": "A-100", "qty": 3 },
            { "sku": "B-200", "qty": 1 }
        ]
    }"##;

    let out = platen::render_json(document, data).unwrap();
    let texts: Vec<&str> = out
        .iter()
        .map(|item| match item {
            RenderItem::Text { content, .. } => content.as_str(),
            other => panic!("unexpected item {other:?}"),
        })
        .collect();
    assert_eq!(texts, ["INVOICE 0042", "A-100 x3", "B-200 x1", "BALANCE DUE"]);
}

#[test]
fn malformed_document_surfaces_parse_error() {
    let err = platen::render_json("{ not json", "{}").unwrap_err();
    assert!(matches!(err, platen::LayoutError::Parse(_)));
}

#[test]
fn hidden_branch_with_fallback_swaps_subtrees() {
    let document = r##"{
        "root": {
            "type": "Stack",
            "children": [
                {
                    "type": "Text",
                    "content": "EXPRESS",
                    "when": { "op": "truthy", "path": "express" },
                    "fallback": { "type": "Text", "content": "GROUND" }
                }
            ]
        }
    }"##;
    let out = platen::render_json(document, r#"{ "express": false }"#).unwrap();
    match &out[0] {
        RenderItem::Text { content, .. } => assert_eq!(content, "GROUND"),
        other => panic!("unexpected item {other:?}"),
    }
}
