//! # Platen
//!
//! A deterministic layout engine for dot-matrix printer documents.
//!
//! Screen layout engines assume continuous pixels, scalable fonts, and a
//! compositor that forgives a half-point of drift. A 9-pin line printer
//! forgives nothing: character cells are fixed by the device pitch, vertical
//! motion is quantized to line units, and an off-by-one column shows up on
//! every invoice a business prints for the next decade.
//!
//! Platen therefore does all geometry in integer device dots (360 per inch)
//! and runs layout as two strict, pure passes, so the same document and data
//! always produce identical output.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    — Document tree: nodes, dimensions, box model
//!       ↓
//!   [style]    — Per-field inheritance to resolved text styles
//!       ↓
//!   [data]     — Bindings, conditions, {path} interpolation
//!       ↓
//!   [layout]   — Measurement pass, then positioning pass
//!       ↓
//!   [render]   — Flatten to positioned render items
//! ```
//!
//! The output is a flat list of [`render::RenderItem`]s — positioned text
//! runs and rules — ready for a downstream control-code encoder.

pub mod data;
pub mod error;
pub mod layout;
pub mod model;
pub mod render;
pub mod style;
pub mod text;

pub use data::{Condition, DataContext};
pub use error::LayoutError;
pub use layout::{LayoutEngine, LayoutResult, Rect};
pub use model::{Document, Node, PageSpec};
pub use render::RenderItem;
pub use style::{ResolvedStyle, Style};
pub use text::{FixedPitchMetrics, TextMetrics};

/// Render a document against a data context.
///
/// This is the primary entry point. Measurement, layout, and flattening run
/// against the document's page rectangle; the result is the flat item list a
/// printer encoder consumes.
pub fn render_document(
    document: &Document,
    data: &DataContext,
    metrics: &dyn TextMetrics,
) -> Result<Vec<RenderItem>, LayoutError> {
    let engine = LayoutEngine::new(metrics);
    let rect = Rect::new(0, 0, document.page.width, document.page.height);
    engine.render(&document.root, rect, data)
}

/// Render a document and data context both described as JSON, using the
/// built-in fixed-pitch metrics.
pub fn render_json(document: &str, data: &str) -> Result<Vec<RenderItem>, LayoutError> {
    let document: Document = serde_json::from_str(document)?;
    let data: serde_json::Value = serde_json::from_str(data)?;
    render_document(&document, &DataContext::new(data), &FixedPitchMetrics)
}
