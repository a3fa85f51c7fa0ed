//! Structured error types for the layout engine.
//!
//! Layout is all-or-nothing: either the whole tree measures and positions
//! cleanly, or an error naming the offending node path is raised before any
//! render items are produced. Structurally invalid input (negative sizes, a
//! grid with cells but no columns) fails fast at measurement time; visually
//! degenerate but valid input (zero-width columns, zero available space)
//! never errors.

use thiserror::Error;

/// The unified error type returned by all public platen API functions.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// A dimension resolved to a negative dot count.
    #[error("negative {what} ({value} dots) at {path}")]
    NegativeDimension {
        path: String,
        what: &'static str,
        value: i32,
    },

    /// A gap between children was negative.
    #[error("negative gap ({value} dots) at {path}")]
    NegativeGap { path: String, value: i32 },

    /// A grid declared rows with cells but no column specs, so no cell can
    /// be assigned a track.
    #[error("grid at {path} has {cells} cell(s) but no column definitions")]
    GridWithoutColumns { path: String, cells: usize },

    /// A row declared more cells than the grid has columns.
    #[error("grid row {row} at {path} has {cells} cell(s) for {columns} column(s)")]
    RowOverflowsColumns {
        path: String,
        row: usize,
        cells: usize,
        columns: usize,
    },

    /// JSON input failed to parse as a valid document.
    #[error("failed to parse document: {0}")]
    Parse(#[from] serde_json::Error),
}
