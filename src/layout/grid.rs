//! # Grid Helpers
//!
//! Column track resolution and cumulative offsets for grid layout. Tracks
//! resolve once per grid, in declaration order; the layout engine then places
//! each cell at the cumulative offset of its track.

use crate::model::{ColumnSpec, Dimension};

/// Resolve column specs to concrete widths in dots.
///
/// - Fixed tracks keep their value.
/// - Percent tracks take that share of `available_width`.
/// - Auto tracks size to `content_widths[i]` (their widest cell).
/// - Fill tracks split the remaining width evenly among themselves.
///
/// Zero or negative remaining space resolves fill tracks to 0; degenerate
/// output is valid, never an error.
pub fn resolve_columns(
    columns: &[ColumnSpec],
    available_width: i32,
    gap: i32,
    content_widths: &[i32],
) -> Vec<i32> {
    if columns.is_empty() {
        return vec![];
    }

    let total_gap = gap * (columns.len() as i32 - 1);
    let space = (available_width - total_gap).max(0);

    let mut widths = vec![0i32; columns.len()];
    let mut remaining = space;
    let mut fill_tracks = 0i32;

    for (i, col) in columns.iter().enumerate() {
        match col.width {
            Dimension::Dots(v) => {
                widths[i] = v;
                remaining -= v;
            }
            Dimension::Percent(p) => {
                let v = ((space as f64) * p / 100.0).floor() as i32;
                widths[i] = v;
                remaining -= v;
            }
            Dimension::Auto => {
                let v = content_widths.get(i).copied().unwrap_or(0);
                widths[i] = v;
                remaining -= v;
            }
            Dimension::Fill => fill_tracks += 1,
        }
    }

    if fill_tracks > 0 {
        let share = (remaining.max(0)) / fill_tracks;
        for (i, col) in columns.iter().enumerate() {
            if col.width == Dimension::Fill {
                widths[i] = share;
            }
        }
    }

    widths
}

/// Cumulative offset of track `index`, accounting for gaps.
pub fn track_offset(index: usize, sizes: &[i32], gap: i32) -> i32 {
    let mut offset = 0;
    for &size in sizes.iter().take(index) {
        offset += size + gap;
    }
    offset
}

/// Total span of all tracks plus inter-track gaps.
pub fn track_span(sizes: &[i32], gap: i32) -> i32 {
    if sizes.is_empty() {
        return 0;
    }
    sizes.iter().sum::<i32>() + gap * (sizes.len() as i32 - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HAlign;

    fn col(width: Dimension) -> ColumnSpec {
        ColumnSpec {
            width,
            align: HAlign::Left,
        }
    }

    #[test]
    fn fixed_columns_keep_their_value() {
        let widths = resolve_columns(
            &[col(Dimension::Dots(100)), col(Dimension::Dots(200))],
            400,
            0,
            &[],
        );
        assert_eq!(widths, vec![100, 200]);
    }

    #[test]
    fn fill_columns_split_remaining_evenly() {
        let widths = resolve_columns(
            &[
                col(Dimension::Dots(100)),
                col(Dimension::Fill),
                col(Dimension::Fill),
            ],
            400,
            0,
            &[],
        );
        assert_eq!(widths, vec![100, 150, 150]);
    }

    #[test]
    fn percent_resolves_against_gapless_space() {
        let widths = resolve_columns(
            &[col(Dimension::Percent(50.0)), col(Dimension::Fill)],
            210,
            10,
            &[],
        );
        // 210 - 10 gap = 200; 50% = 100; fill takes the rest.
        assert_eq!(widths, vec![100, 100]);
    }

    #[test]
    fn auto_column_takes_widest_cell() {
        let widths = resolve_columns(
            &[col(Dimension::Auto), col(Dimension::Fill)],
            400,
            0,
            &[80, 0],
        );
        assert_eq!(widths, vec![80, 320]);
    }

    #[test]
    fn overflow_resolves_fill_to_zero() {
        let widths = resolve_columns(
            &[col(Dimension::Dots(500)), col(Dimension::Fill)],
            400,
            0,
            &[],
        );
        assert_eq!(widths, vec![500, 0]);
    }

    #[test]
    fn track_offsets_accumulate_gaps() {
        let sizes = vec![100, 200, 150];
        assert_eq!(track_offset(0, &sizes, 10), 0);
        assert_eq!(track_offset(1, &sizes, 10), 110);
        assert_eq!(track_offset(2, &sizes, 10), 320);
        assert_eq!(track_span(&sizes, 10), 470);
    }
}
