//! # Flex Helpers
//!
//! Wrap-line partitioning and justify distribution for flex rows. The main
//! flex logic lives in the layout engine; this module provides the
//! lower-level calculations.

use crate::model::Justify;

/// A single line of items in a wrapping flex row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapLine {
    /// Index of the first item in this line.
    pub start: usize,
    /// One past the last item (exclusive end).
    pub end: usize,
}

impl WrapLine {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Partition items into wrap lines based on available width.
///
/// Greedy packing: an item starts a new line when adding it would push the
/// running line width past `available_width`. The first item on a line is
/// always placed regardless of overflow, so every line holds at least one
/// item and oversized items cannot loop forever.
pub fn partition_into_lines(outer_widths: &[i32], gap: i32, available_width: i32) -> Vec<WrapLine> {
    if outer_widths.is_empty() {
        return vec![];
    }

    let mut lines = Vec::new();
    let mut line_start = 0;
    let mut line_width = 0i32;

    for (i, &w) in outer_widths.iter().enumerate() {
        let needed = if i == line_start { w } else { gap + w };
        if i > line_start && line_width + needed > available_width {
            lines.push(WrapLine {
                start: line_start,
                end: i,
            });
            line_start = i;
            line_width = w;
        } else {
            line_width += needed;
        }
    }

    if line_start < outer_widths.len() {
        lines.push(WrapLine {
            start: line_start,
            end: outer_widths.len(),
        });
    }

    lines
}

/// Leading offset and extra between-item spacing for a justify mode.
///
/// `free` is the slack left on the main axis after item widths and base gaps;
/// `count` is the number of items on the line. Single-item edge cases:
/// `space-between` places it at the start; `space-around` and `space-evenly`
/// center it. Negative slack (overflow) degrades to start alignment.
pub fn justify_offsets(justify: Justify, free: i32, count: usize) -> (i32, i32) {
    if count == 0 {
        return (0, 0);
    }
    let free = free.max(0);
    let n = count as i32;
    match justify {
        Justify::Start => (0, 0),
        Justify::Center => (free / 2, 0),
        Justify::End => (free, 0),
        Justify::SpaceBetween => {
            if count == 1 {
                (0, 0)
            } else {
                (0, free / (n - 1))
            }
        }
        Justify::SpaceAround => {
            let share = free / n;
            (share / 2, share)
        }
        Justify::SpaceEvenly => {
            let share = free / (n + 1);
            (share, share)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_single_line_fits() {
        let lines = partition_into_lines(&[100, 100, 100], 10, 400);
        assert_eq!(lines, vec![WrapLine { start: 0, end: 3 }]);
    }

    #[test]
    fn partition_two_line_split() {
        // 3 items × 100 + 2 gaps × 10 = 320; available = 250.
        let lines = partition_into_lines(&[100, 100, 100], 10, 250);
        assert_eq!(
            lines,
            vec![WrapLine { start: 0, end: 2 }, WrapLine { start: 2, end: 3 }]
        );
    }

    #[test]
    fn partition_oversized_item_gets_own_line() {
        let lines = partition_into_lines(&[500], 10, 200);
        assert_eq!(lines, vec![WrapLine { start: 0, end: 1 }]);
    }

    #[test]
    fn partition_exact_fit_stays_on_one_line() {
        // 2 × 100 + 1 × 10 = 210; available = 210.
        let lines = partition_into_lines(&[100, 100], 10, 210);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn partition_empty_input() {
        assert!(partition_into_lines(&[], 10, 200).is_empty());
    }

    #[test]
    fn justify_single_item_edge_cases() {
        assert_eq!(justify_offsets(Justify::SpaceBetween, 100, 1), (0, 0));
        assert_eq!(justify_offsets(Justify::SpaceAround, 100, 1), (50, 100));
        assert_eq!(justify_offsets(Justify::SpaceEvenly, 100, 1), (50, 50));
    }

    #[test]
    fn justify_two_items() {
        assert_eq!(justify_offsets(Justify::Start, 90, 2), (0, 0));
        assert_eq!(justify_offsets(Justify::Center, 90, 2), (45, 0));
        assert_eq!(justify_offsets(Justify::End, 90, 2), (90, 0));
        assert_eq!(justify_offsets(Justify::SpaceBetween, 90, 2), (0, 90));
        assert_eq!(justify_offsets(Justify::SpaceAround, 90, 2), (22, 45));
        assert_eq!(justify_offsets(Justify::SpaceEvenly, 90, 2), (30, 30));
    }

    #[test]
    fn justify_overflow_degrades_to_start() {
        assert_eq!(justify_offsets(Justify::Center, -40, 3), (0, 0));
    }
}
