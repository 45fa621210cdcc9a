//! Greedy row packing inside one category.
//!
//! Candidates are placed in the order given. Each starts at the top of the
//! category and is pushed below any placed bar it collides with, then
//! retested against every placed bar until it is clear.

use ganttview_core::{BarMetrics, OverlapRule};

/// Axis-aligned box of a placed bar.
///
/// Horizontal extents are in time units (epoch milliseconds); the vertical
/// ones in pixels from the top of the category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarBox {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl BarBox {
    /// Vertical overlap is always strict; horizontal overlap follows `rule`
    pub fn collides(&self, other: &BarBox, rule: OverlapRule) -> bool {
        rule.overlaps((self.left, self.right), (other.left, other.right))
            && self.top < other.bottom
            && other.top < self.bottom
    }
}

/// Final position of one candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Offset of the bar top from the category top
    pub offset: f64,
    /// Row index, 0 at the top
    pub row: usize,
}

/// Packing result of one category
#[derive(Debug, Clone, PartialEq)]
pub struct PackedCategory {
    /// One placement per candidate, in candidate order
    pub placements: Vec<Placement>,
    /// Max bar bottom
    pub height: f64,
    pub rows: usize,
}

/// Row packer for a fixed bar geometry and overlap rule
#[derive(Debug, Clone, Copy)]
pub struct RowPacker {
    metrics: BarMetrics,
    rule: OverlapRule,
}

impl RowPacker {
    pub fn new(metrics: BarMetrics, rule: OverlapRule) -> Self {
        Self { metrics, rule }
    }

    /// Place `(start, end)` extents in order
    pub fn pack(&self, spans: &[(f64, f64)]) -> PackedCategory {
        let height = self.metrics.height;
        let gap = self.metrics.gap();
        let mut placed: Vec<BarBox> = Vec::with_capacity(spans.len());
        let mut placements = Vec::with_capacity(spans.len());

        for &(left, right) in spans {
            let mut candidate = BarBox {
                left,
                right,
                top: 0.0,
                bottom: height,
            };
            while let Some(hit) = placed
                .iter()
                .find(|p| candidate.collides(p, self.rule))
                .copied()
            {
                candidate.top = hit.bottom + self.metrics.spacing;
                candidate.bottom = candidate.top + height;
            }
            placements.push(Placement {
                offset: candidate.top,
                row: if gap > 0.0 {
                    (candidate.top / gap).round() as usize
                } else {
                    0
                },
            });
            placed.push(candidate);
        }

        let bottom = placed.iter().map(|b| b.bottom).fold(0.0, f64::max);
        let rows = placements.iter().map(|p| p.row + 1).max().unwrap_or(0);
        PackedCategory {
            placements,
            height: bottom,
            rows,
        }
    }
}

/// Top offsets of stacked categories, separated by twice the bar spacing.
///
/// Returns one offset per height plus the end of the last band.
pub fn stack_categories(heights: &[f64], spacing: f64) -> Vec<f64> {
    let mut offsets = Vec::with_capacity(heights.len() + 1);
    let mut y = 0.0;
    for height in heights {
        offsets.push(y);
        y += height + 2.0 * spacing;
    }
    offsets.push(y);
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rows(packed: &PackedCategory) -> Vec<usize> {
        packed.placements.iter().map(|p| p.row).collect()
    }

    #[test]
    fn overlapping_bars_take_new_rows() {
        let packer = RowPacker::new(BarMetrics::regular(), OverlapRule::HalfOpen);
        let packed = packer.pack(&[(0.0, 100.0), (50.0, 80.0), (200.0, 300.0)]);
        assert_eq!(rows(&packed), vec![0, 1, 0]);
        assert_eq!(packed.placements[1].offset, 24.0);
        assert_eq!(packed.height, 44.0);
        assert_eq!(packed.rows, 2);
    }

    #[test]
    fn cascade_past_several_rows() {
        let packer = RowPacker::new(BarMetrics::regular(), OverlapRule::HalfOpen);
        let packed = packer.pack(&[(0.0, 100.0), (0.0, 90.0), (0.0, 80.0), (85.0, 95.0)]);
        // The last bar clears row 2 (ends at 80) but not rows 0 and 1
        assert_eq!(rows(&packed), vec![0, 1, 2, 2]);
    }

    #[test]
    fn gap_left_by_short_bar_is_reused() {
        let packer = RowPacker::new(BarMetrics::regular(), OverlapRule::HalfOpen);
        let packed = packer.pack(&[(0.0, 100.0), (0.0, 50.0), (0.0, 40.0), (60.0, 90.0)]);
        assert_eq!(rows(&packed), vec![0, 1, 2, 1]);
    }

    #[test]
    fn touching_bars_depend_on_rule() {
        let spans = [(0.0, 10.0), (10.0, 20.0)];
        let half_open = RowPacker::new(BarMetrics::regular(), OverlapRule::HalfOpen).pack(&spans);
        let inclusive = RowPacker::new(BarMetrics::regular(), OverlapRule::Inclusive).pack(&spans);
        assert_eq!(rows(&half_open), vec![0, 0]);
        assert_eq!(rows(&inclusive), vec![0, 1]);
    }

    #[test]
    fn compact_rows_use_compact_gap() {
        let packer = RowPacker::new(BarMetrics::compact(), OverlapRule::HalfOpen);
        let packed = packer.pack(&[(0.0, 10.0), (0.0, 10.0), (0.0, 10.0)]);
        let offsets: Vec<f64> = packed.placements.iter().map(|p| p.offset).collect();
        assert_eq!(offsets, vec![0.0, 6.0, 12.0]);
        assert_eq!(rows(&packed), vec![0, 1, 2]);
        assert_eq!(packed.height, 17.0);
    }

    #[test]
    fn empty_category() {
        let packed = RowPacker::new(BarMetrics::regular(), OverlapRule::HalfOpen).pack(&[]);
        assert!(packed.placements.is_empty());
        assert_eq!(packed.height, 0.0);
        assert_eq!(packed.rows, 0);
    }

    #[test]
    fn no_two_bars_in_a_row_overlap() {
        let spans: Vec<(f64, f64)> = (0..60)
            .map(|i| {
                let start = f64::from((i * 37) % 500);
                let len = f64::from((i * 13) % 90 + 1);
                (start, start + len)
            })
            .collect();
        let packed = RowPacker::new(BarMetrics::regular(), OverlapRule::HalfOpen).pack(&spans);
        for i in 0..spans.len() {
            for j in (i + 1)..spans.len() {
                if packed.placements[i].row == packed.placements[j].row {
                    assert!(
                        !OverlapRule::HalfOpen.overlaps(spans[i], spans[j]),
                        "{:?} and {:?} share row {}",
                        spans[i],
                        spans[j],
                        packed.placements[i].row
                    );
                }
            }
        }
    }

    #[test]
    fn packing_is_deterministic() {
        let spans = [(0.0, 5.0), (1.0, 3.0), (2.0, 9.0), (4.0, 6.0)];
        let packer = RowPacker::new(BarMetrics::regular(), OverlapRule::Inclusive);
        assert_eq!(packer.pack(&spans), packer.pack(&spans));
    }

    #[test]
    fn categories_stack_with_double_spacing() {
        assert_eq!(
            stack_categories(&[44.0, 20.0], 4.0),
            vec![0.0, 52.0, 80.0]
        );
        assert_eq!(stack_categories(&[], 4.0), vec![0.0]);
    }
}
