//! Category and series grouping with the categorical color palette.

use ganttview_core::{Color, Task};
use std::collections::BTreeSet;

/// Twenty-color categorical palette, pairs of dark and light shades
pub const CATEGORY20: [Color; 20] = [
    Color::from_u32(0x1f77b4),
    Color::from_u32(0xaec7e8),
    Color::from_u32(0xff7f0e),
    Color::from_u32(0xffbb78),
    Color::from_u32(0x2ca02c),
    Color::from_u32(0x98df8a),
    Color::from_u32(0xd62728),
    Color::from_u32(0xff9896),
    Color::from_u32(0x9467bd),
    Color::from_u32(0xc5b0d5),
    Color::from_u32(0x8c564b),
    Color::from_u32(0xc49c94),
    Color::from_u32(0xe377c2),
    Color::from_u32(0xf7b6d2),
    Color::from_u32(0x7f7f7f),
    Color::from_u32(0xc7c7c7),
    Color::from_u32(0xbcbd22),
    Color::from_u32(0xdbdb8d),
    Color::from_u32(0x17becf),
    Color::from_u32(0x9edae5),
];

/// Sorted distinct categories and series of a task set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grouping {
    pub categories: Vec<String>,
    pub series: Vec<String>,
}

impl Grouping {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let categories: BTreeSet<&str> = tasks.iter().map(|t| t.category.as_str()).collect();
        let series: BTreeSet<&str> = tasks.iter().map(|t| t.series.as_str()).collect();
        Self {
            categories: categories.into_iter().map(str::to_string).collect(),
            series: series.into_iter().map(str::to_string).collect(),
        }
    }

    /// Position of a series in the sorted series list
    pub fn series_index(&self, series: &str) -> Option<usize> {
        self.series
            .binary_search_by(|s| s.as_str().cmp(series))
            .ok()
    }

    /// Palette color of a series; unknown series take the first color
    pub fn series_color(&self, series: &str) -> Color {
        palette_color(self.series_index(series).unwrap_or(0))
    }

    /// Task indices per category, in category order.
    ///
    /// Within a category tasks are ordered by descending duration; equal
    /// durations keep their input order.
    pub fn tasks_by_category(&self, tasks: &[Task]) -> Vec<Vec<usize>> {
        let mut groups: Vec<Vec<usize>> = vec![Vec::new(); self.categories.len()];
        for (index, task) in tasks.iter().enumerate() {
            if let Ok(slot) = self
                .categories
                .binary_search_by(|c| c.as_str().cmp(task.category.as_str()))
            {
                groups[slot].push(index);
            }
        }
        for group in &mut groups {
            group.sort_by(|a, b| tasks[*b].duration.total_cmp(&tasks[*a].duration));
        }
        groups
    }
}

/// Palette entry for a series index, cycling after twenty
pub fn palette_color(index: usize) -> Color {
    CATEGORY20[index % CATEGORY20.len()]
}
