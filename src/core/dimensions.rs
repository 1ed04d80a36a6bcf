//! # Dimension Propagation
//!
//! Keeps a group tiling its box after one cell is resized.
//!
//! A resize changes the cell's width and height while keeping its origin.
//! Right neighbors absorb the width change and up neighbors absorb the
//! height change, each keeping its own far edge fixed. A verification pass
//! then reattaches every neighbor edge to the resized cell and snaps sides
//! without neighbors to the box. Rectangular tilings decompose into
//! independent rows and columns, so one pass over the cell and its direct
//! neighbors settles the group.

use log::warn;

use super::cell::Cell;
use super::geometry::TermSize;

/// Reattach the neighbors of `cells[index]` to its edges and snap its
/// neighborless sides to the box.
pub fn verify_dimensions(cells: &mut [Cell], index: usize) {
    let Some(cell) = cells.get(index) else {
        return;
    };
    let rect = cell.rect;
    let neighbors = cell.neighbors.clone();

    for &n in &neighbors.right {
        let other = &mut cells[n].rect;
        let far = other.x_end();
        other.x = rect.x_end();
        other.width = far - other.x;
    }
    for &n in &neighbors.left {
        let gap = rect.x - cells[n].rect.x_end();
        cells[n].add_width(gap);
    }
    for &n in &neighbors.up {
        let other = &mut cells[n].rect;
        let far = other.y_end();
        other.y = rect.y_end();
        other.height = far - other.y;
    }
    for &n in &neighbors.down {
        let gap = rect.y - cells[n].rect.y_end();
        cells[n].add_height(gap);
    }

    let own = &mut cells[index].rect;
    if neighbors.left.is_empty() {
        own.width += own.x;
        own.x = 0.0;
    }
    if neighbors.right.is_empty() {
        own.width = 1.0 - own.x;
    }
    if neighbors.down.is_empty() {
        own.height += own.y;
        own.y = 0.0;
    }
    if neighbors.up.is_empty() {
        own.height = 1.0 - own.y;
    }

    clamp_size(cells, index);
    for n in neighbors.iter() {
        clamp_size(cells, n);
    }
}

/// Resize `cells[index]` to `width` x `height` (normalized) and propagate
/// the change through its neighbors.
pub fn update_dimensions(cells: &mut [Cell], index: usize, width: f64, height: f64) {
    let Some(cell) = cells.get_mut(index) else {
        return;
    };
    let delta_w = cell.rect.width - width;
    let delta_h = cell.rect.height - height;
    cell.rect.width = width;
    cell.rect.height = height;
    let neighbors = cell.neighbors.clone();

    for &n in &neighbors.right {
        cells[n].apply_width(delta_w);
    }
    for &n in &neighbors.up {
        cells[n].apply_height(delta_h);
    }

    verify_dimensions(cells, index);
    for n in neighbors.iter() {
        verify_dimensions(cells, n);
    }
}

/// Resize by terminal cells rather than normalized units.
pub fn update_dimensions_in_cells(
    cells: &mut [Cell],
    index: usize,
    cols: u16,
    rows: u16,
    size: TermSize,
) {
    let width = normalize(cols, size.cols);
    let height = normalize(rows, size.rows);
    update_dimensions(cells, index, width, height);
}

fn normalize(cells: u16, total: u16) -> f64 {
    if total == 0 {
        return 1.0;
    }
    (f64::from(cells) / f64::from(total)).min(1.0)
}

fn clamp_size(cells: &mut [Cell], index: usize) {
    let rect = &mut cells[index].rect;
    if rect.width < 0.0 || rect.height < 0.0 {
        warn!(
            "Cell {} collapsed to {}; clamping to zero (layout does not tile its box)",
            index, rect
        );
        rect.width = rect.width.max(0.0);
        rect.height = rect.height.max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{Rect, approx_eq};
    use crate::test_support::cells_from;

    fn assert_rect(cell: &Cell, x: f64, y: f64, w: f64, h: f64) {
        let r = cell.rect;
        assert!(
            approx_eq(r.x, x) && approx_eq(r.y, y) && approx_eq(r.width, w) && approx_eq(r.height, h),
            "expected ({x}, {y}) {w}x{h}, got {r}"
        );
    }

    #[test]
    fn test_shrink_left_column_grows_right_column() {
        let mut cells = cells_from(&[(0.0, 0.0, 0.5, 1.0), (0.5, 0.0, 0.5, 1.0)]);
        update_dimensions(&mut cells, 0, 0.3, 1.0);
        assert_rect(&cells[0], 0.0, 0.0, 0.3, 1.0);
        assert_rect(&cells[1], 0.3, 0.0, 0.7, 1.0);
    }

    #[test]
    fn test_grow_middle_column_only_moves_right_side() {
        let mut cells = cells_from(&[
            (0.0, 0.0, 0.25, 1.0),
            (0.25, 0.0, 0.25, 1.0),
            (0.5, 0.0, 0.5, 1.0),
        ]);
        update_dimensions(&mut cells, 1, 0.5, 1.0);
        assert_rect(&cells[0], 0.0, 0.0, 0.25, 1.0);
        assert_rect(&cells[1], 0.25, 0.0, 0.5, 1.0);
        assert_rect(&cells[2], 0.75, 0.0, 0.25, 1.0);
    }

    #[test]
    fn test_shrink_top_row_grows_row_beneath() {
        let mut cells = cells_from(&[(0.0, 0.0, 1.0, 0.5), (0.0, 0.5, 1.0, 0.5)]);
        update_dimensions(&mut cells, 0, 1.0, 0.2);
        assert_rect(&cells[0], 0.0, 0.0, 1.0, 0.2);
        assert_rect(&cells[1], 0.0, 0.2, 1.0, 0.8);
    }

    #[test]
    fn test_resize_without_neighbor_snaps_back_to_box() {
        let mut cells = cells_from(&[(0.0, 0.0, 0.5, 1.0), (0.5, 0.0, 0.5, 1.0)]);
        update_dimensions(&mut cells, 1, 0.2, 0.6);
        assert_rect(&cells[0], 0.0, 0.0, 0.5, 1.0);
        assert_rect(&cells[1], 0.5, 0.0, 0.5, 1.0);
    }

    #[test]
    fn test_verify_full_screen_cell_is_noop() {
        let mut cells = cells_from(&[(0.0, 0.0, 1.0, 1.0)]);
        verify_dimensions(&mut cells, 0);
        assert_eq!(cells[0].rect, Rect::UNIT);
    }

    #[test]
    fn test_verify_repairs_gap_to_right_neighbor() {
        let mut cells = cells_from(&[(0.0, 0.0, 0.4, 1.0), (0.5, 0.0, 0.5, 1.0)]);
        cells[0].neighbors.right = vec![1];
        cells[1].neighbors.left = vec![0];
        verify_dimensions(&mut cells, 0);
        assert_rect(&cells[1], 0.4, 0.0, 0.6, 1.0);
    }

    #[test]
    fn test_verify_snaps_drifted_cell_to_box() {
        let mut cells = cells_from(&[(0.1, 0.2, 0.5, 0.5)]);
        verify_dimensions(&mut cells, 0);
        assert_eq!(cells[0].rect, Rect::UNIT);
    }

    #[test]
    fn test_negative_size_is_clamped() {
        let mut cells = cells_from(&[(0.0, 0.0, 0.5, 1.0), (0.5, 0.0, 0.5, 1.0)]);
        update_dimensions(&mut cells, 0, 1.4, 1.0);
        assert!(cells[1].rect.width >= 0.0);
        assert!(cells[1].rect.height >= 0.0);
    }

    #[test]
    fn test_resize_in_terminal_cells() {
        let mut cells = cells_from(&[(0.0, 0.0, 0.5, 1.0), (0.5, 0.0, 0.5, 1.0)]);
        update_dimensions_in_cells(&mut cells, 0, 20, 50, TermSize::new(80, 24));
        assert_rect(&cells[0], 0.0, 0.0, 0.25, 1.0);
        assert_rect(&cells[1], 0.25, 0.0, 0.75, 1.0);
    }

    #[test]
    fn test_out_of_range_index_is_ignored() {
        let mut cells = cells_from(&[(0.0, 0.0, 1.0, 1.0)]);
        update_dimensions(&mut cells, 4, 0.5, 0.5);
        verify_dimensions(&mut cells, 4);
        assert_eq!(cells[0].rect, Rect::UNIT);
    }
}
