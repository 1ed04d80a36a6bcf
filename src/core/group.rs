//! # Cell Group
//!
//! Owns the cells tiling one box, keeps their adjacency current, and turns
//! their normalized rectangles into terminal rectangles at draw time.
//!
//! ```text
//! CellGroup
//! ├── bounds: Rect           // placement within the terminal (unit square at top level)
//! ├── cells: Vec<Cell>       // layout order, not spatial order
//! └── glyphs: Arc<BorderGlyphs>   // border set, shared with draw jobs
//! ```

use std::io;
use std::sync::Arc;

use log::{debug, warn};
use serde_json::Value;

use super::cell::{Cell, DrawJob};
use super::dimensions;
use super::geometry::{EDGE_EPSILON, Rect, TermSize};
use super::neighbors;
use crate::surface::{Area, BorderGlyphs, Surface};
use crate::widgets::{WidgetError, WidgetRegistry};

/// One entry of a layout description, before its widget is built.
pub trait CellSource {
    fn kind(&self) -> &str;
    fn rect(&self) -> Rect;
    fn args(&self) -> &[Value];
}

#[derive(Debug)]
pub struct CellGroup {
    pub bounds: Rect,
    cells: Vec<Cell>,
    glyphs: Arc<BorderGlyphs>,
}

impl CellGroup {
    /// Build a group and resolve its initial adjacency.
    pub fn new(bounds: Rect, cells: Vec<Cell>, glyphs: BorderGlyphs) -> Self {
        let mut group = Self {
            bounds,
            cells,
            glyphs: Arc::new(glyphs),
        };
        group.update();
        if !group.tiles() {
            warn!(
                "Layout does not tile its box (coverage {:.4}); resizes may misbehave",
                group.coverage()
            );
        }
        group
    }

    /// Build a full-screen group from a two-dimensional layout, constructing
    /// every widget through `registry`. Fails on the first unknown kind.
    pub fn from_layout<S: CellSource>(
        layout: &[Vec<S>],
        registry: &WidgetRegistry,
        glyphs: BorderGlyphs,
    ) -> Result<Self, WidgetError> {
        let mut cells = Vec::new();
        for spec in layout.iter().flatten() {
            let widget = registry.build(spec.kind(), spec.args())?;
            cells.push(Cell::new(spec.rect(), widget));
        }
        Ok(Self::new(Rect::UNIT, cells, glyphs))
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn glyphs(&self) -> &BorderGlyphs {
        &self.glyphs
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Recompute every cell's neighbors and bump its tick counter.
    pub fn update(&mut self) {
        let rects: Vec<Rect> = self.cells.iter().map(|c| c.rect).collect();
        for (i, cell) in self.cells.iter_mut().enumerate() {
            cell.neighbors = neighbors::resolve(i, &rects);
            cell.update();
        }
    }

    /// Resize cell `index` to a normalized size and propagate.
    pub fn resize(&mut self, index: usize, width: f64, height: f64) {
        dimensions::update_dimensions(&mut self.cells, index, width, height);
    }

    /// Resize cell `index` to a size in terminal cells and propagate.
    pub fn resize_in_cells(&mut self, index: usize, cols: u16, rows: u16, size: TermSize) {
        dimensions::update_dimensions_in_cells(&mut self.cells, index, cols, rows, size);
    }

    pub fn verify(&mut self, index: usize) {
        dimensions::verify_dimensions(&mut self.cells, index);
    }

    /// Verify every cell in layout order.
    pub fn settle(&mut self) {
        for i in 0..self.cells.len() {
            dimensions::verify_dimensions(&mut self.cells, i);
        }
    }

    /// Total normalized area covered by the cells.
    pub fn coverage(&self) -> f64 {
        self.cells.iter().map(|c| c.rect.area()).sum()
    }

    /// Whether the cells exactly tile the unit square: all inside it, no
    /// pairwise overlap, and nothing left uncovered.
    pub fn tiles(&self) -> bool {
        let inside = self.cells.iter().all(|c| c.rect.within_unit());
        let disjoint = self.cells.iter().enumerate().all(|(i, a)| {
            self.cells[i + 1..]
                .iter()
                .all(|b| a.rect.overlap(&b.rect) <= EDGE_EPSILON)
        });
        inside && disjoint && (self.coverage() - 1.0).abs() <= EDGE_EPSILON
    }

    /// Terminal rectangle (border included) for each cell, in layout order.
    ///
    /// Edges are snapped individually, so cells that share a normalized edge
    /// share a terminal edge.
    pub fn areas(&self, size: TermSize) -> Vec<Area> {
        let cols = f64::from(size.cols);
        let rows = f64::from(size.rows);
        let origin_col = (self.bounds.x * cols).floor() + 1.0;
        let origin_row = (self.bounds.y * rows).floor() + 1.0;
        let span_w = (self.bounds.width * cols).floor();
        let span_h = (self.bounds.height * rows).floor();
        let snap = |v: f64, span: f64| (v * span + EDGE_EPSILON * span).floor();

        self.cells
            .iter()
            .map(|cell| {
                let left = snap(cell.rect.x, span_w);
                let right = snap(cell.rect.x_end(), span_w);
                let top = snap(cell.rect.y, span_h);
                let bottom = snap(cell.rect.y_end(), span_h);
                Area {
                    col: (origin_col + left) as u16,
                    row: (origin_row + top) as u16,
                    width: (right - left).max(0.0) as u16,
                    height: (bottom - top).max(0.0) as u16,
                }
            })
            .collect()
    }

    /// Paint one frame.
    ///
    /// Settles every cell, then for each one resets formatting, claims a
    /// widget draw for the space inside its border, and draws the border.
    /// Each job paints its border again once the widget is done, so the
    /// border always ends up on top. The returned jobs are meant to run
    /// concurrently; cells whose previous draw is still running are skipped
    /// this tick.
    pub fn draw(&mut self, surface: &Surface, size: TermSize) -> io::Result<Vec<DrawJob>> {
        self.settle();
        let areas = self.areas(size);
        let mut jobs = Vec::with_capacity(self.cells.len());

        for (i, (cell, area)) in self.cells.iter().zip(areas).enumerate() {
            surface.reset()?;
            match cell.begin_draw(area, Arc::clone(&self.glyphs)) {
                Some(job) => jobs.push(job),
                None => debug!(
                    "Cell {} ({}) still drawing, skipping tick {}",
                    i,
                    cell.widget().name(),
                    cell.update_count
                ),
            }
            surface.draw_box(area, &self.glyphs)?;
        }
        Ok(jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::approx_eq;
    use crate::test_support::{buffered_surface, group_from};
    use crate::surface::remove_ansi_codes;

    #[test]
    fn test_construction_resolves_neighbors_and_ticks() {
        let group = group_from(&[(0.0, 0.0, 0.5, 1.0), (0.5, 0.0, 0.5, 1.0)]);
        assert_eq!(group.cells()[0].neighbors.right, vec![1]);
        assert_eq!(group.cells()[1].neighbors.left, vec![0]);
        assert!(group.cells().iter().all(|c| c.update_count == 1));
    }

    #[test]
    fn test_update_bumps_every_cell() {
        let mut group = group_from(&[(0.0, 0.0, 1.0, 1.0)]);
        group.update();
        group.update();
        assert_eq!(group.cells()[0].update_count, 3);
    }

    #[test]
    fn test_partition_tiles_unit_square() {
        let group = group_from(&[
            (0.0, 0.0, 0.3, 1.0),
            (0.3, 0.0, 0.7, 0.25),
            (0.3, 0.25, 0.35, 0.75),
            (0.65, 0.25, 0.35, 0.75),
        ]);
        assert!(group.tiles());
        assert!(approx_eq(group.coverage(), 1.0));
    }

    #[test]
    fn test_gap_or_overlap_does_not_tile() {
        assert!(!group_from(&[(0.0, 0.0, 0.5, 1.0)]).tiles());
        assert!(!group_from(&[(0.0, 0.0, 0.6, 1.0), (0.4, 0.0, 0.6, 1.0)]).tiles());
    }

    #[test]
    fn test_resize_keeps_tiling() {
        let mut group = group_from(&[
            (0.0, 0.0, 0.25, 1.0),
            (0.25, 0.0, 0.25, 1.0),
            (0.5, 0.0, 0.5, 1.0),
        ]);
        for (i, w) in [(0, 0.1), (1, 0.6), (2, 0.3), (0, 0.45)] {
            group.resize(i, w, 1.0);
            group.update();
            assert!(group.tiles(), "tiling lost after resizing cell {i} to {w}");
        }
        let widths: f64 = group.cells().iter().map(|c| c.rect.width).sum();
        assert!(approx_eq(widths, 1.0));
    }

    #[test]
    fn test_areas_abut() {
        let group = group_from(&[(0.0, 0.0, 0.5, 1.0), (0.5, 0.0, 0.5, 1.0)]);
        let areas = group.areas(TermSize::new(81, 24));
        assert_eq!(areas[0], Area::new(1, 1, 40, 24));
        assert_eq!(areas[1], Area::new(41, 1, 41, 24));
    }

    #[test]
    fn test_areas_respect_group_bounds() {
        let mut group = group_from(&[(0.0, 0.0, 1.0, 1.0)]);
        group.bounds = Rect::new(0.5, 0.5, 0.5, 0.5);
        let areas = group.areas(TermSize::new(80, 24));
        assert_eq!(areas[0], Area::new(41, 13, 40, 12));
    }

    #[test]
    fn test_draw_emits_borders_and_jobs() {
        let mut group = group_from(&[(0.0, 0.0, 0.5, 1.0), (0.5, 0.0, 0.5, 1.0)]);
        let (surface, out) = buffered_surface();
        let jobs = group.draw(&surface, TermSize::new(20, 5)).unwrap();

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].area(), Area::new(2, 2, 8, 3));
        assert_eq!(jobs[1].area(), Area::new(12, 2, 8, 3));

        let text = out.contents();
        assert!(text.starts_with("\x1b[0m"));
        assert!(text.contains("\x1b[1;1H╭────────╮"));
        assert!(text.contains("\x1b[1;11H╭────────╮"));
        assert_eq!(remove_ansi_codes(&text).matches('│').count(), 12);
    }

    #[test]
    fn test_draw_skips_cells_still_drawing() {
        let mut group = group_from(&[(0.0, 0.0, 1.0, 1.0)]);
        let (surface, _out) = buffered_surface();
        let pending = group.draw(&surface, TermSize::new(20, 5)).unwrap();
        assert_eq!(pending.len(), 1);
        assert!(group.draw(&surface, TermSize::new(20, 5)).unwrap().is_empty());
        drop(pending);
        assert_eq!(group.draw(&surface, TermSize::new(20, 5)).unwrap().len(), 1);
    }
}
