//! A positioned, sized, drawable rectangle.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::geometry::Rect;
use super::neighbors::Neighbors;
use crate::surface::{Area, BorderGlyphs, Surface};
use crate::widgets::{Widget, WidgetError};

pub struct Cell {
    /// Normalized to the owning group's box.
    pub rect: Rect,
    /// Recomputed on every group update.
    pub neighbors: Neighbors,
    pub update_count: u64,
    widget: Arc<dyn Widget>,
    in_flight: Arc<AtomicBool>,
}

impl Cell {
    pub fn new(rect: Rect, widget: Arc<dyn Widget>) -> Self {
        Self {
            rect,
            neighbors: Neighbors::default(),
            update_count: 0,
            widget,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn widget(&self) -> &Arc<dyn Widget> {
        &self.widget
    }

    /// Grow by `delta` while keeping the far x edge fixed.
    pub fn apply_width(&mut self, delta: f64) {
        self.rect.width += delta;
        self.rect.x -= delta;
    }

    /// Grow by `delta` while keeping the far y edge fixed.
    pub fn apply_height(&mut self, delta: f64) {
        self.rect.height += delta;
        self.rect.y -= delta;
    }

    pub fn add_width(&mut self, delta: f64) {
        self.rect.width += delta;
    }

    pub fn add_height(&mut self, delta: f64) {
        self.rect.height += delta;
    }

    pub fn update(&mut self) {
        self.update_count += 1;
    }

    /// Whether a previous draw of this cell is still running.
    pub fn is_drawing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claim the cell for one draw inside `border`. Returns `None` while an
    /// earlier draw is still in flight.
    pub(crate) fn begin_draw(&self, border: Area, glyphs: Arc<BorderGlyphs>) -> Option<DrawJob> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some(DrawJob {
            widget: Arc::clone(&self.widget),
            border,
            glyphs,
            tick: self.update_count,
            _claim: InFlight(Arc::clone(&self.in_flight)),
        })
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("widget", &self.widget.name())
            .field("rect", &self.rect)
            .field("neighbors", &self.neighbors)
            .field("update_count", &self.update_count)
            .finish()
    }
}

/// Releases the cell's draw claim when dropped, whether or not the job ran.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One widget draw for one tick, detached from the group so it can run as
/// its own task.
pub struct DrawJob {
    widget: Arc<dyn Widget>,
    border: Area,
    glyphs: Arc<BorderGlyphs>,
    tick: u64,
    _claim: InFlight,
}

impl DrawJob {
    /// Space handed to the widget, inside the border.
    pub fn area(&self) -> Area {
        self.border.inner()
    }

    pub fn widget_name(&self) -> &str {
        self.widget.name()
    }

    /// Draw the widget, then repaint the border over anything it left on
    /// the edge.
    pub async fn run(self, surface: Surface) -> Result<(), WidgetError> {
        let result = self.widget.draw(&surface, self.area(), self.tick).await;
        surface.reset()?;
        surface.draw_box(self.border, &self.glyphs)?;
        surface.flush()?;
        result
    }
}
