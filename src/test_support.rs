//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::core::cell::Cell;
use crate::core::geometry::Rect;
use crate::core::group::CellGroup;
use crate::core::neighbors;
use crate::surface::{Area, BorderGlyphs, Surface};
use crate::widgets::{Widget, WidgetError};

/// In-memory sink behind a test surface.
#[derive(Clone, Default)]
pub struct SinkBuffer(Arc<Mutex<Vec<u8>>>);

impl SinkBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

/// A surface that writes into a buffer instead of stdout.
pub fn buffered_surface() -> (Surface, SinkBuffer) {
    let buffer = SinkBuffer::default();
    (Surface::new(Arc::clone(&buffer.0)), buffer)
}

/// Widget that records every draw and marks the top-left of its area.
#[derive(Default)]
pub struct RecordingWidget {
    pub calls: Mutex<Vec<(Area, u64)>>,
}

impl RecordingWidget {
    pub fn shared() -> Arc<dyn Widget> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl Widget for RecordingWidget {
    fn name(&self) -> &str {
        "recording"
    }

    async fn draw(&self, surface: &Surface, area: Area, tick: u64) -> Result<(), WidgetError> {
        self.calls.lock().unwrap().push((area, tick));
        surface.write_in("#", area)?;
        Ok(())
    }
}

/// Cells with resolved neighbors (update counts left at zero).
pub fn cells_from(rects: &[(f64, f64, f64, f64)]) -> Vec<Cell> {
    let rects: Vec<Rect> = rects
        .iter()
        .map(|&(x, y, w, h)| Rect::new(x, y, w, h))
        .collect();
    rects
        .iter()
        .enumerate()
        .map(|(i, &rect)| {
            let mut cell = Cell::new(rect, RecordingWidget::shared());
            cell.neighbors = neighbors::resolve(i, &rects);
            cell
        })
        .collect()
}

/// A full-screen group of recording widgets.
pub fn group_from(rects: &[(f64, f64, f64, f64)]) -> CellGroup {
    CellGroup::new(Rect::UNIT, cells_from(rects), BorderGlyphs::default())
}
