//! Default widget for cells nobody has claimed yet.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{Widget, WidgetError};
use crate::surface::{Area, Surface};

pub const KIND: &str = "placeholder";

pub struct Placeholder;

pub fn build(_args: &[Value]) -> Result<Arc<dyn Widget>, WidgetError> {
    Ok(Arc::new(Placeholder))
}

#[async_trait]
impl Widget for Placeholder {
    fn name(&self) -> &str {
        KIND
    }

    async fn draw(&self, surface: &Surface, area: Area, tick: u64) -> Result<(), WidgetError> {
        surface.write_in(
            &format!("Nothing is drawing in this cell yet. Updated {tick} times."),
            area,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::remove_ansi_codes;
    use crate::test_support::buffered_surface;

    #[test]
    fn test_reports_update_count_within_area() {
        let (surface, out) = buffered_surface();
        let area = Area::new(3, 2, 20, 5);
        tokio_test::block_on(Placeholder.draw(&surface, area, 7)).unwrap();

        let text = out.contents();
        assert!(text.starts_with("\x1b[2;3H"));
        let plain = remove_ansi_codes(&text);
        assert_eq!(plain, "Nothing is drawing in this cell yet. Updated 7 times.");
        assert!(text.contains("\x1b[4;3H"));
        assert!(!text.contains("\x1b[5;3H"));
    }
}
