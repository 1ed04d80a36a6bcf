//! Local wall-clock time.

use std::fmt::Write;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::format::{Item, StrftimeItems};
use serde_json::Value;

use super::{Widget, WidgetError, bad_args};
use crate::surface::{Area, Surface};

pub const KIND: &str = "clock";
pub const DEFAULT_FORMAT: &str = "%H:%M:%S";

pub struct Clock {
    format: String,
}

impl Clock {
    pub fn new(format: &str) -> Result<Self, WidgetError> {
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(bad_args(KIND, format!("invalid time format '{format}'")));
        }
        Ok(Self { format: format.to_string() })
    }

    pub fn render(&self, now: &chrono::DateTime<chrono::Local>) -> Result<String, WidgetError> {
        let mut text = String::new();
        write!(text, "{}", now.format(&self.format))
            .map_err(|_| WidgetError::Source(format!("could not format time with '{}'", self.format)))?;
        Ok(text)
    }
}

/// Args: `[format?]`, a strftime string.
pub fn build(args: &[Value]) -> Result<Arc<dyn Widget>, WidgetError> {
    let format = match args.first() {
        None => DEFAULT_FORMAT,
        Some(Value::String(format)) => format.as_str(),
        Some(_) => return Err(bad_args(KIND, "the time format must be a string")),
    };
    Ok(Arc::new(Clock::new(format)?))
}

#[async_trait]
impl Widget for Clock {
    fn name(&self) -> &str {
        KIND
    }

    async fn draw(&self, surface: &Surface, area: Area, _tick: u64) -> Result<(), WidgetError> {
        let text = self.render(&chrono::Local::now())?;
        surface.clear_region(area)?;
        surface.write_in(&text, area)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_render_uses_format() {
        let clock = Clock::new("%Y-%m-%d %H:%M").unwrap();
        let now = chrono::Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        assert_eq!(clock.render(&now).unwrap(), "2024-03-09 14:05");
    }

    #[test]
    fn test_build_defaults_and_rejects_non_strings() {
        assert!(build(&[]).is_ok());
        assert!(build(&[Value::from("%H")]).is_ok());
        assert!(build(&[Value::from(12)]).is_err());
    }

    #[tokio::test]
    async fn test_draw_writes_time() {
        let (surface, out) = crate::test_support::buffered_surface();
        let clock = Clock::new("%Y").unwrap();
        clock.draw(&surface, Area::new(1, 1, 10, 1), 1).await.unwrap();
        let plain = crate::surface::remove_ansi_codes(&out.contents());
        let year = plain.trim();
        assert_eq!(year.len(), 4);
        assert!(year.chars().all(|c| c.is_ascii_digit()));
    }
}
