//! Shows the output of a shell command, rerun every tick.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;

use super::{Widget, WidgetError, bad_args};
use crate::surface::{Area, Surface};

pub const KIND: &str = "command";

const TAB: &str = "    ";

pub struct CommandWidget {
    command: String,
}

impl CommandWidget {
    pub fn new(command: impl Into<String>) -> Self {
        Self { command: command.into() }
    }

    async fn run(&self) -> Result<String, WidgetError> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .kill_on_drop(true)
            .output()
            .await?;
        if !output.status.success() && output.stdout.is_empty() {
            return Err(WidgetError::Command {
                command: self.command.clone(),
                status: output.status.to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).replace('\t', TAB))
    }
}

/// Args: `[command]`.
pub fn build(args: &[Value]) -> Result<Arc<dyn Widget>, WidgetError> {
    match args.first().and_then(Value::as_str) {
        Some(cmd) if !cmd.trim().is_empty() => Ok(Arc::new(CommandWidget::new(cmd))),
        _ => Err(bad_args(KIND, "expected a shell command string as the first argument")),
    }
}

#[async_trait]
impl Widget for CommandWidget {
    fn name(&self) -> &str {
        KIND
    }

    async fn draw(&self, surface: &Surface, area: Area, _tick: u64) -> Result<(), WidgetError> {
        let stdout = self.run().await?;
        surface.clear_region(area)?;
        surface.write_in(&stdout, area)?;
        // Some commands re-show the cursor on their way out.
        surface.hide_cursor()?;
        Ok(())
    }
}
