//! # Widgets
//!
//! A widget is whatever fills a cell. The layout engine knows nothing about
//! what a widget shows; it only hands it an absolute rectangle once per tick.
//!
//! ```text
//!   layout file            WidgetRegistry              CellGroup
//!   type = "cpu"   ──►  "cpu" → cpu::build(args)  ──►  Cell { widget }
//! ```
//!
//! ## Draw contract
//!
//! `draw` receives the inner rectangle of the cell (inside its border) and
//! must not write outside it. Draws run as independent tasks: two widgets'
//! writes may interleave on the shared sink, and a widget that never
//! finishes only stalls its own cell. Errors are logged by the render loop
//! and never retried; the cell keeps its previous frame until the next tick.

pub mod clock;
pub mod command;
pub mod cpu;
pub mod placeholder;

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::surface::{Area, Surface};

#[derive(Debug)]
pub enum WidgetError {
    /// No constructor registered under this kind.
    Unknown(String),
    /// Constructor rejected its layout arguments.
    Args { kind: String, message: String },
    /// Writing to the terminal or reading a data source failed.
    Io(io::Error),
    /// A data source returned something unusable.
    Source(String),
    /// An external command exited unsuccessfully.
    Command { command: String, status: String },
}

impl fmt::Display for WidgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetError::Unknown(kind) => {
                write!(f, "attempted to create a widget that does not exist: {kind}")
            }
            WidgetError::Args { kind, message } => {
                write!(f, "bad arguments for widget '{kind}': {message}")
            }
            WidgetError::Io(e) => write!(f, "widget I/O error: {e}"),
            WidgetError::Source(msg) => write!(f, "widget data source error: {msg}"),
            WidgetError::Command { command, status } => {
                write!(f, "command '{command}' failed: {status}")
            }
        }
    }
}

impl std::error::Error for WidgetError {}

impl From<io::Error> for WidgetError {
    fn from(e: io::Error) -> Self {
        WidgetError::Io(e)
    }
}

#[async_trait]
pub trait Widget: Send + Sync {
    /// Registered kind name, for logging.
    fn name(&self) -> &str;

    /// Draw into `area`. `tick` is the owning cell's update count.
    async fn draw(&self, surface: &Surface, area: Area, tick: u64) -> Result<(), WidgetError>;
}

/// Builds a widget from the `args` list of its layout entry.
pub type WidgetConstructor = fn(&[Value]) -> Result<Arc<dyn Widget>, WidgetError>;

/// Maps widget kind names to constructors.
#[derive(Default)]
pub struct WidgetRegistry {
    constructors: HashMap<String, WidgetConstructor>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: impl Into<String>, constructor: WidgetConstructor) {
        self.constructors.insert(kind.into(), constructor);
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn build(&self, kind: &str, args: &[Value]) -> Result<Arc<dyn Widget>, WidgetError> {
        let constructor = self
            .constructors
            .get(kind)
            .ok_or_else(|| WidgetError::Unknown(kind.to_string()))?;
        constructor(args)
    }
}

/// Registry with every built-in widget.
pub fn default_registry() -> WidgetRegistry {
    let mut registry = WidgetRegistry::new();
    registry.register(placeholder::KIND, placeholder::build);
    registry.register(command::KIND, command::build);
    registry.register(clock::KIND, clock::build);
    registry.register(cpu::KIND, cpu::build);
    registry
}

/// Shorthand for an argument error.
pub(crate) fn bad_args(kind: &str, message: impl Into<String>) -> WidgetError {
    WidgetError::Args {
        kind: kind.to_string(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_kinds() {
        let registry = default_registry();
        assert_eq!(registry.kinds(), vec!["clock", "command", "cpu", "placeholder"]);
    }

    #[test]
    fn test_unknown_kind_fails() {
        let registry = default_registry();
        let err = registry.build("gpu", &[]).err().unwrap();
        assert!(matches!(err, WidgetError::Unknown(ref k) if k == "gpu"));
        assert!(err.to_string().contains("does not exist: gpu"));
    }

    #[test]
    fn test_build_forwards_args() {
        let registry = default_registry();
        let widget = registry
            .build("command", &[Value::String("uptime".into())])
            .unwrap();
        assert_eq!(widget.name(), "command");
        assert!(registry.build("command", &[]).is_err());
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = WidgetRegistry::new();
        assert!(!registry.contains("placeholder"));
        registry.register("blank", placeholder::build);
        assert!(registry.contains("blank"));
        assert!(registry.build("blank", &[]).is_ok());
    }
}
