//! # Configuration
//!
//! The dashboard is described by one layout file with a clear override
//! hierarchy: defaults → layout file → env vars → CLI flags.
//!
//! The file is TOML unless its extension is `.json`. It is looked up at the
//! CLI path, then `$GRIDTOP_LAYOUT`, then `./layout.toml`, then
//! `~/.gridtop/layout.toml`. If none exists, a commented-out default is
//! generated in the home location and a single placeholder cell is shown.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::geometry::Rect;
use crate::core::group::CellSource;
use crate::surface::BorderGlyphs;
use crate::widgets::WidgetError;

// ============================================================================
// Config Structs
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LayoutConfig {
    /// Render tick period in milliseconds.
    pub interval: Option<u64>,
    /// Border glyph overrides; unspecified glyphs keep their defaults.
    #[serde(default)]
    pub characters: BorderGlyphs,
    /// Rows of cells, in tiling order.
    #[serde(default)]
    pub layout: Vec<Vec<CellSpec>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CellSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Forwarded to the widget constructor.
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
}

impl CellSpec {
    pub fn full_screen(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
            args: Vec::new(),
        }
    }
}

impl CellSource for CellSpec {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    fn args(&self) -> &[serde_json::Value] {
        &self.args
    }
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_INTERVAL_MS: u64 = 250;
pub const DEFAULT_LAYOUT_FILE: &str = "layout.toml";
pub const FALLBACK_WIDGET: &str = "placeholder";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub interval: Duration,
    pub glyphs: BorderGlyphs,
    pub layout: Vec<Vec<CellSpec>>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Json(serde_json::Error),
    Widget(WidgetError),
    Layout(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Toml(e) => write!(f, "config parse error: {e}"),
            ConfigError::Json(e) => write!(f, "config parse error: {e}"),
            ConfigError::Widget(e) => write!(f, "config widget error: {e}"),
            ConfigError::Layout(msg) => write!(f, "invalid layout: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<WidgetError> for ConfigError {
    fn from(e: WidgetError) -> Self {
        ConfigError::Widget(e)
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.gridtop/layout.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".gridtop").join(DEFAULT_LAYOUT_FILE))
}

/// Find the layout file to load, or `None` to run with the built-in layout.
pub fn find_layout(cli_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var("GRIDTOP_LAYOUT") {
        return Some(PathBuf::from(path));
    }

    let local = PathBuf::from(DEFAULT_LAYOUT_FILE);
    if local.exists() {
        return Some(local);
    }

    let home = config_path()?;
    if home.exists() {
        return Some(home);
    }
    info!("No layout file found, generating default at {}", home.display());
    generate_default_layout(&home);
    None
}

/// Load and parse a layout file.
pub fn load_layout(path: &Path) -> Result<LayoutConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let config = if is_json {
        parse_json(&contents)?
    } else {
        parse_toml(&contents)?
    };
    info!("Loaded layout from {}", path.display());
    debug!("Layout: {:?}", config);
    Ok(config)
}

pub fn parse_toml(contents: &str) -> Result<LayoutConfig, ConfigError> {
    toml::from_str(contents).map_err(ConfigError::Toml)
}

pub fn parse_json(contents: &str) -> Result<LayoutConfig, ConfigError> {
    serde_json::from_str(contents).map_err(ConfigError::Json)
}

/// Generates a commented-out default layout at the given path.
fn generate_default_layout(path: &Path) {
    let default_content = r#"# gridtop layout
# Cells are placed in normalized coordinates: (0, 0) is the top-left corner
# of the screen and 1.0 spans the whole width or height. Cells must tile the
# screen without gaps or overlaps.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# interval = 250                     # Milliseconds between redraws

# layout = [
#   [
#     { type = "cpu", x = 0.0, y = 0.0, width = 0.5, height = 0.5, args = [40] },
#     { type = "clock", x = 0.5, y = 0.0, width = 0.5, height = 0.5, args = ["%H:%M:%S"] },
#   ],
#   [
#     { type = "command", x = 0.0, y = 0.5, width = 1.0, height = 0.5, args = ["df -h"] },
#   ],
# ]

# [characters]                       # Any subset of the border glyphs
# horizontal = "─"
# vertical = "│"
# topLeft = "╭"
# topRight = "╮"
# bottomLeft = "╰"
# bottomRight = "╯"
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default layout: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → file → env vars → CLI.
pub fn resolve(config: &LayoutConfig, cli_interval: Option<u64>) -> Result<ResolvedConfig, ConfigError> {
    // Interval: CLI → env → file → default
    let interval_ms = cli_interval
        .or_else(|| {
            std::env::var("GRIDTOP_INTERVAL")
                .ok()
                .and_then(|v| v.trim().parse().ok())
        })
        .or(config.interval)
        .unwrap_or(DEFAULT_INTERVAL_MS);
    if interval_ms == 0 {
        return Err(ConfigError::Layout("interval must be at least 1ms".into()));
    }

    let layout = if config.layout.iter().all(Vec::is_empty) {
        info!("Layout is empty, using a single {} cell", FALLBACK_WIDGET);
        vec![vec![CellSpec::full_screen(FALLBACK_WIDGET)]]
    } else {
        config.layout.clone()
    };
    validate_layout(&layout)?;

    Ok(ResolvedConfig {
        interval: Duration::from_millis(interval_ms),
        glyphs: config.characters.clone(),
        layout,
    })
}

/// Reject cells that cannot belong to a tiling of the unit square.
pub fn validate_layout(layout: &[Vec<CellSpec>]) -> Result<(), ConfigError> {
    for (row, cells) in layout.iter().enumerate() {
        for (col, spec) in cells.iter().enumerate() {
            let rect = spec.rect();
            let finite = [rect.x, rect.y, rect.width, rect.height]
                .iter()
                .all(|v| v.is_finite());
            if !finite || rect.width <= 0.0 || rect.height <= 0.0 || !rect.within_unit() {
                return Err(ConfigError::Layout(format!(
                    "cell [{row}][{col}] ({}) at {} lies outside the unit square or has no area",
                    spec.kind, rect
                )));
            }
        }
    }
    Ok(())
}
