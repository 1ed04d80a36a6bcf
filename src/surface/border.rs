//! Border glyph sets.

use serde::{Deserialize, Serialize};

/// Glyphs used to outline a cell.
///
/// The `cross_*` junctions are carried for borders shared between split
/// cells; plain boxes only use the edges and corners. Overrides come from the
/// layout file's `characters` table, keyed by the camelCase field name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BorderGlyphs {
    pub horizontal: String,
    pub vertical: String,
    pub top_left: String,
    pub top_right: String,
    pub bottom_left: String,
    pub bottom_right: String,
    pub cross_up: String,
    pub cross_right: String,
    pub cross_down: String,
    pub cross_left: String,
    pub cross_center: String,
}

impl Default for BorderGlyphs {
    fn default() -> Self {
        Self {
            horizontal: "─".into(),
            vertical: "│".into(),
            top_left: "╭".into(),
            top_right: "╮".into(),
            bottom_left: "╰".into(),
            bottom_right: "╯".into(),
            cross_up: "┴".into(),
            cross_right: "├".into(),
            cross_down: "┬".into(),
            cross_left: "┤".into(),
            cross_center: "┼".into(),
        }
    }
}
