//! # Layout Engine
//!
//! Everything that decides where cells go. Rectangles live in normalized
//! `[0, 1]` coordinates of their group's box and only become terminal
//! coordinates at draw time.
//!
//! ```text
//!   config ──► CellGroup ──► Cell (rect, neighbors, widget)
//!                 │
//!                 ├── neighbors   (who touches whom)
//!                 ├── dimensions  (resize + propagate to neighbors)
//!                 └── draw        (normalized → terminal Area)
//! ```
//!
//! ## Modules
//!
//! - [`geometry`]: `Rect`, `TermSize` and edge comparison
//! - [`neighbors`]: adjacency resolution with its direction priority
//! - [`dimensions`]: the resize propagator
//! - [`cell`]: one tile and its in-flight draw claim
//! - [`group`]: the set of cells tiling one box
//! - [`config`]: layout files, env and CLI resolution

pub mod cell;
pub mod config;
pub mod dimensions;
pub mod geometry;
pub mod group;
pub mod neighbors;

pub use cell::{Cell, DrawJob};
pub use geometry::{Rect, TermSize};
pub use group::CellGroup;
