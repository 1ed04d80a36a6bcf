//! Gridtop library exports for testing

pub mod core;
pub mod surface;
pub mod tui;
pub mod widgets;

#[cfg(test)]
pub mod test_support;
