//! Raster output for decoded print jobs.
//!
//! `palette` maps the four printer shades to grayscale blocks, `raster` lays
//! tiles out on a fixed 20-tile-wide canvas.

pub mod raster;
pub mod palette;

pub use raster::{RowPolicy, render_tiles};
pub use palette::{ConfigError, Palette};
