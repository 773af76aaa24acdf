//! Raster renderer for polyline previews
//!
//! Draws polylines as black strokes on a fixed, supersampled canvas and
//! produces PNG bytes, optionally wrapped in a `data:` URL.

pub mod config;
pub mod embed;
pub mod raster;

pub use config::{RasterConfig, Rgb, BG_COLOR, HEIGHT, SCALE, WIDTH};
pub use embed::png_data_url;
pub use raster::{render, render_with_config, Canvas, DrawRequest, RenderOutput};
