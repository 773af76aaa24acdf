//! Polyline Preview - render uploaded SVG drawings as PNG previews
//!
//! This library converts SVG documents into polylines, rasterizes them onto a
//! fixed-size canvas and serves the result through a small web front-end.
//!
//! # Example
//!
//! ```rust
//! use polyline_preview::preview;
//!
//! let out = preview(r#"<svg><line x1="0" y1="0" x2="10" y2="10"/></svg>"#).unwrap();
//! assert_eq!(out.segments, 1);
//! assert!(out.data_url().starts_with("data:image/png;base64,"));
//! ```

pub mod config;
pub mod error;
pub mod ffi;
pub mod geometry;
pub mod parser;
pub mod renderer;
pub mod scaling;
pub mod server;

pub use config::{ParserBackend, SecretKey, ServerConfig};
pub use error::{ConfigError, Error, ParseError, RenderError, ValidationError};
pub use geometry::{CoordinatePair, Polyline, PolylineSet};
pub use parser::{parse, PolylineSource, SvgParser};
pub use renderer::{png_data_url, render, render_with_config, DrawRequest, RasterConfig, Rgb};

use log::debug;

/// A rendered preview together with the geometry it was drawn from
#[derive(Debug, Clone)]
pub struct Preview {
    /// Polylines extracted from the document
    pub polylines: PolylineSet,
    /// Number of straight segments drawn
    pub segments: usize,
    /// PNG-encoded canvas
    pub png: Vec<u8>,
}

impl Preview {
    /// The PNG as a `data:` URL for embedding in HTML
    pub fn data_url(&self) -> String {
        png_data_url(&self.png)
    }
}

/// Parse and render SVG text with default settings
///
/// # Example
///
/// ```rust
/// use polyline_preview::{preview, Error};
///
/// assert!(matches!(preview("not svg"), Err(Error::Parse(_))));
/// assert!(matches!(preview("   "), Err(Error::Validation(_))));
/// ```
pub fn preview(svg: &str) -> Result<Preview, Error> {
    preview_with(
        &SvgParser::default(),
        svg.as_bytes(),
        &DrawRequest::default(),
        &RasterConfig::default(),
    )
}

/// Run the full pipeline with an explicit source, placement and canvas
///
/// A body that is empty after trimming whitespace is rejected before the
/// source is called.
pub fn preview_with(
    source: &dyn PolylineSource,
    svg: &[u8],
    request: &DrawRequest,
    raster: &RasterConfig,
) -> Result<Preview, Error> {
    if svg.trim_ascii().is_empty() {
        return Err(ValidationError::EmptyBody.into());
    }

    let polylines = source.parse(svg)?;
    debug!(
        "Parsed {} polylines from {} bytes of SVG",
        polylines.len(),
        svg.len()
    );

    let output = render_with_config(&polylines, request, raster)?;
    Ok(Preview {
        polylines,
        segments: output.segments,
        png: output.png,
    })
}
