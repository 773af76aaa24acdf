//! SVG to polyline conversion
//!
//! [`PolylineSource`] is the boundary the rest of the crate talks to. The
//! built-in [`SvgParser`] walks the document and flattens its geometry; the
//! [`crate::ffi`] module exposes the same conversion through a C ABI.

pub mod document;
pub mod path;
pub mod shapes;

pub use document::parse_document;
pub use path::flatten_path;

use crate::error::ParseError;
use crate::geometry::PolylineSet;

/// Default maximum distance between a curve and its flattened approximation
pub const DEFAULT_TOLERANCE: f64 = 0.15;

/// Something that turns raw SVG bytes into polylines.
///
/// Implementations must be pure: no state is kept between calls, so one
/// instance can serve concurrent requests.
pub trait PolylineSource: Send + Sync {
    fn parse(&self, svg: &[u8]) -> Result<PolylineSet, ParseError>;
}

/// The built-in SVG parser
#[derive(Debug, Clone, Copy)]
pub struct SvgParser {
    tolerance: f64,
}

impl Default for SvgParser {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl SvgParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flattening tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

impl PolylineSource for SvgParser {
    fn parse(&self, svg: &[u8]) -> Result<PolylineSet, ParseError> {
        let svg = std::str::from_utf8(svg).map_err(|_| ParseError::Encoding)?;
        parse_document(svg, self.tolerance)
    }
}

/// Parse SVG text with the default tolerance
pub fn parse(svg: &str) -> Result<PolylineSet, ParseError> {
    parse_document(svg, DEFAULT_TOLERANCE)
}
