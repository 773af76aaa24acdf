//! Configuration for raster output

use std::fmt;
use std::str::FromStr;

use crate::scaling::{Bounds, Range};

/// Logical canvas width
pub const WIDTH: u32 = 400;
/// Logical canvas height
pub const HEIGHT: u32 = 150;
/// Supersampling factor applied to the canvas and the stroke width
pub const SCALE: u32 = 2;
/// Canvas background
pub const BG_COLOR: Rgb = Rgb::new(0xAE, 0xD3, 0x89);

/// An opaque 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Rgb {
    type Err = String;

    /// Parse `#rrggbb` or `#rgb`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| format!("color '{}' must start with '#'", s))?;
        if !hex.is_ascii() {
            return Err(format!("invalid hex color '{}'", s));
        }
        let channel = |digits: &str| {
            u8::from_str_radix(digits, 16).map_err(|_| format!("invalid hex color '{}'", s))
        };
        match hex.len() {
            6 => Ok(Rgb::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Ok(Rgb::new(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => Err(format!("invalid hex color '{}'", s)),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Configuration options for the preview canvas
#[derive(Debug, Clone, PartialEq)]
pub struct RasterConfig {
    /// Logical width before supersampling
    pub width: u32,

    /// Logical height before supersampling
    pub height: u32,

    /// Multiplier for canvas resolution and stroke width
    pub supersample: u32,

    pub background: Rgb,

    pub stroke: Rgb,

    /// Whether strokes are anti-aliased
    pub anti_alias: bool,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            supersample: SCALE,
            background: BG_COLOR,
            stroke: Rgb::BLACK,
            anti_alias: true,
        }
    }
}

impl RasterConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the logical canvas size
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the supersampling factor
    pub fn with_supersample(mut self, supersample: u32) -> Self {
        self.supersample = supersample;
        self
    }

    /// Set the background color
    pub fn with_background(mut self, background: Rgb) -> Self {
        self.background = background;
        self
    }

    /// Set the stroke color
    pub fn with_stroke(mut self, stroke: Rgb) -> Self {
        self.stroke = stroke;
        self
    }

    /// Enable or disable anti-aliasing
    pub fn with_anti_alias(mut self, anti_alias: bool) -> Self {
        self.anti_alias = anti_alias;
        self
    }

    /// Canvas width in pixels
    pub fn pixel_width(&self) -> u32 {
        self.width * self.supersample
    }

    /// Canvas height in pixels
    pub fn pixel_height(&self) -> u32 {
        self.height * self.supersample
    }

    /// Stroke width in pixels
    pub fn stroke_width(&self) -> f32 {
        self.supersample as f32
    }

    /// The canvas in logical units
    pub fn logical_bounds(&self) -> Bounds {
        Bounds::new(
            Range::new(0.0, f64::from(self.width)),
            Range::new(0.0, f64::from(self.height)),
        )
    }
}
