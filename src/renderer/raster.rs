//! Drawing polylines onto the preview canvas

use log::{debug, trace, warn};
use tiny_skia::{Color, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use super::RasterConfig;
use crate::error::RenderError;
use crate::geometry::{CoordinatePair, Polyline};
use crate::scaling::{fit_polylines, scale_polylines};

/// Padding in logical units kept free around a fitted drawing
pub const FIT_PADDING: f64 = 10.0;

/// Per-request placement of the drawing on the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRequest {
    /// Multiplier applied to every coordinate
    pub scale: f64,
    /// Offset added after scaling, in logical units
    pub translate: (f64, f64),
    /// Fit the drawing into the canvas before scale and translate apply
    pub fit: bool,
}

impl Default for DrawRequest {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate: (0.0, 0.0),
            fit: false,
        }
    }
}

impl DrawRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_translate(mut self, x: f64, y: f64) -> Self {
        self.translate = (x, y);
        self
    }

    pub fn with_fit(mut self, fit: bool) -> Self {
        self.fit = fit;
        self
    }

    /// Copy `polylines` into canvas pixel space.
    ///
    /// Fitting (when requested) runs first, then scale and translate in
    /// logical units, then the supersampling factor of `config`.
    pub fn place(&self, polylines: &[Polyline], config: &RasterConfig) -> Vec<Polyline> {
        let mut placed = polylines.to_vec();
        if self.fit {
            match config.logical_bounds().with_padding(FIT_PADDING) {
                Some(target) => fit_polylines(&mut placed, &target),
                None => warn!("Canvas too small to fit with padding {}", FIT_PADDING),
            }
        }
        scale_polylines(&mut placed, self.translate, (self.scale, self.scale));
        let ss = f64::from(config.supersample);
        scale_polylines(&mut placed, (0.0, 0.0), (ss, ss));
        placed
    }
}

/// A preview canvas filled with the background color
pub struct Canvas {
    pixmap: Pixmap,
    config: RasterConfig,
}

impl Canvas {
    pub fn new(config: &RasterConfig) -> Result<Self, RenderError> {
        let (width, height) = (config.pixel_width(), config.pixel_height());
        let mut pixmap =
            Pixmap::new(width, height).ok_or(RenderError::Allocation { width, height })?;
        let bg = config.background;
        pixmap.fill(Color::from_rgba8(bg.r, bg.g, bg.b, 255));
        Ok(Self {
            pixmap,
            config: config.clone(),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Stroke consecutive points of `polyline`, given in pixels; returns the
    /// number of segments drawn
    pub fn draw_polyline(&mut self, polyline: &[CoordinatePair]) -> usize {
        if polyline.len() < 2 {
            return 0;
        }
        trace!("Drawing polyline:");

        let mut builder = PathBuilder::new();
        let mut last: Option<CoordinatePair> = None;
        for &p in polyline {
            if !p.is_finite() {
                warn!("Skipping polyline with non-finite coordinate {:?}", p);
                return 0;
            }
            match last {
                None => builder.move_to(p.x as f32, p.y as f32),
                Some(prev) => {
                    trace!("  ({:.2},{:.2}) -> ({:.2},{:.2})", prev.x, prev.y, p.x, p.y);
                    builder.line_to(p.x as f32, p.y as f32);
                }
            }
            last = Some(p);
        }
        let Some(path) = builder.finish() else {
            warn!("Skipping polyline without drawable extent");
            return 0;
        };

        let stroke_color = self.config.stroke;
        let mut paint = Paint::default();
        paint.set_color_rgba8(stroke_color.r, stroke_color.g, stroke_color.b, 255);
        paint.anti_alias = self.config.anti_alias;
        let stroke = Stroke {
            width: self.config.stroke_width(),
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        polyline.len() - 1
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(e.to_string()))
    }
}

/// Outcome of a render pass
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// PNG-encoded canvas
    pub png: Vec<u8>,
    /// Number of straight segments drawn
    pub segments: usize,
}

/// Draw `polylines` on a fresh canvas and encode it as PNG
pub fn render_with_config(
    polylines: &[Polyline],
    request: &DrawRequest,
    config: &RasterConfig,
) -> Result<RenderOutput, RenderError> {
    let mut canvas = Canvas::new(config)?;
    let segments: usize = request
        .place(polylines, config)
        .iter()
        .map(|polyline| canvas.draw_polyline(polyline))
        .sum();
    debug!(
        "Rendered {} segments on a {}x{} canvas",
        segments,
        canvas.width(),
        canvas.height()
    );
    let png = canvas.encode_png()?;
    Ok(RenderOutput { png, segments })
}

/// Render with the default canvas, returning the PNG bytes
pub fn render(
    polylines: &[Polyline],
    scale: f64,
    translate: (f64, f64),
) -> Result<Vec<u8>, RenderError> {
    let request = DrawRequest::new()
        .with_scale(scale)
        .with_translate(translate.0, translate.1);
    render_with_config(polylines, &request, &RasterConfig::default()).map(|out| out.png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{Rgb, BG_COLOR};

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn decode(png: &[u8]) -> image::RgbaImage {
        image::load_from_memory_with_format(png, image::ImageFormat::Png)
            .unwrap()
            .to_rgba8()
    }

    fn background() -> image::Rgba<u8> {
        image::Rgba([BG_COLOR.r, BG_COLOR.g, BG_COLOR.b, 255])
    }

    fn place_one(request: &DrawRequest, p: CoordinatePair) -> CoordinatePair {
        request.place(&[vec![p]], &RasterConfig::default())[0][0]
    }

    #[test]
    fn test_place_default_is_supersampled_identity() {
        let request = DrawRequest::default();
        let p = CoordinatePair::new(10.0, 7.5);
        assert_eq!(place_one(&request, p), CoordinatePair::new(20.0, 15.0));
    }

    #[test]
    fn test_place_scale_doubles_distances() {
        let a = CoordinatePair::new(1.0, 2.0);
        let b = CoordinatePair::new(4.0, 6.0);
        let unit = DrawRequest::new();
        let double = DrawRequest::new().with_scale(2.0);
        let d1 = place_one(&unit, a).distance_to(&place_one(&unit, b));
        let d2 = place_one(&double, a).distance_to(&place_one(&double, b));
        assert_eq!(d2, 2.0 * d1);
    }

    #[test]
    fn test_place_translate() {
        let request = DrawRequest::new().with_scale(0.5).with_translate(10.0, -5.0);
        let p = place_one(&request, CoordinatePair::new(4.0, 4.0));
        assert_eq!(p, CoordinatePair::new(24.0, -6.0));
    }

    #[test]
    fn test_place_keeps_input() {
        let polylines = vec![vec![(1., 1.).into(), (2., 2.).into()]];
        let placed = DrawRequest::new()
            .with_fit(true)
            .place(&polylines, &RasterConfig::default());
        assert_eq!(polylines[0][0], CoordinatePair::new(1.0, 1.0));
        assert_ne!(placed, polylines);
    }

    #[test]
    fn test_canvas_dimensions_and_magic() {
        let polylines = vec![vec![(0., 0.).into(), (10., 10.).into()]];
        let png = render(&polylines, 1.0, (0.0, 0.0)).unwrap();
        assert!(png.starts_with(PNG_MAGIC));
        let img = decode(&png);
        assert_eq!(img.dimensions(), (800, 300));
    }

    #[test]
    fn test_segment_is_drawn_at_supersampled_coordinates() {
        let polylines = vec![vec![(0., 0.).into(), (10., 10.).into()]];
        let output =
            render_with_config(&polylines, &DrawRequest::new(), &RasterConfig::default()).unwrap();
        assert_eq!(output.segments, 1);
        let img = decode(&output.png);
        // On the diagonal from (0,0) to (20,20)
        assert_ne!(*img.get_pixel(10, 10), background());
        // Beyond the segment end
        assert_eq!(*img.get_pixel(40, 40), background());
        assert_eq!(*img.get_pixel(799, 299), background());
    }

    #[test]
    fn test_short_polylines_draw_nothing() {
        let blank = render(&[], 1.0, (0.0, 0.0)).unwrap();
        let short = vec![vec![], vec![(5., 5.).into()]];
        let output = render_with_config(&short, &DrawRequest::new(), &RasterConfig::default())
            .unwrap();
        assert_eq!(output.segments, 0);
        assert_eq!(output.png, blank);

        let img = decode(&blank);
        assert!(img.pixels().all(|p| *p == background()));
    }

    #[test]
    fn test_off_canvas_segments_are_accepted() {
        let polylines = vec![vec![(-1000., -1000.).into(), (-900., -950.).into()]];
        let output =
            render_with_config(&polylines, &DrawRequest::new(), &RasterConfig::default()).unwrap();
        assert_eq!(output.segments, 1);
        let img = decode(&output.png);
        assert!(img.pixels().all(|p| *p == background()));
    }

    #[test]
    fn test_non_finite_polyline_is_skipped() {
        let polylines = vec![vec![(0., 0.).into(), (f64::NAN, 1.).into()]];
        let output =
            render_with_config(&polylines, &DrawRequest::new(), &RasterConfig::default()).unwrap();
        assert_eq!(output.segments, 0);
    }

    #[test]
    fn test_fit_moves_drawing_onto_canvas() {
        let polylines = vec![vec![(5000., 5000.).into(), (6000., 5500.).into()]];
        let plain =
            render_with_config(&polylines, &DrawRequest::new(), &RasterConfig::default()).unwrap();
        assert!(decode(&plain.png).pixels().all(|p| *p == background()));

        let fitted = render_with_config(
            &polylines,
            &DrawRequest::new().with_fit(true),
            &RasterConfig::default(),
        )
        .unwrap();
        assert!(decode(&fitted.png).pixels().any(|p| *p != background()));
    }

    #[test]
    fn test_stroke_color() {
        let polylines = vec![vec![(0., 10.).into(), (100., 10.).into()]];
        let config = RasterConfig::new().with_stroke(Rgb::new(255, 0, 0));
        let output = render_with_config(&polylines, &DrawRequest::new(), &config).unwrap();
        let img = decode(&output.png);
        // Row 20 is fully covered by the 2px stroke along y = 20
        assert_eq!(*img.get_pixel(100, 20), image::Rgba([255, 0, 0, 255]));
        assert_eq!(*img.get_pixel(100, 40), background());
    }

    #[test]
    fn test_zero_sized_canvas_fails() {
        let config = RasterConfig::new().with_size(0, 0);
        let result = render_with_config(&[], &DrawRequest::new(), &config);
        assert!(matches!(result, Err(RenderError::Allocation { .. })));
    }
}
