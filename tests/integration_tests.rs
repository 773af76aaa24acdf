//! Integration tests for the SVG to PNG preview pipeline

use polyline_preview::ffi::FfiSource;
use polyline_preview::geometry::segment_count;
use polyline_preview::renderer::{BG_COLOR, HEIGHT, SCALE, WIDTH};
use polyline_preview::{
    parse, preview, preview_with, CoordinatePair, DrawRequest, Error, PolylineSource,
    RasterConfig, SvgParser, ValidationError,
};
use pretty_assertions::assert_eq;

const LINE_SVG: &str = r#"<svg><line x1="0" y1="0" x2="10" y2="10"/></svg>"#;

const DRAWING_SVG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="400" height="150">
    <g transform="translate(20,10)">
        <rect x="0" y="0" width="50" height="30"/>
        <circle cx="100" cy="50" r="20"/>
        <path d="M 150 20 C 170 0, 190 40, 210 20"/>
    </g>
    <defs>
        <path id="unused" d="M 0 0 L 400 150"/>
    </defs>
</svg>"#;

fn decode(png: &[u8]) -> image::RgbaImage {
    image::load_from_memory_with_format(png, image::ImageFormat::Png)
        .expect("Should decode PNG")
        .to_rgba8()
}

fn is_background(pixel: &image::Rgba<u8>) -> bool {
    pixel.0 == [BG_COLOR.r, BG_COLOR.g, BG_COLOR.b, 255]
}

#[test]
fn test_line_to_png() {
    let polylines = parse(LINE_SVG).expect("Should parse");
    assert_eq!(
        polylines,
        vec![vec![CoordinatePair::new(0.0, 0.0), CoordinatePair::new(10.0, 10.0)]]
    );

    let out = preview(LINE_SVG).expect("Should render");
    assert_eq!(out.segments, 1);
    assert!(out.png.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]));

    let img = decode(&out.png);
    assert_eq!(img.dimensions(), (WIDTH * SCALE, HEIGHT * SCALE));
    // The segment runs from (0,0) to (20,20) in pixels
    assert!(!is_background(img.get_pixel(10, 10)));
    assert!(is_background(img.get_pixel(30, 10)));
    assert!(is_background(img.get_pixel(400, 150)));
}

#[test]
fn test_polylines_json() {
    let polylines = parse(LINE_SVG).expect("Should parse");
    let json = serde_json::to_string(&polylines).unwrap();
    insta::assert_snapshot!(json, @r#"[[{"x":0.0,"y":0.0},{"x":10.0,"y":10.0}]]"#);
}

#[test]
fn test_data_url() {
    let out = preview(LINE_SVG).unwrap();
    let url = out.data_url();
    assert!(url.starts_with("data:image/png;base64,iVBORw0KGgo"));
}

#[test]
fn test_drawing_document() {
    let _ = env_logger::try_init();
    let polylines = parse(DRAWING_SVG).expect("Should parse");

    // rect, circle and curve; the path inside <defs> is not drawn
    assert_eq!(polylines.len(), 3);
    assert_eq!(polylines[0].first(), Some(&CoordinatePair::new(20.0, 10.0)));
    assert_eq!(polylines[0].len(), 5);
    assert_eq!(polylines[0].first(), polylines[0].last());
    assert!(polylines[1].len() > 8);
    assert_eq!(
        polylines[2].last().copied(),
        Some(CoordinatePair::new(230.0, 30.0))
    );

    let out = preview(DRAWING_SVG).unwrap();
    assert_eq!(out.segments, segment_count(&polylines));
}

#[test]
fn test_ffi_and_builtin_agree() {
    let builtin = SvgParser::new().parse(DRAWING_SVG.as_bytes()).unwrap();
    let ffi = FfiSource.parse(DRAWING_SVG.as_bytes()).unwrap();
    assert_eq!(builtin, ffi);
}

#[test]
fn test_scale_and_translate() {
    let plain = preview_with(
        &SvgParser::new(),
        LINE_SVG.as_bytes(),
        &DrawRequest::new(),
        &RasterConfig::default(),
    )
    .unwrap();
    let moved = preview_with(
        &SvgParser::new(),
        LINE_SVG.as_bytes(),
        &DrawRequest::new().with_scale(2.0).with_translate(100.0, 50.0),
        &RasterConfig::default(),
    )
    .unwrap();
    assert_ne!(plain.png, moved.png);

    let img = decode(&moved.png);
    // Now from (200,100) to (240,140)
    assert!(is_background(img.get_pixel(10, 10)));
    assert!(!is_background(img.get_pixel(220, 120)));
}

#[test]
fn test_empty_drawing_is_blank_canvas() {
    let out = preview("<svg></svg>").unwrap();
    assert_eq!(out.segments, 0);
    let img = decode(&out.png);
    assert!(img.pixels().all(is_background));
}

#[test]
fn test_errors() {
    assert!(matches!(
        preview(""),
        Err(Error::Validation(ValidationError::EmptyBody))
    ));
    assert!(matches!(preview("<html></html>"), Err(Error::Parse(_))));
    assert!(matches!(preview("<svg><g>"), Err(Error::Parse(_))));
    assert!(matches!(
        preview(r#"<svg><path d="M 0 0 L nope"/></svg>"#),
        Err(Error::Parse(_))
    ));
}
