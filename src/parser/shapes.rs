//! Conversion of SVG basic shapes into path data or point lists

use std::collections::HashMap;
use std::str::FromStr;

use svgtypes::{Length, NumberListParser};

use crate::error::ParseError;
use crate::geometry::{CoordinatePair, Polyline};

/// Attributes of one element, keyed by local name
pub type Attributes = HashMap<String, String>;

/// Geometry extracted from a single element, before flattening
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Path data to run through the flattener
    Path(String),
    /// Points that already form a polyline
    Points(Polyline),
}

/// Elements that carry geometry
pub fn is_geometry_element(name: &str) -> bool {
    matches!(
        name,
        "path" | "line" | "polyline" | "polygon" | "rect" | "circle" | "ellipse"
    )
}

/// Read a numeric attribute, falling back to `default` when absent
fn number(element: &str, attrs: &Attributes, name: &str, default: f64) -> Result<f64, ParseError> {
    match attrs.get(name) {
        None => Ok(default),
        Some(value) => Length::from_str(value.trim())
            .map(|length| length.number)
            .map_err(|_| ParseError::invalid_attribute(element, name, value.as_str())),
    }
}

fn points(element: &str, attrs: &Attributes) -> Result<Polyline, ParseError> {
    let Some(value) = attrs.get("points") else {
        return Ok(Polyline::new());
    };
    let invalid = || ParseError::invalid_attribute(element, "points", value.as_str());
    let numbers = NumberListParser::from(value.trim())
        .collect::<Result<Vec<f64>, _>>()
        .map_err(|_| invalid())?;
    if numbers.len() % 2 != 0 {
        return Err(invalid());
    }
    Ok(numbers
        .chunks_exact(2)
        .map(|pair| CoordinatePair::new(pair[0], pair[1]))
        .collect())
}

/// Extract the geometry of a supported element.
///
/// Returns `Ok(None)` for elements that are supported but draw nothing, such
/// as a `rect` with zero width or a `path` without `d`.
pub fn shape_of(element: &str, attrs: &Attributes) -> Result<Option<Shape>, ParseError> {
    let shape = match element {
        "path" => attrs.get("d").map(|d| Shape::Path(d.clone())),
        "line" => {
            let x1 = number(element, attrs, "x1", 0.0)?;
            let y1 = number(element, attrs, "y1", 0.0)?;
            let x2 = number(element, attrs, "x2", 0.0)?;
            let y2 = number(element, attrs, "y2", 0.0)?;
            Some(Shape::Points(vec![
                CoordinatePair::new(x1, y1),
                CoordinatePair::new(x2, y2),
            ]))
        }
        "polyline" => Some(Shape::Points(points(element, attrs)?)),
        "polygon" => {
            let mut polyline = points(element, attrs)?;
            if polyline.len() > 1 {
                polyline.push(polyline[0]);
            }
            Some(Shape::Points(polyline))
        }
        "rect" => rect(attrs)?,
        "circle" => {
            let cx = number(element, attrs, "cx", 0.0)?;
            let cy = number(element, attrs, "cy", 0.0)?;
            let r = number(element, attrs, "r", 0.0)?;
            ellipse_path(cx, cy, r, r)
        }
        "ellipse" => {
            let cx = number(element, attrs, "cx", 0.0)?;
            let cy = number(element, attrs, "cy", 0.0)?;
            let rx = number(element, attrs, "rx", 0.0)?;
            let ry = number(element, attrs, "ry", 0.0)?;
            ellipse_path(cx, cy, rx, ry)
        }
        _ => None,
    };
    Ok(shape)
}

fn rect(attrs: &Attributes) -> Result<Option<Shape>, ParseError> {
    let x = number("rect", attrs, "x", 0.0)?;
    let y = number("rect", attrs, "y", 0.0)?;
    let width = number("rect", attrs, "width", 0.0)?;
    let height = number("rect", attrs, "height", 0.0)?;
    if width <= 0.0 || height <= 0.0 {
        return Ok(None);
    }

    // A missing rx or ry takes the value of the other one
    let rx = attrs.get("rx").map(|_| number("rect", attrs, "rx", 0.0)).transpose()?;
    let ry = attrs.get("ry").map(|_| number("rect", attrs, "ry", 0.0)).transpose()?;
    let (rx, ry) = match (rx, ry) {
        (Some(rx), Some(ry)) => (rx, ry),
        (Some(r), None) | (None, Some(r)) => (r, r),
        (None, None) => (0.0, 0.0),
    };
    let rx = rx.clamp(0.0, width / 2.0);
    let ry = ry.clamp(0.0, height / 2.0);

    let d = if rx == 0.0 || ry == 0.0 {
        format!("M {x} {y} H {} V {} H {x} Z", x + width, y + height)
    } else {
        format!(
            "M {} {y} H {} A {rx} {ry} 0 0 1 {} {} V {} A {rx} {ry} 0 0 1 {} {} H {} A {rx} {ry} 0 0 1 {x} {} V {} A {rx} {ry} 0 0 1 {} {y} Z",
            x + rx,
            x + width - rx,
            x + width,
            y + ry,
            y + height - ry,
            x + width - rx,
            y + height,
            x + rx,
            y + height - ry,
            y + ry,
            x + rx,
        )
    };
    Ok(Some(Shape::Path(d)))
}

/// Two half-ellipse arcs starting at the leftmost point
fn ellipse_path(cx: f64, cy: f64, rx: f64, ry: f64) -> Option<Shape> {
    if rx <= 0.0 || ry <= 0.0 {
        return None;
    }
    Some(Shape::Path(format!(
        "M {} {cy} A {rx} {ry} 0 1 0 {} {cy} A {rx} {ry} 0 1 0 {} {cy} Z",
        cx - rx,
        cx + rx,
        cx - rx,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_line() {
        let shape = shape_of("line", &attrs(&[("x1", "0"), ("y1", "0"), ("x2", "10"), ("y2", "10")]))
            .unwrap();
        assert_eq!(
            shape,
            Some(Shape::Points(vec![(0., 0.).into(), (10., 10.).into()]))
        );
    }

    #[test]
    fn test_line_defaults_and_units() {
        let shape = shape_of("line", &attrs(&[("x2", "5px")])).unwrap();
        assert_eq!(
            shape,
            Some(Shape::Points(vec![(0., 0.).into(), (5., 0.).into()]))
        );
    }

    #[test]
    fn test_polygon_is_closed() {
        let shape = shape_of("polygon", &attrs(&[("points", "0,0 10,0 10,10")])).unwrap();
        assert_eq!(
            shape,
            Some(Shape::Points(vec![
                (0., 0.).into(),
                (10., 0.).into(),
                (10., 10.).into(),
                (0., 0.).into(),
            ]))
        );
    }

    #[test]
    fn test_single_point_polygon_stays_open() {
        let shape = shape_of("polygon", &attrs(&[("points", "5,5")])).unwrap();
        assert_eq!(shape, Some(Shape::Points(vec![(5., 5.).into()])));
    }

    #[test]
    fn test_points_separators() {
        let shape = shape_of("polyline", &attrs(&[("points", " 1,1 2 2,3-3 ")])).unwrap();
        assert_eq!(
            shape,
            Some(Shape::Points(vec![
                (1., 1.).into(),
                (2., 2.).into(),
                (3., -3.).into(),
            ]))
        );
    }

    #[test]
    fn test_partly_invalid_points() {
        let value = "1,1 2,2 bad 3,3";
        let err = shape_of("polyline", &attrs(&[("points", value)])).unwrap_err();
        assert_eq!(err, ParseError::invalid_attribute("polyline", "points", value));
    }

    #[test]
    fn test_odd_number_of_coordinates() {
        let err = shape_of("polygon", &attrs(&[("points", "0,0 10,0 10")])).unwrap_err();
        assert_eq!(
            err,
            ParseError::invalid_attribute("polygon", "points", "0,0 10,0 10")
        );
    }

    #[test]
    fn test_polyline_without_points() {
        let shape = shape_of("polyline", &attrs(&[])).unwrap();
        assert_eq!(shape, Some(Shape::Points(vec![])));
    }

    #[test]
    fn test_rect_path() {
        let shape = shape_of(
            "rect",
            &attrs(&[("x", "1"), ("y", "2"), ("width", "3"), ("height", "4")]),
        )
        .unwrap();
        assert_eq!(shape, Some(Shape::Path("M 1 2 H 4 V 6 H 1 Z".to_string())));
    }

    #[test]
    fn test_empty_rect_draws_nothing() {
        let shape = shape_of("rect", &attrs(&[("width", "0"), ("height", "4")])).unwrap();
        assert_eq!(shape, None);
    }

    #[test]
    fn test_rounded_rect_uses_arcs() {
        let shape = shape_of(
            "rect",
            &attrs(&[("width", "20"), ("height", "10"), ("rx", "2")]),
        )
        .unwrap();
        match shape {
            Some(Shape::Path(d)) => assert_eq!(d.matches('A').count(), 4),
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_circle_without_radius() {
        let shape = shape_of("circle", &attrs(&[("cx", "5"), ("cy", "5")])).unwrap();
        assert_eq!(shape, None);
    }

    #[test]
    fn test_invalid_number() {
        let err = shape_of("circle", &attrs(&[("r", "big")])).unwrap_err();
        assert_eq!(err, ParseError::invalid_attribute("circle", "r", "big"));
    }

    #[test]
    fn test_unsupported_element() {
        assert_eq!(shape_of("text", &attrs(&[])).unwrap(), None);
        assert!(!is_geometry_element("text"));
        assert!(is_geometry_element("ellipse"));
    }
}
