//! XML traversal of an SVG document
//!
//! Walks the element tree with `quick-xml`, composes `transform` attributes
//! from the root down, and hands each geometry element to the shape and path
//! converters. Output coordinates are in the root user space.

use std::str::{self, FromStr};

use log::{debug, trace};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::path::flatten_path;
use super::shapes::{is_geometry_element, shape_of, Attributes, Shape};
use crate::error::ParseError;
use crate::geometry::{Affine, Polyline, PolylineSet};

/// Containers whose children are templates rather than rendered content
const NON_RENDERED: &[&str] = &["defs", "symbol", "clipPath", "mask", "marker", "pattern"];

/// State inherited by the children of an element
#[derive(Debug, Clone, Copy)]
struct Frame {
    transform: Affine,
    hidden: bool,
}

struct Walker {
    tolerance: f64,
    stack: Vec<Frame>,
    seen_root: bool,
    root_closed: bool,
    polylines: PolylineSet,
}

impl Walker {
    fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            stack: vec![Frame {
                transform: Affine::IDENTITY,
                hidden: false,
            }],
            seen_root: false,
            root_closed: false,
            polylines: PolylineSet::new(),
        }
    }

    fn parent(&self) -> Frame {
        self.stack.last().copied().unwrap_or(Frame {
            transform: Affine::IDENTITY,
            hidden: false,
        })
    }

    /// Process an element and return the frame its children inherit
    fn element(&mut self, start: &BytesStart) -> Result<Frame, ParseError> {
        let name = str::from_utf8(start.local_name().as_ref())
            .map_err(|_| ParseError::Encoding)?
            .to_string();

        if self.root_closed {
            return Err(ParseError::Xml(format!(
                "<{}> found after the root element",
                name
            )));
        }
        if !self.seen_root {
            if name != "svg" {
                return Err(ParseError::NotSvg);
            }
            self.seen_root = true;
        }

        let attrs = attributes(start)?;
        let parent = self.parent();
        let transform = match attrs.get("transform") {
            Some(value) => parent.transform.then_inner(&parse_transform(&name, value)?),
            None => parent.transform,
        };
        let hidden = parent.hidden
            || NON_RENDERED.contains(&name.as_str())
            || attrs.get("display").map(|d| d.trim()) == Some("none");

        if !hidden && is_geometry_element(&name) {
            trace!("parse: <{}>", name);
            self.geometry(&name, &attrs, &transform)?;
        }

        Ok(Frame { transform, hidden })
    }

    fn geometry(
        &mut self,
        name: &str,
        attrs: &Attributes,
        transform: &Affine,
    ) -> Result<(), ParseError> {
        let lines: Vec<Polyline> = match shape_of(name, attrs)? {
            None => return Ok(()),
            Some(Shape::Path(d)) => flatten_path(&d, self.tolerance)?,
            Some(Shape::Points(points)) if points.len() > 1 => vec![points],
            Some(Shape::Points(_)) => return Ok(()),
        };
        for mut line in lines {
            if !transform.is_identity() {
                for pair in line.iter_mut() {
                    *pair = transform.apply(*pair);
                }
            }
            self.polylines.push(line);
        }
        Ok(())
    }
}

fn attributes(start: &BytesStart) -> Result<Attributes, ParseError> {
    let mut attrs = Attributes::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ParseError::Xml(e.to_string()))?;
        let key = str::from_utf8(attr.key.local_name().as_ref())
            .map_err(|_| ParseError::Encoding)?
            .to_string();
        let value = attr.unescape_value()?.into_owned();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

fn parse_transform(element: &str, value: &str) -> Result<Affine, ParseError> {
    let ts = svgtypes::Transform::from_str(value)
        .map_err(|_| ParseError::invalid_attribute(element, "transform", value))?;
    Ok(Affine::new(ts.a, ts.b, ts.c, ts.d, ts.e, ts.f))
}

/// Parse an SVG document into polylines in root user space
pub fn parse_document(svg: &str, tolerance: f64) -> Result<PolylineSet, ParseError> {
    let mut reader = Reader::from_str(svg);
    let mut walker = Walker::new(tolerance);

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let frame = walker.element(&start)?;
                walker.stack.push(frame);
            }
            Event::Empty(start) => {
                walker.element(&start)?;
                walker.root_closed = walker.stack.len() == 1;
            }
            Event::End(_) => {
                walker.stack.pop();
                walker.root_closed = walker.stack.len() == 1;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !walker.seen_root {
        return Err(ParseError::NotSvg);
    }
    if walker.stack.len() > 1 {
        return Err(ParseError::Xml("unexpected end of document".to_string()));
    }

    debug!("parse: found {} polylines", walker.polylines.len());
    Ok(walker.polylines)
}
