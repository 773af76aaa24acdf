//! Flattening of SVG path data into polylines
//!
//! Straight segments are copied as-is; cubic and quadratic Béziers and
//! elliptical arcs are approximated by line segments using `lyon_geom`.
//! Every `M`/`m` starts a new polyline.

use std::mem;

use log::trace;
use lyon_geom::euclid::{Angle, Point2D, Vector2D};
use lyon_geom::{ArcFlags, CubicBezierSegment, QuadraticBezierSegment, SvgArc};
use svgtypes::{PathParser, PathSegment};

use crate::error::ParseError;
use crate::geometry::{CoordinatePair, Polyline};

/// Control point of the previous segment, reflected by `S` and `T`
#[derive(Debug, Clone, Copy, PartialEq)]
enum PrevControl {
    None,
    Cubic(CoordinatePair),
    Quadratic(CoordinatePair),
}

/// Accumulates the polylines of one path expression
#[derive(Debug)]
struct PathFlattener {
    tolerance: f64,
    lines: Vec<Polyline>,
    line: Polyline,
    current: Option<CoordinatePair>,
    subpath_start: Option<CoordinatePair>,
    prev_control: PrevControl,
}

impl PathFlattener {
    fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            lines: Vec::new(),
            line: Polyline::new(),
            current: None,
            subpath_start: None,
            prev_control: PrevControl::None,
        }
    }

    /// Resolve a possibly relative coordinate against the current point.
    ///
    /// A relative coordinate without a current point is taken as absolute,
    /// which is what SVG prescribes for a leading `m`.
    fn resolve(&self, abs: bool, x: f64, y: f64) -> CoordinatePair {
        match (abs, self.current) {
            (false, Some(cur)) => CoordinatePair::new(cur.x + x, cur.y + y),
            _ => CoordinatePair::new(x, y),
        }
    }

    fn current(&self, command: &str) -> Result<CoordinatePair, ParseError> {
        self.current
            .ok_or_else(|| ParseError::invalid_state(format!("{} without a current point", command)))
    }

    fn push(&mut self, pair: CoordinatePair) {
        self.line.push(pair);
        self.current = Some(pair);
    }

    /// Move the finished line into the output if it draws anything
    fn finish_line(&mut self) {
        let line = mem::take(&mut self.line);
        if line.len() > 1 {
            self.lines.push(line);
        }
    }

    fn move_to(&mut self, pair: CoordinatePair) {
        self.finish_line();
        self.subpath_start = Some(pair);
        self.push(pair);
    }

    fn close(&mut self) {
        if let Some(start) = self.subpath_start {
            if self.line.len() > 1 {
                self.line.push(start);
            }
            self.current = Some(start);
        }
    }

    fn cubic_to(
        &mut self,
        ctrl1: CoordinatePair,
        ctrl2: CoordinatePair,
        to: CoordinatePair,
    ) -> Result<(), ParseError> {
        let from = self.current("CurveTo")?;
        let curve = CubicBezierSegment {
            from: Point2D::new(from.x, from.y),
            ctrl1: Point2D::new(ctrl1.x, ctrl1.y),
            ctrl2: Point2D::new(ctrl2.x, ctrl2.y),
            to: Point2D::new(to.x, to.y),
        };
        for point in curve.flattened(self.tolerance) {
            self.line.push(CoordinatePair::new(point.x, point.y));
        }
        self.current = Some(to);
        self.prev_control = PrevControl::Cubic(ctrl2);
        Ok(())
    }

    fn quadratic_to(&mut self, ctrl: CoordinatePair, to: CoordinatePair) -> Result<(), ParseError> {
        let from = self.current("Quadratic")?;
        let curve = QuadraticBezierSegment {
            from: Point2D::new(from.x, from.y),
            ctrl: Point2D::new(ctrl.x, ctrl.y),
            to: Point2D::new(to.x, to.y),
        };
        for point in curve.flattened(self.tolerance) {
            self.line.push(CoordinatePair::new(point.x, point.y));
        }
        self.current = Some(to);
        self.prev_control = PrevControl::Quadratic(ctrl);
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn arc_to(
        &mut self,
        rx: f64,
        ry: f64,
        x_axis_rotation: f64,
        large_arc: bool,
        sweep: bool,
        to: CoordinatePair,
    ) -> Result<(), ParseError> {
        let from = self.current("EllipticalArc")?;
        // Zero radii degrade the arc to a straight line
        if rx == 0.0 || ry == 0.0 {
            self.push(to);
            return Ok(());
        }
        let arc = SvgArc {
            from: Point2D::new(from.x, from.y),
            to: Point2D::new(to.x, to.y),
            radii: Vector2D::new(rx.abs(), ry.abs()),
            x_rotation: Angle::degrees(x_axis_rotation),
            flags: ArcFlags { large_arc, sweep },
        };
        if arc.is_straight_line() {
            self.push(to);
            return Ok(());
        }
        for point in arc.to_arc().flattened(self.tolerance) {
            self.line.push(CoordinatePair::new(point.x, point.y));
        }
        // The flattened arc ends on the computed endpoint; pin it to the exact one
        if let Some(last) = self.line.last_mut() {
            *last = to;
        }
        self.current = Some(to);
        Ok(())
    }

    /// Reflect a control point around the current point
    fn reflect(&self, ctrl: CoordinatePair) -> Option<CoordinatePair> {
        self.current
            .map(|cur| CoordinatePair::new(2.0 * cur.x - ctrl.x, 2.0 * cur.y - ctrl.y))
    }

    fn segment(&mut self, segment: PathSegment) -> Result<(), ParseError> {
        let prev_control = mem::replace(&mut self.prev_control, PrevControl::None);
        match segment {
            PathSegment::MoveTo { abs, x, y } => {
                trace!("flatten: MoveTo");
                let pair = self.resolve(abs, x, y);
                self.move_to(pair);
            }
            PathSegment::LineTo { abs, x, y } => {
                trace!("flatten: LineTo");
                self.current("LineTo")?;
                let pair = self.resolve(abs, x, y);
                self.push(pair);
            }
            PathSegment::HorizontalLineTo { abs, x } => {
                trace!("flatten: HorizontalLineTo");
                let cur = self.current("HorizontalLineTo")?;
                let x = if abs { x } else { cur.x + x };
                self.push(CoordinatePair::new(x, cur.y));
            }
            PathSegment::VerticalLineTo { abs, y } => {
                trace!("flatten: VerticalLineTo");
                let cur = self.current("VerticalLineTo")?;
                let y = if abs { y } else { cur.y + y };
                self.push(CoordinatePair::new(cur.x, y));
            }
            PathSegment::CurveTo {
                abs,
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => {
                trace!("flatten: CurveTo");
                let ctrl1 = self.resolve(abs, x1, y1);
                let ctrl2 = self.resolve(abs, x2, y2);
                let to = self.resolve(abs, x, y);
                self.cubic_to(ctrl1, ctrl2, to)?;
            }
            PathSegment::SmoothCurveTo { abs, x2, y2, x, y } => {
                trace!("flatten: SmoothCurveTo");
                let cur = self.current("SmoothCurveTo")?;
                let ctrl1 = match prev_control {
                    PrevControl::Cubic(prev) => self.reflect(prev).unwrap_or(cur),
                    _ => cur,
                };
                let ctrl2 = self.resolve(abs, x2, y2);
                let to = self.resolve(abs, x, y);
                self.cubic_to(ctrl1, ctrl2, to)?;
            }
            PathSegment::Quadratic { abs, x1, y1, x, y } => {
                trace!("flatten: Quadratic");
                let ctrl = self.resolve(abs, x1, y1);
                let to = self.resolve(abs, x, y);
                self.quadratic_to(ctrl, to)?;
            }
            PathSegment::SmoothQuadratic { abs, x, y } => {
                trace!("flatten: SmoothQuadratic");
                let cur = self.current("SmoothQuadratic")?;
                let ctrl = match prev_control {
                    PrevControl::Quadratic(prev) => self.reflect(prev).unwrap_or(cur),
                    _ => cur,
                };
                let to = self.resolve(abs, x, y);
                self.quadratic_to(ctrl, to)?;
            }
            PathSegment::EllipticalArc {
                abs,
                rx,
                ry,
                x_axis_rotation,
                large_arc,
                sweep,
                x,
                y,
            } => {
                trace!("flatten: EllipticalArc");
                let to = self.resolve(abs, x, y);
                self.arc_to(rx, ry, x_axis_rotation, large_arc, sweep, to)?;
            }
            PathSegment::ClosePath { .. } => {
                trace!("flatten: ClosePath");
                self.close();
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Vec<Polyline> {
        self.finish_line();
        self.lines
    }
}

/// Flatten a path `d` expression into polylines.
///
/// The `tolerance` is the maximum distance between a curve and its
/// approximation. A large value (e.g. `10.0`) gives coarse, jagged curves; a
/// small one (e.g. `0.05`) gives smooth curves with many points.
pub fn flatten_path(data: &str, tolerance: f64) -> Result<Vec<Polyline>, ParseError> {
    let mut flattener = PathFlattener::new(tolerance);
    for segment in PathParser::from(data) {
        let segment = segment.map_err(|e| ParseError::PathData(e.to_string()))?;
        flattener.segment(segment)?;
    }
    Ok(flattener.finish())
}
