//! Bounds, scaling and fitting of polylines

use log::{debug, warn};

use crate::geometry::Polyline;

/// A closed interval on one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn spread(&self) -> f64 {
        self.max - self.min
    }

    fn include(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }
}

/// Axis-aligned bounds of a drawing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: Range,
    pub y: Range,
}

impl Bounds {
    pub fn new(x: Range, y: Range) -> Self {
        Self { x, y }
    }

    /// Bounds of all points in `polylines`, or `None` if there are no points
    pub fn of(polylines: &[Polyline]) -> Option<Bounds> {
        let mut points = polylines.iter().flatten();
        let first = points.next()?;
        let mut bounds = Bounds {
            x: Range::new(first.x, first.x),
            y: Range::new(first.y, first.y),
        };
        for point in points {
            bounds.x.include(point.x);
            bounds.y.include(point.y);
        }
        Some(bounds)
    }

    /// Shrink by `padding` on every side.
    ///
    /// Returns `None` if the padding would leave a negative spread.
    pub fn with_padding(&self, padding: f64) -> Option<Bounds> {
        let padded = Bounds {
            x: Range::new(self.x.min + padding, self.x.max - padding),
            y: Range::new(self.y.min + padding, self.y.max - padding),
        };
        if padded.x.spread() < 0.0 || padded.y.spread() < 0.0 {
            return None;
        }
        Some(padded)
    }
}

/// Scale every coordinate per axis, then add the offset
pub fn scale_polylines(polylines: &mut [Polyline], offset: (f64, f64), scale: (f64, f64)) {
    debug!(
        "Scaling polylines with offset {:?} and scale factor {:?}",
        offset, scale
    );
    for coord in polylines.iter_mut().flatten() {
        coord.x = scale.0 * coord.x + offset.0;
        coord.y = scale.1 * coord.y + offset.1;
    }
}

/// Scale uniformly and translate so the drawing is centered within `target`.
///
/// The factor is the smaller of the two per-axis factors; an axis with zero
/// spread (or any other non-normal factor) counts as factor 1.0. Does nothing
/// if the polylines contain no points.
pub fn fit_polylines(polylines: &mut [Polyline], target: &Bounds) {
    let Some(current) = Bounds::of(polylines) else {
        warn!("Cannot fit polylines without any points");
        return;
    };
    debug!("Fitting polylines into {:?}", target);

    let x_factor = target.x.spread() / current.x.spread();
    let y_factor = target.y.spread() / current.y.spread();
    let factor = normal_or_one(x_factor).min(normal_or_one(y_factor));

    let x_offset = (target.x.spread() - current.x.spread() * factor) / 2.0;
    let y_offset = (target.y.spread() - current.y.spread() * factor) / 2.0;

    for coord in polylines.iter_mut().flatten() {
        coord.x = (coord.x - current.x.min) * factor + target.x.min + x_offset;
        coord.y = (coord.y - current.y.min) * factor + target.y.min + y_offset;
    }
}

fn normal_or_one(factor: f64) -> f64 {
    if factor.is_normal() {
        factor
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CoordinatePair;

    fn assert_close(actual: &[Polyline], expected: &[Vec<(f64, f64)>]) {
        assert_eq!(actual.len(), expected.len());
        for (line, expected_line) in actual.iter().zip(expected) {
            assert_eq!(line.len(), expected_line.len());
            for (p, &(x, y)) in line.iter().zip(expected_line) {
                assert!(
                    (p.x - x).abs() < 1e-9 && (p.y - y).abs() < 1e-9,
                    "expected ({}, {}), got {:?}",
                    x,
                    y,
                    p
                );
            }
        }
    }

    #[test]
    fn test_bounds_empty() {
        assert!(Bounds::of(&[]).is_none());
        assert!(Bounds::of(&[vec![]]).is_none());
    }

    #[test]
    fn test_bounds_single_polyline() {
        let polylines = vec![vec![
            CoordinatePair::new(1.0, 1.0),
            CoordinatePair::new(2.0, 2.0),
            CoordinatePair::new(0.0, 1.5),
        ]];
        assert_eq!(
            Bounds::of(&polylines).unwrap(),
            Bounds::new(Range::new(0.0, 2.0), Range::new(1.0, 2.0))
        );
    }

    #[test]
    fn test_bounds_multiple_polylines() {
        let polylines = vec![
            vec![CoordinatePair::new(1.0, 2.0), CoordinatePair::new(2.0, 1.0)],
            vec![CoordinatePair::new(3.0, -1.0), CoordinatePair::new(2.0, 1.0)],
        ];
        assert_eq!(
            Bounds::of(&polylines).unwrap(),
            Bounds::new(Range::new(1.0, 3.0), Range::new(-1.0, 2.0))
        );
    }

    #[test]
    fn test_padding() {
        let bounds = Bounds::new(Range::new(0.0, 400.0), Range::new(0.0, 150.0));
        assert_eq!(
            bounds.with_padding(10.0).unwrap(),
            Bounds::new(Range::new(10.0, 390.0), Range::new(10.0, 140.0))
        );
        assert!(bounds.with_padding(80.0).is_none());
    }

    #[test]
    fn test_scale_polylines() {
        let mut polylines = vec![vec![
            CoordinatePair::new(1.0, 2.0),
            CoordinatePair::new(-1.0, 0.5),
        ]];
        scale_polylines(&mut polylines, (10.0, 20.0), (2.0, 4.0));
        assert_close(&polylines, &[vec![(12.0, 28.0), (8.0, 22.0)]]);
    }

    #[test]
    fn test_fit_polylines() {
        let mut polylines = vec![
            vec![CoordinatePair::new(2.0, 2.0), CoordinatePair::new(5.0, 8.0)],
            vec![CoordinatePair::new(2.0, 5.0), CoordinatePair::new(5.0, 5.0)],
        ];
        let target = Bounds::new(Range::new(1.0, 4.0), Range::new(1.0, 3.0));
        fit_polylines(&mut polylines, &target);
        assert_close(
            &polylines,
            &[
                vec![(2.0, 1.0), (3.0, 3.0)],
                vec![(2.0, 2.0), (3.0, 2.0)],
            ],
        );
    }

    #[test]
    fn test_fit_polylines_single_point() {
        let mut polylines = vec![vec![CoordinatePair::new(7.0, 12.0)]];
        let target = Bounds::new(Range::new(1.0, 4.0), Range::new(1.0, 3.0));
        fit_polylines(&mut polylines, &target);
        assert_close(&polylines, &[vec![(2.5, 2.0)]]);
    }

    #[test]
    fn test_fit_polylines_without_points() {
        let mut polylines: Vec<Polyline> = vec![vec![]];
        let target = Bounds::new(Range::new(0.0, 1.0), Range::new(0.0, 1.0));
        fit_polylines(&mut polylines, &target);
        assert_eq!(polylines, vec![Vec::<CoordinatePair>::new()]);
    }
}
