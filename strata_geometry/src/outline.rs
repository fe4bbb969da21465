// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shape outlines placed in document space.

use alloc::vec::Vec;

use kurbo::{Affine, Ellipse, Line, PathEl, Point, Rect, Shape};

use crate::util::{points_bbox, transform_rect_bbox};

/// Flattening tolerance used when an ellipse outline is reduced to segments.
pub const ELLIPSE_TOLERANCE: f64 = 0.1;

/// Unrotated outline of a shape in absolute document coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum Outline {
    /// Axis-aligned rectangle.
    Rect(Rect),
    /// Rhombus inscribed in the rect, touching the middle of each side.
    Diamond(Rect),
    /// Ellipse inscribed in the rect.
    Ellipse(Rect),
    /// Open polyline through the points, in order.
    Polyline(Vec<Point>),
}

impl Outline {
    /// Unrotated axis-aligned bounds.
    pub fn local_bounds(&self) -> Rect {
        match self {
            Self::Rect(r) | Self::Diamond(r) | Self::Ellipse(r) => *r,
            Self::Polyline(points) => points_bbox(points.iter().copied()),
        }
    }
}

/// An [`Outline`] rotated by `angle` radians about `center`.
#[derive(Clone, Debug, PartialEq)]
pub struct OrientedOutline {
    /// The unrotated outline.
    pub outline: Outline,
    /// Clockwise rotation in radians (y axis points down).
    pub angle: f64,
    /// Pivot of the rotation in document coordinates.
    pub center: Point,
}

impl OrientedOutline {
    /// Rotate `outline` about the center of its own bounds.
    pub fn new(outline: Outline, angle: f64) -> Self {
        let center = outline.local_bounds().center();
        Self {
            outline,
            angle,
            center,
        }
    }

    /// An unrotated outline.
    pub fn axis_aligned(outline: Outline) -> Self {
        Self::new(outline, 0.0)
    }

    /// Override the rotation pivot.
    pub fn with_center(mut self, center: Point) -> Self {
        self.center = center;
        self
    }

    /// Local-to-document transform applied to the outline.
    pub fn transform(&self) -> Affine {
        if self.angle == 0.0 {
            Affine::IDENTITY
        } else {
            Affine::rotate_about(self.angle, self.center)
        }
    }

    /// Axis-aligned bounds of the rotated outline.
    ///
    /// Zero-size outlines yield a point rect rather than failing.
    pub fn bounds(&self) -> Rect {
        let tf = self.transform();
        match &self.outline {
            Outline::Rect(r) => transform_rect_bbox(tf, *r),
            Outline::Ellipse(r) => {
                if r.width() == 0.0 || r.height() == 0.0 {
                    transform_rect_bbox(tf, *r)
                } else {
                    (tf * Ellipse::from_rect(*r)).bounding_box()
                }
            }
            Outline::Diamond(r) => points_bbox(diamond_corners(*r).into_iter().map(|p| tf * p)),
            Outline::Polyline(points) => points_bbox(points.iter().map(|p| tf * *p)),
        }
    }

    /// Boundary segments of the rotated outline.
    pub fn edges(&self) -> Vec<Line> {
        let tf = self.transform();
        match &self.outline {
            Outline::Rect(r) => closed_edges(&rect_corners(*r), tf),
            Outline::Diamond(r) => closed_edges(&diamond_corners(*r), tf),
            Outline::Ellipse(r) => ellipse_edges(*r, tf),
            Outline::Polyline(points) => points
                .windows(2)
                .map(|w| Line::new(tf * w[0], tf * w[1]))
                .collect(),
        }
    }
}

fn rect_corners(r: Rect) -> [Point; 4] {
    [
        Point::new(r.x0, r.y0),
        Point::new(r.x1, r.y0),
        Point::new(r.x1, r.y1),
        Point::new(r.x0, r.y1),
    ]
}

fn diamond_corners(r: Rect) -> [Point; 4] {
    let c = r.center();
    [
        Point::new(c.x, r.y0),
        Point::new(r.x1, c.y),
        Point::new(c.x, r.y1),
        Point::new(r.x0, c.y),
    ]
}

fn closed_edges(corners: &[Point], tf: Affine) -> Vec<Line> {
    let n = corners.len();
    (0..n)
        .map(|i| Line::new(tf * corners[i], tf * corners[(i + 1) % n]))
        .collect()
}

fn ellipse_edges(r: Rect, tf: Affine) -> Vec<Line> {
    if r.width() == 0.0 || r.height() == 0.0 {
        return closed_edges(&rect_corners(r), tf);
    }
    let ellipse = tf * Ellipse::from_rect(r);
    let mut edges = Vec::new();
    let mut start = Point::ZERO;
    let mut last = Point::ZERO;
    kurbo::flatten(
        ellipse.path_elements(ELLIPSE_TOLERANCE),
        ELLIPSE_TOLERANCE,
        |el| match el {
            PathEl::MoveTo(p) => {
                start = p;
                last = p;
            }
            PathEl::LineTo(p) => {
                edges.push(Line::new(last, p));
                last = p;
            }
            PathEl::ClosePath => {
                if last != start {
                    edges.push(Line::new(last, start));
                }
                last = start;
            }
            // `flatten` only emits lines.
            PathEl::QuadTo(..) | PathEl::CurveTo(..) => {}
        },
    );
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::FRAC_PI_2;
    use float_cmp::approx_eq;

    #[test]
    fn rect_has_four_edges() {
        let o = OrientedOutline::axis_aligned(Outline::Rect(Rect::new(0.0, 0.0, 10.0, 20.0)));
        assert_eq!(o.edges().len(), 4);
        assert_eq!(o.bounds(), Rect::new(0.0, 0.0, 10.0, 20.0));
    }

    #[test]
    fn quarter_turn_swaps_extent() {
        let o = OrientedOutline::new(Outline::Rect(Rect::new(0.0, 0.0, 10.0, 20.0)), FRAC_PI_2);
        let b = o.bounds();
        assert!(approx_eq!(f64, b.width(), 20.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, b.height(), 10.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, b.center().x, 5.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, b.center().y, 10.0, epsilon = 1e-9));
    }

    #[test]
    fn zero_size_is_a_point() {
        let o = OrientedOutline::new(Outline::Rect(Rect::new(5.0, 5.0, 5.0, 5.0)), 1.0);
        let b = o.bounds();
        assert!(approx_eq!(f64, b.width(), 0.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, b.x0, 5.0, epsilon = 1e-9));
    }

    #[test]
    fn ellipse_is_closed_polygon() {
        let o = OrientedOutline::axis_aligned(Outline::Ellipse(Rect::new(0.0, 0.0, 40.0, 20.0)));
        let edges = o.edges();
        assert!(edges.len() > 4);
        let first = edges.first().unwrap();
        let last = edges.last().unwrap();
        assert!(approx_eq!(f64, first.p0.x, last.p1.x, epsilon = 1e-9));
        assert!(approx_eq!(f64, first.p0.y, last.p1.y, epsilon = 1e-9));
    }

    #[test]
    fn diamond_bounds_match_rect() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        let o = OrientedOutline::axis_aligned(Outline::Diamond(r));
        assert_eq!(o.bounds(), r);
    }

    #[test]
    fn polyline_edges_are_open() {
        let o = OrientedOutline::axis_aligned(Outline::Polyline(alloc::vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ]));
        assert_eq!(o.edges().len(), 2);
    }
}
