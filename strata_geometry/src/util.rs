// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Affine, Line, Point, Rect};

/// Transform an axis-aligned `Rect` by an `Affine` and return a conservative
/// axis-aligned bounding box in world space.
pub(crate) fn transform_rect_bbox(affine: Affine, rect: Rect) -> Rect {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    let min_x = (a * rect.x0).min(a * rect.x1) + (c * rect.y0).min(c * rect.y1);
    let max_x = (a * rect.x0).max(a * rect.x1) + (c * rect.y0).max(c * rect.y1);
    let min_y = (b * rect.x0).min(b * rect.x1) + (d * rect.y0).min(d * rect.y1);
    let max_y = (b * rect.x0).max(b * rect.x1) + (d * rect.y0).max(d * rect.y1);
    Rect::new(min_x + e, min_y + f, max_x + e, max_y + f)
}

/// Smallest rect covering all points; a point rect for a single point and
/// [`Rect::ZERO`] for none.
pub(crate) fn points_bbox(points: impl IntoIterator<Item = Point>) -> Rect {
    let mut it = points.into_iter();
    let Some(first) = it.next() else {
        return Rect::ZERO;
    };
    it.fold(Rect::from_points(first, first), |acc, p| acc.union_pt(p))
}

/// Sign of the turn `a -> b -> c`: positive for counter-clockwise, negative
/// for clockwise, zero when collinear.
fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Whether `p`, known to be collinear with `line`, lies within its extent.
fn on_segment(line: Line, p: Point) -> bool {
    p.x >= line.p0.x.min(line.p1.x)
        && p.x <= line.p0.x.max(line.p1.x)
        && p.y >= line.p0.y.min(line.p1.y)
        && p.y <= line.p0.y.max(line.p1.y)
}

/// Closed segment intersection test. Touching endpoints and collinear
/// overlap count as crossing.
///
/// Kept local because kurbo's line intersection helpers report no hit for
/// collinear overlap.
pub(crate) fn segments_intersect(a: Line, b: Line) -> bool {
    let o1 = sign(orientation(a.p0, a.p1, b.p0));
    let o2 = sign(orientation(a.p0, a.p1, b.p1));
    let o3 = sign(orientation(b.p0, b.p1, a.p0));
    let o4 = sign(orientation(b.p0, b.p1, a.p1));

    if o1 != o2 && o3 != o4 {
        return true;
    }
    (o1 == 0 && on_segment(a, b.p0))
        || (o2 == 0 && on_segment(a, b.p1))
        || (o3 == 0 && on_segment(b, a.p0))
        || (o4 == 0 && on_segment(b, a.p1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_segments() {
        let a = Line::new((0.0, 0.0), (10.0, 10.0));
        let b = Line::new((0.0, 10.0), (10.0, 0.0));
        assert!(segments_intersect(a, b));
    }

    #[test]
    fn parallel_segments_do_not_cross() {
        let a = Line::new((0.0, 0.0), (10.0, 0.0));
        let b = Line::new((0.0, 1.0), (10.0, 1.0));
        assert!(!segments_intersect(a, b));
    }

    #[test]
    fn touching_and_collinear_segments() {
        let a = Line::new((0.0, 0.0), (10.0, 0.0));
        let touching = Line::new((10.0, 0.0), (10.0, 5.0));
        let overlapping = Line::new((5.0, 0.0), (15.0, 0.0));
        let apart = Line::new((11.0, 0.0), (15.0, 0.0));
        assert!(segments_intersect(a, touching));
        assert!(segments_intersect(a, overlapping));
        assert!(!segments_intersect(a, apart));
    }

    #[test]
    fn points_bbox_degenerate() {
        assert_eq!(points_bbox([]), Rect::ZERO);
        let p = Point::new(3.0, 4.0);
        assert_eq!(points_bbox([p]), Rect::new(3.0, 4.0, 3.0, 4.0));
    }
}
