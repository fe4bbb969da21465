// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry predicates for scene containment.
//!
//! This crate answers "is A inside, overlapping, or crossing B" for shapes
//! described by their outline and a rotation about a pivot, built on top of
//! [`kurbo`]. It holds no state and never fails: degenerate (zero-size)
//! shapes collapse to point bounds.
//!
//! # Key types
//!
//! - [`Footprint`] – anything with absolute axis-aligned bounds and a set of
//!   boundary segments. Implemented for [`Rect`] (a plain region) and for
//!   [`OrientedOutline`]; scene crates implement it for their elements.
//! - [`Outline`] / [`OrientedOutline`] – rectangle, diamond, ellipse or
//!   polyline outlines, rotated about their center.
//!
//! # Predicates
//!
//! - [`intersects`] – some boundary segment of A crosses some boundary
//!   segment of B (every edge pair is compared).
//! - [`contains_fully`] – B's bounds lie inside A's bounds (inclusive).
//! - [`overlaps`] – `contains_fully(frame, el) || intersects(frame, el) ||
//!   contains_fully(el, frame)`; the last case covers a large shape that
//!   swallows a small region.
//!
//! ```rust
//! use kurbo::Rect;
//! use strata_geometry::{contains_fully, intersects, overlaps};
//!
//! let frame = Rect::new(0.0, 0.0, 100.0, 100.0);
//! let inside = Rect::new(10.0, 10.0, 20.0, 20.0);
//! let straddling = Rect::new(90.0, 10.0, 120.0, 20.0);
//! let huge = Rect::new(-50.0, -50.0, 500.0, 500.0);
//!
//! assert!(contains_fully(&frame, &inside));
//! assert!(!intersects(&frame, &inside));
//! assert!(intersects(&frame, &straddling));
//! assert!(overlaps(&frame, &huge));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;

use kurbo::{Line, Point, Rect};

mod outline;
mod util;

pub use outline::{ELLIPSE_TOLERANCE, OrientedOutline, Outline};

/// A shape's placement in absolute document coordinates.
pub trait Footprint {
    /// Axis-aligned bounds with any rotation applied.
    fn bounds(&self) -> Rect;

    /// Boundary segments with any rotation applied.
    fn edges(&self) -> Vec<Line>;
}

/// A plain axis-aligned region.
impl Footprint for Rect {
    fn bounds(&self) -> Rect {
        *self
    }

    fn edges(&self) -> Vec<Line> {
        OrientedOutline::axis_aligned(Outline::Rect(*self)).edges()
    }
}

impl Footprint for OrientedOutline {
    fn bounds(&self) -> Rect {
        Self::bounds(self)
    }

    fn edges(&self) -> Vec<Line> {
        Self::edges(self)
    }
}

impl<F: Footprint + ?Sized> Footprint for &F {
    fn bounds(&self) -> Rect {
        (**self).bounds()
    }

    fn edges(&self) -> Vec<Line> {
        (**self).edges()
    }
}

/// Rotated bounding box of `shape` in document coordinates.
pub fn bounds_of<F: Footprint + ?Sized>(shape: &F) -> Rect {
    shape.bounds()
}

/// Whether any boundary segment of `a` crosses any boundary segment of `b`.
///
/// A shape strictly inside another does not intersect it.
pub fn intersects<A, B>(a: &A, b: &B) -> bool
where
    A: Footprint + ?Sized,
    B: Footprint + ?Sized,
{
    let ea = a.edges();
    let eb = b.edges();
    ea.iter()
        .any(|x| eb.iter().any(|y| util::segments_intersect(*x, *y)))
}

/// Whether `inner` lies within `outer` (edges inclusive).
pub fn rect_contains_rect(outer: Rect, inner: Rect) -> bool {
    outer.x0 <= inner.x0 && outer.y0 <= inner.y0 && outer.x1 >= inner.x1 && outer.y1 >= inner.y1
}

/// Whether the bounds of `inner` lie entirely within the bounds of `outer`.
pub fn contains_fully<A, B>(outer: &A, inner: &B) -> bool
where
    A: Footprint + ?Sized,
    B: Footprint + ?Sized,
{
    rect_contains_rect(outer.bounds(), inner.bounds())
}

/// Whether `element` belongs with `frame` geometrically: fully inside it,
/// crossing its boundary, or enclosing it.
pub fn overlaps<A, B>(frame: &A, element: &B) -> bool
where
    A: Footprint + ?Sized,
    B: Footprint + ?Sized,
{
    contains_fully(frame, element) || intersects(frame, element) || contains_fully(element, frame)
}

/// Whether `point` is within the bounds of `shape` (edges inclusive).
///
/// `Rect::contains` excludes the far edges, so the check is spelled out.
pub fn contains_point<F: Footprint + ?Sized>(shape: &F, point: Point) -> bool {
    let b = shape.bounds();
    b.x0 <= point.x && point.x <= b.x1 && b.y0 <= point.y && point.y <= b.y1
}

/// Union of the bounds of all shapes, or `None` when empty.
pub fn common_bounds<I>(shapes: I) -> Option<Rect>
where
    I: IntoIterator,
    I::Item: Footprint,
{
    let mut it = shapes.into_iter().map(|s| s.bounds());
    let first = it.next()?;
    Some(it.fold(first, |acc, r| acc.union(r)))
}
