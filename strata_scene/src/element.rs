// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene: identifiers, element kinds, flags, and geometry.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;

use kurbo::{Line, Point, Rect};
use smallvec::SmallVec;
use strata_fractional::FractionalIndex;
use strata_geometry::{Footprint, OrientedOutline, Outline};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(Arc<str>);

        impl $name {
            /// The identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(&*self.0, f)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(Arc::from(s))
            }
        }

        impl From<alloc::string::String> for $name {
            fn from(s: alloc::string::String) -> Self {
                Self(Arc::from(s))
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id! {
    /// Stable identifier of an element, unique for the document's lifetime.
    ElementId
}

string_id! {
    /// Identifier of a group; an element lists the groups it belongs to.
    GroupId
}

/// Closed set of element variants.
///
/// Frame-like elements ([`ElementKind::Frame`] and [`ElementKind::MagicFrame`])
/// are containers that other elements point to via [`Element::frame_id`].
#[derive(Clone, Debug, PartialEq)]
pub enum ElementKind {
    /// Rectangle.
    Rectangle,
    /// Rhombus inscribed in the element box.
    Diamond,
    /// Ellipse inscribed in the element box.
    Ellipse,
    /// Straight or multi-point line; points are relative to the element origin.
    Line {
        /// Vertices relative to `(x, y)`.
        points: Vec<Point>,
    },
    /// Arrow; points are relative to the element origin.
    Arrow {
        /// Vertices relative to `(x, y)`.
        points: Vec<Point>,
    },
    /// Freehand stroke; points are relative to the element origin.
    Freedraw {
        /// Samples relative to `(x, y)`.
        points: Vec<Point>,
    },
    /// Text. A label bound to a container carries the container's id.
    Text {
        /// Container this text is a label of, if any.
        container_id: Option<ElementId>,
    },
    /// Raster image.
    Image,
    /// Embedded external content.
    Embeddable,
    /// Frame container.
    Frame,
    /// Generated frame container; same containment rules as [`ElementKind::Frame`].
    MagicFrame,
}

impl ElementKind {
    /// Whether this kind is a frame-like container.
    pub const fn is_frame_like(&self) -> bool {
        matches!(self, Self::Frame | Self::MagicFrame)
    }

    /// Container id when this is a bound text label.
    pub fn container_id(&self) -> Option<&ElementId> {
        match self {
            Self::Text { container_id } => container_id.as_ref(),
            _ => None,
        }
    }
}

bitflags::bitflags! {
    /// Lifecycle flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ElementFlags: u8 {
        /// Soft-deleted tombstone; kept in the scene for ordering stability.
        const DELETED = 0b0000_0001;
        /// Locked against editing.
        const LOCKED  = 0b0000_0010;
    }
}

/// Kind of a non-hierarchical attachment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// A text label glued to its container. Moves with the container.
    Text,
    /// An arrow endpoint bound to a shape. Does not constrain ordering.
    Arrow,
}

/// One attachment listed on a container.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BoundElement {
    /// Id of the attached element.
    pub id: ElementId,
    /// What kind of attachment this is.
    pub kind: BindingKind,
}

impl BoundElement {
    /// A text label binding.
    pub fn text(id: impl Into<ElementId>) -> Self {
        Self {
            id: id.into(),
            kind: BindingKind::Text,
        }
    }

    /// An arrow binding.
    pub fn arrow(id: impl Into<ElementId>) -> Self {
        Self {
            id: id.into(),
            kind: BindingKind::Arrow,
        }
    }
}

/// A scene element.
///
/// `frame_id`, `index` and the version fields are owned by the mutation
/// primitive ([`crate::Mutator`]); the builder methods below are meant for
/// callers creating elements, not for edits of committed ones.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    /// Stable identity.
    pub id: ElementId,
    /// Variant.
    pub kind: ElementKind,
    /// Left edge of the unrotated box.
    pub x: f64,
    /// Top edge of the unrotated box.
    pub y: f64,
    /// Width of the unrotated box.
    pub width: f64,
    /// Height of the unrotated box.
    pub height: f64,
    /// Clockwise rotation about the box center, in radians.
    pub angle: f64,
    /// Fractional sort key; `None` until first assigned.
    pub index: Option<FractionalIndex>,
    /// Frame this element belongs to.
    pub frame_id: Option<ElementId>,
    /// Groups, deepest first and outermost last.
    pub group_ids: SmallVec<[GroupId; 2]>,
    /// Attachments (labels, arrows).
    pub bound_elements: Vec<BoundElement>,
    /// Lifecycle flags.
    pub flags: ElementFlags,
    /// Incremented on every mutation.
    pub version: u32,
    /// Random tie-breaker drawn on every mutation.
    pub version_nonce: u32,
    /// Timestamp of the last mutation.
    pub updated: u64,
}

impl Element {
    /// A zero-size element of `kind` at the origin.
    pub fn new(id: impl Into<ElementId>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            kind,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            angle: 0.0,
            index: None,
            frame_id: None,
            group_ids: SmallVec::new(),
            bound_elements: Vec::new(),
            flags: ElementFlags::empty(),
            version: 1,
            version_nonce: 0,
            updated: 0,
        }
    }

    /// Set position and size of the unrotated box.
    pub fn with_geometry(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
        self
    }

    /// Set the rotation.
    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    /// Set the initial fractional index.
    pub fn with_index(mut self, index: FractionalIndex) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the initial frame.
    pub fn with_frame(mut self, frame_id: impl Into<ElementId>) -> Self {
        self.frame_id = Some(frame_id.into());
        self
    }

    /// Set the group chain, deepest first.
    pub fn with_groups<I, G>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<GroupId>,
    {
        self.group_ids = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Add an attachment.
    pub fn with_bound(mut self, bound: BoundElement) -> Self {
        self.bound_elements.push(bound);
        self
    }

    /// Set lifecycle flags.
    pub fn with_flags(mut self, flags: ElementFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Whether this element is a soft-deleted tombstone.
    pub fn is_deleted(&self) -> bool {
        self.flags.contains(ElementFlags::DELETED)
    }

    /// Whether this element is locked.
    pub fn is_locked(&self) -> bool {
        self.flags.contains(ElementFlags::LOCKED)
    }

    /// Whether this element is a frame-like container.
    pub fn is_frame_like(&self) -> bool {
        self.kind.is_frame_like()
    }

    /// Container id when this element is a bound text label.
    pub fn container_id(&self) -> Option<&ElementId> {
        self.kind.container_id()
    }

    /// Id of the text label bound to this element, if any.
    pub fn bound_text_id(&self) -> Option<&ElementId> {
        self.bound_elements
            .iter()
            .find(|b| b.kind == BindingKind::Text)
            .map(|b| &b.id)
    }

    /// Outermost group, if any.
    pub fn shallowest_group(&self) -> Option<&GroupId> {
        self.group_ids.last()
    }

    /// Unrotated box in document coordinates.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Outline in document coordinates, rotated about the box center.
    pub fn outline(&self) -> OrientedOutline {
        let rect = self.rect();
        let outline = match &self.kind {
            ElementKind::Diamond => Outline::Diamond(rect),
            ElementKind::Ellipse => Outline::Ellipse(rect),
            ElementKind::Line { points }
            | ElementKind::Arrow { points }
            | ElementKind::Freedraw { points } => Outline::Polyline(
                points
                    .iter()
                    .map(|p| Point::new(p.x + self.x, p.y + self.y))
                    .collect(),
            ),
            ElementKind::Rectangle
            | ElementKind::Text { .. }
            | ElementKind::Image
            | ElementKind::Embeddable
            | ElementKind::Frame
            | ElementKind::MagicFrame => Outline::Rect(rect),
        };
        OrientedOutline::new(outline, self.angle).with_center(rect.center())
    }
}

impl Footprint for Element {
    fn bounds(&self) -> Rect {
        self.outline().bounds()
    }

    fn edges(&self) -> Vec<Line> {
        self.outline().edges()
    }
}

/// Position of the element with `id` in scene order.
pub(crate) fn position_of(elements: &[Element], id: &ElementId) -> Option<usize> {
    elements.iter().position(|e| e.id == *id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use core::f64::consts::FRAC_PI_2;
    use float_cmp::approx_eq;

    #[test]
    fn frame_like_kinds() {
        assert!(ElementKind::Frame.is_frame_like());
        assert!(ElementKind::MagicFrame.is_frame_like());
        assert!(!ElementKind::Rectangle.is_frame_like());
        assert!(!ElementKind::Text { container_id: None }.is_frame_like());
    }

    #[test]
    fn ids_borrow_as_str() {
        let mut set = hashbrown::HashSet::new();
        set.insert(ElementId::from("a"));
        assert!(set.contains("a"));
        assert_eq!(ElementId::from("a").to_string(), "a");
    }

    #[test]
    fn linear_points_are_relative() {
        let el = Element::new(
            "l",
            ElementKind::Line {
                points: alloc::vec![Point::ZERO, Point::new(10.0, 5.0)],
            },
        )
        .with_geometry(100.0, 100.0, 10.0, 5.0);
        assert_eq!(el.bounds(), Rect::new(100.0, 100.0, 110.0, 105.0));
        assert_eq!(el.edges().len(), 1);
    }

    #[test]
    fn rotated_bounds_use_box_center() {
        let el = Element::new("r", ElementKind::Rectangle)
            .with_geometry(0.0, 0.0, 40.0, 20.0)
            .with_angle(FRAC_PI_2);
        let b = el.bounds();
        assert!(approx_eq!(f64, b.x0, 10.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, b.y0, -10.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, b.x1, 30.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, b.y1, 30.0, epsilon = 1e-9));
    }

    #[test]
    fn bound_text_lookup_ignores_arrows() {
        let el = Element::new("box", ElementKind::Rectangle)
            .with_bound(BoundElement::arrow("arrow"))
            .with_bound(BoundElement::text("label"));
        assert_eq!(el.bound_text_id().map(ElementId::as_str), Some("label"));
    }
}
