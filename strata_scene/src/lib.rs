// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=strata_scene --heading-base-level=0

//! Strata Scene: ordering and spatial containment for a flat diagram scene.
//!
//! A diagram editor keeps its elements in one flat array that is also the
//! paint order: index 0 is at the back, the last element is at the front.
//! Structure lives in pointers on the elements rather than in nesting:
//!
//! - a child of a frame points at it through `frame_id`,
//! - a text label points at its container through `container_id`,
//! - groups are chains of group ids on each member, deepest first.
//!
//! This crate keeps that array coherent while users reorder and reparent
//! elements.
//!
//! ## Invariants
//!
//! - A frame's children sit in one contiguous block directly below the frame.
//! - Frames never nest, and a group that contains a frame is never a child.
//! - Groups move, enter and leave frames as a whole.
//! - Elements that have a fractional index are strictly increasing by it in
//!   array order, and reordering re-stamps only the elements that moved.
//!
//! ## API overview
//!
//! - [`Element`] with [`ElementId`], [`GroupId`], [`ElementKind`] and
//!   [`ElementFlags`]: the scene model.
//! - [`SelectionContext`]: selection, editing group and drop target.
//! - [`Engine`]: runs every operation over three collaborators:
//!   - [`GroupPartition`] (default [`Groups`]) resolves group cohesion,
//!   - [`IndexAssigner`] (default [`FractionalIndexer`]) re-stamps indices,
//!   - [`Mutator`] (default [`VersionBump`]) writes every change.
//!
//! Reordering ([`zorder`]):
//! - [`Engine::move_one_left`] / [`Engine::move_one_right`] step past the
//!   nearest eligible neighbor.
//! - [`Engine::move_all_left`] / [`Engine::move_all_right`] send the selection
//!   to the extreme of its scope.
//! - [`Engine::move_above_element`] reinserts elements right before a target.
//!
//! Containment ([`frame`]):
//! - [`Engine::set_frame_membership`], [`Engine::clear_frame_membership`] and
//!   [`Engine::replace_all_in_frame`] flip `frame_id` only.
//! - [`Engine::repair_ordering`] restores the contiguous child block.
//! - [`Engine::recompute_on_resize`] and [`Engine::is_member_now`] answer
//!   membership questions during interaction.
//!
//! Operations never fail: a request that does not apply (an unknown frame, a
//! selection already at the front) returns the scene unchanged and is logged
//! at `debug` level through [`log`].
//!
//! # Example
//!
//! ```rust
//! use strata_scene::{
//!     Element, ElementKind, Engine, SelectionContext, ValidateOptions, validate_indices,
//! };
//!
//! let scene = vec![
//!     Element::new("a", ElementKind::Rectangle).with_geometry(10.0, 10.0, 20.0, 20.0),
//!     Element::new("frame", ElementKind::Frame).with_geometry(0.0, 0.0, 100.0, 100.0),
//!     Element::new("b", ElementKind::Ellipse).with_geometry(40.0, 40.0, 20.0, 20.0),
//! ];
//! let mut engine = Engine::new();
//! let ctx = SelectionContext::new();
//!
//! // Adopt `b` into the frame; it moves right below the frame.
//! let scene = engine.repair_ordering(scene, &["b".into()], &"frame".into(), &ctx);
//! let order: Vec<_> = scene.iter().map(|e| e.id.as_str()).collect();
//! assert_eq!(order, ["a", "b", "frame"]);
//! assert_eq!(scene[1].frame_id, Some("frame".into()));
//!
//! // `a` steps over the whole frame block.
//! let scene = engine.move_one_right(scene, &SelectionContext::selecting(["a"]));
//! let order: Vec<_> = scene.iter().map(|e| e.id.as_str()).collect();
//! assert_eq!(order, ["b", "frame", "a"]);
//! assert!(validate_indices(&scene, ValidateOptions::default()).is_ok());
//! ```
//!
//! This crate is `no_std` and uses `alloc`. The `std` feature (on by default)
//! stamps mutation times from the system clock; enable `libm` instead for
//! pure `no_std` targets.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod element;
mod engine;
pub mod frame;
mod groups;
mod indices;
mod mutate;
mod selection;
pub mod zorder;

pub use element::{
    BindingKind, BoundElement, Element, ElementFlags, ElementId, ElementKind, GroupId,
};
pub use engine::Engine;
pub use groups::{GroupPartition, Groups, is_in_group, shares_immediate_group};
pub use indices::{
    FractionalIndexer, IndexAssigner, IndexError, ValidateOptions, order_by_index,
    validate_indices,
};
pub use mutate::{ElementUpdate, Mutations, Mutator, VersionBump};
pub use selection::{SelectionContext, selected_with_dependents};
pub use zorder::Direction;

pub use strata_fractional::FractionalIndex;
