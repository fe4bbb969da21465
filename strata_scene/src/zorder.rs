// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Z-order shifting.
//!
//! The scene array is back to front: `Left` moves towards index 0 (further
//! back), `Right` towards the end (further front). Every operation takes the
//! scene by value and hands back the reordered scene. Elements that end up
//! at a new position are re-indexed through the engine's [`IndexAssigner`].
//!
//! Shifts respect three boundaries:
//!
//! - a frame's children never leave the frame's block unless the frame
//!   itself moves along,
//! - outside a frame, a frame's block (children plus frame) is stepped over
//!   as a whole,
//! - while a group is being edited, nothing leaves the group, and sibling
//!   sub-groups are stepped over as a whole.

use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};
use log::{debug, trace};

use crate::element::{BindingKind, Element, ElementId, GroupId, position_of};
use crate::engine::Engine;
use crate::groups::{GroupPartition, is_in_group};
use crate::indices::IndexAssigner;
use crate::mutate::Mutator;
use crate::selection::{SelectionContext, selected_with_dependents};

/// Shift direction along the scene array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards the back (lower positions).
    Left,
    /// Towards the front (higher positions).
    Right,
}

impl<G: GroupPartition, I: IndexAssigner, M: Mutator> Engine<G, I, M> {
    /// Send the selection one step backward.
    pub fn move_one_left(
        &mut self,
        elements: Vec<Element>,
        ctx: &SelectionContext,
    ) -> Vec<Element> {
        self.shift_by_one(elements, ctx, Direction::Left)
    }

    /// Bring the selection one step forward.
    pub fn move_one_right(
        &mut self,
        elements: Vec<Element>,
        ctx: &SelectionContext,
    ) -> Vec<Element> {
        self.shift_by_one(elements, ctx, Direction::Right)
    }

    /// Send the selection to the back of its scope.
    pub fn move_all_left(
        &mut self,
        elements: Vec<Element>,
        ctx: &SelectionContext,
    ) -> Vec<Element> {
        let ids = selected_with_dependents(&elements, ctx);
        self.move_elements_to_extreme(elements, &ids, Direction::Left, ctx)
    }

    /// Bring the selection to the front of its scope.
    pub fn move_all_right(
        &mut self,
        elements: Vec<Element>,
        ctx: &SelectionContext,
    ) -> Vec<Element> {
        let ids = selected_with_dependents(&elements, ctx);
        self.move_elements_to_extreme(elements, &ids, Direction::Right, ctx)
    }

    /// Move `ids` to the extreme of their scope in `direction`.
    ///
    /// Children of unselected frames are shifted within their frame's block,
    /// one frame at a time; everything else is shifted within the whole scene
    /// (or the editing group). Each bucket sees the scene as left by the
    /// previous one.
    pub fn move_elements_to_extreme(
        &mut self,
        elements: Vec<Element>,
        ids: &HashSet<ElementId>,
        direction: Direction,
        ctx: &SelectionContext,
    ) -> Vec<Element> {
        let mut elements = elements;
        let (frame_buckets, regular) = bucket_by_frame(&elements, ids);
        let editing = ctx.editing_group_id.as_ref();

        let mut moved: HashSet<ElementId> = HashSet::new();
        for (frame, bucket) in &frame_buckets {
            moved.extend(self.shift_to_end(&mut elements, bucket, direction, Some(frame), editing));
        }
        moved.extend(self.shift_to_end(&mut elements, &regular, direction, None, editing));

        if moved.is_empty() {
            debug!(direction:?, selected = ids.len(); "Selection already at the extreme");
            return elements;
        }
        debug!(
            direction:?,
            frames = frame_buckets.len(),
            moved = moved.len();
            "Moved selection to the extreme"
        );
        self.indexer
            .assign_indices(&mut elements, &moved, &mut self.mutator);
        elements
    }

    /// Remove `to_move` from wherever they are and reinsert them, in the
    /// order given, directly before `target`.
    ///
    /// Ids that are missing (and `target` itself) are ignored. A missing
    /// `target` leaves the scene unchanged.
    pub fn move_above_element(
        &mut self,
        elements: Vec<Element>,
        to_move: &[ElementId],
        target: &ElementId,
    ) -> Vec<Element> {
        if position_of(&elements, target).is_none() {
            debug!(target:?; "Move above an unknown element ignored");
            return elements;
        }
        let rank: HashMap<ElementId, usize> = {
            let present: HashSet<&ElementId> = elements.iter().map(|e| &e.id).collect();
            let mut rank = HashMap::new();
            for id in to_move {
                if id != target && present.contains(id) && !rank.contains_key(id) {
                    rank.insert(id.clone(), rank.len());
                }
            }
            rank
        };
        if rank.is_empty() || already_above(&elements, &rank, target) {
            trace!(target:?; "Elements already sit above target");
            return elements;
        }

        let (mut moving, mut rest): (Vec<Element>, Vec<Element>) = elements
            .into_iter()
            .partition(|e| rank.contains_key(&e.id));
        moving.sort_by_key(|e| rank.get(&e.id).copied().unwrap_or(usize::MAX));
        let at = position_of(&rest, target).unwrap_or(rest.len());
        let tail = rest.split_off(at);
        rest.extend(moving);
        rest.extend(tail);

        let moved: HashSet<ElementId> = rank.into_keys().collect();
        trace!(target:?, moved = moved.len(); "Moved elements above target");
        self.indexer
            .assign_indices(&mut rest, &moved, &mut self.mutator);
        rest
    }

    fn shift_by_one(
        &mut self,
        elements: Vec<Element>,
        ctx: &SelectionContext,
        direction: Direction,
    ) -> Vec<Element> {
        let mut elements = elements;
        let selected = selected_with_dependents(&elements, ctx);
        let indices = indices_to_move(&elements, &selected);
        let selected_frames: HashSet<ElementId> = indices
            .iter()
            .map(|&i| &elements[i])
            .filter(|e| e.is_frame_like())
            .map(|e| e.id.clone())
            .collect();

        let mut runs = scoped_runs(&elements, &indices, &selected_frames);
        if direction == Direction::Right {
            runs.reverse();
        }

        let mut moved: HashSet<ElementId> = HashSet::new();
        for (leading, trailing, containing) in runs {
            let boundary = match direction {
                Direction::Left => leading,
                Direction::Right => trailing,
            };
            let Some(target) = self.target_index(
                &elements,
                boundary,
                direction,
                containing.as_ref(),
                ctx.editing_group_id.as_ref(),
            ) else {
                trace!(leading, trailing, direction:?; "No eligible neighbor");
                continue;
            };

            let len = trailing - leading + 1;
            let landed = match direction {
                Direction::Left if target < leading => {
                    elements[target..=trailing].rotate_right(len);
                    target..target + len
                }
                Direction::Right if target > trailing => {
                    elements[leading..=target].rotate_left(len);
                    target + 1 - len..target + 1
                }
                _ => continue,
            };
            moved.extend(elements[landed].iter().map(|e| e.id.clone()));
        }

        if moved.is_empty() {
            debug!(direction:?, selected = selected.len(); "Nothing to shift");
            return elements;
        }
        debug!(direction:?, moved = moved.len(); "Shifted selection by one");
        self.indexer
            .assign_indices(&mut elements, &moved, &mut self.mutator);
        elements
    }

    /// Where the run ending at `boundary` should land when stepping once in
    /// `direction`, or `None` when it cannot move.
    fn target_index(
        &self,
        elements: &[Element],
        boundary: usize,
        direction: Direction,
        containing_frame: Option<&ElementId>,
        editing: Option<&GroupId>,
    ) -> Option<usize> {
        let eligible = |e: &Element| {
            !e.is_deleted()
                && match (containing_frame, editing) {
                    (Some(frame), _) => e.frame_id.as_ref() == Some(frame),
                    (None, Some(group)) => is_in_group(e, group),
                    (None, None) => true,
                }
        };
        let candidate = match direction {
            Direction::Left => elements[..boundary].iter().rposition(|e| eligible(e))?,
            Direction::Right => {
                boundary
                    + 1
                    + elements
                        .get(boundary + 1..)?
                        .iter()
                        .position(|e| eligible(e))?
            }
        };
        let next = &elements[candidate];

        if let Some(group) = editing {
            if elements[boundary].group_ids == next.group_ids {
                return Some(binding_extent(elements, candidate, direction));
            }
            if !is_in_group(next, group) {
                return None;
            }
        }

        // Outside frames, a frame's block is stepped over as a whole.
        if containing_frame.is_none()
            && let Some(frame) = next
                .frame_id
                .as_ref()
                .or_else(|| next.is_frame_like().then_some(&next.id))
        {
            let mut block = elements
                .iter()
                .enumerate()
                .filter(|(_, e)| e.frame_id.as_ref() == Some(frame) || e.id == *frame)
                .map(|(i, _)| i);
            let extent = match direction {
                Direction::Left => block.next(),
                Direction::Right => block.last(),
            };
            return Some(extent.unwrap_or(candidate));
        }

        if next.group_ids.is_empty() {
            return Some(binding_extent(elements, candidate, direction));
        }

        let sibling = match editing {
            Some(group) => next
                .group_ids
                .iter()
                .position(|g| g == group)
                .and_then(|at| at.checked_sub(1))
                .and_then(|at| next.group_ids.get(at)),
            None => next.group_ids.last(),
        };
        let Some(sibling) = sibling else {
            return Some(candidate);
        };
        let members = self.groups.elements_in_group(elements, sibling);
        let edge = match direction {
            Direction::Left => members.first(),
            Direction::Right => members.last(),
        };
        Some(
            edge.and_then(|m| position_of(elements, &m.id))
                .unwrap_or(candidate),
        )
    }

    /// Move the elements of `ids` to the extreme of their scope within
    /// `elements`, keeping their relative order. Returns the ids whose
    /// position changed.
    fn shift_to_end(
        &self,
        elements: &mut Vec<Element>,
        ids: &HashSet<ElementId>,
        direction: Direction,
        containing_frame: Option<&ElementId>,
        editing: Option<&GroupId>,
    ) -> Vec<ElementId> {
        let indices = indices_to_move(elements, ids);
        let (Some(&first), Some(&last)) = (indices.first(), indices.last()) else {
            return Vec::new();
        };

        // The scope bound: the frame's child block, the editing group, or the
        // whole scene. The frame itself is not part of its child block.
        let bound = match (containing_frame, editing) {
            (Some(frame), _) => {
                let mut children = elements
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.frame_id.as_ref() == Some(frame))
                    .map(|(i, _)| i);
                match direction {
                    Direction::Left => children.next(),
                    Direction::Right => children.last(),
                }
            }
            (None, Some(group)) => {
                let members = self.groups.elements_in_group(elements.iter(), group);
                let edge = match direction {
                    Direction::Left => members.first(),
                    Direction::Right => members.last(),
                };
                let Some(edge) = edge else {
                    return Vec::new();
                };
                position_of(elements, &edge.id)
            }
            (None, None) => None,
        };
        let (leading, trailing) = match direction {
            Direction::Left => (bound.unwrap_or(0).min(first), last),
            Direction::Right => (first, bound.unwrap_or(elements.len() - 1).max(last)),
        };

        let targets: HashSet<usize> = indices.into_iter().collect();
        let (picked, displaced): (Vec<_>, Vec<_>) = elements
            .drain(leading..=trailing)
            .enumerate()
            .map(|(k, e)| (leading + k, e))
            .partition(|(at, _)| targets.contains(at));
        let block: Vec<(usize, Element)> = match direction {
            Direction::Left => picked.into_iter().chain(displaced).collect(),
            Direction::Right => displaced.into_iter().chain(picked).collect(),
        };

        let mut moved = Vec::new();
        for (k, (was, element)) in block.iter().enumerate() {
            if targets.contains(was) && leading + k != *was {
                moved.push(element.id.clone());
            }
        }
        let tail = elements.split_off(leading);
        elements.extend(block.into_iter().map(|(_, e)| e));
        elements.extend(tail);
        moved
    }
}

/// Whether the elements ranked in `rank` already sit, in rank order,
/// directly below `target`.
fn already_above(
    elements: &[Element],
    rank: &HashMap<ElementId, usize>,
    target: &ElementId,
) -> bool {
    let Some(at) = position_of(elements, target) else {
        return false;
    };
    at >= rank.len()
        && elements[at - rank.len()..at]
            .iter()
            .enumerate()
            .all(|(k, e)| rank.get(&e.id) == Some(&k))
}

/// Positions of the elements in `ids`, ascending.
///
/// Deleted elements sandwiched between two selected elements are carried
/// along so that shifting does not split the selection around them, and so
/// are deleted children of a frame in `ids`.
fn indices_to_move(elements: &[Element], ids: &HashSet<ElementId>) -> Vec<usize> {
    let mut indices = Vec::new();
    let mut pending = Vec::new();
    let mut after_selected = false;
    for (i, element) in elements.iter().enumerate() {
        if element.is_deleted() {
            if element.frame_id.as_ref().is_some_and(|f| ids.contains(f)) {
                indices.append(&mut pending);
                indices.push(i);
                after_selected = true;
            } else if after_selected {
                pending.push(i);
            }
        } else if ids.contains(&element.id) {
            indices.append(&mut pending);
            indices.push(i);
            after_selected = true;
        } else {
            pending.clear();
            after_selected = false;
        }
    }
    indices
}

/// Maximal runs of consecutive positions within one frame scope, as
/// inclusive `(first, last, frame)`.
///
/// Children of a frame that is not moving along are confined to that frame;
/// everything else is unconfined. Deleted elements join the run they follow.
fn scoped_runs(
    elements: &[Element],
    indices: &[usize],
    selected_frames: &HashSet<ElementId>,
) -> Vec<(usize, usize, Option<ElementId>)> {
    let mut runs: Vec<(usize, usize, Option<ElementId>)> = Vec::new();
    for &i in indices {
        let element = &elements[i];
        let scope = element
            .frame_id
            .as_ref()
            .filter(|f| !element.is_frame_like() && !selected_frames.contains(*f));
        match runs.last_mut() {
            Some((_, last, current))
                if *last + 1 == i && (element.is_deleted() || current.as_ref() == scope) =>
            {
                *last = i;
            }
            _ => runs.push((i, i, scope.cloned())),
        }
    }
    runs
}

/// Widen `candidate` to its binding partner: a label's container, or a
/// container's first non-arrow bound element.
fn binding_extent(elements: &[Element], candidate: usize, direction: Direction) -> usize {
    let element = &elements[candidate];
    let partner = match element.container_id() {
        Some(container) => position_of(elements, container),
        None => element
            .bound_elements
            .iter()
            .find(|b| !matches!(b.kind, BindingKind::Arrow))
            .and_then(|b| position_of(elements, &b.id)),
    };
    match (partner, direction) {
        (Some(p), Direction::Left) => p.min(candidate),
        (Some(p), Direction::Right) => p.max(candidate),
        (None, _) => candidate,
    }
}

/// Splits `ids` into per-frame buckets (children of frames that are not
/// themselves in `ids`, keyed in order of first appearance) and the rest.
fn bucket_by_frame(
    elements: &[Element],
    ids: &HashSet<ElementId>,
) -> (Vec<(ElementId, HashSet<ElementId>)>, HashSet<ElementId>) {
    let selected_frames: HashSet<&ElementId> = elements
        .iter()
        .filter(|e| e.is_frame_like() && ids.contains(&e.id))
        .map(|e| &e.id)
        .collect();
    let mut buckets: Vec<(ElementId, HashSet<ElementId>)> = Vec::new();
    let mut regular = HashSet::new();
    for element in elements.iter().filter(|e| ids.contains(&e.id)) {
        match &element.frame_id {
            Some(frame) if !element.is_frame_like() && !selected_frames.contains(frame) => {
                match buckets.iter_mut().find(|(f, _)| f == frame) {
                    Some((_, bucket)) => {
                        bucket.insert(element.id.clone());
                    }
                    None => {
                        let mut bucket = HashSet::new();
                        bucket.insert(element.id.clone());
                        buckets.push((frame.clone(), bucket));
                    }
                }
            }
            _ => {
                regular.insert(element.id.clone());
            }
        }
    }
    (buckets, regular)
}
