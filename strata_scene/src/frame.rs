// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame containment.
//!
//! Membership is the `frame_id` pointer on each child. Everything in this
//! module only flips that pointer, except [`Engine::repair_ordering`], which
//! also moves the children into one contiguous block right below the frame.
//!
//! Groups that (through any member) contain a frame-like element are never
//! eligible as frame children, and geometry is judged per group: once one
//! member of a group qualifies, the whole group does.

use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};
use kurbo::{Point, Rect};
use log::{debug, trace};
use strata_geometry::{
    Footprint, common_bounds, contains_fully, contains_point, intersects, overlaps,
    rect_contains_rect,
};

use crate::element::{Element, ElementId, GroupId};
use crate::engine::Engine;
use crate::groups::GroupPartition;
use crate::indices::IndexAssigner;
use crate::mutate::{ElementUpdate, Mutator};
use crate::selection::{SelectionContext, selected_with_dependents};

/// Elements whose `frame_id` is `frame_id`, in scene order.
pub fn frame_children<'a>(elements: &'a [Element], frame_id: &ElementId) -> Vec<&'a Element> {
    elements
        .iter()
        .filter(|e| e.frame_id.as_ref() == Some(frame_id))
        .collect()
}

/// All frame-like elements, in scene order.
pub fn frame_like_elements(elements: &[Element]) -> Vec<&Element> {
    elements.iter().filter(|e| e.is_frame_like()).collect()
}

/// Frames plus every element that is not inside an existing frame.
pub fn root_elements(elements: &[Element]) -> Vec<&Element> {
    let frames: HashSet<&ElementId> = elements
        .iter()
        .filter(|e| e.is_frame_like())
        .map(|e| &e.id)
        .collect();
    elements
        .iter()
        .filter(|e| {
            frames.contains(&e.id) || e.frame_id.as_ref().is_none_or(|f| !frames.contains(f))
        })
        .collect()
}

/// Children keyed by frame id, in order of first appearance.
///
/// Frames without children are listed with an empty set.
pub fn group_by_frame_likes(elements: &[Element]) -> Vec<(ElementId, Vec<&Element>)> {
    let mut seen: HashSet<&ElementId> = HashSet::new();
    let mut out = Vec::new();
    for element in elements {
        let frame_id = if element.is_frame_like() {
            Some(&element.id)
        } else {
            element.frame_id.as_ref()
        };
        if let Some(frame_id) = frame_id
            && seen.insert(frame_id)
        {
            out.push((frame_id.clone(), frame_children(elements, frame_id)));
        }
    }
    out
}

/// The frame-like element `element` points to, if it exists.
pub fn containing_frame<'a>(elements: &'a [Element], element: &Element) -> Option<&'a Element> {
    find_frame(elements, element.frame_id.as_ref()?)
}

/// The frame `element` is being added to or kept in.
///
/// While a selection is dragged this is the highlighted drop target, unless
/// the element's own frame is selected too. Otherwise it is the containing
/// frame. Bound labels follow their container.
pub fn target_frame<'a>(
    elements: &'a [Element],
    element: &'a Element,
    ctx: &SelectionContext,
    dragging: bool,
) -> Option<&'a Element> {
    let subject = label_subject(elements, element);
    if ctx.is_selected(&subject.id) {
        if subject.frame_id.as_ref().is_some_and(|f| ctx.is_selected(f)) {
            return containing_frame(elements, subject);
        }
        if dragging {
            return find_frame(elements, ctx.frame_to_highlight.as_ref()?);
        }
    }
    containing_frame(elements, subject)
}

/// Whether the common bounds of `elements` lie within `frame`.
///
/// An empty set is trivially in bounds.
pub fn elements_in_frame_bounds<'a, I, F>(elements: I, frame: &F) -> bool
where
    I: IntoIterator<Item = &'a Element>,
    F: Footprint + ?Sized,
{
    common_bounds(elements).is_none_or(|b| rect_contains_rect(frame.bounds(), b))
}

/// Whether `point` is within the bounds of `frame`.
pub fn is_cursor_in_frame(point: Point, frame: &Element) -> bool {
    contains_point(frame, point)
}

pub(crate) fn find_frame<'a>(elements: &'a [Element], id: &ElementId) -> Option<&'a Element> {
    elements.iter().find(|e| e.id == *id && e.is_frame_like())
}

/// The container of a bound label, or the element itself.
fn label_subject<'a>(elements: &'a [Element], element: &'a Element) -> &'a Element {
    element
        .container_id()
        .and_then(|c| elements.iter().find(|e| e.id == *c))
        .unwrap_or(element)
}

/// Inside or crossing the frame boundary.
fn touches<F: Footprint + ?Sized>(frame: &F, element: &Element) -> bool {
    contains_fully(frame, element) || intersects(frame, element)
}

impl<G: GroupPartition, I, M> Engine<G, I, M> {
    /// Drop every element whose outermost group contains a frame-like
    /// element somewhere in `all`.
    pub fn omit_groups_containing_frame_likes<'a, S>(
        &self,
        all: &[Element],
        subset: S,
    ) -> Vec<&'a Element>
    where
        S: IntoIterator<Item = &'a Element>,
    {
        let subset: Vec<&'a Element> = subset.into_iter().collect();
        let mut rejected: HashMap<&'a GroupId, bool> = HashMap::new();
        for element in subset.iter().copied() {
            if let Some(group) = element.shallowest_group() {
                rejected.entry(group).or_insert_with(|| {
                    self.groups
                        .elements_in_group(all, group)
                        .iter()
                        .any(|m| m.is_frame_like())
                });
            }
        }
        subset
            .into_iter()
            .filter(|e| {
                e.shallowest_group()
                    .is_none_or(|g| !rejected.get(g).copied().unwrap_or(false))
            })
            .collect()
    }

    /// Candidates that may become children of `frame`.
    ///
    /// Frame-like elements, children of other frames among the candidates,
    /// deleted elements and groups containing frames are excluded. Ungrouped
    /// elements qualify when they overlap the frame; a group qualifies as a
    /// whole when any member overlaps.
    pub fn eligible_children_of<'a>(
        &self,
        candidates: &'a [Element],
        frame: &Element,
    ) -> Vec<&'a Element> {
        let live = candidates.iter().filter(|e| !e.is_deleted());
        let kept = self.omit_groups_containing_frame_likes(candidates, live);
        let other_frames: HashSet<&ElementId> = kept
            .iter()
            .filter(|e| e.is_frame_like() && e.id != frame.id)
            .map(|e| &e.id)
            .collect();

        let mut processed: HashSet<&GroupId> = HashSet::new();
        let mut eligible = Vec::new();
        for element in kept.iter().copied() {
            if element.is_frame_like()
                || element
                    .frame_id
                    .as_ref()
                    .is_some_and(|f| other_frames.contains(f))
            {
                continue;
            }
            match element.shallowest_group() {
                Some(group) => {
                    if !processed.insert(group) {
                        continue;
                    }
                    let members = self.groups.elements_in_group(kept.iter().copied(), group);
                    if members.iter().any(|m| overlaps(frame, *m)) {
                        eligible.extend(members);
                    }
                }
                None => {
                    if overlaps(frame, element) {
                        eligible.push(element);
                    }
                }
            }
        }
        eligible
    }

    /// Whether any member of `group_ids` is inside or crossing `frame`.
    /// True when the groups have no members.
    pub fn groups_at_least_intersecting(
        &self,
        elements: &[Element],
        group_ids: &[GroupId],
        frame: &Element,
    ) -> bool {
        let mut members = group_ids
            .iter()
            .flat_map(|g| self.groups.elements_in_group(elements, g))
            .peekable();
        members.peek().is_none() || members.any(|m| touches(frame, m))
    }

    /// Whether no member of `group_ids` is inside or crossing `frame`.
    /// True when the groups have no members.
    pub fn groups_completely_out_of_frame(
        &self,
        elements: &[Element],
        group_ids: &[GroupId],
        frame: &Element,
    ) -> bool {
        !group_ids
            .iter()
            .flat_map(|g| self.groups.elements_in_group(elements, g))
            .any(|m| touches(frame, m))
    }

    /// Elements whose bounds lie fully inside `frame` and that are loose or
    /// already its children. Bound labels and groups containing frames are
    /// left out.
    pub fn elements_completely_in_frame<'a>(
        &self,
        elements: &'a [Element],
        frame: &Element,
    ) -> Vec<&'a Element> {
        let within = elements.iter().filter(|e| {
            !e.is_deleted()
                && e.id != frame.id
                && e.container_id().is_none()
                && contains_fully(frame, *e)
        });
        self.omit_groups_containing_frame_likes(elements, within)
            .into_iter()
            .filter(|e| {
                (!e.is_frame_like() && e.frame_id.is_none())
                    || e.frame_id.as_ref() == Some(&frame.id)
            })
            .collect()
    }

    /// Elements a freshly drawn `frame` should adopt: those completely in it,
    /// minus groups that stick out of it.
    pub fn elements_in_new_frame<'a>(
        &self,
        elements: &'a [Element],
        frame: &Element,
    ) -> Vec<&'a Element> {
        let candidates = self.elements_completely_in_frame(elements, frame);
        let mut checked: HashMap<&'a GroupId, bool> = HashMap::new();
        let mut out = Vec::new();
        for element in candidates {
            let mut omit = false;
            if !element.group_ids.is_empty() {
                if element
                    .group_ids
                    .iter()
                    .any(|g| checked.get(g).copied().unwrap_or(false))
                {
                    omit = true;
                } else {
                    let members = element
                        .group_ids
                        .iter()
                        .flat_map(|g| self.groups.elements_in_group(elements, g));
                    omit = !elements_in_frame_bounds(members, frame);
                }
                for group in &element.group_ids {
                    checked.insert(group, omit);
                }
            }
            if !omit {
                out.push(element);
            }
        }
        out
    }

    /// Settled children of `frame_id` while it is interactively resized to
    /// `new_bounds`. Does not mutate anything.
    ///
    /// Previous children fully inside (or enclosing) the new bounds stay.
    /// Ungrouped children that no longer cross the bounds are dropped; grouped
    /// ones stay while any member of one of their groups still does. Loose
    /// elements and whole groups now fully inside are added. Bound labels are
    /// left out; they follow their containers. Ids come back in scene order.
    pub fn recompute_on_resize(
        &self,
        elements: &[Element],
        frame_id: &ElementId,
        new_bounds: Rect,
        ctx: &SelectionContext,
    ) -> Vec<ElementId> {
        let Some(frame) = find_frame(elements, frame_id) else {
            debug!(frame:? = frame_id; "Resize of unknown frame ignored");
            return Vec::new();
        };
        let mut resized = frame.clone();
        resized.x = new_bounds.x0;
        resized.y = new_bounds.y0;
        resized.width = new_bounds.width();
        resized.height = new_bounds.height();

        let previous = frame_children(elements, frame_id);
        let mut next: HashSet<&ElementId> = previous.iter().map(|e| &e.id).collect();

        let mut completely = self.elements_completely_in_frame(elements, &resized);
        for element in previous.iter().copied() {
            if !element.is_deleted()
                && contains_fully(element, &resized)
                && !completely.iter().any(|c| c.id == element.id)
            {
                completely.push(element);
            }
        }
        let completely_ids: HashSet<&ElementId> = completely.iter().map(|e| &e.id).collect();
        let partial: Vec<&Element> = previous
            .iter()
            .copied()
            .filter(|e| !e.is_deleted() && !completely_ids.contains(&e.id))
            .collect();

        let mut groups_to_keep: HashSet<&GroupId> =
            completely.iter().flat_map(|e| e.group_ids.iter()).collect();
        for element in partial.iter().copied() {
            if !intersects(element, &resized) {
                if element.group_ids.is_empty() {
                    next.remove(&element.id);
                }
            } else {
                groups_to_keep.extend(element.group_ids.iter());
            }
        }
        for element in partial.iter().copied() {
            if !element.group_ids.is_empty()
                && !element.group_ids.iter().any(|g| groups_to_keep.contains(g))
            {
                next.remove(&element.id);
            }
        }

        for element in completely.iter().filter(|e| e.group_ids.is_empty()) {
            next.insert(&element.id);
        }
        let grouped = completely.iter().copied().filter(|e| !e.group_ids.is_empty());
        let new_groups = self
            .groups
            .groups_selected_by_elements(grouped, ctx.editing_group_id.as_ref());
        for group in &new_groups {
            let members = self.groups.elements_in_group(elements, group);
            if elements_in_frame_bounds(members.iter().copied(), &resized) {
                next.extend(members.iter().map(|m| &m.id));
            }
        }

        let settled: Vec<ElementId> = elements
            .iter()
            .filter(|e| next.contains(&e.id) && e.container_id().is_none())
            .map(|e| e.id.clone())
            .collect();
        trace!(
            frame:? = frame_id,
            previous = previous.len(),
            next = settled.len();
            "Recomputed children on resize"
        );
        settled
    }

    /// Whether `element` belongs to `frame` right now.
    ///
    /// `frame` defaults to the element's [`target_frame`]: the highlighted
    /// drop target while a selection is dragged, the containing frame
    /// otherwise. Outside a drag, or for unselected elements, this trusts
    /// `frame_id`. During a drag it uses live geometry with group cohesion and
    /// the frame-in-group exclusion.
    pub fn is_member_now(
        &self,
        elements: &[Element],
        element: &Element,
        frame: Option<&ElementId>,
        ctx: &SelectionContext,
        dragging: bool,
    ) -> bool {
        let frame = match frame {
            Some(id) => find_frame(elements, id),
            None => target_frame(elements, element, ctx, dragging),
        };
        let Some(frame) = frame else {
            return false;
        };
        if !dragging || !ctx.is_selected(&element.id) {
            return element.frame_id.as_ref() == Some(&frame.id);
        }
        if ctx.is_selected(&frame.id) {
            return true;
        }

        let subject = label_subject(elements, element);
        if subject.group_ids.is_empty() {
            return overlaps(frame, subject);
        }

        let mut members: Vec<&Element> = Vec::new();
        let mut seen: HashSet<&ElementId> = HashSet::new();
        for group in &subject.group_ids {
            for member in self.groups.elements_in_group(elements, group) {
                if seen.insert(&member.id) {
                    members.push(member);
                }
            }
        }
        if ctx.editing_group_id.is_some() {
            if ctx.frame_to_highlight.is_some() {
                return true;
            }
            members.retain(|m| !ctx.is_selected(&m.id));
        }
        if members.iter().any(|m| m.is_frame_like()) {
            return false;
        }
        members
            .iter()
            .any(|m| !m.is_deleted() && overlaps(frame, *m))
    }
}

impl<G: GroupPartition, I, M: Mutator> Engine<G, I, M> {
    /// Point `ids` (and their bound labels) at `frame_id`. Does not reorder.
    ///
    /// Frame-like elements, groups containing frames, children of other
    /// frames in the same call, and children selected together with their own
    /// frame are skipped. Deleted elements are only kept if they already are
    /// children of `frame_id`. Existing members are left untouched.
    pub fn set_frame_membership(
        &mut self,
        elements: &mut [Element],
        ids: &[ElementId],
        frame_id: &ElementId,
        ctx: &SelectionContext,
    ) {
        let Some(add) = self.membership_for(elements, ids, frame_id, ctx) else {
            debug!(frame:? = frame_id; "Membership change for unknown frame ignored");
            return;
        };
        let changed = self.write_frame(elements, &add, Some(frame_id));
        debug!(frame:? = frame_id, requested = ids.len(), changed; "Set frame membership");
    }

    /// Clear the frame membership of `ids` and their bound labels.
    pub fn clear_frame_membership(&mut self, elements: &mut [Element], ids: &[ElementId]) {
        let requested: HashSet<&ElementId> = ids.iter().collect();
        let mut clear: HashSet<ElementId> = HashSet::new();
        for element in elements
            .iter()
            .filter(|e| e.frame_id.is_some() && requested.contains(&e.id))
        {
            clear.insert(element.id.clone());
            if let Some(text) = element.bound_text_id() {
                clear.insert(text.clone());
            }
        }
        let changed = self.write_frame(elements, &clear, None);
        debug!(requested = ids.len(), changed; "Cleared frame membership");
    }

    /// Clear the membership of every child of `frame_id`.
    pub fn remove_all_from_frame(&mut self, elements: &mut [Element], frame_id: &ElementId) {
        let children: Vec<ElementId> = frame_children(elements, frame_id)
            .iter()
            .map(|e| e.id.clone())
            .collect();
        self.clear_frame_membership(elements, &children);
    }

    /// Make `next` the children of `frame_id`, pointer-only.
    ///
    /// Children that stay are not written. Deleted children stay if listed in
    /// `next`. If the frame is missing, its dangling children are released.
    pub fn replace_all_in_frame(
        &mut self,
        elements: &mut [Element],
        next: &[ElementId],
        frame_id: &ElementId,
        ctx: &SelectionContext,
    ) {
        let keep = self
            .membership_for(elements, next, frame_id, ctx)
            .unwrap_or_default();
        let release: HashSet<ElementId> = frame_children(elements, frame_id)
            .into_iter()
            .filter(|e| !keep.contains(&e.id))
            .map(|e| e.id.clone())
            .collect();
        let released = self.write_frame(elements, &release, None);
        let added = self.write_frame(elements, &keep, Some(frame_id));
        debug!(frame:? = frame_id, released, added; "Replaced frame children");
    }

    /// After a drag, release selected children that are no longer members of
    /// their target frame (see [`Engine::is_member_now`]).
    ///
    /// When editing a group, the other members of the selected elements'
    /// groups are checked as well. Dangling `frame_id`s are cleared too.
    pub fn update_membership_of_selected(
        &mut self,
        elements: &mut [Element],
        ctx: &SelectionContext,
        dragging: bool,
    ) {
        let release: Vec<ElementId> = {
            let scene: &[Element] = elements;
            let selected = selected_with_dependents(scene, ctx);
            let mut candidates: HashSet<&ElementId> = scene
                .iter()
                .filter(|e| selected.contains(&e.id))
                .map(|e| &e.id)
                .collect();
            if ctx.editing_group_id.is_some() {
                for element in scene.iter().filter(|e| selected.contains(&e.id)) {
                    for group in &element.group_ids {
                        candidates.extend(
                            self.groups
                                .elements_in_group(scene, group)
                                .into_iter()
                                .map(|m| &m.id),
                        );
                    }
                }
            }
            scene
                .iter()
                .filter(|e| {
                    candidates.contains(&e.id)
                        && e.frame_id.is_some()
                        && !e.is_frame_like()
                        && (containing_frame(scene, e).is_none()
                            || !self.is_member_now(scene, e, None, ctx, dragging))
                })
                .map(|e| e.id.clone())
                .collect()
        };
        if !release.is_empty() {
            self.clear_frame_membership(elements, &release);
        }
    }

    /// Re-point duplicated children: a duplicate follows its frame's
    /// duplicate when the frame was duplicated too, and otherwise keeps the
    /// original frame.
    pub fn bind_to_frames_after_duplication(
        &mut self,
        next: &mut [Element],
        originals: &[Element],
        id_map: &HashMap<ElementId, ElementId>,
    ) {
        let mut assignments: HashMap<&ElementId, &ElementId> = HashMap::new();
        for original in originals {
            let (Some(frame), Some(duplicate)) = (&original.frame_id, id_map.get(&original.id))
            else {
                continue;
            };
            assignments.insert(duplicate, id_map.get(frame).unwrap_or(frame));
        }
        for element in next.iter_mut() {
            if let Some(frame) = assignments.get(&element.id) {
                let update = ElementUpdate::frame(Some((*frame).clone()));
                self.mutator.mutate(element, update);
            }
        }
    }

    /// The elements `set_frame_membership` would point at `frame_id`, or
    /// `None` if the frame does not exist.
    fn membership_for(
        &self,
        elements: &[Element],
        ids: &[ElementId],
        frame_id: &ElementId,
        ctx: &SelectionContext,
    ) -> Option<HashSet<ElementId>> {
        let frame = find_frame(elements, frame_id)?;
        let supplied: HashSet<&ElementId> = ids.iter().collect();
        let to_add: Vec<&Element> = elements
            .iter()
            .filter(|e| {
                supplied.contains(&e.id)
                    && (!e.is_deleted() || e.frame_id.as_ref() == Some(&frame.id))
            })
            .collect();
        let other_frames: HashSet<&ElementId> = to_add
            .iter()
            .filter(|e| e.is_frame_like() && e.id != frame.id)
            .map(|e| &e.id)
            .collect();

        let mut add = HashSet::new();
        for element in self.omit_groups_containing_frame_likes(elements, to_add.iter().copied()) {
            if element.is_frame_like() {
                continue;
            }
            if let Some(current) = &element.frame_id
                && (other_frames.contains(current)
                    || (ctx.is_selected(&element.id) && ctx.is_selected(current)))
            {
                continue;
            }
            add.insert(element.id.clone());
            if let Some(text) = element.bound_text_id() {
                add.insert(text.clone());
            }
        }
        Some(add)
    }

    /// Write `frame_id` into every element listed in `ids`; returns how many
    /// actually changed.
    fn write_frame(
        &mut self,
        elements: &mut [Element],
        ids: &HashSet<ElementId>,
        frame_id: Option<&ElementId>,
    ) -> usize {
        let mut changed = 0;
        for element in elements.iter_mut().filter(|e| ids.contains(&e.id)) {
            if element.frame_id.as_ref() != frame_id {
                changed += 1;
                self.mutator
                    .mutate(element, ElementUpdate::frame(frame_id.cloned()));
            }
        }
        changed
    }
}

impl<G: GroupPartition, I: IndexAssigner, M: Mutator> Engine<G, I, M> {
    /// Make `next` the children of `frame_id` and restore contiguity: the
    /// children (with their bound labels) end up as one block directly below
    /// the frame, in the order given by `next`. Former children stay where
    /// they are. A missing frame leaves the scene unchanged.
    pub fn repair_ordering(
        &mut self,
        elements: Vec<Element>,
        next: &[ElementId],
        frame_id: &ElementId,
        ctx: &SelectionContext,
    ) -> Vec<Element> {
        let mut elements = elements;
        if find_frame(&elements, frame_id).is_none() {
            debug!(frame:? = frame_id; "Repair of unknown frame ignored");
            return elements;
        }
        self.replace_all_in_frame(&mut elements, next, frame_id, ctx);

        let order: Vec<ElementId> = {
            let members: HashSet<&ElementId> = frame_children(&elements, frame_id)
                .into_iter()
                .map(|e| &e.id)
                .collect();
            let by_id: HashMap<&ElementId, &Element> =
                elements.iter().map(|e| (&e.id, e)).collect();
            let mut seen: HashSet<&ElementId> = HashSet::new();
            let mut order = Vec::new();
            for id in next {
                if !members.contains(id) || !seen.insert(id) {
                    continue;
                }
                order.push(id.clone());
                if let Some(text) = by_id.get(id).and_then(|e| e.bound_text_id())
                    && members.contains(text)
                    && seen.insert(text)
                {
                    order.push(text.clone());
                }
            }
            for element in &elements {
                if members.contains(&element.id) && seen.insert(&element.id) {
                    order.push(element.id.clone());
                }
            }
            order
        };
        self.move_above_element(elements, &order, frame_id)
    }
}
