// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The slice of editor state the engine reads.

use hashbrown::HashSet;

use crate::element::{Element, ElementId, GroupId};

/// Selection, editing-group and drop-target state for one operation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionContext {
    /// Selected element ids.
    pub selected: HashSet<ElementId>,
    /// Group the user has entered for editing, if any.
    pub editing_group_id: Option<GroupId>,
    /// Frame currently highlighted as the drop target of a drag.
    pub frame_to_highlight: Option<ElementId>,
}

impl SelectionContext {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context selecting exactly `ids`.
    pub fn selecting<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ElementId>,
    {
        Self {
            selected: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Set the editing group.
    pub fn with_editing_group(mut self, group: impl Into<GroupId>) -> Self {
        self.editing_group_id = Some(group.into());
        self
    }

    /// Set the highlighted drop-target frame.
    pub fn with_frame_to_highlight(mut self, frame: impl Into<ElementId>) -> Self {
        self.frame_to_highlight = Some(frame.into());
        self
    }

    /// Whether `id` is selected.
    pub fn is_selected(&self, id: &ElementId) -> bool {
        self.selected.contains(id)
    }
}

/// Selected, non-deleted elements plus the text labels of selected
/// containers and the children of selected frames.
pub fn selected_with_dependents(
    elements: &[Element],
    ctx: &SelectionContext,
) -> HashSet<ElementId> {
    let direct: HashSet<&ElementId> = elements
        .iter()
        .filter(|e| !e.is_deleted() && ctx.is_selected(&e.id))
        .map(|e| &e.id)
        .collect();
    let frames: HashSet<&ElementId> = elements
        .iter()
        .filter(|e| e.is_frame_like() && direct.contains(&e.id))
        .map(|e| &e.id)
        .collect();

    elements
        .iter()
        .filter(|e| !e.is_deleted())
        .filter(|e| {
            direct.contains(&e.id)
                || e.container_id().is_some_and(|c| direct.contains(c))
                || e.frame_id.as_ref().is_some_and(|f| frames.contains(f))
        })
        .map(|e| e.id.clone())
        .collect()
}
