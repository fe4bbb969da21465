// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Group partition adapter.
//!
//! Elements list their groups deepest first, so the last entry is the
//! outermost group. Cohesion is always resolved through a [`GroupPartition`].

use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};

use crate::element::{Element, GroupId};

/// Resolves group chains into cohesive element sets.
pub trait GroupPartition {
    /// Members of `group`, in the order they are yielded.
    fn elements_in_group<'a, I>(&self, elements: I, group: &GroupId) -> Vec<&'a Element>
    where
        I: IntoIterator<Item = &'a Element>;

    /// Disjoint partition into maximal cohesive sets.
    ///
    /// The engine does not call this; it is provided for adapter callers
    /// such as selection and export.
    fn maximal_groups<'a, I>(&self, elements: I) -> Vec<Vec<&'a Element>>
    where
        I: IntoIterator<Item = &'a Element>;

    /// Groups that become selected when `elements` are selected while
    /// `editing_group` (if any) is being edited.
    fn groups_selected_by_elements<'a, I>(
        &self,
        elements: I,
        editing_group: Option<&GroupId>,
    ) -> HashSet<GroupId>
    where
        I: IntoIterator<Item = &'a Element>;
}

/// Default [`GroupPartition`] over `group_ids` chains.
#[derive(Clone, Copy, Debug, Default)]
pub struct Groups;

impl GroupPartition for Groups {
    fn elements_in_group<'a, I>(&self, elements: I, group: &GroupId) -> Vec<&'a Element>
    where
        I: IntoIterator<Item = &'a Element>,
    {
        elements
            .into_iter()
            .filter(|e| is_in_group(e, group))
            .collect()
    }

    fn maximal_groups<'a, I>(&self, elements: I) -> Vec<Vec<&'a Element>>
    where
        I: IntoIterator<Item = &'a Element>,
    {
        // Ungrouped elements are keyed by their own id.
        let mut slots: HashMap<(bool, &'a str), usize> = HashMap::new();
        let mut parts: Vec<Vec<&'a Element>> = Vec::new();
        for element in elements {
            let key = element
                .shallowest_group()
                .map_or((false, element.id.as_str()), |g| (true, g.as_str()));
            let slot = *slots.entry(key).or_insert_with(|| {
                parts.push(Vec::new());
                parts.len() - 1
            });
            parts[slot].push(element);
        }
        parts
    }

    fn groups_selected_by_elements<'a, I>(
        &self,
        elements: I,
        editing_group: Option<&GroupId>,
    ) -> HashSet<GroupId>
    where
        I: IntoIterator<Item = &'a Element>,
    {
        let mut selected = HashSet::new();
        for element in elements {
            let mut chain = &element.group_ids[..];
            if let Some(editing) = editing_group
                && let Some(at) = chain.iter().position(|g| g == editing)
            {
                chain = &chain[..at];
            }
            if let Some(outermost) = chain.last() {
                selected.insert(outermost.clone());
            }
        }
        selected
    }
}

/// Whether `element` belongs to `group` at any depth.
pub fn is_in_group(element: &Element, group: &GroupId) -> bool {
    element.group_ids.contains(group)
}

/// Whether two elements share their deepest group.
///
/// Not used by the engine; provided for adapter callers.
pub fn shares_immediate_group(a: &Element, b: &Element) -> bool {
    match (a.group_ids.first(), b.group_ids.first()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;
    use alloc::vec;

    fn rect(id: &str, groups: &[&str]) -> Element {
        Element::new(id, ElementKind::Rectangle).with_groups(groups.iter().copied())
    }

    #[test]
    fn members_in_scene_order() {
        let elements = vec![rect("a", &["g"]), rect("b", &[]), rect("c", &["h", "g"])];
        let ids: Vec<_> = Groups
            .elements_in_group(&elements, &"g".into())
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn maximal_groups_key_on_outermost() {
        let elements = vec![
            rect("a", &["inner", "outer"]),
            rect("b", &[]),
            rect("c", &["outer"]),
            rect("d", &["other"]),
        ];
        let parts: Vec<Vec<&str>> = Groups
            .maximal_groups(&elements)
            .into_iter()
            .map(|p| p.iter().map(|e| e.id.as_str()).collect())
            .collect();
        assert_eq!(parts, vec![vec!["a", "c"], vec!["b"], vec!["d"]]);
    }

    #[test]
    fn selection_stops_below_editing_group() {
        let elements = vec![rect("a", &["inner", "outer"]), rect("b", &["outer"])];
        let none = Groups.groups_selected_by_elements(&elements, None);
        assert_eq!(none.len(), 1);
        assert!(none.contains(&GroupId::from("outer")));

        let editing = GroupId::from("outer");
        let inside = Groups.groups_selected_by_elements(&elements, Some(&editing));
        assert_eq!(inside.len(), 1);
        assert!(inside.contains(&GroupId::from("inner")));
    }

    #[test]
    fn immediate_group_is_deepest() {
        assert!(shares_immediate_group(
            &rect("a", &["g", "o"]),
            &rect("b", &["g", "o"])
        ));
        assert!(!shares_immediate_group(
            &rect("a", &["g", "o"]),
            &rect("b", &["o"])
        ));
        assert!(!shares_immediate_group(&rect("a", &[]), &rect("b", &[])));
    }
}
