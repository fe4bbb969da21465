// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fractional index assignment.
//!
//! Scene order is the array order; every element that has an index must
//! carry one strictly greater than the element before it. Reordering only
//! re-stamps the elements that moved, leaving every other key untouched.

use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};
use log::{trace, warn};
use strata_fractional::{FractionalIndex, KeyError, n_keys_between};
use thiserror::Error;

use crate::element::{Element, ElementId};
use crate::mutate::{ElementUpdate, Mutator};

/// Why a scene's indices are not in a consistent state.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IndexError {
    /// An element has no index.
    #[error("element {id} at position {position} has no index")]
    Missing {
        /// Offending element.
        id: ElementId,
        /// Its scene position.
        position: usize,
    },
    /// An index does not sort above its predecessor.
    #[error("index {index} of {id} at position {position} is not above {previous}")]
    NotIncreasing {
        /// Offending element.
        id: ElementId,
        /// Its scene position.
        position: usize,
        /// Its index.
        index: FractionalIndex,
        /// Index of the element before it.
        previous: FractionalIndex,
    },
    /// A bound text label sorts below its container.
    #[error("bound text {text} is ordered below its container {container}")]
    TextBelowContainer {
        /// The label.
        text: ElementId,
        /// The container.
        container: ElementId,
    },
    /// Key generation failed.
    #[error(transparent)]
    Key(#[from] KeyError),
}

/// Options for [`validate_indices`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Also require bound text labels to sort above their containers.
    pub include_bound_text: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            include_bound_text: true,
        }
    }
}

/// Stamps fractional indices on elements whose scene position changed.
pub trait IndexAssigner {
    /// Re-index the elements in `moved` so that the scene is ordered again.
    ///
    /// Every write goes through `mutator`.
    fn assign_indices<M: Mutator>(
        &mut self,
        elements: &mut [Element],
        moved: &HashSet<ElementId>,
        mutator: &mut M,
    );
}

/// Default [`IndexAssigner`] built on [`strata_fractional`] keys.
#[derive(Clone, Copy, Debug, Default)]
pub struct FractionalIndexer {
    /// Validation applied to candidate indices before they are written.
    pub validate: ValidateOptions,
}

impl FractionalIndexer {
    /// An indexer with default validation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Regenerate the indices of moved elements that no longer fit between
    /// their unmoved neighbors, falling back to [`Self::sync_invalid_indices`] when
    /// that cannot produce a valid order.
    pub fn sync_moved_indices<M: Mutator>(
        &self,
        elements: &mut [Element],
        moved: &HashSet<ElementId>,
        mutator: &mut M,
    ) {
        match self.moved_updates(elements, moved) {
            Ok(updates) => {
                trace!(regenerated = updates.len(); "Synced moved indices");
                apply(elements, updates, mutator);
            }
            Err(err) => {
                warn!(err:?; "Moved indices could not be synced, repairing whole scene");
                self.sync_invalid_indices(elements, mutator);
            }
        }
    }

    /// Repair every missing or out-of-order index.
    ///
    /// Indices forming a strictly increasing chain are kept; runs between
    /// kept indices are regenerated. If even that fails, all indices are
    /// regenerated from scratch.
    pub fn sync_invalid_indices<M: Mutator>(&self, elements: &mut [Element], mutator: &mut M) {
        let updates = match invalid_updates(elements) {
            Ok(updates) => updates,
            Err(err) => {
                warn!(err:?; "Partial index repair failed, regenerating all indices");
                match n_keys_between(None, None, elements.len()) {
                    Ok(keys) => keys.into_iter().enumerate().collect(),
                    Err(err) => {
                        warn!(err:?; "Index regeneration failed");
                        return;
                    }
                }
            }
        };
        trace!(regenerated = updates.len(); "Synced invalid indices");
        apply(elements, updates, mutator);
    }

    fn moved_updates(
        &self,
        elements: &[Element],
        moved: &HashSet<ElementId>,
    ) -> Result<Vec<(usize, FractionalIndex)>, IndexError> {
        // Maximal runs of adjacent moved elements, bounded by unmoved
        // neighbors whose keys stay put.
        let mut updates = Vec::new();
        let mut i = 0;
        while i < elements.len() {
            if !moved.contains(&elements[i].id) {
                i += 1;
                continue;
            }
            let start = i;
            while i < elements.len() && moved.contains(&elements[i].id) {
                i += 1;
            }
            let lower = start.checked_sub(1).and_then(|p| elements[p].index.as_ref());
            let upper = elements.get(i).and_then(|n| n.index.as_ref());
            if run_fits(&elements[start..i], lower, upper) {
                continue;
            }
            let keys = n_keys_between(lower, upper, i - start)?;
            updates.extend((start..i).zip(keys));
        }

        {
            let overrides: HashMap<usize, &FractionalIndex> =
                updates.iter().map(|(i, k)| (*i, k)).collect();
            validate_with(
                elements,
                |i| overrides.get(&i).copied().or(elements[i].index.as_ref()),
                self.validate,
            )?;
        }
        Ok(updates)
    }
}

impl IndexAssigner for FractionalIndexer {
    fn assign_indices<M: Mutator>(
        &mut self,
        elements: &mut [Element],
        moved: &HashSet<ElementId>,
        mutator: &mut M,
    ) {
        self.sync_moved_indices(elements, moved, mutator);
    }
}

/// Check that every element has an index strictly above its predecessor's.
pub fn validate_indices(elements: &[Element], options: ValidateOptions) -> Result<(), IndexError> {
    validate_with(elements, |i| elements[i].index.as_ref(), options)
}

/// Stable sort by index. Unindexed elements go last; equal keys are ordered by id.
pub fn order_by_index(elements: &mut [Element]) {
    elements.sort_by(|a, b| match (&a.index, &b.index) {
        (Some(x), Some(y)) => x.cmp(y).then_with(|| a.id.cmp(&b.id)),
        (Some(_), None) => core::cmp::Ordering::Less,
        (None, Some(_)) => core::cmp::Ordering::Greater,
        (None, None) => core::cmp::Ordering::Equal,
    });
}

/// Whether every element of `run` has a key, increasing from `lower` to `upper`.
fn run_fits(
    run: &[Element],
    lower: Option<&FractionalIndex>,
    upper: Option<&FractionalIndex>,
) -> bool {
    let mut previous = lower;
    for element in run {
        let Some(index) = element.index.as_ref() else {
            return false;
        };
        if previous.is_some_and(|p| p >= index) {
            return false;
        }
        previous = Some(index);
    }
    match (previous, upper) {
        (Some(p), Some(u)) => p < u,
        _ => true,
    }
}

fn validate_with<'a>(
    elements: &'a [Element],
    index_at: impl Fn(usize) -> Option<&'a FractionalIndex>,
    options: ValidateOptions,
) -> Result<(), IndexError> {
    let mut previous: Option<&FractionalIndex> = None;
    for (position, element) in elements.iter().enumerate() {
        let index = index_at(position).ok_or_else(|| IndexError::Missing {
            id: element.id.clone(),
            position,
        })?;
        if let Some(prev) = previous
            && prev >= index
        {
            return Err(IndexError::NotIncreasing {
                id: element.id.clone(),
                position,
                index: index.clone(),
                previous: prev.clone(),
            });
        }
        previous = Some(index);
    }

    if options.include_bound_text {
        let positions: HashMap<&ElementId, usize> = elements
            .iter()
            .enumerate()
            .map(|(i, e)| (&e.id, i))
            .collect();
        for (position, container) in elements.iter().enumerate() {
            let Some(text) = container.bound_text_id() else {
                continue;
            };
            let Some(&text_position) = positions.get(text) else {
                continue;
            };
            if index_at(text_position) <= index_at(position) {
                return Err(IndexError::TextBelowContainer {
                    text: text.clone(),
                    container: container.id.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Keep the longest greedy increasing chain and fill the gaps.
fn invalid_updates(elements: &[Element]) -> Result<Vec<(usize, FractionalIndex)>, KeyError> {
    let mut updates = Vec::new();
    let mut lower: Option<&FractionalIndex> = None;
    let mut gap_start: Option<usize> = None;

    let mut fill = |from: usize,
                    to: usize,
                    lower: Option<&FractionalIndex>,
                    upper: Option<&FractionalIndex>|
     -> Result<(), KeyError> {
        let keys = n_keys_between(lower, upper, to - from)?;
        updates.extend((from..to).zip(keys));
        Ok(())
    };

    for (i, element) in elements.iter().enumerate() {
        match &element.index {
            Some(index) if lower.is_none_or(|l| l < index) => {
                if let Some(start) = gap_start.take() {
                    fill(start, i, lower, Some(index))?;
                }
                lower = Some(index);
            }
            _ => {
                gap_start.get_or_insert(i);
            }
        }
    }
    if let Some(start) = gap_start {
        fill(start, elements.len(), lower, None)?;
    }
    Ok(updates)
}

fn apply<M: Mutator>(
    elements: &mut [Element],
    updates: Vec<(usize, FractionalIndex)>,
    mutator: &mut M,
) {
    for (i, key) in updates {
        mutator.mutate(&mut elements[i], ElementUpdate::index(key));
    }
}
