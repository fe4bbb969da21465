// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The element mutation primitive and the journal of mutated elements.

use alloc::vec::Vec;

use hashbrown::HashSet;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use strata_fractional::FractionalIndex;

use crate::element::{Element, ElementId};

/// Field patch applied through a [`Mutator`].
///
/// Each field is `None` to leave the element's value alone, or `Some(value)`
/// to overwrite it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementUpdate {
    /// New frame membership.
    pub frame_id: Option<Option<ElementId>>,
    /// New fractional index.
    pub index: Option<Option<FractionalIndex>>,
}

impl ElementUpdate {
    /// Patch that sets (or clears) the frame membership.
    pub fn frame(frame_id: Option<ElementId>) -> Self {
        Self {
            frame_id: Some(frame_id),
            ..Self::default()
        }
    }

    /// Patch that sets the fractional index.
    pub fn index(index: FractionalIndex) -> Self {
        Self {
            index: Some(Some(index)),
            ..Self::default()
        }
    }

    /// Whether the patch touches no field.
    pub fn is_empty(&self) -> bool {
        self.frame_id.is_none() && self.index.is_none()
    }

    /// Write the patched fields into `element`.
    ///
    /// Returns `true` if any field actually changed. Version fields are left
    /// to the [`Mutator`].
    pub fn apply(self, element: &mut Element) -> bool {
        let mut changed = false;
        if let Some(frame_id) = self.frame_id
            && element.frame_id != frame_id
        {
            element.frame_id = frame_id;
            changed = true;
        }
        if let Some(index) = self.index
            && element.index != index
        {
            element.index = index;
            changed = true;
        }
        changed
    }
}

/// The only path through which the engine writes `frame_id` and `index`.
///
/// Implementations apply the patch, bump version bookkeeping, and notify
/// whatever caches depend on the element.
pub trait Mutator {
    /// Apply `update` to `element`.
    fn mutate(&mut self, element: &mut Element, update: ElementUpdate);
}

impl<M: Mutator + ?Sized> Mutator for &mut M {
    fn mutate(&mut self, element: &mut Element, update: ElementUpdate) {
        (**self).mutate(element, update);
    }
}

/// Ids of elements mutated since the journal was last drained.
#[derive(Clone, Debug, Default)]
pub struct Mutations {
    /// Mutated element ids, in first-mutation order.
    pub changed: Vec<ElementId>,
    seen: HashSet<ElementId>,
}

impl Mutations {
    /// Whether nothing was mutated.
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    /// Number of distinct mutated elements.
    pub fn len(&self) -> usize {
        self.changed.len()
    }

    /// Whether `id` was mutated.
    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    fn record(&mut self, id: &ElementId) {
        if self.seen.insert(id.clone()) {
            self.changed.push(id.clone());
        }
    }
}

/// Default [`Mutator`]: bumps `version`, draws a fresh `version_nonce`,
/// stamps `updated`, and journals the element id.
#[derive(Clone, Debug)]
pub struct VersionBump {
    rng: SmallRng,
    tick: u64,
    journal: Mutations,
}

impl VersionBump {
    const DEFAULT_SEED: u64 = 0x5EED_5CE2;

    /// A mutator with the default nonce seed.
    pub fn new() -> Self {
        Self::with_seed(Self::DEFAULT_SEED)
    }

    /// A mutator whose nonce sequence is derived from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            tick: 0,
            journal: Mutations::default(),
        }
    }

    /// Mutations recorded so far.
    pub fn mutations(&self) -> &Mutations {
        &self.journal
    }

    /// Drain the journal, typically to invalidate render caches.
    pub fn take_mutations(&mut self) -> Mutations {
        core::mem::take(&mut self.journal)
    }

    #[cfg(feature = "std")]
    fn now(&mut self) -> u64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        self.tick += 1;
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(self.tick)
    }

    #[cfg(not(feature = "std"))]
    fn now(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}

impl Default for VersionBump {
    fn default() -> Self {
        Self::new()
    }
}

impl Mutator for VersionBump {
    fn mutate(&mut self, element: &mut Element, update: ElementUpdate) {
        if update.is_empty() || !update.apply(element) {
            return;
        }
        element.version = element.version.wrapping_add(1);
        element.version_nonce = self.rng.random();
        element.updated = self.now();
        self.journal.record(&element.id);
    }
}
