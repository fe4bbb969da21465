// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The engine: collaborators shared by frame containment and z-order shifting.

use crate::groups::Groups;
use crate::indices::FractionalIndexer;
use crate::mutate::VersionBump;

/// Scene ordering and containment engine.
///
/// Holds only its collaborators: a group partition adapter `G`, an index
/// assigner `I` and a mutation primitive `M`. The scene itself is owned by the
/// caller and passed into every operation; nothing is kept between calls.
///
/// Frame operations live in [`crate::frame`], reordering in [`crate::zorder`].
#[derive(Clone, Debug, Default)]
pub struct Engine<G = Groups, I = FractionalIndexer, M = VersionBump> {
    pub(crate) groups: G,
    pub(crate) indexer: I,
    pub(crate) mutator: M,
}

impl Engine {
    /// An engine with the default collaborators.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<G, I, M> Engine<G, I, M> {
    /// An engine from explicit collaborators.
    pub fn with_parts(groups: G, indexer: I, mutator: M) -> Self {
        Self {
            groups,
            indexer,
            mutator,
        }
    }

    /// The group partition adapter.
    pub fn groups(&self) -> &G {
        &self.groups
    }

    /// The index assigner.
    pub fn indexer(&self) -> &I {
        &self.indexer
    }

    /// The mutation primitive.
    pub fn mutator(&self) -> &M {
        &self.mutator
    }

    /// Mutable access to the mutation primitive, e.g. to drain its journal.
    pub fn mutator_mut(&mut self) -> &mut M {
        &mut self.mutator
    }

    /// Split the engine into its collaborators.
    pub fn into_parts(self) -> (G, I, M) {
        (self.groups, self.indexer, self.mutator)
    }
}
