//! The `OccupancyTable` — which train holds which block.

use std::collections::BTreeMap;

use rg_core::{EdgeId, TrainId};
use rg_network::EdgeOccupancy;

use crate::{MotionError, MotionResult};

/// `EdgeId → TrainId`, at most one train per edge.
///
/// Kept outside the network so the graph stays immutable and shareable.  A
/// `BTreeMap` keeps iteration in edge order for deterministic snapshots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OccupancyTable {
    inner: BTreeMap<EdgeId, TrainId>,
}

impl OccupancyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// `true` if `edge` is free or already held by `train`.
    pub fn is_free_for(&self, edge: EdgeId, train: &TrainId) -> bool {
        self.inner.get(&edge).is_none_or(|holder| holder == train)
    }

    /// Take `edge` for `train`.  Idempotent for the current holder.
    ///
    /// # Errors
    ///
    /// [`MotionError::OccupancyConflict`] if another train holds the edge;
    /// the table is left unchanged.
    pub fn claim(&mut self, edge: EdgeId, train: &TrainId) -> MotionResult<()> {
        match self.inner.get(&edge) {
            Some(holder) if holder != train => Err(MotionError::OccupancyConflict {
                edge,
                holder:   holder.clone(),
                claimant: train.clone(),
            }),
            Some(_) => Ok(()),
            None => {
                self.inner.insert(edge, train.clone());
                Ok(())
            }
        }
    }

    /// Give up `edge` if `train` holds it.  Returns whether anything changed.
    pub fn release(&mut self, edge: EdgeId, train: &TrainId) -> bool {
        if self.inner.get(&edge) == Some(train) {
            self.inner.remove(&edge);
            true
        } else {
            false
        }
    }

    /// Move `train` from `from` (if any) onto `to` as one step: `to` is
    /// checked before `from` is released, so a conflict leaves both entries
    /// as they were.
    pub fn transfer(
        &mut self,
        from:  Option<EdgeId>,
        to:    EdgeId,
        train: &TrainId,
    ) -> MotionResult<()> {
        if !self.is_free_for(to, train) {
            return self.claim(to, train);
        }
        if let Some(old) = from.filter(|&old| old != to) {
            self.release(old, train);
        }
        self.claim(to, train)
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Entries in ascending `EdgeId` order.
    pub fn iter(&self) -> impl Iterator<Item = (EdgeId, &TrainId)> + '_ {
        self.inner.iter().map(|(&e, t)| (e, t))
    }
}

impl EdgeOccupancy for OccupancyTable {
    fn occupant(&self, edge: EdgeId) -> Option<&TrainId> {
        self.inner.get(&edge)
    }
}
