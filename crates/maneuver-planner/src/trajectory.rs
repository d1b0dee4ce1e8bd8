//! Patched Trajectory
//!
//! Arena of orbit patches linked into successor chains, plus the maneuver
//! nodes already planned on them. Read-only lookup of the patch that is in
//! effect at a given time.

use crate::{PlannerError, Result};
use nalgebra::Vector3;
use tracing::debug;

/// Index of a patch inside a [`PatchedTrajectory`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatchId(usize);

impl PatchId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One orbit segment and its link to the segment that follows it
#[derive(Debug, Clone)]
pub struct Patch<O> {
    pub orbit: O,
    /// Time from which this patch is valid
    pub start_ut: f64,
    /// Inactive patches are predicted but not yet in effect
    pub active: bool,
    pub next: Option<PatchId>,
}

/// A maneuver node already in the plan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedNode {
    pub ut: f64,
    /// Delta-v in node coordinates
    pub delta_v: Vector3<f64>,
    /// Patch that begins once this node executes
    pub next_patch: PatchId,
}

/// Current orbit, predicted successors and planned nodes
#[derive(Debug, Clone)]
pub struct PatchedTrajectory<O> {
    patches: Vec<Patch<O>>,
    current: PatchId,
    nodes: Vec<PlannedNode>,
}

impl<O> PatchedTrajectory<O> {
    /// Start a trajectory whose only patch is the vehicle's current orbit
    pub fn new(orbit: O, start_ut: f64) -> Self {
        Self {
            patches: vec![Patch {
                orbit,
                start_ut,
                active: true,
                next: None,
            }],
            current: PatchId(0),
            nodes: Vec::new(),
        }
    }

    pub fn current(&self) -> PatchId {
        self.current
    }

    pub fn nodes(&self) -> &[PlannedNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    pub fn patch(&self, id: PatchId) -> Result<&Patch<O>> {
        self.patches
            .get(id.0)
            .ok_or(PlannerError::UnknownPatch(id.0))
    }

    /// Add an unlinked patch
    pub fn add_patch(&mut self, orbit: O, start_ut: f64, active: bool) -> PatchId {
        self.patches.push(Patch {
            orbit,
            start_ut,
            active,
            next: None,
        });
        PatchId(self.patches.len() - 1)
    }

    /// Make `to` the successor of `from`
    pub fn link(&mut self, from: PatchId, to: PatchId) -> Result<()> {
        self.patch(to)?;
        let patch = self
            .patches
            .get_mut(from.0)
            .ok_or(PlannerError::UnknownPatch(from.0))?;
        patch.next = Some(to);
        Ok(())
    }

    /// Record a node that is already part of the plan
    pub fn add_node(&mut self, node: PlannedNode) -> Result<()> {
        if !node.ut.is_finite() {
            return Err(PlannerError::InvalidNode(format!(
                "execution time must be finite, got {}",
                node.ut
            )));
        }
        self.patch(node.next_patch)?;
        self.nodes.push(node);
        Ok(())
    }

    /// Patch in effect at `ut`.
    ///
    /// Starts from the patch produced by the latest node executing before
    /// `ut` (or the current patch), then follows active successors whose
    /// start time is still before `ut`. Among nodes sharing that time the
    /// one planned first wins.
    pub fn patch_at(&self, ut: f64) -> Result<PatchId> {
        // max_by keeps the last maximum, so scan newest first
        let earlier = self
            .nodes
            .iter()
            .rev()
            .filter(|n| n.ut < ut)
            .max_by(|a, b| a.ut.total_cmp(&b.ut));

        let mut id = earlier.map_or(self.current, |n| n.next_patch);
        debug!(ut, start = id.0, from_node = earlier.is_some(), "Resolving patch");

        let mut patch = self.patch(id)?;
        let mut steps = 0;
        while let Some(next_id) = patch.next {
            let next = self.patch(next_id)?;
            if !(next.active && next.start_ut < ut) {
                break;
            }

            steps += 1;
            if steps > self.len() {
                return Err(PlannerError::CyclicPatchChain(id.0));
            }

            debug!(ut, patch = next_id.0, start_ut = next.start_ut, "Following successor");
            id = next_id;
            patch = next;
        }

        Ok(id)
    }
}
