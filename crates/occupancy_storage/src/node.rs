use crate::{log_odds_to_probability, Measurement, SensorModel};

use serde::{Deserialize, Serialize};

/// Handle of a node in the `Octree`'s arena.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub(crate) fn from_slab_key(key: usize) -> Self {
        // Slab keys are dense, so they stay far below u32::MAX for any tree that fits in memory.
        debug_assert!(key < u32::MAX as usize);

        Self(key as u32)
    }

    #[inline]
    pub(crate) fn slab_key(self) -> usize {
        self.0 as usize
    }
}

/// One cube of space. It stores nothing but its occupancy estimate and the handles of the children that differ from it.
///
/// An absent child means the whole octant shares this node's estimate. No geometry is stored; the position of a node is
/// implied by the path taken to reach it.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct OccupancyNode {
    log_odds: f32,
    children: [Option<NodeId>; 8],
}

impl OccupancyNode {
    #[inline]
    pub(crate) fn new(log_odds: f32) -> Self {
        Self {
            log_odds,
            children: [None; 8],
        }
    }

    /// Accumulated log-odds of occupancy.
    #[inline]
    pub fn log_odds(&self) -> f32 {
        self.log_odds
    }

    #[inline]
    pub fn probability(&self) -> f32 {
        log_odds_to_probability(self.log_odds)
    }

    #[inline]
    pub fn is_occupied(&self, threshold: f32) -> bool {
        self.probability() >= threshold
    }

    /// Fuse one observation into this node's estimate. This is the only way an estimate changes, apart from pruning.
    #[inline]
    pub fn fuse(&mut self, model: &SensorModel, measurement: Measurement) {
        self.log_odds = model.fuse(self.log_odds, measurement);
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        self.children.iter().any(Option::is_some)
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        !self.has_children()
    }

    #[inline]
    pub fn child(&self, child_index: u8) -> Option<NodeId> {
        self.children[child_index as usize]
    }

    #[inline]
    pub fn children(&self) -> &[Option<NodeId>; 8] {
        &self.children
    }

    #[inline]
    pub(crate) fn set_child(&mut self, child_index: u8, child: Option<NodeId>) {
        self.children[child_index as usize] = child;
    }

    #[inline]
    pub(crate) fn set_log_odds(&mut self, log_odds: f32) {
        self.log_odds = log_odds;
    }

    #[inline]
    pub(crate) fn take_children(&mut self) -> [Option<NodeId>; 8] {
        std::mem::replace(&mut self.children, [None; 8])
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
