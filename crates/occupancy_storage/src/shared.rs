//! Copy-on-write snapshots of an `Octree` for readers running alongside a single writer.
//!
//! ```
//! use occupancy_core::prelude::*;
//! use occupancy_storage::prelude::*;
//!
//! let mut map = SharedOctree::new(OctreeConfig::default()).unwrap();
//! map.write().update_node(PointN([0.0, 0.0, 0.0]), true).unwrap();
//!
//! let snapshot = map.snapshot();
//! let reader = std::thread::spawn(move || snapshot.query_probability(PointN([0.0, 0.0, 0.0])).unwrap());
//!
//! // The writer keeps going. Its first write after taking a snapshot clones the tree.
//! map.write().update_node(PointN([0.0, 0.0, 0.0]), false).unwrap();
//!
//! assert!(reader.join().unwrap().unwrap() > 0.5);
//! ```

use crate::{Octree, OctreeConfig};

use occupancy_core::prelude::*;

use std::ops::Deref;
use std::sync::Arc;

/// An `Octree` that can hand out immutable snapshots.
#[derive(Clone, Debug)]
pub struct SharedOctree {
    current: Arc<Octree>,
}

impl SharedOctree {
    pub fn new(config: OctreeConfig) -> Result<Self, InvalidConfigurationError> {
        Ok(Self::from(Octree::new(config)?))
    }

    /// An immutable view of the current state. It is unaffected by later writes.
    #[inline]
    pub fn snapshot(&self) -> Arc<Octree> {
        Arc::clone(&self.current)
    }

    /// Mutable access for the single writer. Clones the tree if any snapshot is still alive.
    #[inline]
    pub fn write(&mut self) -> &mut Octree {
        Arc::make_mut(&mut self.current)
    }

    /// Returns `true` iff some snapshot of the current state is still alive, i.e. the next `write` will clone.
    #[inline]
    pub fn is_shared(&self) -> bool {
        Arc::strong_count(&self.current) > 1
    }

    pub fn into_inner(self) -> Octree {
        Arc::try_unwrap(self.current).unwrap_or_else(|shared| (*shared).clone())
    }
}

impl From<Octree> for SharedOctree {
    fn from(octree: Octree) -> Self {
        Self {
            current: Arc::new(octree),
        }
    }
}

impl Deref for SharedOctree {
    type Target = Octree;

    #[inline]
    fn deref(&self) -> &Octree {
        &self.current
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn snapshots_do_not_see_later_writes() {
        let mut map = SharedOctree::new(OctreeConfig::default()).unwrap();
        let p = PointN([1.0, 1.0, 1.0]);

        map.write().update_node(p, true).unwrap();
        let before = map.snapshot();
        assert!(map.is_shared());

        for _ in 0..5 {
            map.write().update_node(p, false).unwrap();
        }

        assert!(!map.is_shared());
        assert!(before.query_probability(p).unwrap().unwrap() > 0.5);
        assert!(map.query_probability(p).unwrap().unwrap() < 0.5);
    }

    #[test]
    fn writes_without_snapshots_do_not_clone() {
        let mut map = SharedOctree::new(OctreeConfig::default()).unwrap();

        let first = map.write() as *const Octree;
        map.write().update_node(PointN([0.0, 0.0, 0.0]), true).unwrap();
        let second = map.write() as *const Octree;

        assert_eq!(first, second);
        assert_eq!(map.into_inner().num_nodes(), 17);
    }
}
