use common::shapes::{Aabb, Collider, ColliderId};
use quadtree::quadtree::DynamicQuadtree;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Platform,
    Player,
    Enemy,
}

/// What the shared index stores: an id, what it is, and a snapshot of where it
/// was when last filed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialEntry {
    pub id: ColliderId,
    pub kind: EntityKind,
    pub bounds: Aabb,
}

impl SpatialEntry {
    pub fn new(id: ColliderId, kind: EntityKind, bounds: Aabb) -> Self {
        Self { id, kind, bounds }
    }

    pub fn is_solid(&self) -> bool {
        self.kind == EntityKind::Platform
    }
}

impl Collider for SpatialEntry {
    fn id(&self) -> ColliderId {
        self.id
    }

    fn bounds(&self) -> Aabb {
        self.bounds
    }
}

/// The quadtree every body moves through. One lock for the whole structure.
pub type SharedQuadtree = Arc<Mutex<DynamicQuadtree<SpatialEntry>>>;

pub fn share(tree: DynamicQuadtree<SpatialEntry>) -> SharedQuadtree {
    Arc::new(Mutex::new(tree))
}

/// Lock the shared tree, carrying on if a panicking worker poisoned it.
///
/// Every tree operation either completes or leaves the index pointing at a
/// node that the update fallbacks can repair, so the data is still usable.
pub fn lock_tree(tree: &SharedQuadtree) -> MutexGuard<'_, DynamicQuadtree<SpatialEntry>> {
    tree.lock().unwrap_or_else(|poisoned| {
        log::warn!("quadtree lock was poisoned by a panicking thread, recovering");
        PoisonError::into_inner(poisoned)
    })
}

/// Hands out collider ids in increasing order.
#[derive(Debug, Clone, Default)]
pub struct ColliderIds {
    next: u64,
}

impl ColliderIds {
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    pub fn next_id(&mut self) -> ColliderId {
        let id = ColliderId(self.next);
        self.next += 1;
        id
    }

    pub fn peek(&self) -> ColliderId {
        ColliderId(self.next)
    }
}
