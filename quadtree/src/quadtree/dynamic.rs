use super::config::Config;
use super::node::NodeId;
use super::tree::Quadtree;
use crate::error::{QuadtreeError, QuadtreeResult};
use common::shapes::{Aabb, Collider, ColliderId};
use fxhash::FxHashMap;

/// A [`Quadtree`] plus an id -> node index, so moving objects can be updated in
/// place instead of clearing and rebuilding the whole tree every tick.
///
/// The tree is the source of truth. The index only says where to look first.
/// After moving an indexed object, call [`DynamicQuadtree::update`] before it is
/// queried again or queries may miss it.
pub struct DynamicQuadtree<T> {
    root: Quadtree<T>,
    index: FxHashMap<ColliderId, NodeId>,
    moved: Vec<(ColliderId, NodeId)>,
}

impl<T: Collider> DynamicQuadtree<T> {
    pub fn new(bounds: Aabb) -> QuadtreeResult<Self> {
        Self::new_with_config(bounds, Config::default())
    }

    pub fn new_with_config(bounds: Aabb, config: Config) -> QuadtreeResult<Self> {
        bounds.validate().map_err(QuadtreeError::InvalidBounds)?;
        config.validate()?;
        Ok(Self {
            root: Quadtree::new_with_config(bounds, config),
            index: FxHashMap::default(),
            moved: Vec::new(),
        })
    }

    pub fn tree(&self) -> &Quadtree<T> {
        &self.root
    }

    pub fn bounds(&self) -> Aabb {
        self.root.bounds()
    }

    /// Insert `obj` and remember the node it landed in.
    ///
    /// An id that is already indexed is updated instead, so the tree never
    /// holds two copies of the same object.
    pub fn insert(&mut self, obj: T) -> QuadtreeResult<()> {
        validate(&obj)?;
        if self.index.contains_key(&obj.id()) {
            return self.update(obj);
        }
        self.insert_unchecked(obj);
        Ok(())
    }

    fn insert_unchecked(&mut self, obj: T) {
        let id = obj.id();
        let mut moved = std::mem::take(&mut self.moved);
        moved.clear();
        let landed = self.root.insert_tracked(obj, &mut moved);
        self.index.insert(id, landed);
        for (moved_id, node) in moved.drain(..) {
            self.index.insert(moved_id, node);
        }
        self.moved = moved;
    }

    /// Re-file `obj` under its current bounds.
    ///
    /// Removes the stored copy from the indexed node, falling back to that
    /// node's subtree and then the whole tree if the index went stale, and
    /// inserts it again from the root. Unknown ids are simply inserted.
    pub fn update(&mut self, obj: T) -> QuadtreeResult<()> {
        validate(&obj)?;
        let id = obj.id();
        let Some(&node) = self.index.get(&id) else {
            self.insert_unchecked(obj);
            return Ok(());
        };

        if self.root.remove_from_node(node, id).is_none()
            && self.root.remove_from_subtree(node, id).is_none()
            && self.root.remove_from_subtree(NodeId::ROOT, id).is_none()
        {
            log::warn!("quadtree index entry for {} pointed at nothing, reinserting", id);
        }
        self.insert_unchecked(obj);
        Ok(())
    }

    pub fn update_all<I>(&mut self, objs: I) -> QuadtreeResult<()>
    where
        I: IntoIterator<Item = T>,
    {
        for obj in objs {
            self.update(obj)?;
        }
        Ok(())
    }

    /// Remove `id` from its indexed node. Returns whether a stored copy was
    /// deleted; the index entry is dropped either way.
    pub fn remove(&mut self, id: ColliderId) -> bool {
        match self.index.remove(&id) {
            Some(node) => self.root.remove_from_node(node, id).is_some(),
            None => false,
        }
    }

    /// Everything that may overlap `rect` (broad phase).
    pub fn retrieve(&self, rect: &Aabb) -> QuadtreeResult<Vec<&T>> {
        rect.validate().map_err(QuadtreeError::InvalidShape)?;
        Ok(self.root.retrieve(rect))
    }

    pub fn retrieve_with<'a, F>(&'a self, rect: &Aabb, f: F) -> QuadtreeResult<()>
    where
        F: FnMut(&'a T),
    {
        rect.validate().map_err(QuadtreeError::InvalidShape)?;
        self.root.retrieve_with(rect, f);
        Ok(())
    }

    pub fn contains(&self, id: ColliderId) -> bool {
        self.index.contains_key(&id)
    }

    /// Node the index believes holds `id`.
    pub fn indexed_node(&self, id: ColliderId) -> Option<NodeId> {
        self.index.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn clear(&mut self) {
        self.root.clear();
        self.index.clear();
    }
}

fn validate<T: Collider>(obj: &T) -> QuadtreeResult<()> {
    obj.bounds().validate().map_err(QuadtreeError::InvalidShape)
}
