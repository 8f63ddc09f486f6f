use super::config::Config;
use super::node::{quadrant_for, Node, NodeId, Quadrant};
use common::shapes::{Aabb, Collider, ColliderId};
use smallvec::SmallVec;

type NodeStack = SmallVec<[NodeId; 64]>;

/// Recursive spatial partition over an arena of nodes.
///
/// This is the unchecked broad phase: it trusts its input rectangles and never
/// merges nodes back once split. [`super::DynamicQuadtree`] adds validation and
/// an id -> node index on top.
pub struct Quadtree<T> {
    nodes: Vec<Node<T>>,
    config: Config,
}

impl<T: Collider> Quadtree<T> {
    pub fn new(bounds: Aabb) -> Self {
        Self::new_with_config(bounds, Config::default())
    }

    pub fn new_with_config(bounds: Aabb, config: Config) -> Self {
        Self {
            nodes: vec![Node::new(0, bounds)],
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn bounds(&self) -> Aabb {
        self.nodes[NodeId::ROOT.index()].bounds
    }

    pub fn node(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // Insert an object, descending as far as it fits in a single quadrant
    pub fn insert(&mut self, obj: T) {
        let mut moved = Vec::new();
        self.insert_at(NodeId::ROOT, obj, &mut moved);
    }

    /// Like [`Quadtree::insert`], but reports where the object landed and every
    /// object that a resulting split pushed into a child.
    ///
    /// `moved` is ordered: when the same id appears twice the later entry wins.
    pub(crate) fn insert_tracked(
        &mut self,
        obj: T,
        moved: &mut Vec<(ColliderId, NodeId)>,
    ) -> NodeId {
        self.insert_at(NodeId::ROOT, obj, moved)
    }

    fn insert_at(
        &mut self,
        start: NodeId,
        obj: T,
        moved: &mut Vec<(ColliderId, NodeId)>,
    ) -> NodeId {
        let rect = obj.bounds();
        let mut current = start;
        while let Some(children) = self.nodes[current.index()].children {
            match quadrant_for(&self.nodes[current.index()].bounds, &rect) {
                Some(quadrant) => current = children[quadrant.index()],
                None => break,
            }
        }

        let id = obj.id();
        let node = &mut self.nodes[current.index()];
        node.objects.push(obj);
        if node.objects.len() > self.config.max_objects && node.level < self.config.max_levels {
            let mark = moved.len();
            self.redistribute(current, moved);
            // The split may have carried the new object further down.
            if let Some(&(_, landed)) = moved[mark..].iter().rev().find(|(moved_id, _)| *moved_id == id) {
                return landed;
            }
        }
        current
    }

    // Split the node if needed and push every object that fits a child down into it
    fn redistribute(&mut self, node_id: NodeId, moved: &mut Vec<(ColliderId, NodeId)>) {
        if self.nodes[node_id.index()].children.is_none() {
            self.split(node_id);
        }
        let Some(children) = self.nodes[node_id.index()].children else {
            return;
        };
        let bounds = self.nodes[node_id.index()].bounds;
        let held = std::mem::take(&mut self.nodes[node_id.index()].objects);
        for obj in held {
            match quadrant_for(&bounds, &obj.bounds()) {
                Some(quadrant) => {
                    let id = obj.id();
                    let landed = self.insert_at(children[quadrant.index()], obj, moved);
                    moved.push((id, landed));
                }
                None => self.nodes[node_id.index()].objects.push(obj),
            }
        }
    }

    fn split(&mut self, node_id: NodeId) {
        let bounds = self.nodes[node_id.index()].bounds;
        let level = self.nodes[node_id.index()].level + 1;
        let first = self.nodes.len() as u32;
        for quadrant in Quadrant::ALL {
            self.nodes
                .push(Node::new(level, quadrant.bounds_within(&bounds)));
        }
        self.nodes[node_id.index()].children =
            Some([NodeId(first), NodeId(first + 1), NodeId(first + 2), NodeId(first + 3)]);
        log::debug!("quadtree split node {:?} into level {}", node_id, level);
    }

    /// Call `f` for every object that may overlap `rect`.
    ///
    /// Over-inclusive: callers still need a precise intersection test.
    pub fn retrieve_with<'a, F>(&'a self, rect: &Aabb, mut f: F)
    where
        F: FnMut(&'a T),
    {
        let mut stack = NodeStack::new();
        stack.push(NodeId::ROOT);
        while let Some(node_id) = stack.pop() {
            let node = &self.nodes[node_id.index()];
            for obj in &node.objects {
                f(obj);
            }
            let Some(children) = node.children else {
                continue;
            };
            match quadrant_for(&node.bounds, rect) {
                Some(quadrant) => stack.push(children[quadrant.index()]),
                None => {
                    // Push in reverse so children are visited NE, NW, SW, SE.
                    for child in children.iter().rev() {
                        if self.nodes[child.index()].bounds.intersects(rect) {
                            stack.push(*child);
                        }
                    }
                }
            }
        }
    }

    pub fn retrieve(&self, rect: &Aabb) -> Vec<&T> {
        let mut found = Vec::new();
        self.retrieve_with(rect, |obj| found.push(obj));
        found
    }

    /// Remove `id` from this node only.
    pub(crate) fn remove_from_node(&mut self, node_id: NodeId, id: ColliderId) -> Option<T> {
        let objects = &mut self.nodes.get_mut(node_id.index())?.objects;
        let position = objects.iter().position(|obj| obj.id() == id)?;
        Some(objects.remove(position))
    }

    /// Remove `id` from the first node holding it in the subtree rooted at `start`.
    pub(crate) fn remove_from_subtree(&mut self, start: NodeId, id: ColliderId) -> Option<T> {
        let mut stack = NodeStack::new();
        stack.push(start);
        while let Some(node_id) = stack.pop() {
            if let Some(obj) = self.remove_from_node(node_id, id) {
                return Some(obj);
            }
            if let Some(children) = self.nodes[node_id.index()].children {
                stack.extend(children);
            }
        }
        None
    }

    /// Total number of stored objects, counting every node.
    pub fn len(&self) -> usize {
        self.nodes.iter().map(|node| node.objects.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.iter().all(|node| node.objects.is_empty())
    }

    pub fn depth(&self) -> usize {
        self.nodes.iter().map(|node| node.level).max().unwrap_or(0)
    }

    /// Drop every object and collapse back to a single empty root.
    pub fn clear(&mut self) {
        let bounds = self.bounds();
        self.nodes.clear();
        self.nodes.push(Node::new(0, bounds));
    }

    pub fn all_node_bounds(&self, bounding_boxes: &mut Vec<Aabb>) {
        bounding_boxes.extend(self.nodes.iter().map(|node| node.bounds));
    }

    pub fn all_objects(&self) -> impl Iterator<Item = &T> + '_ {
        self.nodes.iter().flat_map(|node| node.objects.iter())
    }

    /// Number of stored copies of `id`; anything but 0 or 1 is a bug.
    pub fn count_of(&self, id: ColliderId) -> usize {
        self.all_objects().filter(|obj| obj.id() == id).count()
    }

    /// Node currently holding `id`, found by walking the whole tree.
    pub fn find(&self, id: ColliderId) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.objects.iter().any(|obj| obj.id() == id))
            .map(|index| NodeId(index as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64, x: f32, y: f32) -> (ColliderId, Aabb) {
        (ColliderId(id), Aabb::new(x, y, 2.0, 2.0))
    }

    fn small_config() -> Config {
        Config {
            max_objects: 2,
            max_levels: 3,
        }
    }

    #[test]
    fn splits_when_over_capacity() {
        let mut qt = Quadtree::new_with_config(Aabb::new(0.0, 0.0, 100.0, 100.0), small_config());
        qt.insert(entry(0, 10.0, 10.0));
        qt.insert(entry(1, 70.0, 10.0));
        assert!(qt.node(NodeId::ROOT).is_leaf());
        qt.insert(entry(2, 10.0, 70.0));
        assert!(!qt.node(NodeId::ROOT).is_leaf());
        assert!(qt.node(NodeId::ROOT).objects().is_empty());
        assert_eq!(qt.len(), 3);
    }

    #[test]
    fn straddlers_stay_at_parent() {
        let mut qt = Quadtree::new_with_config(Aabb::new(0.0, 0.0, 100.0, 100.0), small_config());
        qt.insert((ColliderId(0), Aabb::new(45.0, 45.0, 10.0, 10.0)));
        qt.insert(entry(1, 10.0, 10.0));
        qt.insert(entry(2, 70.0, 70.0));
        let root = qt.node(NodeId::ROOT);
        assert_eq!(root.objects().len(), 1);
        assert_eq!(root.objects()[0].0, ColliderId(0));
    }

    #[test]
    fn never_splits_past_max_levels() {
        let config = Config {
            max_objects: 1,
            max_levels: 2,
        };
        let mut qt = Quadtree::new_with_config(Aabb::new(0.0, 0.0, 100.0, 100.0), config);
        for i in 0..20 {
            qt.insert(entry(i, 1.0, 1.0));
        }
        assert_eq!(qt.depth(), 2);
        assert_eq!(qt.len(), 20);
    }

    #[test]
    fn tracked_insert_reports_moves() {
        let mut qt = Quadtree::new_with_config(Aabb::new(0.0, 0.0, 100.0, 100.0), small_config());
        let mut moved = Vec::new();
        qt.insert_tracked(entry(0, 10.0, 10.0), &mut moved);
        qt.insert_tracked(entry(1, 70.0, 10.0), &mut moved);
        assert!(moved.is_empty());
        qt.insert_tracked(entry(2, 70.0, 70.0), &mut moved);
        assert_eq!(moved.len(), 3);
        for (id, node) in moved {
            assert!(qt.node(node).objects().iter().any(|obj| obj.0 == id));
        }
    }

    #[test]
    fn tracked_insert_follows_cascading_splits() {
        let config = Config {
            max_objects: 2,
            max_levels: 5,
        };
        let mut qt = Quadtree::new_with_config(Aabb::new(0.0, 0.0, 100.0, 100.0), config);
        let mut moved = Vec::new();
        qt.insert_tracked((ColliderId(0), Aabb::new(1.0, 1.0, 1.0, 1.0)), &mut moved);
        qt.insert_tracked((ColliderId(1), Aabb::new(1.5, 1.5, 1.0, 1.0)), &mut moved);
        let landed = qt.insert_tracked((ColliderId(2), Aabb::new(2.0, 2.0, 1.0, 1.0)), &mut moved);

        assert!(qt.node(landed).objects().iter().any(|obj| obj.0 == ColliderId(2)));
        assert_eq!(qt.find(ColliderId(2)), Some(landed));
        // The last entry recorded for each id names the node that holds it.
        for id in 0..2 {
            let id = ColliderId(id);
            let (_, node) = moved.iter().rev().find(|(moved_id, _)| *moved_id == id).unwrap();
            assert!(qt.node(*node).objects().iter().any(|obj| obj.0 == id));
        }
    }

    #[test]
    fn clear_resets_to_leaf() {
        let mut qt = Quadtree::new_with_config(Aabb::new(0.0, 0.0, 100.0, 100.0), small_config());
        for i in 0..10 {
            qt.insert(entry(i, i as f32 * 9.0, 5.0));
        }
        qt.clear();
        assert_eq!(qt.node_count(), 1);
        assert!(qt.is_empty());
        assert_eq!(qt.bounds(), Aabb::new(0.0, 0.0, 100.0, 100.0));
    }
}
