use common::shapes::Aabb;

/// Index of a node inside a [`super::Quadtree`] arena. The root is always `NodeId(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    #[inline(always)]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    NorthEast = 0,
    NorthWest = 1,
    SouthWest = 2,
    SouthEast = 3,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthEast,
        Quadrant::NorthWest,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Bounds of this quadrant within `parent`.
    pub fn bounds_within(self, parent: &Aabb) -> Aabb {
        let half_w = parent.width / 2.0;
        let half_h = parent.height / 2.0;
        let (x, y) = match self {
            Quadrant::NorthEast => (parent.x + half_w, parent.y),
            Quadrant::NorthWest => (parent.x, parent.y),
            Quadrant::SouthWest => (parent.x, parent.y + half_h),
            Quadrant::SouthEast => (parent.x + half_w, parent.y + half_h),
        };
        Aabb::new(x, y, half_w, half_h)
    }
}

/// The single quadrant of `bounds` that fully holds `rect`, if any.
///
/// A rectangle touching either midpoint line straddles and gets `None`, as
/// does one that is not contained in `bounds` at all.
#[inline]
pub fn quadrant_for(bounds: &Aabb, rect: &Aabb) -> Option<Quadrant> {
    if !bounds.contains(rect) {
        return None;
    }
    let vertical_mid = bounds.x + bounds.width / 2.0;
    let horizontal_mid = bounds.y + bounds.height / 2.0;

    let top = rect.y < horizontal_mid && rect.bottom() < horizontal_mid;
    let bottom = rect.y > horizontal_mid;

    if rect.x < vertical_mid && rect.right() < vertical_mid {
        if top {
            return Some(Quadrant::NorthWest);
        }
        if bottom {
            return Some(Quadrant::SouthWest);
        }
    } else if rect.x > vertical_mid {
        if top {
            return Some(Quadrant::NorthEast);
        }
        if bottom {
            return Some(Quadrant::SouthEast);
        }
    }
    None
}

/// One cell of the partition. Either a leaf or split into exactly four children.
#[derive(Debug, Clone)]
pub struct Node<T> {
    pub(crate) level: usize,
    pub(crate) bounds: Aabb,
    pub(crate) objects: Vec<T>,
    pub(crate) children: Option<[NodeId; 4]>,
}

impl<T> Node<T> {
    pub(crate) fn new(level: usize, bounds: Aabb) -> Self {
        Self {
            level,
            bounds,
            objects: Vec::new(),
            children: None,
        }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn objects(&self) -> &[T] {
        &self.objects
    }

    /// Children in NE, NW, SW, SE order.
    pub fn children(&self) -> Option<[NodeId; 4]> {
        self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Aabb = Aabb::new(0.0, 0.0, 100.0, 100.0);

    #[test]
    fn picks_each_quadrant() {
        assert_eq!(
            quadrant_for(&BOUNDS, &Aabb::new(60.0, 10.0, 10.0, 10.0)),
            Some(Quadrant::NorthEast)
        );
        assert_eq!(
            quadrant_for(&BOUNDS, &Aabb::new(10.0, 10.0, 10.0, 10.0)),
            Some(Quadrant::NorthWest)
        );
        assert_eq!(
            quadrant_for(&BOUNDS, &Aabb::new(10.0, 60.0, 10.0, 10.0)),
            Some(Quadrant::SouthWest)
        );
        assert_eq!(
            quadrant_for(&BOUNDS, &Aabb::new(60.0, 60.0, 10.0, 10.0)),
            Some(Quadrant::SouthEast)
        );
    }

    #[test]
    fn straddling_rect_has_no_quadrant() {
        assert_eq!(quadrant_for(&BOUNDS, &Aabb::new(45.0, 10.0, 10.0, 10.0)), None);
        assert_eq!(quadrant_for(&BOUNDS, &Aabb::new(10.0, 45.0, 10.0, 10.0)), None);
    }

    #[test]
    fn touching_midpoint_is_ambiguous() {
        // Right edge lands exactly on the vertical midpoint.
        assert_eq!(quadrant_for(&BOUNDS, &Aabb::new(40.0, 10.0, 10.0, 10.0)), None);
        // Left edge starts exactly on it.
        assert_eq!(quadrant_for(&BOUNDS, &Aabb::new(50.0, 10.0, 10.0, 10.0)), None);
        assert_eq!(quadrant_for(&BOUNDS, &Aabb::new(10.0, 50.0, 10.0, 10.0)), None);
    }

    #[test]
    fn outside_bounds_is_ambiguous() {
        assert_eq!(quadrant_for(&BOUNDS, &Aabb::new(95.0, 10.0, 10.0, 10.0)), None);
        assert_eq!(quadrant_for(&BOUNDS, &Aabb::new(-5.0, 10.0, 10.0, 10.0)), None);
    }

    #[test]
    fn quadrant_bounds_partition_parent() {
        let total: f32 = Quadrant::ALL
            .iter()
            .map(|q| q.bounds_within(&BOUNDS).area())
            .sum();
        assert_eq!(total, BOUNDS.area());
        assert_eq!(
            Quadrant::SouthEast.bounds_within(&BOUNDS),
            Aabb::new(50.0, 50.0, 50.0, 50.0)
        );
    }
}
