use rand::Rng;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeError {
    InvalidDims { width: f32, height: f32 },
    NonFinitePosition { x: f32, y: f32 },
}

pub type ShapeResult<T> = Result<T, ShapeError>;

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeError::InvalidDims { width, height } => write!(
                f,
                "aabb width/height must be finite and non-negative (width: {}, height: {})",
                width, height
            ),
            ShapeError::NonFinitePosition { x, y } => {
                write!(f, "aabb position must be finite (x: {}, y: {})", x, y)
            }
        }
    }
}

impl std::error::Error for ShapeError {}

/// Stable identity of anything stored in a spatial index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderId(pub u64);

impl fmt::Display for ColliderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Anything that can report where it currently is.
///
/// Spatial indices only ever see this capability, never the concrete entity.
pub trait Collider {
    fn id(&self) -> ColliderId;
    fn bounds(&self) -> Aabb;
}

impl Collider for (ColliderId, Aabb) {
    fn id(&self) -> ColliderId {
        self.0
    }

    fn bounds(&self) -> Aabb {
        self.1
    }
}

/// Axis-aligned box anchored at its top-left corner (y grows downwards).
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Aabb {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn try_new(x: f32, y: f32, width: f32, height: f32) -> ShapeResult<Self> {
        let aabb = Self::new(x, y, width, height);
        aabb.validate()?;
        Ok(aabb)
    }

    pub fn validate(&self) -> ShapeResult<()> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(ShapeError::NonFinitePosition {
                x: self.x,
                y: self.y,
            });
        }
        if !self.width.is_finite()
            || !self.height.is_finite()
            || self.width < 0.0
            || self.height < 0.0
        {
            return Err(ShapeError::InvalidDims {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Half-open overlap test: boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Closed containment: `inner` may touch this box's edges.
    pub fn contains(&self, inner: &Aabb) -> bool {
        self.x <= inner.x
            && self.right() >= inner.right()
            && self.y <= inner.y
            && self.bottom() >= inner.bottom()
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Aabb {
        Aabb::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// A box of the given size placed uniformly at random fully inside `self`.
    pub fn random_inside<R: Rng>(&self, width: f32, height: f32, rng: &mut R) -> Aabb {
        Aabb::new(
            safe_randf32(rng, self.x, self.right() - width),
            safe_randf32(rng, self.y, self.bottom() - height),
            width,
            height,
        )
    }
}

/// Free-function form of [`Aabb::intersects`].
pub fn intersects(a: &Aabb, b: &Aabb) -> bool {
    a.intersects(b)
}

fn safe_randf32<R: Rng>(rng: &mut R, min: f32, max: f32) -> f32 {
    if min >= max {
        return min;
    }
    rng.gen_range(min..=max)
}
