use common::shapes::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_new_and_getters() {
    let rect = Aabb::new(2.0, 3.0, 4.0, 6.0);
    assert_eq!(rect.left(), 2.0);
    assert_eq!(rect.right(), 6.0);
    assert_eq!(rect.top(), 3.0);
    assert_eq!(rect.bottom(), 9.0);
    assert_eq!(rect.center_x(), 4.0);
    assert_eq!(rect.center_y(), 6.0);
    assert_eq!(rect.area(), 24.0);
}

#[test]
fn test_overlapping_boxes_intersect() {
    let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
    let b = Aabb::new(5.0, 5.0, 10.0, 10.0);
    assert!(a.intersects(&b));
    assert!(intersects(&b, &a));
}

#[test]
fn test_touching_edges_do_not_intersect() {
    let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
    let right = Aabb::new(10.0, 0.0, 10.0, 10.0);
    let below = Aabb::new(0.0, 10.0, 10.0, 10.0);
    let corner = Aabb::new(10.0, 10.0, 5.0, 5.0);
    assert!(!a.intersects(&right));
    assert!(!a.intersects(&below));
    assert!(!a.intersects(&corner));
}

#[test]
fn test_overlap_on_one_axis_only() {
    let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
    let b = Aabb::new(5.0, 20.0, 10.0, 10.0);
    assert!(!a.intersects(&b));
}

#[test]
fn test_intersection_is_symmetric() {
    let mut rng: StdRng = SeedableRng::seed_from_u64(7);
    for _ in 0..2_000 {
        let a = Aabb::new(
            rng.gen_range(-50.0..50.0),
            rng.gen_range(-50.0..50.0),
            rng.gen_range(0.0..40.0),
            rng.gen_range(0.0..40.0),
        );
        let b = Aabb::new(
            rng.gen_range(-50.0..50.0),
            rng.gen_range(-50.0..50.0),
            rng.gen_range(0.0..40.0),
            rng.gen_range(0.0..40.0),
        );
        assert_eq!(intersects(&a, &b), intersects(&b, &a), "{:?} {:?}", a, b);
    }
}

#[test]
fn test_contains_allows_touching_edges() {
    let outer = Aabb::new(0.0, 0.0, 10.0, 10.0);
    assert!(outer.contains(&Aabb::new(0.0, 0.0, 10.0, 10.0)));
    assert!(outer.contains(&Aabb::new(5.0, 5.0, 5.0, 5.0)));
    assert!(!outer.contains(&Aabb::new(5.0, 5.0, 6.0, 5.0)));
}

#[test]
fn test_try_new_rejects_bad_input() {
    assert!(Aabb::try_new(0.0, 0.0, 1.0, 1.0).is_ok());
    assert_eq!(
        Aabb::try_new(0.0, 0.0, -1.0, 1.0),
        Err(ShapeError::InvalidDims {
            width: -1.0,
            height: 1.0
        })
    );
    assert!(matches!(
        Aabb::try_new(f32::NAN, 0.0, 1.0, 1.0),
        Err(ShapeError::NonFinitePosition { .. })
    ));
    assert!(matches!(
        Aabb::try_new(0.0, 0.0, f32::INFINITY, 1.0),
        Err(ShapeError::InvalidDims { .. })
    ));
}

#[test]
fn test_zero_sized_box_is_valid() {
    assert!(Aabb::new(3.0, 3.0, 0.0, 0.0).validate().is_ok());
}

#[test]
fn test_random_inside() {
    let rect = Aabb::new(2.0, 3.0, 60.0, 80.0);
    // Use a fixed seed for reproducibility.
    let mut rng: StdRng = SeedableRng::seed_from_u64(123);
    for _ in 0..100 {
        let inner = rect.random_inside(5.0, 7.0, &mut rng);
        assert!(rect.contains(&inner));
    }
}

#[test]
fn test_random_inside_oversized() {
    let rect = Aabb::new(2.0, 3.0, 2.0, 2.0);
    let mut rng: StdRng = SeedableRng::seed_from_u64(123);
    let inner = rect.random_inside(10.0, 10.0, &mut rng);
    // Clamped to the top-left corner when it cannot fit.
    assert_eq!((inner.x, inner.y), (2.0, 3.0));
}

#[test]
fn test_tuple_collider() {
    let entry = (ColliderId(4), Aabb::new(1.0, 2.0, 3.0, 4.0));
    assert_eq!(entry.id(), ColliderId(4));
    assert_eq!(entry.bounds(), Aabb::new(1.0, 2.0, 3.0, 4.0));
    assert_eq!(format!("{}", ColliderId(4)), "#4");
}
