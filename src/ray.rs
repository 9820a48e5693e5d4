use crate::vector::Vector3;

/// A ray with an origin and a unit-length direction.
///
/// The direction is normalized on construction, so code receiving a `Ray` may
/// rely on `direction` having length one (unless a zero direction was given).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Ray {
    pub origin: Vector3,
    pub direction: Vector3,
}

impl Ray {
    pub fn new(origin: Vector3, direction: Vector3) -> Ray {
        Ray { origin, direction: direction.normalize() }
    }

    /// The point at parametric distance `t` along the ray.
    pub fn position(&self, t: f64) -> Vector3 {
        self.origin + (t * self.direction)
    }
}

#[test]
fn ray_position() {
    let r = Ray::new(
                Vector3::new(2.0, 3.0, 4.0),
                Vector3::new(1.0, 0.0, 0.0)
            );

    assert_eq!(r.position(0.0), Vector3::new(2.0, 3.0, 4.0));
    assert_eq!(r.position(1.0), Vector3::new(3.0, 3.0, 4.0));
    assert_eq!(r.position(-1.0), Vector3::new(1.0, 3.0, 4.0));
    assert_eq!(r.position(2.5), Vector3::new(4.5, 3.0, 4.0));
}

#[test]
fn ray_direction_is_normalized() {
    let directions = [
        Vector3::new(3.0, 4.0, 0.0),
        Vector3::new(-0.001, 0.002, -0.5),
        Vector3::new(100.0, -250.0, 7.5),
        Vector3::new(0.4, 0.3, -1.0),
    ];

    for d in directions.iter() {
        let r = Ray::new(Vector3::zero(), *d);
        assert!(crate::feq(r.direction.length(), 1.0));
    }
}
