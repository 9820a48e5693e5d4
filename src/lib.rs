pub mod consts;
pub mod error;

pub mod vector;
pub mod ray;
pub mod light;

pub mod geometry;
pub mod intersect;
pub mod world;
pub mod camera;

pub mod color;
pub mod canvas;
pub mod bmp;

pub mod parallel;
pub mod scene;

use crate::consts::FEQ_EPSILON;

/// Approximate floating point equality, used by the `PartialEq`
/// implementations of `Vector3` and `Color`.
pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < FEQ_EPSILON
}
