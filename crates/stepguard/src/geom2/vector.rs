//! 2D vector kernel on top of `nalgebra::Vector2<f64>`.
//!
//! Thin, total functions; `normalize` is the only one with a degenerate-input
//! rule (zero vector below `NORMALIZE_EPS`).

use nalgebra::Vector2;

use crate::cfg::NORMALIZE_EPS;

/// Step / normal / gradient vector in the plane.
pub type Vec2 = Vector2<f64>;

#[inline]
pub fn add(a: Vec2, b: Vec2) -> Vec2 {
    a + b
}

#[inline]
pub fn sub(a: Vec2, b: Vec2) -> Vec2 {
    a - b
}

#[inline]
pub fn scale(a: Vec2, s: f64) -> Vec2 {
    a * s
}

#[inline]
pub fn dot(a: Vec2, b: Vec2) -> f64 {
    a.x * b.x + a.y * b.y
}

#[inline]
pub fn norm_sq(a: Vec2) -> f64 {
    dot(a, a)
}

#[inline]
pub fn norm(a: Vec2) -> f64 {
    norm_sq(a).sqrt()
}

/// Unit vector along `a`, or the zero vector when `||a|| <= NORMALIZE_EPS`.
#[inline]
pub fn normalize(a: Vec2) -> Vec2 {
    let len = norm(a);
    if len <= NORMALIZE_EPS {
        Vec2::zeros()
    } else {
        a / len
    }
}

/// `a + t (b − a)`.
#[inline]
pub fn lerp(a: Vec2, b: Vec2, t: f64) -> Vec2 {
    add(a, scale(sub(b, a), t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn arithmetic_matches_components() {
        let a = vector![1.0, -2.0];
        let b = vector![0.5, 4.0];
        assert_eq!(add(a, b), vector![1.5, 2.0]);
        assert_eq!(sub(a, b), vector![0.5, -6.0]);
        assert_eq!(scale(a, -3.0), vector![-3.0, 6.0]);
        assert!((dot(a, b) - (0.5 - 8.0)).abs() < 1e-15);
        assert!((norm_sq(a) - 5.0).abs() < 1e-15);
        assert!((norm(vector![3.0, 4.0]) - 5.0).abs() < 1e-15);
    }

    #[test]
    fn normalize_falls_back_to_zero() {
        let u = normalize(vector![0.0, -7.0]);
        assert!((u - vector![0.0, -1.0]).norm() < 1e-15);
        assert_eq!(normalize(vector![1e-9, 0.0]), Vec2::zeros());
        assert_eq!(normalize(Vec2::zeros()), Vec2::zeros());
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let a = vector![-1.0, 2.0];
        let b = vector![3.0, 0.0];
        assert_eq!(lerp(a, b, 0.0), a);
        assert_eq!(lerp(a, b, 1.0), b);
        assert!((lerp(a, b, 0.5) - vector![1.0, 1.0]).norm() < 1e-15);
    }
}
