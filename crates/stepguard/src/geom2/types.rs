//! Basic 2D types for guardrail geometry.
//!
//! - `Halfspace`: closed half-space `normal·x <= bound` with an id, a display
//!   label, and an `active` switch.
//! - `Polygon`: convex vertex loop produced by clipping.

use super::vector::{dot, Vec2};

/// Closed half‑space `normal · x <= bound` (no normalization required here).
///
/// Inactive halfspaces stay in the caller's list; every geometric and
/// optimization routine skips them.
#[derive(Clone, Debug, PartialEq)]
pub struct Halfspace {
    pub id: String,
    pub label: String,
    pub normal: Vec2,
    pub bound: f64,
    pub active: bool,
}

impl Halfspace {
    /// Active halfspace whose label equals its id.
    pub fn new(id: impl Into<String>, normal: Vec2, bound: f64) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            normal,
            bound,
            active: true,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Signed violation `normal·p − bound` (positive outside).
    #[inline]
    pub fn value(&self, p: Vec2) -> f64 {
        dot(self.normal, p) - self.bound
    }

    #[inline]
    pub fn satisfies_eps(&self, p: Vec2, eps: f64) -> bool {
        dot(self.normal, p) <= self.bound + eps
    }
}

/// Convex polygon as a cyclic vertex list.
///
/// `is_empty` is true when fewer than 3 vertices survived clipping; the
/// vertices are kept for inspection in that case.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<Vec2>,
    pub is_empty: bool,
}

impl Polygon {
    pub fn from_vertices(vertices: Vec<Vec2>) -> Self {
        let is_empty = vertices.len() < 3;
        Self { vertices, is_empty }
    }

    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            is_empty: true,
        }
    }

    /// Axis-aligned square `[-r, r]²`, counterclockwise.
    pub fn square(r: f64) -> Self {
        Self::from_vertices(vec![
            Vec2::new(-r, -r),
            Vec2::new(r, -r),
            Vec2::new(r, r),
            Vec2::new(-r, r),
        ])
    }

    /// Shoelace area (positive for counterclockwise order).
    pub fn signed_area(&self) -> f64 {
        let m = self.vertices.len();
        if m < 3 {
            return 0.0;
        }
        let mut acc = 0.0;
        for k in 0..m {
            let p = self.vertices[k];
            let q = self.vertices[(k + 1) % m];
            acc += p.x * q.y - p.y * q.x;
        }
        0.5 * acc
    }
}
