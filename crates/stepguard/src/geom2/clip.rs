//! Feasibility predicates and Sutherland–Hodgman clipping over guardrails.
//!
//! All routines read only *active* halfspaces; inactive ones are skipped,
//! never filtered out of the caller's list.
//!
//! eps policy (clipping)
//! - A vertex is inside when `normal·v − bound <= eps`. A small positive eps
//!   keeps degenerate (zero-width) regions from collapsing through rounding.

use super::types::{Halfspace, Polygon};
use super::vector::{lerp, Vec2};
use crate::cfg::CLIP_EPS;

/// True iff `step` satisfies every active halfspace within `tol`.
pub fn is_step_feasible(step: Vec2, halfspaces: &[Halfspace], tol: f64) -> bool {
    halfspaces
        .iter()
        .filter(|h| h.active)
        .all(|h| h.satisfies_eps(step, tol))
}

/// Largest signed violation `normal·step − bound` over active halfspaces.
///
/// `None` stands for −∞: there is no active halfspace to violate.
pub fn max_constraint_violation(step: Vec2, halfspaces: &[Halfspace]) -> Option<f64> {
    halfspaces
        .iter()
        .filter(|h| h.active)
        .map(|h| h.value(step))
        .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
}

/// Working radius of the clip square: `max(1.2, 1.9 · max |bound|)`, or 1
/// when no halfspace is active.
pub fn world_bounds_from_halfspaces(halfspaces: &[Halfspace]) -> f64 {
    let largest = halfspaces
        .iter()
        .filter(|h| h.active)
        .map(|h| h.bound.abs())
        .fold(None, |acc: Option<f64>, b| Some(acc.map_or(b, |a| a.max(b))));
    match largest {
        Some(b) => (1.9 * b).max(1.2),
        None => 1.0,
    }
}

/// Shorthand for `intersect_halfspaces_eps(halfspaces, world_radius, CLIP_EPS)`.
#[inline]
pub fn intersect_halfspaces(halfspaces: &[Halfspace], world_radius: f64) -> Polygon {
    intersect_halfspaces_eps(halfspaces, world_radius, CLIP_EPS)
}

/// Clip the square `[-r, r]²` by every active halfspace in order.
///
/// Returns immediately with no vertices once a pass clips everything away.
pub fn intersect_halfspaces_eps(halfspaces: &[Halfspace], world_radius: f64, eps: f64) -> Polygon {
    let mut verts = Polygon::square(world_radius).vertices;
    for h in halfspaces.iter().filter(|h| h.active) {
        verts = clip_by(&verts, h, eps);
        if verts.is_empty() {
            return Polygon::empty();
        }
    }
    Polygon::from_vertices(verts)
}

/// One Sutherland–Hodgman pass against `h`.
fn clip_by(verts: &[Vec2], h: &Halfspace, eps: f64) -> Vec<Vec2> {
    let m = verts.len();
    let mut out = Vec::with_capacity(m + 1);
    for k in 0..m {
        let cur = verts[k];
        let next = verts[(k + 1) % m];
        let vc = h.value(cur);
        let vn = h.value(next);
        let cur_in = vc <= eps;
        let next_in = vn <= eps;
        if cur_in {
            out.push(cur);
        }
        if cur_in != next_in {
            out.push(lerp(cur, next, crossing(vc, vn)));
        }
    }
    out
}

/// Crossing parameter `vc / (vc − vn)`, clamped to the edge.
#[inline]
fn crossing(vc: f64, vn: f64) -> f64 {
    let denom = vc - vn;
    if denom == 0.0 {
        return 0.0;
    }
    (vc / denom).clamp(0.0, 1.0)
}
