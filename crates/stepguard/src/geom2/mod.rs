//! 2D guardrail geometry.
//!
//! Purpose
//! - Vector kernel, the `Halfspace` guardrail type, feasibility predicates, and
//!   the clipped feasible region used to pre-screen a projection.
//!
//! Conventions
//! - Halfspaces are `normal·x <= bound` with arbitrary (non-normalized) normals.
//! - Only `active` halfspaces participate; order of the input list is kept.
//!
//! Code cross-refs: `qp::project_step`, `cfg`

mod clip;
mod types;
pub mod vector;

pub use clip::{
    intersect_halfspaces, intersect_halfspaces_eps, is_step_feasible, max_constraint_violation,
    world_bounds_from_halfspaces,
};
pub use types::{Halfspace, Polygon};
pub use vector::Vec2;
