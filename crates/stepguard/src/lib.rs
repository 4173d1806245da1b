//! Guardrail projection engine.
//!
//! Given a proposed 2D step `−eta · gradient` and linear guardrails
//! `normal·step <= bound`, compute the feasible step closest to the proposal
//! (exact active-set QP) together with the certificates that prove it:
//! multipliers, per-guardrail corrections, stationarity residual, violations.
//!
//! Layout
//! - `geom2`: vector kernel, `Halfspace`, feasibility predicates, clipping.
//! - `qp`: dense solver, active-set enumeration, `project_step`.
//! - `sampler`: seeded random guardrail sets for tests, benches, and the CLI.
//! - `cfg`: tolerance defaults.
//!
//! Infeasibility is a verdict, not an error: `ProjectionResult::ship` is false
//! and `reason` says why.

pub mod cfg;
pub mod geom2;
pub mod qp;
pub mod sampler;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use geom2::{Halfspace, Polygon, Vec2};
pub use qp::{
    consistency_error, project_step, ById, Diagnostic, HoldReason, ProjectionInput,
    ProjectionResult, SearchStats,
};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::geom2::vector::{add, dot, lerp, norm, norm_sq, normalize, scale, sub};
    pub use crate::geom2::{
        intersect_halfspaces, is_step_feasible, max_constraint_violation,
        world_bounds_from_halfspaces, Halfspace, Polygon, Vec2,
    };
    pub use crate::qp::{
        consistency_error, project_step, HoldReason, ProjectionInput, ProjectionResult,
    };
    pub use crate::sampler::{
        draw_gradient, draw_guardrails, GuardrailCfg, HalfspaceCount, ReplayToken,
    };
}
