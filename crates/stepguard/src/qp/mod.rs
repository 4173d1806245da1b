//! Exact projection of a step onto guardrails (2-variable active-set QP).
//!
//! - `linsolve`: dense Gaussian elimination with partial pivoting.
//! - `active_set`: subset enumeration, KKT solves, candidate filtering.
//! - `project`: pre-checks, selection, and the certificate bundle.
//!
//! Code cross-refs: `geom2::{Halfspace, intersect_halfspaces}`, `cfg`

pub mod active_set;
pub mod linsolve;
mod project;
mod types;

pub use active_set::{enumerate_candidates, objective, Candidate, CandidateSearch};
pub use linsolve::{solve_dense, solve_dense_eps};
pub use project::{consistency_error, project_step};
pub use types::{
    ById, Diagnostic, HoldReason, ProjectionInput, ProjectionResult, SearchStats,
};
