//! Tolerance defaults for the projection engine (internal).
//!
//! Policy
//! - Defaults are fixed constants; the only per-call knob is
//!   `ProjectionInput::tolerance`. Everything else is tuned for O(1) guardrail
//!   magnitudes and should not need adjusting.
//! - `PIVOT_EPS` is absolute. It assumes `1/eta` stays well above 1e-10: with a
//!   huge step size the `1/eta` diagonal falls under the pivot floor and even a
//!   single-guardrail system is reported singular (`NumericalInstability`).

/// Default feasibility / dual-feasibility tolerance for a projection call.
pub const DEFAULT_TOLERANCE: f64 = 1e-7;
/// Smallest pivot magnitude accepted by the dense solver.
pub const PIVOT_EPS: f64 = 1e-10;
/// `normalize` returns the zero vector below this norm.
pub const NORMALIZE_EPS: f64 = 1e-8;
/// Inside/outside slack used by Sutherland–Hodgman clipping.
pub const CLIP_EPS: f64 = 1e-9;
/// A constraint counts as binding when `|n·p − c| <= BINDING_FACTOR * tol`.
pub const BINDING_FACTOR: f64 = 8.0;
/// Objectives closer than this are ties; the earlier subset mask wins.
pub const OBJECTIVE_TIE_EPS: f64 = 1e-12;
/// Upper bound on active halfspaces for the 2^n subset enumeration.
pub const MAX_ACTIVE_HALFSPACES: usize = 12;
