//! Input, verdict, and certificate types of a projection call.

use std::fmt;

use crate::cfg::{DEFAULT_TOLERANCE, MAX_ACTIVE_HALFSPACES};
use crate::geom2::{Halfspace, Polygon, Vec2};

/// One projection request: unconstrained step `−eta · gradient` against
/// `halfspaces`.
#[derive(Clone, Debug)]
pub struct ProjectionInput {
    pub gradient: Vec2,
    pub eta: f64,
    pub halfspaces: Vec<Halfspace>,
    pub tolerance: f64,
}

impl ProjectionInput {
    pub fn new(gradient: Vec2, eta: f64, halfspaces: Vec<Halfspace>) -> Self {
        Self {
            gradient,
            eta,
            halfspaces,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Unconstrained step `−eta · gradient`.
    #[inline]
    pub fn step0(&self) -> Vec2 {
        -self.gradient * self.eta
    }
}

/// Why a projection was held (`ship = false`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoldReason {
    /// `eta` is not finite or not above the tolerance.
    InvalidStepSize,
    /// Clipping the active halfspaces left no region.
    EmptyFeasibleRegion,
    /// No candidate survived and at least one KKT solve was singular.
    NumericalInstability,
    /// Every solve succeeded but no candidate was primal and dual feasible.
    NoFeasibleStep,
    /// More active halfspaces than the subset enumeration accepts.
    TooManyGuardrails { count: usize, max: usize },
}

impl HoldReason {
    pub(crate) fn too_many(count: usize) -> Self {
        HoldReason::TooManyGuardrails {
            count,
            max: MAX_ACTIVE_HALFSPACES,
        }
    }
}

impl fmt::Display for HoldReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HoldReason::InvalidStepSize => write!(f, "step size must be positive"),
            HoldReason::EmptyFeasibleRegion => {
                write!(f, "guardrail set is infeasible: the feasible region is empty")
            }
            HoldReason::NumericalInstability => write!(
                f,
                "numerical instability while solving the active-set systems"
            ),
            HoldReason::NoFeasibleStep => {
                write!(f, "no feasible projected step for current guardrails")
            }
            HoldReason::TooManyGuardrails { count, max } => write!(
                f,
                "too many active guardrails for exhaustive search ({} > {})",
                count, max
            ),
        }
    }
}

/// Ordered association from halfspace id to a value (input order).
#[derive(Clone, Debug, PartialEq)]
pub struct ById<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for ById<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> ById<T> {
    pub fn push(&mut self, id: impl Into<String>, value: T) {
        self.entries.push((id.into(), value));
    }

    /// First entry for `id`.
    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.iter().find(|(k, _)| k == id).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> FromIterator<(String, T)> for ById<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Per-halfspace certificate row.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub id: String,
    pub label: String,
    pub active: bool,
    /// Signed `normal·step0 − bound`.
    pub violation_step0: f64,
    /// Signed `normal·projected − bound`.
    pub violation_projected: f64,
    pub lambda: f64,
    pub is_binding: bool,
}

/// Counters from the subset enumeration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub subsets_examined: usize,
    pub solve_failures: usize,
    pub candidates: usize,
}

/// Snapshot returned by `project_step`.
///
/// Held results (`ship = false`) fall back to `projected_step = step0` with all
/// multipliers zero, so geometry can still be displayed.
#[derive(Clone, Debug)]
pub struct ProjectionResult {
    pub ship: bool,
    pub reason: Option<HoldReason>,
    pub gradient: Vec2,
    pub eta: f64,
    pub tolerance: f64,
    pub step0: Vec2,
    pub projected_step: Vec2,
    pub objective_step0: f64,
    pub objective_projected: f64,
    pub lambda_by_id: ById<f64>,
    pub correction_by_id: ById<Vec2>,
    pub diagnostics: Vec<Diagnostic>,
    pub active_set_ids: Vec<String>,
    /// `||step/eta + gradient + Σ λ_i n_i||`; not finite when `eta` is invalid.
    pub stationarity_residual: f64,
    /// `None` when no halfspace is active.
    pub max_violation_step0: Option<f64>,
    pub max_violation_projected: Option<f64>,
    pub descent_linear0: f64,
    pub descent_linear_projected: f64,
    pub descent_retained_ratio: f64,
    pub world_radius: f64,
    /// Clipped feasible region; vertex-free when it was not computed.
    pub region: Polygon,
    pub search: SearchStats,
}
