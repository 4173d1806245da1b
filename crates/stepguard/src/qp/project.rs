//! Projection entry point: pre-checks, search, and certificate assembly.
//!
//! Pipeline
//! 1. `eta` must be finite and above the tolerance.
//! 2. No active halfspace ⇒ ship `step0` unchanged.
//! 3. Clip the world square by the active halfspaces; an empty region holds.
//! 4. Enumerate active sets, pick the minimal objective, and package
//!    multipliers, corrections, residuals, and per-guardrail diagnostics.
//!
//! Every call is a pure function of its input.

use super::active_set::{enumerate_candidates, objective, CandidateSearch};
use super::types::{ById, Diagnostic, HoldReason, ProjectionInput, ProjectionResult, SearchStats};
use crate::cfg::{BINDING_FACTOR, MAX_ACTIVE_HALFSPACES};
use crate::geom2::vector::{add, dot, norm, scale, sub};
use crate::geom2::{
    intersect_halfspaces, max_constraint_violation, world_bounds_from_halfspaces, Halfspace,
    Polygon, Vec2,
};

/// Project `step0 = −eta · gradient` onto the active guardrails.
pub fn project_step(input: &ProjectionInput) -> ProjectionResult {
    let tol = input.tolerance;
    let hs = &input.halfspaces;
    let zeros = vec![0.0; hs.len()];

    if !input.eta.is_finite() || input.eta <= tol {
        tracing::debug!(eta = input.eta, "invalid step size");
        return assemble(
            input,
            Outcome::hold(HoldReason::InvalidStepSize),
            &zeros,
            Polygon::empty(),
            1.0,
        );
    }

    let active: Vec<Halfspace> = hs.iter().filter(|h| h.active).cloned().collect();
    if active.is_empty() {
        return assemble(input, Outcome::ship(input.step0()), &zeros, Polygon::empty(), 1.0);
    }

    let world_radius = world_bounds_from_halfspaces(&active);
    let region = intersect_halfspaces(&active, world_radius);
    if region.is_empty {
        tracing::debug!(active = active.len(), world_radius, "empty feasible region");
        return assemble(
            input,
            Outcome::hold(HoldReason::EmptyFeasibleRegion),
            &zeros,
            region,
            world_radius,
        );
    }
    if active.len() > MAX_ACTIVE_HALFSPACES {
        return assemble(
            input,
            Outcome::hold(HoldReason::too_many(active.len())),
            &zeros,
            region,
            world_radius,
        );
    }

    let search = enumerate_candidates(input.gradient, input.eta, hs, tol);
    tracing::debug!(
        active = active.len(),
        subsets = search.stats.subsets_examined,
        solve_failures = search.stats.solve_failures,
        candidates = search.stats.candidates,
        "active-set search"
    );
    match search.best() {
        Some(best) => {
            let mut outcome = Outcome::ship(best.step);
            outcome.stats = search.stats;
            assemble(input, outcome, &best.lambdas, region, world_radius)
        }
        None => {
            let reason = empty_search_reason(&search);
            let mut outcome = Outcome::hold(reason);
            outcome.stats = search.stats;
            assemble(input, outcome, &zeros, region, world_radius)
        }
    }
}

/// `||(step0 + Σ correction) − projected||`; ≈0 for a consistent result.
pub fn consistency_error(result: &ProjectionResult) -> f64 {
    let rebuilt = result
        .correction_by_id
        .values()
        .fold(result.step0, |acc, c| add(acc, *c));
    norm(sub(rebuilt, result.projected_step))
}

fn empty_search_reason(search: &CandidateSearch) -> HoldReason {
    if search.stats.solve_failures > 0 {
        HoldReason::NumericalInstability
    } else {
        HoldReason::NoFeasibleStep
    }
}

/// Verdict plus chosen point, before certificates are derived.
struct Outcome {
    reason: Option<HoldReason>,
    /// Held outcomes carry no point and fall back to `step0`.
    projected: Option<Vec2>,
    stats: SearchStats,
}

impl Outcome {
    fn ship(projected: Vec2) -> Self {
        Self {
            reason: None,
            projected: Some(projected),
            stats: SearchStats::default(),
        }
    }

    fn hold(reason: HoldReason) -> Self {
        Self {
            reason: Some(reason),
            projected: None,
            stats: SearchStats::default(),
        }
    }
}

/// Derive every certificate field from the chosen point and multipliers.
///
/// `lambdas` is indexed like `input.halfspaces`.
fn assemble(
    input: &ProjectionInput,
    outcome: Outcome,
    lambdas: &[f64],
    region: Polygon,
    world_radius: f64,
) -> ProjectionResult {
    let tol = input.tolerance;
    let eta = input.eta;
    let g = input.gradient;
    let hs = &input.halfspaces;
    let step0 = input.step0();
    let projected = outcome.projected.unwrap_or(step0);

    let mut lambda_by_id = ById::default();
    let mut correction_by_id = ById::default();
    let mut diagnostics = Vec::with_capacity(hs.len());
    let mut active_set_ids = Vec::new();
    let mut balance = add(scale(projected, 1.0 / eta), g);
    for (h, &lambda) in hs.iter().zip(lambdas) {
        let lambda = if h.active { lambda } else { 0.0 };
        let correction = if lambda == 0.0 {
            Vec2::zeros()
        } else {
            scale(h.normal, -eta * lambda)
        };
        if h.active {
            balance = add(balance, scale(h.normal, lambda));
        }
        if lambda > tol {
            active_set_ids.push(h.id.clone());
        }
        let violation_projected = h.value(projected);
        diagnostics.push(Diagnostic {
            id: h.id.clone(),
            label: h.label.clone(),
            active: h.active,
            violation_step0: h.value(step0),
            violation_projected,
            lambda,
            is_binding: h.active
                && violation_projected.abs() <= BINDING_FACTOR * tol
                && lambda > tol,
        });
        lambda_by_id.push(h.id.clone(), lambda);
        correction_by_id.push(h.id.clone(), correction);
    }

    let descent_linear0 = -dot(g, step0);
    let descent_linear_projected = -dot(g, projected);
    let descent_retained_ratio = if descent_linear0 <= tol {
        1.0
    } else {
        descent_linear_projected / descent_linear0
    };

    ProjectionResult {
        ship: outcome.reason.is_none(),
        reason: outcome.reason,
        gradient: g,
        eta,
        tolerance: tol,
        step0,
        projected_step: projected,
        objective_step0: objective(g, eta, step0),
        objective_projected: objective(g, eta, projected),
        lambda_by_id,
        correction_by_id,
        diagnostics,
        active_set_ids,
        stationarity_residual: norm(balance),
        max_violation_step0: max_constraint_violation(step0, hs),
        max_violation_projected: max_constraint_violation(projected, hs),
        descent_linear0,
        descent_linear_projected,
        descent_retained_ratio,
        world_radius,
        region,
        search: outcome.stats,
    }
}
