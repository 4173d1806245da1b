//! Exhaustive active-set search for the 2-variable projection QP.
//!
//! Problem
//! - minimize `g·s + ||s||² / (2 eta)` subject to `n_i·s <= c_i` (active i).
//!
//! Method
//! - Every subset `S` of the active halfspaces (bitmask order `0..2^n`) is a
//!   hypothesis "exactly S binds". The empty subset is the unconstrained step.
//!   A non-empty subset solves the KKT system
//!
//! ```text
//! [ I/eta   N_S ] [ s ]   [ -g  ]
//! [ N_S^T    0  ] [ λ ] = [ c_S ]
//! ```
//!
//!   and survives if `λ >= −tol` (clamped to 0) and `s` is feasible for *all*
//!   active halfspaces. Subsets with 3+ members are rank deficient in 2D and
//!   show up as solve failures.
//!
//! Code cross-refs: `linsolve::solve_dense`, `project::project_step`

use nalgebra::{DMatrix, DVector};

use super::linsolve::solve_dense;
use super::types::SearchStats;
use crate::cfg::{MAX_ACTIVE_HALFSPACES, OBJECTIVE_TIE_EPS};
use crate::geom2::vector::{dot, norm_sq};
use crate::geom2::{is_step_feasible, Halfspace, Vec2};

/// Objective `g·s + ||s||² / (2 eta)`.
#[inline]
pub fn objective(gradient: Vec2, eta: f64, step: Vec2) -> f64 {
    dot(gradient, step) + norm_sq(step) / (2.0 * eta)
}

/// A primal- and dual-feasible stationary point for one subset.
#[derive(Clone, Debug)]
pub struct Candidate {
    /// Bit k set ⇔ the k-th *active* halfspace binds.
    pub mask: u32,
    pub step: Vec2,
    /// One multiplier per input halfspace (0 for inactive / non-binding).
    pub lambdas: Vec<f64>,
    pub objective: f64,
}

/// All surviving candidates in enumeration order, plus counters.
#[derive(Clone, Debug, Default)]
pub struct CandidateSearch {
    pub candidates: Vec<Candidate>,
    pub stats: SearchStats,
}

impl CandidateSearch {
    /// Minimal objective; ties within `OBJECTIVE_TIE_EPS` keep the earlier mask.
    pub fn best(&self) -> Option<&Candidate> {
        let mut best: Option<&Candidate> = None;
        for c in &self.candidates {
            if best.is_none_or(|b| c.objective < b.objective - OBJECTIVE_TIE_EPS) {
                best = Some(c);
            }
        }
        best
    }
}

/// Enumerate all active-set hypotheses for `step0 = −eta · gradient`.
///
/// Pre: `eta > 0`. More than `MAX_ACTIVE_HALFSPACES` active halfspaces yields an
/// empty search (the caller holds before getting here).
pub fn enumerate_candidates(
    gradient: Vec2,
    eta: f64,
    halfspaces: &[Halfspace],
    tol: f64,
) -> CandidateSearch {
    let active: Vec<usize> = halfspaces
        .iter()
        .enumerate()
        .filter(|(_, h)| h.active)
        .map(|(i, _)| i)
        .collect();
    let n = active.len();
    let mut out = CandidateSearch::default();
    if n > MAX_ACTIVE_HALFSPACES {
        return out;
    }
    let step0 = -gradient * eta;
    for mask in 0u32..(1u32 << n) {
        out.stats.subsets_examined += 1;
        if mask == 0 {
            if is_step_feasible(step0, halfspaces, tol) {
                out.candidates.push(Candidate {
                    mask,
                    step: step0,
                    lambdas: vec![0.0; halfspaces.len()],
                    objective: objective(gradient, eta, step0),
                });
            }
            continue;
        }
        let subset: Vec<usize> = (0..n)
            .filter(|k| mask & (1 << k) != 0)
            .map(|k| active[k])
            .collect();
        let Some(x) = solve_kkt(gradient, eta, halfspaces, &subset) else {
            out.stats.solve_failures += 1;
            tracing::trace!(mask, "singular active-set system");
            continue;
        };
        let step = Vec2::new(x[0], x[1]);
        if !(step.x.is_finite() && step.y.is_finite()) {
            out.stats.solve_failures += 1;
            continue;
        }
        let mut lambdas = vec![0.0; halfspaces.len()];
        let mut dual_ok = true;
        for (k, &i) in subset.iter().enumerate() {
            let l = x[2 + k];
            if l < -tol || !l.is_finite() {
                dual_ok = false;
                break;
            }
            lambdas[i] = l.max(0.0);
        }
        if !dual_ok {
            tracing::trace!(mask, "negative multiplier");
            continue;
        }
        if !is_step_feasible(step, halfspaces, tol) {
            tracing::trace!(mask, "subset solution violates another guardrail");
            continue;
        }
        out.candidates.push(Candidate {
            mask,
            step,
            lambdas,
            objective: objective(gradient, eta, step),
        });
    }
    out.stats.candidates = out.candidates.len();
    out
}

/// Build and solve the `(2+m)×(2+m)` KKT system for `subset` (input indices).
fn solve_kkt(
    gradient: Vec2,
    eta: f64,
    halfspaces: &[Halfspace],
    subset: &[usize],
) -> Option<DVector<f64>> {
    let dim = 2 + subset.len();
    let mut a = DMatrix::<f64>::zeros(dim, dim);
    let mut b = DVector::<f64>::zeros(dim);
    a[(0, 0)] = 1.0 / eta;
    a[(1, 1)] = 1.0 / eta;
    b[0] = -gradient.x;
    b[1] = -gradient.y;
    for (k, &i) in subset.iter().enumerate() {
        let h = &halfspaces[i];
        let col = 2 + k;
        a[(0, col)] = h.normal.x;
        a[(1, col)] = h.normal.y;
        a[(col, 0)] = h.normal.x;
        a[(col, 1)] = h.normal.y;
        b[col] = h.bound;
    }
    solve_dense(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn empty_subset_only_when_feasible() {
        let hs = vec![Halfspace::new("x", vector![1.0, 0.0], 2.0)];
        let s = enumerate_candidates(vector![-1.0, 0.0], 1.0, &hs, 1e-7);
        assert_eq!(s.stats.subsets_examined, 2);
        let best = s.best().unwrap();
        assert_eq!(best.mask, 0);
        assert_eq!(best.step, vector![1.0, 0.0]);
        // {x} binding would need λ = -1
        assert_eq!(s.candidates.len(), 1);
    }

    #[test]
    fn single_binding_solution() {
        let hs = vec![Halfspace::new("x", vector![1.0, 0.0], 0.5)];
        let s = enumerate_candidates(vector![-1.0, 0.0], 1.0, &hs, 1e-7);
        let best = s.best().unwrap();
        assert_eq!(best.mask, 1);
        assert!((best.step - vector![0.5, 0.0]).norm() < 1e-12);
        assert!((best.lambdas[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn dual_boundary_at_minus_tolerance_is_admitted() {
        // exact binary values: the binding multiplier is -(g_x + 0.5)
        let tol = 2f64.powi(-20);
        let hs = vec![Halfspace::new("x", vector![1.0, 0.0], 0.5)];
        let at = enumerate_candidates(vector![-0.5 + tol, 0.0], 1.0, &hs, tol);
        let c = at.candidates.iter().find(|c| c.mask == 1).unwrap();
        assert_eq!(c.lambdas[0], 0.0);

        let below = enumerate_candidates(vector![-0.5 + 2.0 * tol, 0.0], 1.0, &hs, tol);
        assert!(below.candidates.iter().all(|c| c.mask != 1));
        assert_eq!(below.stats.solve_failures, 0);
    }

    #[test]
    fn parallel_pair_counts_a_failure() {
        let hs = vec![
            Halfspace::new("a", vector![1.0, 0.0], 0.5),
            Halfspace::new("b", vector![2.0, 0.0], 2.0),
        ];
        let s = enumerate_candidates(vector![-1.0, 0.0], 1.0, &hs, 1e-7);
        assert_eq!(s.stats.subsets_examined, 4);
        assert_eq!(s.stats.solve_failures, 1);
        assert_eq!(s.best().unwrap().mask, 0b01);
    }

    #[test]
    fn inactive_halfspaces_get_no_bit() {
        let hs = vec![
            Halfspace::new("off", vector![1.0, 0.0], -5.0).with_active(false),
            Halfspace::new("x", vector![1.0, 0.0], 0.5),
        ];
        let s = enumerate_candidates(vector![-1.0, 0.0], 1.0, &hs, 1e-7);
        assert_eq!(s.stats.subsets_examined, 2);
        let best = s.best().unwrap();
        assert_eq!(best.lambdas[0], 0.0);
        assert!((best.lambdas[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn ties_prefer_earlier_mask() {
        // duplicate guardrail: masks 0b01 and 0b10 give the same point
        let hs = vec![
            Halfspace::new("a", vector![1.0, 0.0], 0.5),
            Halfspace::new("a2", vector![1.0, 0.0], 0.5),
        ];
        let s = enumerate_candidates(vector![-1.0, 0.0], 1.0, &hs, 1e-7);
        assert_eq!(s.candidates.len(), 2);
        assert_eq!(s.best().unwrap().mask, 0b01);
    }

    #[test]
    fn objective_is_minimized_by_step0() {
        let g = vector![0.3, -0.7];
        let eta = 0.4;
        let s0 = -g * eta;
        let f0 = objective(g, eta, s0);
        assert!((f0 + 0.5 * eta * g.norm_squared()).abs() < 1e-12);
        assert!(objective(g, eta, s0 + vector![0.01, 0.0]) > f0);
    }
}
