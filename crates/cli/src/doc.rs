//! JSON documents exchanged by the CLI (input requests and result bundles).

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use stepguard::{consistency_error, Halfspace, ProjectionInput, ProjectionResult, Vec2};

fn yes() -> bool {
    true
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HalfspaceDoc {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub normal: [f64; 2],
    pub bound: f64,
    #[serde(default = "yes")]
    pub active: bool,
}

/// A projection request as written on disk.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputDoc {
    pub gradient: [f64; 2],
    pub eta: f64,
    pub halfspaces: Vec<HalfspaceDoc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
}

impl InputDoc {
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
    }

    /// Validate ids and numbers, then build the engine input.
    pub fn to_input(&self) -> Result<ProjectionInput> {
        let mut seen = HashSet::new();
        let mut hs = Vec::with_capacity(self.halfspaces.len());
        for h in &self.halfspaces {
            if !seen.insert(h.id.as_str()) {
                bail!("duplicate halfspace id `{}`", h.id);
            }
            if !(h.normal.iter().all(|v| v.is_finite()) && h.bound.is_finite()) {
                bail!("halfspace `{}` has a non-finite normal or bound", h.id);
            }
            let mut out = Halfspace::new(h.id.clone(), vec2(h.normal), h.bound).with_active(h.active);
            if let Some(label) = &h.label {
                out = out.with_label(label.clone());
            }
            hs.push(out);
        }
        if !self.gradient.iter().all(|v| v.is_finite()) {
            bail!("gradient must be finite");
        }
        let mut input = ProjectionInput::new(vec2(self.gradient), self.eta, hs);
        if let Some(tol) = self.tolerance {
            if !tol.is_finite() {
                bail!("tolerance must be finite");
            }
            input = input.with_tolerance(tol);
        }
        Ok(input)
    }

    pub fn from_input(input: &ProjectionInput) -> Self {
        Self {
            gradient: arr(input.gradient),
            eta: input.eta,
            halfspaces: input
                .halfspaces
                .iter()
                .map(|h| HalfspaceDoc {
                    id: h.id.clone(),
                    label: (h.label != h.id).then(|| h.label.clone()),
                    normal: arr(h.normal),
                    bound: h.bound,
                    active: h.active,
                })
                .collect(),
            tolerance: Some(input.tolerance),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Keyed<T> {
    pub id: String,
    pub value: T,
}

#[derive(Clone, Debug, Serialize)]
pub struct DiagnosticDoc {
    pub id: String,
    pub label: String,
    pub active: bool,
    pub violation_step0: f64,
    pub violation_projected: f64,
    pub lambda: f64,
    pub is_binding: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct SearchDoc {
    pub subsets_examined: usize,
    pub solve_failures: usize,
    pub candidates: usize,
}

/// Serialized `ProjectionResult`; non-finite numbers become `null`.
#[derive(Clone, Debug, Serialize)]
pub struct ResultDoc {
    pub ship: bool,
    pub reason: Option<String>,
    pub step0: [f64; 2],
    pub projected_step: [f64; 2],
    pub objective_step0: f64,
    pub objective_projected: f64,
    pub lambda_by_id: Vec<Keyed<f64>>,
    pub correction_by_id: Vec<Keyed<[f64; 2]>>,
    pub diagnostics: Vec<DiagnosticDoc>,
    pub active_set_ids: Vec<String>,
    pub stationarity_residual: f64,
    pub max_violation_step0: Option<f64>,
    pub max_violation_projected: Option<f64>,
    pub descent_linear0: f64,
    pub descent_linear_projected: f64,
    pub descent_retained_ratio: f64,
    pub consistency_error: f64,
    pub world_radius: f64,
    pub region: Vec<[f64; 2]>,
    pub region_is_empty: bool,
    pub search: SearchDoc,
}

impl From<&ProjectionResult> for ResultDoc {
    fn from(r: &ProjectionResult) -> Self {
        Self {
            ship: r.ship,
            reason: r.reason.map(|reason| reason.to_string()),
            step0: arr(r.step0),
            projected_step: arr(r.projected_step),
            objective_step0: r.objective_step0,
            objective_projected: r.objective_projected,
            lambda_by_id: r
                .lambda_by_id
                .iter()
                .map(|(id, l)| Keyed {
                    id: id.to_string(),
                    value: *l,
                })
                .collect(),
            correction_by_id: r
                .correction_by_id
                .iter()
                .map(|(id, c)| Keyed {
                    id: id.to_string(),
                    value: arr(*c),
                })
                .collect(),
            diagnostics: r
                .diagnostics
                .iter()
                .map(|d| DiagnosticDoc {
                    id: d.id.clone(),
                    label: d.label.clone(),
                    active: d.active,
                    violation_step0: d.violation_step0,
                    violation_projected: d.violation_projected,
                    lambda: d.lambda,
                    is_binding: d.is_binding,
                })
                .collect(),
            active_set_ids: r.active_set_ids.clone(),
            stationarity_residual: r.stationarity_residual,
            max_violation_step0: r.max_violation_step0,
            max_violation_projected: r.max_violation_projected,
            descent_linear0: r.descent_linear0,
            descent_linear_projected: r.descent_linear_projected,
            descent_retained_ratio: r.descent_retained_ratio,
            consistency_error: consistency_error(r),
            world_radius: r.world_radius,
            region: r.region.vertices.iter().map(|v| arr(*v)).collect(),
            region_is_empty: r.region.is_empty,
            search: SearchDoc {
                subsets_examined: r.search.subsets_examined,
                solve_failures: r.search.solve_failures,
                candidates: r.search.candidates,
            },
        }
    }
}

#[inline]
fn vec2(a: [f64; 2]) -> Vec2 {
    Vec2::new(a[0], a[1])
}

#[inline]
fn arr(v: Vec2) -> [f64; 2] {
    [v.x, v.y]
}
