//! Batch projection of many gradients against one guardrail set (CSV in/out).

use std::fs::File;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use polars::prelude::*;
use stepguard::{project_step, ProjectionInput, Vec2};

/// Read a column as `f64`, casting integer columns; nulls are errors.
fn column_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let s = df
        .column(name)
        .with_context(|| format!("missing column `{name}`"))?
        .cast(&DataType::Float64)?;
    s.f64()?
        .into_iter()
        .enumerate()
        .map(|(i, v)| v.ok_or_else(|| anyhow!("null `{name}` at row {i}")))
        .collect()
}

/// Project every `(gx, gy[, eta])` row of `gradients` with `base`'s guardrails
/// and tolerance. Rows without an `eta` column use `base.eta`.
///
/// Returns the summary frame (one row per input row).
pub fn sweep(base: &ProjectionInput, gradients: &Path) -> Result<DataFrame> {
    let df = LazyCsvReader::new(gradients)
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .finish()?
        .collect()
        .with_context(|| format!("reading {}", gradients.display()))?;
    let gx = column_f64(&df, "gx")?;
    let gy = column_f64(&df, "gy")?;
    let eta = if df.column("eta").is_ok() {
        column_f64(&df, "eta")?
    } else {
        vec![base.eta; df.height()]
    };
    tracing::info!(rows = df.height(), cols = df.width(), "sweep_input_shape");

    let n = gx.len();
    let mut ship = Vec::with_capacity(n);
    let mut reason = Vec::with_capacity(n);
    let mut px = Vec::with_capacity(n);
    let mut py = Vec::with_capacity(n);
    let mut retained = Vec::with_capacity(n);
    let mut residual = Vec::with_capacity(n);
    let mut active_set = Vec::with_capacity(n);
    let mut input = base.clone();
    for i in 0..n {
        input.gradient = Vec2::new(gx[i], gy[i]);
        input.eta = eta[i];
        let r = project_step(&input);
        ship.push(r.ship);
        reason.push(r.reason.map(|x| x.to_string()).unwrap_or_default());
        px.push(r.projected_step.x);
        py.push(r.projected_step.y);
        retained.push(r.descent_retained_ratio);
        residual.push(r.stationarity_residual);
        active_set.push(r.active_set_ids.join(";"));
    }
    let out = DataFrame::new(vec![
        Series::new("gx".into(), gx),
        Series::new("gy".into(), gy),
        Series::new("eta".into(), eta),
        Series::new("ship".into(), ship),
        Series::new("reason".into(), reason),
        Series::new("px".into(), px),
        Series::new("py".into(), py),
        Series::new("retained".into(), retained),
        Series::new("residual".into(), residual),
        Series::new("active_set".into(), active_set),
    ])?;
    Ok(out)
}

pub fn write_csv(df: &mut DataFrame, out: &Path) -> Result<()> {
    let mut file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepguard::Halfspace;
    use tempfile::tempdir;

    fn base() -> ProjectionInput {
        ProjectionInput::new(
            Vec2::zeros(),
            1.0,
            vec![Halfspace::new("cap", Vec2::new(1.0, 0.0), 0.5)],
        )
    }

    #[test]
    fn sweep_projects_each_row() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("g.csv");
        std::fs::write(&csv, "gx,gy\n-1.0,0.0\n0.2,0.1\n-2,0\n").unwrap();
        let df = sweep(&base(), &csv).unwrap();
        assert_eq!(df.height(), 3);
        let px = column_f64(&df, "px").unwrap();
        assert!((px[0] - 0.5).abs() < 1e-9);
        assert!((px[1] + 0.2).abs() < 1e-12);
        assert!((px[2] - 0.5).abs() < 1e-9);
        let eta = column_f64(&df, "eta").unwrap();
        assert_eq!(eta, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn sweep_uses_eta_column_and_writes_csv() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("g.csv");
        std::fs::write(&csv, "gx,gy,eta\n-1.0,0.0,0.25\n-1.0,0.0,0.0\n").unwrap();
        let mut df = sweep(&base(), &csv).unwrap();
        let px = column_f64(&df, "px").unwrap();
        assert!((px[0] - 0.25).abs() < 1e-12);
        let out = dir.path().join("out.csv");
        write_csv(&mut df, &out).unwrap();
        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.starts_with("gx,gy,eta,ship,reason"));
        assert!(text.contains("step size must be positive"));
    }

    #[test]
    fn missing_column_is_an_error() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("g.csv");
        std::fs::write(&csv, "x,y\n1,2\n").unwrap();
        let err = sweep(&base(), &csv).unwrap_err();
        assert!(err.to_string().contains("gx"));
    }
}
