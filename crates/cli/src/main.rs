use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use stepguard::sampler::{draw_gradient, draw_guardrails, GuardrailCfg, HalfspaceCount, ReplayToken};
use stepguard::{project_step, ProjectionInput};
use tracing_subscriber::fmt::SubscriberBuilder;

mod doc;
mod provenance;
mod sweep;

use doc::{InputDoc, ResultDoc};
use provenance::{write_sidecar, Payload};

#[derive(Parser)]
#[command(name = "stepguard-cli")]
#[command(about = "Project update steps onto guardrail halfspaces")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Project one request document and write the certified result
    Project {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Overrides the document's tolerance
        #[arg(long)]
        tolerance: Option<f64>,
    },
    /// Project every gradient row of a CSV against one guardrail set
    Sweep {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        gradients: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Write a random request document
    Sample {
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 0)]
        index: u64,
        #[arg(long, default_value_t = 4)]
        count: usize,
        #[arg(long, default_value_t = 1.0)]
        eta: f64,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Project {
            input,
            out,
            tolerance,
        } => project(&input, &out, tolerance),
        Action::Sweep {
            input,
            gradients,
            out,
        } => run_sweep(&input, &gradients, &out),
        Action::Sample {
            seed,
            index,
            count,
            eta,
            out,
        } => sample(seed, index, count, eta, &out),
        Action::Report => report(),
    }
}

fn ensure_parent(out: &Path) -> Result<()> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn load_input(path: &Path, tolerance: Option<f64>) -> Result<ProjectionInput> {
    let mut input = InputDoc::read(path)?.to_input()?;
    if let Some(tol) = tolerance {
        if !tol.is_finite() {
            bail!("tolerance must be finite");
        }
        input = input.with_tolerance(tol);
    }
    Ok(input)
}

fn project(input_path: &Path, out: &Path, tolerance: Option<f64>) -> Result<()> {
    let input = load_input(input_path, tolerance)?;
    tracing::info!(
        input = %input_path.display(),
        out = %out.display(),
        halfspaces = input.halfspaces.len(),
        tolerance = input.tolerance,
        "project"
    );
    let result = project_step(&input);
    tracing::info!(
        ship = result.ship,
        reason = ?result.reason,
        active_set = ?result.active_set_ids,
        residual = result.stationarity_residual,
        "projection_done"
    );
    ensure_parent(out)?;
    std::fs::write(out, serde_json::to_vec_pretty(&ResultDoc::from(&result))?)?;
    write_sidecar(
        out,
        Payload::new(
            "project",
            serde_json::json!({ "tolerance": input.tolerance, "eta": input.eta }),
        )
        .with_input(input_path),
    )?;
    Ok(())
}

fn run_sweep(input_path: &Path, gradients: &Path, out: &Path) -> Result<()> {
    tracing::info!(
        input = %input_path.display(),
        gradients = %gradients.display(),
        out = %out.display(),
        "sweep"
    );
    let base = load_input(input_path, None)?;
    let mut df = sweep::sweep(&base, gradients)?;
    ensure_parent(out)?;
    sweep::write_csv(&mut df, out)?;
    write_sidecar(
        out,
        Payload::new("sweep", serde_json::json!({ "rows": df.height() }))
            .with_input(input_path)
            .with_input(gradients),
    )?;
    Ok(())
}

fn sample(seed: u64, index: u64, count: usize, eta: f64, out: &Path) -> Result<()> {
    tracing::info!(seed, index, count, eta, out = %out.display(), "sample");
    let cfg = GuardrailCfg {
        count: HalfspaceCount::Fixed(count),
        ..GuardrailCfg::default()
    };
    let tok = ReplayToken::new(seed, index);
    let input = ProjectionInput::new(draw_gradient(2.0, tok), eta, draw_guardrails(cfg, tok));
    ensure_parent(out)?;
    std::fs::write(out, serde_json::to_vec_pretty(&InputDoc::from_input(&input))?)?;
    write_sidecar(
        out,
        Payload::new(
            "sample",
            serde_json::json!({ "seed": seed, "index": index, "count": count, "eta": eta }),
        ),
    )?;
    Ok(())
}

fn report() -> Result<()> {
    let obj = serde_json::json!({
        "code_rev": provenance::current_git_rev(),
        "engine_version": stepguard::VERSION,
        "defaults": {
            "tolerance": stepguard::cfg::DEFAULT_TOLERANCE,
            "max_active_halfspaces": stepguard::cfg::MAX_ACTIVE_HALFSPACES
        }
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sample_then_project_writes_artifacts() {
        let dir = tempdir().unwrap();
        let req = dir.path().join("req.json");
        let res = dir.path().join("out/res.json");
        sample(7, 3, 3, 0.5, &req).unwrap();
        assert!(dir.path().join("req.provenance.json").exists());
        project(&req, &res, None).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&res).unwrap()).unwrap();
        // default sampler bounds keep the origin feasible
        assert_eq!(parsed["ship"], true);
        assert_eq!(parsed["diagnostics"].as_array().unwrap().len(), 3);
        assert!(dir.path().join("out/res.provenance.json").exists());
    }

    #[test]
    fn non_finite_tolerance_is_rejected() {
        let dir = tempdir().unwrap();
        let req = dir.path().join("req.json");
        sample(1, 1, 2, 1.0, &req).unwrap();
        assert!(load_input(&req, Some(f64::NAN)).is_err());
    }
}
