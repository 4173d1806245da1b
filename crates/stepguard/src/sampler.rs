//! Random guardrail sets (unit normals + replay tokens).
//!
//! Purpose
//! - Deterministic inputs for seeded tests, benchmarks, and `stepguard-cli sample`.
//!
//! Model
//! - `n` halfspaces with normals at independent uniform angles, bounds uniform
//!   in `[bound_min, bound_max]`, each switched off with probability
//!   `inactive_prob`. With `bound_min >= 0` the origin is always feasible.
//! - Determinism uses a replay token `(seed, index)` mixed into a single RNG.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geom2::vector::{normalize, scale};
use crate::geom2::{Halfspace, Vec2};

/// Halfspace count distribution.
#[derive(Clone, Copy, Debug)]
pub enum HalfspaceCount {
    Fixed(usize),
    Uniform { min: usize, max: usize },
}
impl HalfspaceCount {
    fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        match *self {
            HalfspaceCount::Fixed(n) => n,
            HalfspaceCount::Uniform { min, max } => rng.gen_range(min..=max.max(min)),
        }
    }
}

/// Sampler configuration.
#[derive(Clone, Copy, Debug)]
pub struct GuardrailCfg {
    pub count: HalfspaceCount,
    pub bound_min: f64,
    pub bound_max: f64,
    /// Probability that a drawn halfspace is marked inactive. Clamped to [0, 1].
    pub inactive_prob: f64,
}
impl Default for GuardrailCfg {
    fn default() -> Self {
        Self {
            count: HalfspaceCount::Uniform { min: 1, max: 6 },
            bound_min: 0.1,
            bound_max: 1.0,
            inactive_prob: 0.0,
        }
    }
}

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}
impl ReplayToken {
    pub fn new(seed: u64, index: u64) -> Self {
        Self { seed, index }
    }

    #[inline]
    fn to_std_rng(self, stream: u64) -> StdRng {
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15) ^ stream));
        StdRng::seed_from_u64(k)
    }
}

/// Draw a guardrail set with ids `g0, g1, …`.
pub fn draw_guardrails(cfg: GuardrailCfg, tok: ReplayToken) -> Vec<Halfspace> {
    let mut rng = tok.to_std_rng(0);
    let n = cfg.count.sample(&mut rng);
    let (lo, hi) = if cfg.bound_min <= cfg.bound_max {
        (cfg.bound_min, cfg.bound_max)
    } else {
        (cfg.bound_max, cfg.bound_min)
    };
    let p_off = cfg.inactive_prob.clamp(0.0, 1.0);
    (0..n)
        .map(|k| {
            let th = rng.gen::<f64>() * std::f64::consts::TAU;
            let normal = normalize(Vec2::new(th.cos(), th.sin()));
            let bound = lo + rng.gen::<f64>() * (hi - lo);
            let active = rng.gen::<f64>() >= p_off;
            Halfspace::new(format!("g{k}"), normal, bound)
                .with_label(format!("guardrail {k}"))
                .with_active(active)
        })
        .collect()
}

/// Gradient with uniform direction and length in `[0, max_norm]`.
pub fn draw_gradient(max_norm: f64, tok: ReplayToken) -> Vec2 {
    let mut rng = tok.to_std_rng(1);
    let th = rng.gen::<f64>() * std::f64::consts::TAU;
    let r = rng.gen::<f64>() * max_norm.abs();
    scale(Vec2::new(th.cos(), th.sin()), r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_is_deterministic() {
        let cfg = GuardrailCfg::default();
        let a = draw_guardrails(cfg, ReplayToken::new(3, 11));
        let b = draw_guardrails(cfg, ReplayToken::new(3, 11));
        assert_eq!(a, b);
        let c = draw_guardrails(cfg, ReplayToken::new(3, 12));
        assert!(a != c || a.is_empty());
        assert_eq!(
            draw_gradient(2.0, ReplayToken::new(5, 0)),
            draw_gradient(2.0, ReplayToken::new(5, 0))
        );
    }

    #[test]
    fn draws_respect_cfg() {
        let cfg = GuardrailCfg {
            count: HalfspaceCount::Fixed(5),
            bound_min: 0.2,
            bound_max: 0.4,
            inactive_prob: 0.0,
        };
        for index in 0..20 {
            let hs = draw_guardrails(cfg, ReplayToken::new(9, index));
            assert_eq!(hs.len(), 5);
            for (k, h) in hs.iter().enumerate() {
                assert_eq!(h.id, format!("g{k}"));
                assert!(h.active);
                assert!((h.normal.norm() - 1.0).abs() < 1e-12);
                assert!((0.2..=0.4).contains(&h.bound));
            }
            let g = draw_gradient(1.5, ReplayToken::new(9, index));
            assert!(g.norm() <= 1.5 + 1e-12);
        }
    }

    #[test]
    fn inactive_prob_one_switches_everything_off() {
        let cfg = GuardrailCfg {
            count: HalfspaceCount::Fixed(4),
            inactive_prob: 1.0,
            ..GuardrailCfg::default()
        };
        let hs = draw_guardrails(cfg, ReplayToken::new(1, 1));
        assert!(hs.iter().all(|h| !h.active));
    }
}
