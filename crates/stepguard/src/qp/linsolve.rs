//! Dense Gaussian elimination with partial pivoting.
//!
//! Sized for the small KKT systems of the active-set search (at most
//! `2 + MAX_ACTIVE_HALFSPACES` unknowns). Singular input is an expected
//! outcome and reported as `None`.

use nalgebra::{DMatrix, DVector};

use crate::cfg::PIVOT_EPS;

/// Shorthand for `solve_dense_eps(a, b, PIVOT_EPS)`.
#[inline]
pub fn solve_dense(a: DMatrix<f64>, b: DVector<f64>) -> Option<DVector<f64>> {
    solve_dense_eps(a, b, PIVOT_EPS)
}

/// Solve the square system `a x = b`.
///
/// Returns `None` when the best pivot of some column is below `pivot_eps` or a
/// back-substitution diagonal is, or when the shapes disagree.
pub fn solve_dense_eps(
    mut a: DMatrix<f64>,
    mut b: DVector<f64>,
    pivot_eps: f64,
) -> Option<DVector<f64>> {
    let n = a.nrows();
    if a.ncols() != n || b.len() != n {
        return None;
    }
    for col in 0..n {
        // partial pivoting over the unprocessed rows
        let mut piv = col;
        let mut best = a[(col, col)].abs();
        for row in (col + 1)..n {
            let v = a[(row, col)].abs();
            if v > best {
                best = v;
                piv = row;
            }
        }
        if best.is_nan() || best < pivot_eps {
            return None;
        }
        if piv != col {
            a.swap_rows(col, piv);
            b.swap_rows(col, piv);
        }
        let d = a[(col, col)];
        for row in (col + 1)..n {
            let f = a[(row, col)] / d;
            if f == 0.0 {
                continue;
            }
            for k in col..n {
                a[(row, k)] -= f * a[(col, k)];
            }
            b[row] -= f * b[col];
        }
    }
    let mut x = DVector::zeros(n);
    for row in (0..n).rev() {
        let d = a[(row, row)];
        if d.abs() < pivot_eps {
            return None;
        }
        let mut acc = b[row];
        for k in (row + 1)..n {
            acc -= a[(row, k)] * x[k];
        }
        x[row] = acc / d;
    }
    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn solves_small_system_needing_a_swap() {
        // zero in the (0,0) slot forces a row swap
        let a = DMatrix::from_row_slice(3, 3, &[0.0, 2.0, 1.0, 1.0, 1.0, 0.0, 3.0, 0.0, 1.0]);
        let x_true = DVector::from_vec(vec![1.0, -2.0, 0.5]);
        let b = &a * &x_true;
        let x = solve_dense(a, b).expect("regular system");
        assert!((x - x_true).norm() < 1e-12);
    }

    #[test]
    fn singular_and_near_singular_are_none() {
        // parallel rows
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let b = DVector::from_vec(vec![1.0, 2.0]);
        assert!(solve_dense(a, b).is_none());
        // pivot below tolerance
        let a = DMatrix::from_row_slice(2, 2, &[1e-12, 0.0, 0.0, 1.0]);
        let b = DVector::from_vec(vec![1.0, 1.0]);
        assert!(solve_dense(a.clone(), b.clone()).is_none());
        assert!(solve_dense_eps(a, b, 1e-14).is_some());
    }

    #[test]
    fn shape_mismatch_is_none() {
        let a = DMatrix::<f64>::identity(3, 3);
        let b = DVector::from_vec(vec![1.0, 2.0]);
        assert!(solve_dense(a, b).is_none());
    }

    #[test]
    fn empty_system_is_trivially_solved() {
        let x = solve_dense(DMatrix::zeros(0, 0), DVector::zeros(0)).unwrap();
        assert_eq!(x.len(), 0);
    }

    #[test]
    fn random_diagonally_dominant_seeded() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in 1..8 {
            let mut a = DMatrix::<f64>::zeros(n, n);
            for i in 0..n {
                for j in 0..n {
                    a[(i, j)] = rng.gen_range(-1.0..1.0);
                }
                a[(i, i)] += n as f64 * 2.0;
            }
            let x_true = DVector::from_fn(n, |_, _| rng.gen_range(-3.0..3.0));
            let b = &a * &x_true;
            let x = solve_dense(a, b).unwrap();
            assert!((x - x_true).norm() < 1e-10);
        }
    }
}
