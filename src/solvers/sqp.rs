//! Sequential quadratic programming for smooth objectives with equality
//! constraints and a lower bound on every variable.
//!
//! Each iteration solves the quadratic model
//!
//! ```text
//! min  ½ dᵀBd + ∇f(x)ᵀd
//! s.t. J(x) d = -c(x)
//!      x + d ≥ lb
//! ```
//!
//! where `B` is a damped-BFGS approximation of the Lagrangian Hessian, then
//! backtracks along `d` on the L1 merit function `f + Σ ρ_i |c_i|`. The bound
//! constraints of the subproblem are handled with an active set over the
//! variables; each working set is a dense KKT system solved by LU.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sufficient-decrease constant for the merit line search.
const ARMIJO: f64 = 1e-4;

/// A smooth problem `min f(x)` subject to `c(x) = 0` and `x ≥ lb`.
pub trait ConstrainedProblem {
    /// Number of decision variables.
    fn dimension(&self) -> usize;

    fn objective(&self, x: &DVector<f64>) -> f64;

    fn gradient(&self, x: &DVector<f64>) -> DVector<f64>;

    /// Equality constraint residuals. Feasible points give zeros.
    fn constraints(&self, x: &DVector<f64>) -> DVector<f64>;

    /// Jacobian of [`constraints`](Self::constraints), one row per constraint.
    fn jacobian(&self, x: &DVector<f64>) -> DMatrix<f64>;

    /// Lower bound on each variable. Defaults to non-negativity.
    fn lower_bounds(&self) -> DVector<f64> {
        DVector::zeros(self.dimension())
    }
}

/// Configuration for [`minimize`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqpConfig {
    /// Hard cap on outer iterations.
    pub max_iterations: u32,
    /// Relative tolerance on the objective change and on the step length.
    pub tolerance: f64,
    /// Largest acceptable constraint residual (max norm) at a solution.
    pub constraint_tolerance: f64,
    /// Step halvings tried before the line search gives up.
    pub max_line_search_steps: u32,
}

impl Default for SqpConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-6,
            constraint_tolerance: 1e-8,
            max_line_search_steps: 30,
        }
    }
}

/// Why the solver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqpStatus {
    Converged,
    IterationLimit,
    /// The linearized constraints could not be satisfied within the bounds.
    SingularSubproblem,
    LineSearchFailed,
    NonFinite,
}

impl fmt::Display for SqpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            SqpStatus::Converged => "optimization terminated successfully",
            SqpStatus::IterationLimit => "iteration limit reached",
            SqpStatus::SingularSubproblem => "incompatible or singular QP subproblem",
            SqpStatus::LineSearchFailed => "line search failed to reduce the merit function",
            SqpStatus::NonFinite => "objective or constraints evaluated to a non-finite value",
        };
        f.write_str(message)
    }
}

/// Final state of an SQP run. `x` is the last iterate even on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqpOutcome {
    pub x: Vec<f64>,
    pub objective_value: f64,
    /// Max-norm of the constraint residuals at `x`.
    pub constraint_violation: f64,
    pub iterations: u32,
    pub status: SqpStatus,
}

impl SqpOutcome {
    pub fn converged(&self) -> bool {
        self.status == SqpStatus::Converged
    }
}

/// Minimize `problem` starting from `initial` (clamped onto the bounds).
pub fn minimize<P>(problem: &P, initial: &[f64], config: &SqpConfig) -> SqpOutcome
where
    P: ConstrainedProblem + ?Sized,
{
    let n = problem.dimension();
    let lower = problem.lower_bounds();
    let mut x = DVector::from_fn(n, |i, _| {
        initial.get(i).copied().unwrap_or(0.0).max(lower[i])
    });

    let mut f = problem.objective(&x);
    let mut c = problem.constraints(&x);
    if !is_finite(f, &c) {
        return outcome(&x, f, &c, 0, SqpStatus::NonFinite);
    }
    if n == 0 {
        let status = if max_abs(&c) <= config.constraint_tolerance {
            SqpStatus::Converged
        } else {
            SqpStatus::SingularSubproblem
        };
        return outcome(&x, f, &c, 0, status);
    }

    let mut g = problem.gradient(&x);
    let mut jac = problem.jacobian(&x);
    let mut hessian = DMatrix::<f64>::identity(n, n);
    let mut penalty = DVector::<f64>::zeros(c.len());

    for iteration in 1..=config.max_iterations {
        let step_bounds = &lower - &x;
        let Some((step, multipliers)) =
            solve_qp_subproblem(&hessian, &g, &jac, &(-c.clone()), &step_bounds)
        else {
            return outcome(&x, f, &c, iteration, SqpStatus::SingularSubproblem);
        };

        if max_abs(&c) <= config.constraint_tolerance
            && max_abs(&step) <= config.tolerance * (1.0 + max_abs(&x))
        {
            return outcome(&x, f, &c, iteration, SqpStatus::Converged);
        }

        for (rho, mu) in penalty.iter_mut().zip(multipliers.iter()) {
            *rho = mu.abs().max(0.5 * (*rho + mu.abs()));
        }
        let merit = f + penalty.dot(&c.abs());
        let slope = (g.dot(&step) - penalty.dot(&c.abs())).min(0.0);
        let slack = 16.0 * f64::EPSILON * merit.abs().max(1.0);

        let mut alpha = 1.0;
        let mut accepted = None;
        for _ in 0..config.max_line_search_steps {
            let trial = clamp_to_bounds(&x + &step * alpha, &lower);
            let f_trial = problem.objective(&trial);
            let c_trial = problem.constraints(&trial);
            if is_finite(f_trial, &c_trial) {
                let merit_trial = f_trial + penalty.dot(&c_trial.abs());
                if merit_trial <= merit + ARMIJO * alpha * slope + slack {
                    accepted = Some((trial, f_trial, c_trial));
                    break;
                }
            }
            alpha *= 0.5;
        }
        let Some((x_next, f_next, c_next)) = accepted else {
            return outcome(&x, f, &c, iteration, SqpStatus::LineSearchFailed);
        };

        let g_next = problem.gradient(&x_next);
        let jac_next = problem.jacobian(&x_next);
        let s = &x_next - &x;
        let y = (&g_next - jac_next.tr_mul(&multipliers)) - (&g - jac.tr_mul(&multipliers));
        damped_bfgs_update(&mut hessian, &s, &y);

        let f_previous = f;
        x = x_next;
        f = f_next;
        c = c_next;
        g = g_next;
        jac = jac_next;

        log::debug!(
            "sqp iteration {}: f = {:.6e}, |c| = {:.3e}, alpha = {}",
            iteration,
            f,
            max_abs(&c),
            alpha
        );

        let objective_settled = (f - f_previous).abs() <= config.tolerance * f.abs().max(1.0);
        let step_settled = max_abs(&s) <= config.tolerance * (1.0 + max_abs(&x));
        if max_abs(&c) <= config.constraint_tolerance && (objective_settled || step_settled) {
            return outcome(&x, f, &c, iteration, SqpStatus::Converged);
        }
    }

    outcome(&x, f, &c, config.max_iterations, SqpStatus::IterationLimit)
}

/// Solve the bound-constrained equality QP
/// `min ½dᵀBd + gᵀd  s.t.  J d = rhs, d ≥ lower`.
///
/// Returns the step and the equality multipliers `μ` satisfying
/// `B d + g - Jᵀμ ≥ 0` on the active bounds.
fn solve_qp_subproblem(
    b: &DMatrix<f64>,
    g: &DVector<f64>,
    jac: &DMatrix<f64>,
    rhs: &DVector<f64>,
    lower: &DVector<f64>,
) -> Option<(DVector<f64>, DVector<f64>)> {
    let n = g.len();
    let m = rhs.len();
    let gradient_scale = 1.0 + max_abs(g);
    let mut fixed = vec![false; n];

    for _ in 0..(3 * n + 10) {
        let free: Vec<usize> = (0..n).filter(|&i| !fixed[i]).collect();
        let nf = free.len();
        if nf < m {
            return None;
        }

        let mut d = DVector::from_fn(n, |i, _| if fixed[i] { lower[i] } else { 0.0 });
        let b_fixed = b * &d;
        let jac_fixed = jac * &d;

        let size = nf + m;
        let mut kkt = DMatrix::<f64>::zeros(size, size);
        let mut kkt_rhs = DVector::<f64>::zeros(size);
        for (row, &i) in free.iter().enumerate() {
            for (col, &j) in free.iter().enumerate() {
                kkt[(row, col)] = b[(i, j)];
            }
            for k in 0..m {
                kkt[(row, nf + k)] = -jac[(k, i)];
                kkt[(nf + k, row)] = jac[(k, i)];
            }
            kkt_rhs[row] = -g[i] - b_fixed[i];
        }
        for k in 0..m {
            kkt_rhs[nf + k] = rhs[k] - jac_fixed[k];
        }

        let solution = kkt.lu().solve(&kkt_rhs)?;
        if solution.iter().any(|v| !v.is_finite()) {
            return None;
        }
        for (row, &i) in free.iter().enumerate() {
            d[i] = solution[row];
        }
        let multipliers = DVector::from_iterator(m, solution.iter().skip(nf).copied());

        // A rank-deficient working set can yield a "solution" that misses the constraints.
        let residual = max_abs(&(jac * &d - rhs));
        if residual > 1e-8 * (1.0 + max_abs(rhs)) {
            return None;
        }

        let most_violated = free
            .iter()
            .map(|&i| (i, lower[i] - d[i]))
            .filter(|&(i, gap)| gap > 1e-12 * (1.0 + lower[i].abs()))
            .max_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((i, _)) = most_violated {
            fixed[i] = true;
            continue;
        }

        let bound_multipliers = b * &d + g - jac.tr_mul(&multipliers);
        let most_negative = (0..n)
            .filter(|&i| fixed[i])
            .map(|i| (i, bound_multipliers[i]))
            .filter(|&(_, lambda)| lambda < -1e-10 * gradient_scale)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((i, _)) = most_negative {
            fixed[i] = false;
            continue;
        }

        return Some((d, multipliers));
    }

    None
}

/// Powell-damped BFGS update keeping `b` positive definite.
fn damped_bfgs_update(b: &mut DMatrix<f64>, s: &DVector<f64>, y: &DVector<f64>) {
    let bs = &*b * s;
    let s_bs = s.dot(&bs);
    if s_bs <= f64::MIN_POSITIVE {
        return;
    }
    let s_y = s.dot(y);
    let theta = if s_y >= 0.2 * s_bs {
        1.0
    } else {
        0.8 * s_bs / (s_bs - s_y)
    };
    let r = y * theta + &bs * (1.0 - theta);
    let s_r = s.dot(&r);
    if s_r <= f64::MIN_POSITIVE {
        return;
    }
    *b -= &bs * bs.transpose() / s_bs;
    *b += &r * r.transpose() / s_r;
}

fn clamp_to_bounds(mut x: DVector<f64>, lower: &DVector<f64>) -> DVector<f64> {
    for (value, bound) in x.iter_mut().zip(lower.iter()) {
        if *value < *bound {
            *value = *bound;
        }
    }
    x
}

fn max_abs(v: &DVector<f64>) -> f64 {
    v.iter().fold(0.0, |acc, x| acc.max(x.abs()))
}

fn is_finite(f: f64, c: &DVector<f64>) -> bool {
    f.is_finite() && c.iter().all(|v| v.is_finite())
}

fn outcome(
    x: &DVector<f64>,
    f: f64,
    c: &DVector<f64>,
    iterations: u32,
    status: SqpStatus,
) -> SqpOutcome {
    SqpOutcome {
        x: x.iter().copied().collect(),
        objective_value: f,
        constraint_violation: max_abs(c),
        iterations,
        status,
    }
}
