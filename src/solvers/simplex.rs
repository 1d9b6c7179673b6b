//! Dense two-phase tableau simplex for small linear programs.
//!
//! Solves `min cᵀx` subject to rows `aᵢᵀx {≤, ≥, =} bᵢ` and `x ≥ 0`.
//! Phase one minimizes the sum of artificial variables to find a feasible
//! basis; phase two optimizes the real objective from there. Pivoting uses
//! Bland's rule, so degenerate problems cannot cycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sense of a constraint row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    LessEq,
    GreaterEq,
    Equal,
}

impl Relation {
    fn flipped(self) -> Self {
        match self {
            Relation::LessEq => Relation::GreaterEq,
            Relation::GreaterEq => Relation::LessEq,
            Relation::Equal => Relation::Equal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub coefficients: Vec<f64>,
    pub relation: Relation,
    pub rhs: f64,
}

/// Configuration for [`LinearProgram::solve`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplexConfig {
    /// Pivot budget shared by both phases.
    pub max_iterations: u32,
    /// Threshold below which reduced costs and pivots count as zero.
    pub tolerance: f64,
}

impl Default for SimplexConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            tolerance: 1e-9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LpStatus {
    Optimal,
    Infeasible,
    Unbounded,
    IterationLimit,
}

impl fmt::Display for LpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            LpStatus::Optimal => "optimal solution found",
            LpStatus::Infeasible => "problem is infeasible",
            LpStatus::Unbounded => "problem is unbounded",
            LpStatus::IterationLimit => "iteration limit reached",
        };
        f.write_str(message)
    }
}

/// Result of a simplex run. `x` is all zeros unless the status is optimal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LpSolution {
    pub status: LpStatus,
    pub x: Vec<f64>,
    pub objective_value: f64,
    pub iterations: u32,
}

impl LpSolution {
    pub fn is_optimal(&self) -> bool {
        self.status == LpStatus::Optimal
    }
}

/// A minimization problem over non-negative variables.
///
/// # Examples
///
/// ```
/// use hedging_engine::solvers::simplex::{LinearProgram, Relation, SimplexConfig};
///
/// // min x + y  s.t.  x + 2y ≥ 4,  3x + y ≥ 6
/// let lp = LinearProgram::new(vec![1.0, 1.0])
///     .with_constraint(vec![1.0, 2.0], Relation::GreaterEq, 4.0)
///     .with_constraint(vec![3.0, 1.0], Relation::GreaterEq, 6.0);
///
/// let solution = lp.solve(&SimplexConfig::default());
/// assert!(solution.is_optimal());
/// assert!((solution.objective_value - 2.8).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearProgram {
    objective: Vec<f64>,
    constraints: Vec<Constraint>,
}

impl LinearProgram {
    pub fn new(objective: Vec<f64>) -> Self {
        Self {
            objective,
            constraints: Vec::new(),
        }
    }

    /// Add a row. Missing trailing coefficients are treated as zero.
    pub fn add_constraint(&mut self, coefficients: Vec<f64>, relation: Relation, rhs: f64) {
        self.constraints.push(Constraint {
            coefficients,
            relation,
            rhs,
        });
    }

    #[must_use]
    pub fn with_constraint(mut self, coefficients: Vec<f64>, relation: Relation, rhs: f64) -> Self {
        self.add_constraint(coefficients, relation, rhs);
        self
    }

    pub fn variable_count(&self) -> usize {
        self.objective.len()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn solve(&self, config: &SimplexConfig) -> LpSolution {
        let n = self.objective.len();
        let mut tableau = Tableau::build(n, &self.constraints);
        let mut iterations = 0;

        let failed = |status: LpStatus, iterations: u32| LpSolution {
            status,
            x: vec![0.0; n],
            objective_value: 0.0,
            iterations,
        };

        if tableau.artificial_count() > 0 {
            let mut phase_one_cost = vec![0.0; tableau.columns];
            for cost in &mut phase_one_cost[tableau.artificial_start..] {
                *cost = 1.0;
            }
            tableau.load_objective(&phase_one_cost);
            if let Err(status) = tableau.optimize(tableau.columns, config, &mut iterations) {
                return failed(status, iterations);
            }

            let scale = 1.0
                + self
                    .constraints
                    .iter()
                    .fold(0.0_f64, |acc, c| acc.max(c.rhs.abs()));
            let infeasibility = tableau.objective_value();
            if infeasibility > config.tolerance * scale {
                log::debug!("simplex phase one ended with infeasibility {:.3e}", infeasibility);
                return failed(LpStatus::Infeasible, iterations);
            }
            tableau.drive_out_artificials(config.tolerance);
        }

        let mut cost = vec![0.0; tableau.columns];
        cost[..n].copy_from_slice(&self.objective);
        tableau.load_objective(&cost);
        let allowed = tableau.artificial_start;
        if let Err(status) = tableau.optimize(allowed, config, &mut iterations) {
            return failed(status, iterations);
        }

        let x = tableau.primal_values(n);
        let objective_value = x.iter().zip(&self.objective).map(|(v, c)| v * c).sum();
        log::debug!(
            "simplex optimal after {} pivots, objective {:.6e}",
            iterations,
            objective_value
        );
        LpSolution {
            status: LpStatus::Optimal,
            x,
            objective_value,
            iterations,
        }
    }
}

/// Row-major tableau. Column layout: decision variables, then one slack or
/// surplus per inequality, then one artificial per `≥` / `=` row, then the
/// right-hand side. The objective row holds reduced costs and `-z` in its
/// last entry.
struct Tableau {
    rows: Vec<Vec<f64>>,
    objective: Vec<f64>,
    basis: Vec<usize>,
    columns: usize,
    artificial_start: usize,
}

impl Tableau {
    fn build(n: usize, constraints: &[Constraint]) -> Self {
        let slack_count = constraints
            .iter()
            .filter(|c| c.relation != Relation::Equal)
            .count();
        let artificial_total = constraints
            .iter()
            .filter(|c| normalized_relation(c) != Relation::LessEq)
            .count();
        let artificial_start = n + slack_count;
        let columns = artificial_start + artificial_total;

        let mut rows = Vec::with_capacity(constraints.len());
        let mut basis = Vec::with_capacity(constraints.len());
        let mut next_slack = n;
        let mut next_artificial = artificial_start;

        for constraint in constraints {
            let sign = if constraint.rhs < 0.0 { -1.0 } else { 1.0 };
            let relation = normalized_relation(constraint);
            let mut row = vec![0.0; columns + 1];
            for (j, a) in constraint.coefficients.iter().take(n).enumerate() {
                row[j] = sign * a;
            }
            row[columns] = sign * constraint.rhs;

            match relation {
                Relation::LessEq => {
                    row[next_slack] = 1.0;
                    basis.push(next_slack);
                    next_slack += 1;
                }
                Relation::GreaterEq => {
                    row[next_slack] = -1.0;
                    next_slack += 1;
                    row[next_artificial] = 1.0;
                    basis.push(next_artificial);
                    next_artificial += 1;
                }
                Relation::Equal => {
                    row[next_artificial] = 1.0;
                    basis.push(next_artificial);
                    next_artificial += 1;
                }
            }
            rows.push(row);
        }

        Self {
            rows,
            objective: vec![0.0; columns + 1],
            basis,
            columns,
            artificial_start,
        }
    }

    fn artificial_count(&self) -> usize {
        self.columns - self.artificial_start
    }

    /// Price out the current basis against `cost`.
    fn load_objective(&mut self, cost: &[f64]) {
        let mut objective = vec![0.0; self.columns + 1];
        objective[..self.columns].copy_from_slice(cost);
        for (row, &basic) in self.rows.iter().zip(&self.basis) {
            let cb = cost[basic];
            if cb != 0.0 {
                for (o, r) in objective.iter_mut().zip(row) {
                    *o -= cb * r;
                }
            }
        }
        self.objective = objective;
    }

    fn objective_value(&self) -> f64 {
        -self.objective[self.columns]
    }

    /// Pivot until no column below `allowed` has a negative reduced cost.
    fn optimize(
        &mut self,
        allowed: usize,
        config: &SimplexConfig,
        iterations: &mut u32,
    ) -> Result<(), LpStatus> {
        loop {
            let Some(entering) = (0..allowed).find(|&j| self.objective[j] < -config.tolerance)
            else {
                return Ok(());
            };
            if *iterations >= config.max_iterations {
                return Err(LpStatus::IterationLimit);
            }

            let rhs = self.columns;
            let leaving = self
                .rows
                .iter()
                .enumerate()
                .filter(|(_, row)| row[entering] > config.tolerance)
                .map(|(i, row)| (i, row[rhs] / row[entering]))
                .min_by(|a, b| {
                    a.1.total_cmp(&b.1)
                        .then_with(|| self.basis[a.0].cmp(&self.basis[b.0]))
                })
                .map(|(i, _)| i);
            let Some(leaving) = leaving else {
                return Err(LpStatus::Unbounded);
            };

            self.pivot(leaving, entering);
            *iterations += 1;
        }
    }

    fn pivot(&mut self, pivot_row: usize, pivot_col: usize) {
        let pivot = self.rows[pivot_row][pivot_col];
        for value in &mut self.rows[pivot_row] {
            *value /= pivot;
        }
        let normalized = self.rows[pivot_row].clone();

        for (i, row) in self.rows.iter_mut().enumerate() {
            if i == pivot_row {
                continue;
            }
            let factor = row[pivot_col];
            if factor != 0.0 {
                for (value, p) in row.iter_mut().zip(&normalized) {
                    *value -= factor * p;
                }
            }
        }
        let factor = self.objective[pivot_col];
        if factor != 0.0 {
            for (value, p) in self.objective.iter_mut().zip(&normalized) {
                *value -= factor * p;
            }
        }
        self.basis[pivot_row] = pivot_col;
    }

    /// After phase one, swap zero-valued artificials out of the basis where a
    /// structural column can replace them. Rows with no such column are
    /// redundant and keep their artificial pinned at zero.
    fn drive_out_artificials(&mut self, tolerance: f64) {
        for i in 0..self.rows.len() {
            if self.basis[i] < self.artificial_start {
                continue;
            }
            if let Some(j) =
                (0..self.artificial_start).find(|&j| self.rows[i][j].abs() > tolerance)
            {
                self.pivot(i, j);
            }
        }
    }

    fn primal_values(&self, n: usize) -> Vec<f64> {
        let mut x = vec![0.0; n];
        for (row, &basic) in self.rows.iter().zip(&self.basis) {
            if basic < n {
                x[basic] = row[self.columns].max(0.0);
            }
        }
        x
    }
}

fn normalized_relation(constraint: &Constraint) -> Relation {
    if constraint.rhs < 0.0 {
        constraint.relation.flipped()
    } else {
        constraint.relation
    }
}
