/*
 * Copyright (c) 2021, 2022 Frank Fischer <frank-fischer@shadow-soft.de>
 *
 * This program is free software: you can redistribute it and/or
 * modify it under the terms of the GNU General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful, but
 * WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
 * General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see  <http://www.gnu.org/licenses/>
 */

//! A dense bounded variable primal simplex solver.
//!
//! This is the reference implementation behind the [`LpSolver`]
//! trait. It is written for correctness on small and medium problems,
//! not for speed: the basis inverse is kept explicitly and recomputed
//! after every pivot, and Bland's rule is used throughout so that the
//! method terminates even on degenerate programs.

use crate::lp::StandardLp;
use crate::output::{Basis, Output, VariableStatus};
use crate::solver::{LpSolver, SolveMethod, SolverError, SolverSettings, WarmStart};
use num_traits::{Float, NumAssign};
use std::time::Instant;

/// The reference simplex solver.
///
/// A warm start basis may be rank deficient, as the bases produced by
/// the network crossover are: the uncovered rows are completed with
/// zero cost artificial variables fixed at value zero. A warm start
/// whose basic point violates the bounds is discarded and the solve
/// falls back to a cold start with big-M artificials.
///
/// The dual values returned belong to the final basis. If a cold
/// start artificial remains basic at value zero, they are the duals
/// of the extended program.
///
/// The `method` argument of [`LpSolver::solve`] is accepted for
/// interface compatibility, this implementation always runs the
/// primal algorithm.
///
/// # Example
///
/// ```
/// use rs_crossover::lp::StandardLp;
/// use rs_crossover::sparse::SparseMatrix;
/// use rs_crossover::solver::{LpSolver, SolveMethod, SolverSettings};
/// use rs_crossover::SimplexSolver;
///
/// // min -x - 2y  s.t.  x + y = 1,  0 <= x, y <= 1
/// let mat = SparseMatrix::from_columns(1, vec![vec![(0, 1.0)], vec![(0, 1.0)]]);
/// let lp = StandardLp::new(mat, vec![1.0], vec![-1.0, -2.0], vec![1.0, 1.0]).unwrap();
///
/// let mut solver = SimplexSolver::new();
/// let out = solver
///     .solve(&lp, SolveMethod::PrimalSimplex, &SolverSettings::default(), None)
///     .unwrap();
/// assert_eq!(out.x, vec![0.0, 1.0]);
/// assert_eq!(out.objective, -2.0);
/// ```
pub struct SimplexSolver<F> {
    /// The value to be considered zero.
    ///
    /// If this is zero, the tolerance of the [`SolverSettings`] is
    /// used instead.
    pub zero: F,
    /// The cost value of the artificial variables of a cold start.
    ///
    /// If `None` the value `(1 + max |cost|) * nr_variables` is used.
    pub artificial_cost: Option<F>,
    /// Bounds greater than or equal to this value are treated as
    /// infinite.
    pub infinite: F,
}

impl<F> SimplexSolver<F>
where
    F: Float,
{
    pub fn new() -> Self {
        SimplexSolver {
            zero: F::zero(),
            artificial_cost: None,
            infinite: F::max_value(),
        }
    }
}

impl<F> Default for SimplexSolver<F>
where
    F: Float,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<F> LpSolver<F> for SimplexSolver<F>
where
    F: Float + NumAssign,
{
    fn solve(
        &mut self,
        lp: &StandardLp<F>,
        _method: SolveMethod,
        settings: &SolverSettings,
        warm: Option<&WarmStart<F>>,
    ) -> Result<Output<F>, SolverError> {
        let tstart = Instant::now();

        let tol = if self.zero > F::zero() {
            self.zero
        } else {
            F::from(settings.tolerance).unwrap_or_else(F::zero)
        };

        let mut tab = Tableau::new(lp, tol, self.infinite);

        let warm_ok = match warm {
            Some(w) => tab.init_warm(&w.basis)?,
            None => false,
        };
        if !warm_ok {
            tab.init_cold(self.artificial_cost);
        }

        let y = tab.iterate(settings.iteration_limit)?;

        // a basic artificial with non-zero value proves infeasibility
        for (&j, &v) in tab.basis.iter().zip(&tab.xb) {
            if j >= tab.n && v.abs() > tab.tol {
                return Err(SolverError::Infeasible);
            }
        }

        let mut x = vec![F::zero(); tab.n];
        let mut statuses = Vec::with_capacity(tab.n);
        for j in 0..tab.n {
            statuses.push(tab.status[j]);
            if tab.status[j] == VariableStatus::AtUpper {
                x[j] = lp.upper[j];
            }
        }
        for (&j, &v) in tab.basis.iter().zip(&tab.xb) {
            if j < tab.n {
                x[j] = v;
            }
        }

        let objective = lp.objective(&x);
        Ok(Output {
            x,
            y: Some(y),
            objective,
            basis: Basis::new(statuses),
            runtime: tstart.elapsed(),
            iterations: tab.niter,
        })
    }
}

/// The working data of a single solve.
///
/// The variables `0..n` are the structural columns of the program,
/// `n..n+m` are artificial slots, one per row. Artificial `k` is the
/// single entry column `art_sign[k]` in row `k`; unused slots keep a
/// zero upper bound and never move.
struct Tableau<'a, F> {
    lp: &'a StandardLp<F>,
    m: usize,
    n: usize,
    tol: F,
    infinite: F,
    art_sign: Vec<F>,
    art_cost: Vec<F>,
    art_upper: Vec<F>,
    status: Vec<VariableStatus>,
    /// The basic variable of each basis position.
    basis: Vec<usize>,
    /// The inverse of the basis matrix, row-major.
    binv: Vec<Vec<F>>,
    /// The values of the basic variables, aligned with `basis`.
    xb: Vec<F>,
    niter: usize,
}

impl<'a, F> Tableau<'a, F>
where
    F: Float + NumAssign,
{
    fn new(lp: &'a StandardLp<F>, tol: F, infinite: F) -> Self {
        let m = lp.nr_rows();
        let n = lp.nr_variables();
        Tableau {
            lp,
            m,
            n,
            tol,
            infinite,
            art_sign: vec![F::one(); m],
            art_cost: vec![F::zero(); m],
            art_upper: vec![F::zero(); m],
            status: vec![VariableStatus::AtLower; n + m],
            basis: Vec::with_capacity(m),
            binv: vec![],
            xb: vec![],
            niter: 0,
        }
    }

    fn upper_of(&self, j: usize) -> F {
        if j < self.n {
            self.lp.upper[j]
        } else {
            self.art_upper[j - self.n]
        }
    }

    fn cost_of(&self, j: usize) -> F {
        if j < self.n {
            self.lp.costs[j]
        } else {
            self.art_cost[j - self.n]
        }
    }

    /// Install a warm start basis.
    ///
    /// Returns `false` if the basis cannot be used and a cold start is
    /// required. A basis of the wrong size is an error.
    fn init_warm(&mut self, warm: &Basis) -> Result<bool, SolverError> {
        if warm.len() != self.n {
            return Err(SolverError::Internal(format!(
                "warm start basis has {} variables, expected {}",
                warm.len(),
                self.n
            )));
        }
        for (j, &s) in warm.statuses().iter().enumerate() {
            self.status[j] = s;
        }

        let cand = warm.basic_indices();
        if cand.len() > self.m {
            return Err(SolverError::Internal(
                "warm start basis has too many basic variables".to_string(),
            ));
        }

        let (accepted, covered) = self.independent_columns(&cand);

        // demote the dependent candidates
        let mut keep = vec![false; self.n];
        for &j in &accepted {
            keep[j] = true;
        }
        for &j in &cand {
            if !keep[j] {
                self.status[j] = VariableStatus::AtLower;
            }
        }

        // cover the remaining rows with zero cost artificials fixed at
        // value zero
        self.basis = accepted;
        for i in 0..self.m {
            if !covered[i] {
                self.status[self.n + i] = VariableStatus::Basic;
                self.basis.push(self.n + i);
            }
        }

        if self.refresh().is_err() {
            return Ok(false);
        }
        Ok(self.is_within_bounds())
    }

    /// Install the all-artificial big-M start basis.
    fn init_cold(&mut self, artificial_cost: Option<F>) {
        let big_m = artificial_cost.unwrap_or_else(|| {
            let mut value = F::zero();
            for &c in &self.lp.costs {
                if c.abs() > value {
                    value = c.abs();
                }
            }
            F::from(self.n.max(1)).unwrap() * (F::one() + value)
        });

        // negative cost variables with a finite bound start at their
        // upper bound
        for j in 0..self.n {
            self.status[j] = if self.lp.costs[j] < F::zero() && self.lp.upper[j] < self.infinite {
                VariableStatus::AtUpper
            } else {
                VariableStatus::AtLower
            };
        }

        let rhs = self.adjusted_rhs();
        self.basis.clear();
        for (i, &b) in rhs.iter().enumerate() {
            self.art_sign[i] = if b >= F::zero() { F::one() } else { -F::one() };
            self.art_cost[i] = big_m;
            self.art_upper[i] = self.infinite;
            self.status[self.n + i] = VariableStatus::Basic;
            self.basis.push(self.n + i);
        }

        // the basis matrix is diag(art_sign), which is its own inverse
        self.binv = (0..self.m)
            .map(|i| {
                let mut row = vec![F::zero(); self.m];
                row[i] = self.art_sign[i];
                row
            })
            .collect();
        self.xb = rhs.iter().zip(&self.art_sign).map(|(&b, &s)| b * s).collect();
    }

    /// Pick a maximal independent subset of the candidate columns.
    ///
    /// Plain Gaussian elimination over the dense candidate columns.
    /// Returns the accepted candidates and a mask of the pivot rows
    /// they cover.
    fn independent_columns(&self, cand: &[usize]) -> (Vec<usize>, Vec<bool>) {
        let mut accepted = Vec::with_capacity(cand.len());
        let mut covered = vec![false; self.m];
        let mut pivots: Vec<(usize, Vec<F>)> = Vec::with_capacity(cand.len());

        for &j in cand {
            let mut col = self.dense_column(j);
            for (prow, pcol) in &pivots {
                let f = col[*prow];
                if f != F::zero() {
                    for (v, &pv) in col.iter_mut().zip(pcol) {
                        *v = *v - f * pv;
                    }
                }
            }
            let mut best: Option<(usize, F)> = None;
            for (i, &v) in col.iter().enumerate() {
                if !covered[i] && best.map(|(_, bv)| v.abs() > bv).unwrap_or(true) {
                    best = Some((i, v.abs()));
                }
            }
            if let Some((i, v)) = best {
                if v > self.tol {
                    let piv = col[i];
                    for c in col.iter_mut() {
                        *c = *c / piv;
                    }
                    covered[i] = true;
                    pivots.push((i, col));
                    accepted.push(j);
                }
            }
        }
        (accepted, covered)
    }

    fn dense_column(&self, j: usize) -> Vec<F> {
        let mut col = vec![F::zero(); self.m];
        if j < self.n {
            for &(i, a) in self.lp.matrix.column(j) {
                col[i] = a;
            }
        } else {
            col[j - self.n] = self.art_sign[j - self.n];
        }
        col
    }

    /// The right-hand side with the non-basic upper bound variables
    /// folded in.
    fn adjusted_rhs(&self) -> Vec<F> {
        let mut rhs = self.lp.rhs.clone();
        for j in 0..self.n {
            if self.status[j] == VariableStatus::AtUpper {
                self.lp.matrix.add_column_times(j, -self.lp.upper[j], &mut rhs);
            }
        }
        rhs
    }

    /// Recompute the basis inverse and the basic variable values.
    fn refresh(&mut self) -> Result<(), SolverError> {
        self.binv = self
            .invert()
            .ok_or_else(|| SolverError::Internal("singular basis".to_string()))?;
        let rhs = self.adjusted_rhs();
        self.xb = self
            .binv
            .iter()
            .map(|row| {
                let mut v = F::zero();
                for (&r, &b) in row.iter().zip(&rhs) {
                    v += r * b;
                }
                v
            })
            .collect();
        Ok(())
    }

    /// Invert the basis matrix by Gauss-Jordan elimination.
    fn invert(&self) -> Option<Vec<Vec<F>>> {
        let m = self.m;
        let mut a = vec![vec![F::zero(); 2 * m]; m];
        for (pos, &j) in self.basis.iter().enumerate() {
            if j < self.n {
                for &(i, v) in self.lp.matrix.column(j) {
                    a[i][pos] = v;
                }
            } else {
                a[j - self.n][pos] = self.art_sign[j - self.n];
            }
        }
        for (i, row) in a.iter_mut().enumerate() {
            row[m + i] = F::one();
        }

        for k in 0..m {
            let mut p = k;
            for i in k + 1..m {
                if a[i][k].abs() > a[p][k].abs() {
                    p = i;
                }
            }
            if a[p][k].abs() <= self.tol {
                return None;
            }
            a.swap(k, p);
            let piv = a[k][k];
            for v in a[k].iter_mut() {
                *v = *v / piv;
            }
            let row_k = a[k].clone();
            for (i, row) in a.iter_mut().enumerate() {
                if i != k {
                    let f = row[k];
                    if f != F::zero() {
                        for (v, &rv) in row.iter_mut().zip(&row_k) {
                            *v = *v - f * rv;
                        }
                    }
                }
            }
        }
        Some(a.into_iter().map(|row| row[m..].to_vec()).collect())
    }

    fn is_within_bounds(&self) -> bool {
        self.basis.iter().zip(&self.xb).all(|(&j, &v)| {
            let u = self.upper_of(j);
            v >= -self.tol && (u >= self.infinite || v <= u + self.tol)
        })
    }

    /// The dual values of the current basis.
    fn duals(&self) -> Vec<F> {
        let mut y = vec![F::zero(); self.m];
        for (k, &j) in self.basis.iter().enumerate() {
            let c = self.cost_of(j);
            if c != F::zero() {
                for (yi, &r) in y.iter_mut().zip(&self.binv[k]) {
                    *yi += c * r;
                }
            }
        }
        y
    }

    fn reduced_cost(&self, j: usize, y: &[F]) -> F {
        if j < self.n {
            self.lp.costs[j] - self.lp.matrix.column_dot(j, y)
        } else {
            self.art_cost[j - self.n] - self.art_sign[j - self.n] * y[j - self.n]
        }
    }

    /// Find the entering variable by Bland's rule.
    ///
    /// Returns the variable and whether it enters from its upper
    /// bound.
    fn price(&self, y: &[F]) -> Option<(usize, bool)> {
        for j in 0..self.n + self.m {
            match self.status[j] {
                VariableStatus::Basic => (),
                VariableStatus::AtLower => {
                    // variables with a zero bound range can never move
                    if self.upper_of(j) > self.tol && self.reduced_cost(j, y) < -self.tol {
                        return Some((j, false));
                    }
                }
                VariableStatus::AtUpper => {
                    if self.reduced_cost(j, y) > self.tol {
                        return Some((j, true));
                    }
                }
            }
        }
        None
    }

    /// The entering column transformed by the basis inverse.
    fn solved_column(&self, j: usize) -> Vec<F> {
        let mut w = vec![F::zero(); self.m];
        if j < self.n {
            for &(i, a) in self.lp.matrix.column(j) {
                for (wk, row) in w.iter_mut().zip(&self.binv) {
                    *wk += row[i] * a;
                }
            }
        } else {
            let i = j - self.n;
            for (wk, row) in w.iter_mut().zip(&self.binv) {
                *wk += row[i] * self.art_sign[i];
            }
        }
        w
    }

    /// Perform one pivot with the given entering variable.
    fn pivot(&mut self, j_in: usize, from_upper: bool) -> Result<(), SolverError> {
        let w = self.solved_column(j_in);

        // bounded ratio test; the entering variable itself may only
        // move to its opposite bound
        let mut best_t = self.upper_of(j_in);
        let mut leaving: Option<(usize, bool)> = None;
        for k in 0..self.m {
            // the change of basic variable k per unit step
            let delta = if from_upper { w[k] } else { -w[k] };
            let (t, to_upper) = if delta < -self.tol {
                let v = if self.xb[k] > F::zero() { self.xb[k] } else { F::zero() };
                (v / -delta, false)
            } else if delta > self.tol {
                let u = self.upper_of(self.basis[k]);
                if u >= self.infinite {
                    continue;
                }
                let gap = u - self.xb[k];
                let v = if gap > F::zero() { gap } else { F::zero() };
                (v / delta, true)
            } else {
                continue;
            };
            // Bland's rule again: on ties the smallest variable leaves
            let replace = t < best_t
                || (t == best_t && leaving.map(|(pos, _)| self.basis[k] < self.basis[pos]).unwrap_or(true));
            if replace {
                best_t = t;
                leaving = Some((k, to_upper));
            }
        }

        if leaving.is_none() && best_t >= self.infinite {
            return Err(SolverError::Unbounded);
        }

        self.niter += 1;
        match leaving {
            None => {
                // bound flip of the entering variable
                let gap = self.upper_of(j_in);
                for (v, &wk) in self.xb.iter_mut().zip(&w) {
                    let delta = if from_upper { wk } else { -wk };
                    *v += delta * gap;
                }
                self.status[j_in] = if from_upper {
                    VariableStatus::AtLower
                } else {
                    VariableStatus::AtUpper
                };
                Ok(())
            }
            Some((pos, to_upper)) => {
                let j_out = self.basis[pos];
                self.status[j_out] = if to_upper {
                    VariableStatus::AtUpper
                } else {
                    VariableStatus::AtLower
                };
                self.status[j_in] = VariableStatus::Basic;
                self.basis[pos] = j_in;
                self.refresh()
            }
        }
    }

    /// Run the simplex loop and return the final duals.
    fn iterate(&mut self, limit: Option<usize>) -> Result<Vec<F>, SolverError> {
        loop {
            let y = self.duals();
            let (j, from_upper) = match self.price(&y) {
                None => return Ok(y),
                Some(e) => e,
            };
            if let Some(limit) = limit {
                if self.niter >= limit {
                    return Err(SolverError::IterationLimit);
                }
            }
            self.pivot(j, from_upper)?;
        }
    }
}
