/*
 * Copyright (c) 2022 Frank Fischer <frank-fischer@shadow-soft.de>
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

//! The manager of the restricted network programs.

use super::restriction::Restriction;
use super::{CrossoverError, FlowIndicator};
use crate::lp::StandardLp;
use crate::network::{incidence_column, MinCostFlow};
use crate::output::{Basis, VariableStatus};
use num_traits::{Float, NumAssign, Signed};

/// Maintains the working program of a network crossover run.
///
/// The manager owns the standard form view of the flow problem
/// together with the fixed/free partition, the current basis and the
/// cost scaling. The column generation driver exclusively talks to
/// this type.
///
/// The variables of the program are the real arcs of the network in
/// their original order, followed by the artificial arcs appended by
/// [`extend_by_big_m`](NetworkManager::extend_by_big_m).
pub struct NetworkManager<F> {
    lp: StandardLp<F>,
    arcs: Vec<(usize, usize)>,
    nr_nodes: usize,
    nr_real_arcs: usize,
    restriction: Restriction,
    subproblem: Option<StandardLp<F>>,
    basis: Basis,
    cost_scale: F,
    /// The flow value to be considered zero.
    pub zero: F,
    /// The tolerance of the optimality certificate.
    pub opt_tol: F,
    /// Bounds greater than or equal to this value are treated as
    /// infinite.
    pub infinite: F,
}

impl<F> NetworkManager<F>
where
    F: Float + NumAssign + Signed,
{
    pub fn new(flow: &MinCostFlow<F>) -> Self {
        let nr_arcs = flow.nr_arcs();
        NetworkManager {
            lp: flow.to_lp(),
            arcs: flow.arcs().to_vec(),
            nr_nodes: flow.nr_nodes(),
            nr_real_arcs: nr_arcs,
            restriction: Restriction::all_free(nr_arcs),
            subproblem: None,
            basis: Basis::at_lower(nr_arcs),
            cost_scale: F::one(),
            zero: F::zero(),
            opt_tol: F::zero(),
            infinite: F::max_value(),
        }
    }

    pub fn nr_nodes(&self) -> usize {
        self.nr_nodes
    }

    /// The number of arcs of the original network.
    pub fn nr_real_arcs(&self) -> usize {
        self.nr_real_arcs
    }

    /// The number of arcs including the artificial ones.
    pub fn nr_arcs(&self) -> usize {
        self.arcs.len()
    }

    pub fn arcs(&self) -> &[(usize, usize)] {
        &self.arcs
    }

    /// The working program, including cost scaling and artificial
    /// arcs.
    pub fn lp(&self) -> &StandardLp<F> {
        &self.lp
    }

    pub fn nr_free(&self) -> usize {
        self.restriction.nr_free()
    }

    pub fn is_free(&self, var: usize) -> bool {
        self.restriction.is_free(var)
    }

    pub fn basis(&self) -> &Basis {
        &self.basis
    }

    pub fn cost_scale(&self) -> F {
        self.cost_scale
    }

    /// Fix free variables at their bounds.
    ///
    /// Fixing a variable without finite upper bound at its upper bound
    /// is an error. The restricted program becomes stale.
    pub fn fix_variables(&mut self, to_lower: &[usize], to_upper: &[usize]) -> Result<(), CrossoverError> {
        for &var in to_upper {
            if var < self.lp.nr_variables() && self.lp.upper[var] >= self.infinite {
                return Err(CrossoverError::InvalidPartition {
                    var,
                    msg: "variable has no upper bound",
                });
            }
        }
        self.restriction.fix(to_lower, to_upper)?;
        self.subproblem = None;
        Ok(())
    }

    /// Release fixed variables into the free class.
    ///
    /// The restricted program becomes stale.
    pub fn free_variables(&mut self, vars: &[usize]) -> Result<(), CrossoverError> {
        self.restriction.release(vars)?;
        self.subproblem = None;
        Ok(())
    }

    /// Rebuild the restricted program for the current partition.
    pub fn update_subproblem(&mut self) -> &StandardLp<F> {
        let sub = self.restriction.subproblem(&self.lp);
        &*self.subproblem.insert(sub)
    }

    /// The restricted program, if it is up to date.
    pub fn subproblem(&self) -> Option<&StandardLp<F>> {
        self.subproblem.as_ref()
    }

    /// Expand a point of the restricted program to the full space.
    pub fn recover_x(&self, x_sub: &[F]) -> Vec<F> {
        self.restriction.recover_x(&self.lp, x_sub)
    }

    /// Expand a basis of the restricted program to the full space.
    pub fn recover_basis(&self, basis_sub: &Basis) -> Basis {
        self.restriction.recover_basis(basis_sub)
    }

    /// The objective value of a full space point in the original cost
    /// scale.
    pub fn recover_obj(&self, x: &[F]) -> F {
        self.lp.objective(x) * self.cost_scale
    }

    /// The basis of the restricted program induced by the current full
    /// basis.
    pub fn subproblem_basis(&self) -> Basis {
        self.restriction.restrict_basis(&self.basis)
    }

    /// Install a full space basis.
    pub fn set_basis(&mut self, basis: Basis) {
        debug_assert_eq!(basis.len(), self.lp.nr_variables());
        self.basis = basis;
    }

    /// Divide all costs by `factor`.
    ///
    /// The factor is remembered and undone again by
    /// [`recover_obj`](NetworkManager::recover_obj). Non-positive
    /// factors are ignored.
    pub fn rescale_cost(&mut self, factor: F) {
        if factor > F::zero() {
            for c in &mut self.lp.costs {
                *c /= factor;
            }
            self.cost_scale *= factor;
            self.subproblem = None;
        }
    }

    /// Sort the real arcs by how far their flow is from the nearer
    /// bound.
    ///
    /// Returns the arc indices ordered by decreasing
    /// `min(x[j], upper[j] - x[j])`, ties in increasing index order,
    /// together with an indicator telling for each arc on which bound
    /// the flow sits. Arcs without upper bound are keyed by `x[j]`
    /// alone, arcs with a NaN key go to the back of the queue.
    /// Artificial arcs do not take part.
    pub fn sorted_flows(&self, x: &[F]) -> (Vec<usize>, Vec<FlowIndicator>) {
        debug_assert_eq!(x.len(), self.nr_real_arcs);
        let key = |j: usize| {
            let u = self.lp.upper[j];
            if u >= self.infinite {
                x[j]
            } else {
                x[j].min(u - x[j])
            }
        };
        let mut queue: Vec<usize> = (0..self.nr_real_arcs).collect();
        queue.sort_by(|&a, &b| match key(b).partial_cmp(&key(a)) {
            Some(ord) => ord,
            None => key(a).is_nan().cmp(&key(b).is_nan()),
        });

        let indicators = (0..self.nr_real_arcs)
            .map(|j| {
                let u = self.lp.upper[j];
                if x[j] <= self.zero {
                    FlowIndicator::AtZero
                } else if u < self.infinite && u - x[j] <= self.zero {
                    FlowIndicator::AtUpper
                } else {
                    FlowIndicator::Positive
                }
            })
            .collect();
        (queue, indicators)
    }

    /// Extend the program by artificial big-M arcs.
    ///
    /// For every node `v` except the hub node `0` the two arcs
    /// `(v, 0)` and `(0, v)` are appended with cost `cost` and no
    /// capacity bound. The artificial arcs are free and non-basic at
    /// their lower bound.
    pub fn extend_by_big_m(&mut self, cost: F) {
        let nr_new = 2 * self.nr_nodes.saturating_sub(1);
        for v in 1..self.nr_nodes {
            for &(src, snk) in &[(v, 0), (0, v)] {
                self.arcs.push((src, snk));
                self.lp.matrix.push_column(incidence_column(src, snk));
                self.lp.costs.push(cost);
                self.lp.upper.push(self.infinite);
                self.basis.push(VariableStatus::AtLower);
            }
        }
        self.restriction.extend(nr_new);
        self.subproblem = None;
    }

    /// Install the initial artificial star basis.
    ///
    /// The artificial arc towards the hub becomes basic for nodes with
    /// non-negative modified balance, the opposite arc for the
    /// remaining nodes. Real arcs are non-basic at the bound they are
    /// fixed to. Must be called after
    /// [`extend_by_big_m`](NetworkManager::extend_by_big_m).
    pub fn set_initial_basis(&mut self) {
        let rhs = self.restriction.adjusted_rhs(&self.lp);
        let mut statuses = Vec::with_capacity(self.lp.nr_variables());
        for j in 0..self.nr_real_arcs {
            statuses.push(if self.restriction.is_fixed_at_upper(j) {
                VariableStatus::AtUpper
            } else {
                VariableStatus::AtLower
            });
        }
        // the artificial arcs come in pairs ((v, 0), (0, v))
        let mut j = self.nr_real_arcs;
        while j < self.arcs.len() {
            let (v, _) = self.arcs[j];
            if rhs[v] >= F::zero() {
                statuses.push(VariableStatus::Basic);
                statuses.push(VariableStatus::AtLower);
            } else {
                statuses.push(VariableStatus::AtLower);
                statuses.push(VariableStatus::Basic);
            }
            j += 2;
        }
        debug_assert_eq!(statuses.len(), self.lp.nr_variables());
        self.basis = Basis::new(statuses);
    }

    /// Check the optimality certificate for a full space point.
    ///
    /// Verifies primal feasibility, dual feasibility and complementary
    /// slackness of the working program within `opt_tol`. Without dual
    /// values the certificate cannot be established and the result is
    /// `false`.
    pub fn is_optimal(&self, x: &[F], y: Option<&[F]>) -> bool {
        let y = match y {
            Some(y) => y,
            None => return false,
        };
        debug_assert_eq!(x.len(), self.lp.nr_variables());
        debug_assert_eq!(y.len(), self.lp.nr_rows());
        let tol = self.opt_tol;

        // primal feasibility
        for (j, &xj) in x.iter().enumerate() {
            if xj < -tol {
                return false;
            }
            let u = self.lp.upper[j];
            if u < self.infinite && xj > u + tol {
                return false;
            }
        }
        for (axi, &bi) in self.lp.matrix.times(x).iter().zip(&self.lp.rhs) {
            if (*axi - bi).abs() > tol {
                return false;
            }
        }

        // dual feasibility and complementary slackness
        for (j, &xj) in x.iter().enumerate() {
            let s = self.lp.costs[j] - self.lp.matrix.column_dot(j, y);
            let u = self.lp.upper[j];
            if s > tol && xj > tol {
                return false;
            }
            if s < -tol && (u >= self.infinite || xj < u - tol) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {

    use super::NetworkManager;
    use crate::crossover::{CrossoverError, FlowIndicator};
    use crate::network::MinCostFlow;
    use crate::output::VariableStatus;

    fn single_arc() -> MinCostFlow<f64> {
        MinCostFlow::new(vec![10.0, -10.0], vec![(0, 1)], vec![3.0], vec![20.0]).unwrap()
    }

    fn cycle() -> MinCostFlow<f64> {
        MinCostFlow::new(
            vec![3.0, -2.0, -3.0, 2.0],
            vec![(0, 1), (1, 2), (2, 3), (3, 0)],
            vec![1.0, 2.0, 3.0, 4.0],
            vec![10.0, 10.0, 10.0, 10.0],
        )
        .unwrap()
    }

    #[test]
    fn test_sorted_flows() {
        let mut manager = NetworkManager::new(&cycle());
        manager.zero = 1e-9;
        let (queue, ind) = manager.sorted_flows(&[5.0, 3.0, 0.0, 2.0]);
        assert_eq!(queue, vec![0, 1, 3, 2]);
        assert_eq!(
            ind,
            vec![
                FlowIndicator::Positive,
                FlowIndicator::Positive,
                FlowIndicator::AtZero,
                FlowIndicator::Positive,
            ]
        );
    }

    #[test]
    fn test_sorted_flows_with_nan_values() {
        let mut manager = NetworkManager::new(&cycle());
        manager.zero = 1e-9;
        let (queue, ind) = manager.sorted_flows(&[5.0, f64::NAN, 0.0, 2.0]);
        // the broken flow value sorts behind every finite one
        assert_eq!(queue, vec![0, 3, 2, 1]);
        assert_eq!(ind[1], FlowIndicator::Positive);
    }

    #[test]
    fn test_certificate() {
        let mut manager = NetworkManager::new(&single_arc());
        manager.opt_tol = 1e-6;

        // conservation is violated
        assert!(!manager.is_optimal(&[7.0], Some(&[3.0, 0.0])));
        // no duals, no certificate
        assert!(!manager.is_optimal(&[10.0], None));
        // the dual values must price the arc to zero
        assert!(manager.is_optimal(&[10.0], Some(&[3.0, 0.0])));
        assert!(!manager.is_optimal(&[10.0], Some(&[0.0, 0.0])));
    }

    #[test]
    fn test_rescale_round_trip() {
        let mut manager = NetworkManager::new(&single_arc());
        manager.rescale_cost(3.0);
        assert_eq!(manager.lp().costs, vec![1.0]);
        assert_eq!(manager.recover_obj(&[10.0]), 30.0);
        // non-positive factors are ignored
        manager.rescale_cost(0.0);
        assert_eq!(manager.cost_scale(), 3.0);
    }

    #[test]
    fn test_fix_and_subproblem() {
        let mut manager = NetworkManager::new(&cycle());
        manager.fix_variables(&[2], &[3]).unwrap();
        assert!(manager.subproblem().is_none());

        let sub = manager.update_subproblem();
        assert_eq!(sub.nr_variables(), 2);
        // arc 3 = (3, 0) at capacity 10 shifts the balances
        assert_eq!(sub.rhs, vec![13.0, -2.0, -3.0, -8.0]);
        assert!(manager.subproblem().is_some());

        let x = manager.recover_x(&[5.0, 3.0]);
        assert_eq!(x, vec![5.0, 3.0, 0.0, 10.0]);
    }

    #[test]
    fn test_fix_unbounded_at_upper_is_rejected() {
        let flow = MinCostFlow::new(
            vec![1.0, -1.0],
            vec![(0, 1)],
            vec![1.0],
            vec![crate::lp::unbounded()],
        )
        .unwrap();
        let mut manager = NetworkManager::new(&flow);
        match manager.fix_variables(&[], &[0]) {
            Err(CrossoverError::InvalidPartition { var: 0, .. }) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_big_m_extension_and_star_basis() {
        let mut manager = NetworkManager::new(&single_arc());
        manager.fix_variables(&[], &[0]).unwrap();
        manager.extend_by_big_m(100.0);
        assert_eq!(manager.nr_arcs(), 3);
        assert_eq!(manager.arcs()[1..], [(1, 0), (0, 1)]);
        assert_eq!(manager.lp().costs[1..], [100.0, 100.0]);

        manager.set_initial_basis();
        // balances modified by the fixed arc: node 0 lacks 10, node 1
        // has 10 too much, so the flow returns over (1, 0)
        assert_eq!(
            manager.basis().statuses(),
            &[VariableStatus::AtUpper, VariableStatus::Basic, VariableStatus::AtLower]
        );

        // the star flow is feasible for the extended program
        let x = manager.recover_x(&[10.0, 0.0]);
        assert_eq!(x, vec![20.0, 10.0, 0.0]);
        let ax = manager.lp().matrix.times(&x);
        assert_eq!(ax, manager.lp().rhs);
    }
}
