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

//! Minimum cost flow and optimal transport problems.

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

use crate::lp::{ModelError, StandardLp};
use crate::sparse::SparseMatrix;
use num_traits::{NumAssign, Signed};

/// A minimum cost flow problem on a directed network.
///
/// Arcs are `(source, sink)` node pairs with a zero lower and an
/// `upper` capacity bound. Balances are positive for supply nodes and
/// negative for demand nodes and must sum to zero exactly. Self-loops
/// and parallel arcs are allowed.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct MinCostFlow<F> {
    balances: Vec<F>,
    arcs: Vec<(usize, usize)>,
    costs: Vec<F>,
    upper: Vec<F>,
}

impl<F> MinCostFlow<F>
where
    F: NumAssign + PartialOrd + Copy,
{
    /// Create a min-cost-flow problem.
    ///
    /// Fails if the balances do not sum to zero, an arc references a
    /// non-existing node, a capacity is negative or the vectors have
    /// mismatching lengths.
    pub fn new(
        balances: Vec<F>,
        arcs: Vec<(usize, usize)>,
        costs: Vec<F>,
        upper: Vec<F>,
    ) -> Result<Self, ModelError> {
        if costs.len() != arcs.len() {
            return Err(ModelError::Shape {
                what: "arc costs",
                expected: arcs.len(),
                got: costs.len(),
            });
        }
        if upper.len() != arcs.len() {
            return Err(ModelError::Shape {
                what: "arc capacities",
                expected: arcs.len(),
                got: upper.len(),
            });
        }
        for (j, &(u, v)) in arcs.iter().enumerate() {
            if u >= balances.len() {
                return Err(ModelError::Arc { arc: j, node: u });
            }
            if v >= balances.len() {
                return Err(ModelError::Arc { arc: j, node: v });
            }
        }
        if let Some(j) = upper.iter().position(|&u| u < F::zero()) {
            return Err(ModelError::Negative {
                what: "capacity",
                index: j,
            });
        }
        let mut total = F::zero();
        for &b in &balances {
            total += b;
        }
        if !total.is_zero() {
            return Err(ModelError::Unbalanced);
        }
        Ok(MinCostFlow {
            balances,
            arcs,
            costs,
            upper,
        })
    }

    pub fn nr_nodes(&self) -> usize {
        self.balances.len()
    }

    pub fn nr_arcs(&self) -> usize {
        self.arcs.len()
    }

    /// The arcs as `(source, sink)` pairs.
    pub fn arcs(&self) -> &[(usize, usize)] {
        &self.arcs
    }

    pub fn balances(&self) -> &[F] {
        &self.balances
    }

    pub fn costs(&self) -> &[F] {
        &self.costs
    }

    pub fn upper(&self) -> &[F] {
        &self.upper
    }
}

impl<F> MinCostFlow<F>
where
    F: NumAssign + PartialOrd + Copy + Signed,
{
    /// The standard form program of this network.
    ///
    /// Column `j` is the incidence vector of arc `j` with `+1` at the
    /// source and `-1` at the sink node, the right-hand side is the
    /// balance vector. A self-loop contributes an empty column.
    pub fn to_lp(&self) -> StandardLp<F> {
        let mut matrix = SparseMatrix::new(self.nr_nodes());
        for &(u, v) in &self.arcs {
            matrix.push_column(incidence_column(u, v));
        }
        StandardLp {
            matrix,
            rhs: self.balances.clone(),
            costs: self.costs.clone(),
            upper: self.upper.clone(),
        }
    }
}

/// The incidence column of an arc `(u, v)`.
pub(crate) fn incidence_column<F: Signed>(u: usize, v: usize) -> Vec<(usize, F)> {
    if u == v {
        vec![]
    } else if u < v {
        vec![(u, F::one()), (v, -F::one())]
    } else {
        vec![(v, -F::one()), (u, F::one())]
    }
}

/// An optimal transport problem.
///
/// `costs` is a dense `supplies.len() x demands.len()` matrix in
/// row-major order, so `costs[i * demands.len() + j]` is the unit cost
/// of shipping from source `i` to sink `j`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct OptTransport<F> {
    supplies: Vec<F>,
    demands: Vec<F>,
    costs: Vec<F>,
}

impl<F> OptTransport<F>
where
    F: NumAssign + PartialOrd + Copy + Signed,
{
    /// Create an optimal transport problem.
    ///
    /// Fails if a supply or demand is negative, the totals differ or
    /// the cost matrix has the wrong size.
    pub fn new(supplies: Vec<F>, demands: Vec<F>, costs: Vec<F>) -> Result<Self, ModelError> {
        if costs.len() != supplies.len() * demands.len() {
            return Err(ModelError::Shape {
                what: "transport costs",
                expected: supplies.len() * demands.len(),
                got: costs.len(),
            });
        }
        if let Some(i) = supplies.iter().position(|&s| s < F::zero()) {
            return Err(ModelError::Negative {
                what: "supply",
                index: i,
            });
        }
        if let Some(j) = demands.iter().position(|&d| d < F::zero()) {
            return Err(ModelError::Negative {
                what: "demand",
                index: j,
            });
        }
        let mut total = F::zero();
        for &s in &supplies {
            total += s;
        }
        for &d in &demands {
            total -= d;
        }
        if !total.is_zero() {
            return Err(ModelError::Unbalanced);
        }
        Ok(OptTransport {
            supplies,
            demands,
            costs,
        })
    }

    pub fn nr_sources(&self) -> usize {
        self.supplies.len()
    }

    pub fn nr_sinks(&self) -> usize {
        self.demands.len()
    }

    pub fn supplies(&self) -> &[F] {
        &self.supplies
    }

    pub fn demands(&self) -> &[F] {
        &self.demands
    }

    /// The unit cost of the cell `(i, j)`.
    pub fn cost(&self, i: usize, j: usize) -> F {
        self.costs[i * self.demands.len() + j]
    }

    /// The bipartite min-cost-flow formulation.
    ///
    /// Source `i` becomes node `i` with its supply as balance, sink
    /// `j` becomes node `nr_sources() + j` with its negated demand.
    /// The cell `(i, j)` becomes arc `i * nr_sinks() + j`, so a
    /// transport plan and a flow vector use the same indexing. Each
    /// arc is capacitated by the smaller of its supply and demand.
    pub fn to_flow(&self) -> MinCostFlow<F> {
        let s = self.supplies.len();
        let d = self.demands.len();

        let mut balances = Vec::with_capacity(s + d);
        balances.extend(self.supplies.iter().cloned());
        balances.extend(self.demands.iter().map(|&b| -b));

        let mut arcs = Vec::with_capacity(s * d);
        let mut upper = Vec::with_capacity(s * d);
        for i in 0..s {
            for j in 0..d {
                arcs.push((i, s + j));
                let cap = self.supplies[i];
                upper.push(if self.demands[j] < cap { self.demands[j] } else { cap });
            }
        }

        // balances and capacities are consistent by construction
        MinCostFlow {
            balances,
            arcs,
            costs: self.costs.clone(),
            upper,
        }
    }
}

#[cfg(test)]
mod tests {

    use super::{MinCostFlow, OptTransport};
    use crate::lp::ModelError;

    #[test]
    fn test_flow_validation() {
        match MinCostFlow::new(vec![1.0, -2.0], vec![(0, 1)], vec![1.0], vec![1.0]) {
            Err(ModelError::Unbalanced) => (),
            other => panic!("unexpected result: {:?}", other),
        }
        match MinCostFlow::new(vec![1.0, -1.0], vec![(0, 2)], vec![1.0], vec![1.0]) {
            Err(ModelError::Arc { arc: 0, node: 2 }) => (),
            other => panic!("unexpected result: {:?}", other),
        }
        match MinCostFlow::new(vec![1.0, -1.0], vec![(0, 1)], vec![1.0], vec![-1.0]) {
            Err(ModelError::Negative { index: 0, .. }) => (),
            other => panic!("unexpected result: {:?}", other),
        }
        // self-loops and parallel arcs are fine
        assert!(MinCostFlow::new(
            vec![1.0, -1.0],
            vec![(0, 1), (0, 1), (1, 1)],
            vec![1.0, 2.0, 3.0],
            vec![1.0, 1.0, 1.0],
        )
        .is_ok());
    }

    #[test]
    fn test_flow_to_lp() {
        let flow = MinCostFlow::new(
            vec![10.0, 0.0, -10.0],
            vec![(0, 1), (2, 1), (1, 1)],
            vec![1.0, 2.0, 3.0],
            vec![20.0, 20.0, 20.0],
        )
        .unwrap();
        let lp = flow.to_lp();
        assert_eq!(lp.nr_rows(), 3);
        assert_eq!(lp.nr_variables(), 3);
        assert_eq!(lp.matrix.column(0), &[(0, 1.0), (1, -1.0)]);
        // entries are sorted by row even for backward arcs
        assert_eq!(lp.matrix.column(1), &[(1, -1.0), (2, 1.0)]);
        // the self-loop becomes an empty column
        assert!(lp.matrix.column(2).is_empty());
        assert_eq!(lp.rhs, vec![10.0, 0.0, -10.0]);
    }

    #[test]
    fn test_transport_validation() {
        match OptTransport::new(vec![1.0, 2.0], vec![1.0], vec![1.0, 1.0]) {
            Err(ModelError::Unbalanced) => (),
            other => panic!("unexpected result: {:?}", other),
        }
        match OptTransport::new(vec![1.0, -1.0], vec![0.0], vec![1.0, 1.0]) {
            Err(ModelError::Negative { index: 1, .. }) => (),
            other => panic!("unexpected result: {:?}", other),
        }
        match OptTransport::new(vec![1.0], vec![1.0], vec![1.0, 1.0]) {
            Err(ModelError::Shape { expected: 1, got: 2, .. }) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_transport_to_flow() {
        let ot = OptTransport::new(
            vec![3.0, 2.0],
            vec![2.0, 3.0],
            vec![1.0, 2.0, 3.0, 1.0],
        )
        .unwrap();
        let flow = ot.to_flow();
        assert_eq!(flow.nr_nodes(), 4);
        assert_eq!(flow.nr_arcs(), 4);
        assert_eq!(flow.balances(), &[3.0, 2.0, -2.0, -3.0]);
        assert_eq!(flow.arcs(), &[(0, 2), (0, 3), (1, 2), (1, 3)]);
        assert_eq!(flow.costs(), &[1.0, 2.0, 3.0, 1.0]);
        assert_eq!(flow.upper(), &[2.0, 3.0, 2.0, 2.0]);
        assert_eq!(ot.cost(1, 0), 3.0);
    }

    #[cfg(feature = "serialize")]
    mod serialize {
        use super::super::MinCostFlow;

        #[test]
        fn test_serde() {
            let flow = MinCostFlow::new(
                vec![1.0, -1.0],
                vec![(0, 1), (0, 1)],
                vec![1.0, 2.0],
                vec![1.0, 1.0],
            )
            .unwrap();
            let s = serde_json::to_string(&flow).unwrap();
            let flow2: MinCostFlow<f64> = serde_json::from_str(&s).unwrap();
            assert_eq!(flow, flow2);
        }
    }
}
