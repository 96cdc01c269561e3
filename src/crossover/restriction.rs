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

//! The fixed and free variable partition of a restricted program.

use super::CrossoverError;
use crate::lp::StandardLp;
use crate::output::{Basis, VariableStatus};
use num_traits::{NumAssign, Signed};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum FixState {
    Free,
    Lower,
    Upper,
}

/// A partition of the variables into fixed and free ones.
///
/// Fixed variables sit at their lower or upper bound, the free
/// variables span the restricted program. All variables start free;
/// [`fix`](Restriction::fix) and [`release`](Restriction::release)
/// move them between the classes and
/// [`subproblem`](Restriction::subproblem) builds the restricted
/// program over the free columns.
///
/// On error the partition is left unchanged.
#[derive(Clone, Debug)]
pub struct Restriction {
    state: Vec<FixState>,
    /// The free variables in increasing order.
    free: Vec<usize>,
}

impl Restriction {
    /// A partition with all `nr_variables` variables free.
    pub fn all_free(nr_variables: usize) -> Self {
        Restriction {
            state: vec![FixState::Free; nr_variables],
            free: (0..nr_variables).collect(),
        }
    }

    pub fn nr_variables(&self) -> usize {
        self.state.len()
    }

    /// The number of free variables.
    pub fn nr_free(&self) -> usize {
        self.free.len()
    }

    /// The free variables in increasing order.
    pub fn free(&self) -> &[usize] {
        &self.free
    }

    pub fn is_free(&self, var: usize) -> bool {
        self.state[var] == FixState::Free
    }

    pub fn is_fixed_at_upper(&self, var: usize) -> bool {
        self.state[var] == FixState::Upper
    }

    /// Append `count` additional free variables.
    pub(crate) fn extend(&mut self, count: usize) {
        let n = self.state.len();
        self.state.resize(n + count, FixState::Free);
        self.free.extend(n..n + count);
    }

    /// Fix free variables at their lower or upper bound.
    ///
    /// Every index must denote a distinct, currently free variable.
    pub fn fix(&mut self, to_lower: &[usize], to_upper: &[usize]) -> Result<(), CrossoverError> {
        let mut done = 0;
        for &var in to_lower.iter().chain(to_upper) {
            let err = if var >= self.state.len() {
                Some("no such variable")
            } else if self.state[var] != FixState::Free {
                Some("variable is not free")
            } else {
                None
            };
            if let Some(msg) = err {
                for &w in to_lower.iter().chain(to_upper).take(done) {
                    self.state[w] = FixState::Free;
                }
                return Err(CrossoverError::InvalidPartition { var, msg });
            }
            // mark immediately so duplicated indices are caught
            self.state[var] = FixState::Lower;
            done += 1;
        }
        for &var in to_upper {
            self.state[var] = FixState::Upper;
        }
        self.rebuild_free();
        Ok(())
    }

    /// Release fixed variables into the free class.
    ///
    /// Every index must denote a distinct, currently fixed variable.
    pub fn release(&mut self, vars: &[usize]) -> Result<(), CrossoverError> {
        let mut undo = Vec::with_capacity(vars.len());
        for &var in vars {
            let err = if var >= self.state.len() {
                Some("no such variable")
            } else if self.state[var] == FixState::Free {
                Some("variable is not fixed")
            } else {
                None
            };
            if let Some(msg) = err {
                for (w, s) in undo {
                    self.state[w] = s;
                }
                return Err(CrossoverError::InvalidPartition { var, msg });
            }
            undo.push((var, self.state[var]));
            self.state[var] = FixState::Free;
        }
        self.rebuild_free();
        Ok(())
    }

    fn rebuild_free(&mut self) {
        self.free.clear();
        self.free.extend(
            self.state
                .iter()
                .enumerate()
                .filter(|(_, &s)| s == FixState::Free)
                .map(|(j, _)| j),
        );
    }

    /// The right-hand side of the restricted program.
    ///
    /// The contributions of the variables fixed at their upper bound
    /// are folded into the right-hand side.
    pub fn adjusted_rhs<F>(&self, lp: &StandardLp<F>) -> Vec<F>
    where
        F: NumAssign + PartialOrd + Copy + Signed,
    {
        debug_assert_eq!(self.state.len(), lp.nr_variables());
        let mut rhs = lp.rhs.clone();
        for (j, &s) in self.state.iter().enumerate() {
            if s == FixState::Upper {
                lp.matrix.add_column_times(j, -lp.upper[j], &mut rhs);
            }
        }
        rhs
    }

    /// Build the restricted program over the free variables.
    pub fn subproblem<F>(&self, lp: &StandardLp<F>) -> StandardLp<F>
    where
        F: NumAssign + PartialOrd + Copy + Signed,
    {
        debug_assert_eq!(self.state.len(), lp.nr_variables());
        StandardLp {
            matrix: lp.matrix.select_columns(&self.free),
            rhs: self.adjusted_rhs(lp),
            costs: self.free.iter().map(|&j| lp.costs[j]).collect(),
            upper: self.free.iter().map(|&j| lp.upper[j]).collect(),
        }
    }

    /// Expand a point of the restricted program to the full space.
    ///
    /// Fixed variables take their bound value.
    pub fn recover_x<F>(&self, lp: &StandardLp<F>, x_sub: &[F]) -> Vec<F>
    where
        F: NumAssign + Copy,
    {
        debug_assert_eq!(x_sub.len(), self.free.len());
        let mut x = vec![F::zero(); self.state.len()];
        for (j, &s) in self.state.iter().enumerate() {
            if s == FixState::Upper {
                x[j] = lp.upper[j];
            }
        }
        for (&j, &v) in self.free.iter().zip(x_sub) {
            x[j] = v;
        }
        x
    }

    /// Expand a basis of the restricted program to the full space.
    ///
    /// Fixed variables become non-basic at their bound.
    pub fn recover_basis(&self, basis_sub: &Basis) -> Basis {
        debug_assert_eq!(basis_sub.len(), self.free.len());
        let mut statuses: Vec<_> = self
            .state
            .iter()
            .map(|&s| {
                if s == FixState::Upper {
                    VariableStatus::AtUpper
                } else {
                    VariableStatus::AtLower
                }
            })
            .collect();
        for (k, &j) in self.free.iter().enumerate() {
            statuses[j] = basis_sub.status(k);
        }
        Basis::new(statuses)
    }

    /// Restrict a full space basis to the free variables.
    pub fn restrict_basis(&self, basis: &Basis) -> Basis {
        debug_assert_eq!(basis.len(), self.state.len());
        Basis::new(self.free.iter().map(|&j| basis.status(j)).collect())
    }
}

#[cfg(test)]
mod tests {

    use super::Restriction;
    use crate::crossover::CrossoverError;
    use crate::lp::StandardLp;
    use crate::output::{Basis, VariableStatus};
    use crate::sparse::SparseMatrix;

    fn example_lp() -> StandardLp<f64> {
        // two arcs 0 -> 1 and a direct one, plus an expensive bypass
        let mat = SparseMatrix::from_columns(
            2,
            vec![
                vec![(0, 1.0), (1, -1.0)],
                vec![(0, 1.0), (1, -1.0)],
                vec![(0, 1.0), (1, -1.0)],
            ],
        );
        StandardLp::new(mat, vec![5.0, -5.0], vec![1.0, 2.0, 3.0], vec![4.0, 4.0, 4.0]).unwrap()
    }

    #[test]
    fn test_partition_moves() {
        let mut part = Restriction::all_free(3);
        assert_eq!(part.nr_free(), 3);

        part.fix(&[0], &[2]).unwrap();
        assert_eq!(part.free(), &[1]);
        assert!(!part.is_free(0));
        assert!(part.is_fixed_at_upper(2));

        part.release(&[0]).unwrap();
        assert_eq!(part.free(), &[0, 1]);

        part.extend(2);
        assert_eq!(part.nr_variables(), 5);
        assert_eq!(part.free(), &[0, 1, 3, 4]);
    }

    #[test]
    fn test_errors_leave_partition_unchanged() {
        let mut part = Restriction::all_free(3);
        part.fix(&[0], &[]).unwrap();

        // 0 is already fixed
        match part.fix(&[1, 0], &[]) {
            Err(CrossoverError::InvalidPartition { var: 0, .. }) => (),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(part.is_free(1));

        // duplicates are rejected
        match part.fix(&[1, 1], &[]) {
            Err(CrossoverError::InvalidPartition { var: 1, .. }) => (),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(part.is_free(1));

        match part.release(&[0, 2]) {
            Err(CrossoverError::InvalidPartition { var: 2, .. }) => (),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(!part.is_free(0));
    }

    #[test]
    fn test_subproblem_and_recovery() {
        let lp = example_lp();
        let mut part = Restriction::all_free(3);
        part.fix(&[1], &[0]).unwrap();

        let sub = part.subproblem(&lp);
        assert_eq!(sub.nr_variables(), 1);
        assert_eq!(sub.costs, vec![3.0]);
        // arc 0 is fixed at its capacity 4
        assert_eq!(sub.rhs, vec![1.0, -1.0]);

        let x = part.recover_x(&lp, &[1.0]);
        assert_eq!(x, vec![4.0, 0.0, 1.0]);

        let basis = part.recover_basis(&Basis::new(vec![VariableStatus::Basic]));
        assert_eq!(
            basis.statuses(),
            &[VariableStatus::AtUpper, VariableStatus::AtLower, VariableStatus::Basic]
        );

        let sub_basis = part.restrict_basis(&basis);
        assert_eq!(sub_basis.statuses(), &[VariableStatus::Basic]);
    }
}
