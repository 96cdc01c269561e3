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

//! Linear programs in standard and general form.
//!
//! The algorithms of this crate work on [`StandardLp`], a program of
//! the form
//!
//! ```text
//! min costs·x   s.t.   matrix·x = rhs,   0 <= x <= upper
//! ```
//!
//! A [`GeneralLp`] with inequality rows and general bounds can be
//! converted into this form with [`GeneralLp::to_standard`].

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

use crate::sparse::SparseMatrix;
use num_traits::{Bounded, NumAssign, Signed};
use std::error;
use std::fmt;

/// The upper bound value treated as "no bound".
///
/// Variables without an upper bound carry this sentinel value, the
/// largest finite value of the number type.
pub fn unbounded<F: Bounded>() -> F {
    F::max_value()
}

/// Error constructing a problem.
#[derive(Debug)]
pub enum ModelError {
    /// Two related quantities have different sizes.
    Shape {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    /// The node balances do not sum to zero.
    Unbalanced,
    /// A variable has crossing bounds.
    Bound { index: usize },
    /// A quantity that must not be negative is negative.
    Negative { what: &'static str, index: usize },
    /// An arc references a node that does not exist.
    Arc { arc: usize, node: usize },
}

impl fmt::Display for ModelError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        use self::ModelError::*;
        match self {
            Shape { what, expected, got } => write!(fmt, "{}: expected {} entries, got {}", what, expected, got),
            Unbalanced => write!(fmt, "balances do not sum to zero"),
            Bound { index } => write!(fmt, "invalid bounds for variable {}", index),
            Negative { what, index } => write!(fmt, "{} {} is negative", what, index),
            Arc { arc, node } => write!(fmt, "arc {} references invalid node {}", arc, node),
        }
    }
}

impl error::Error for ModelError {}

/// The sense of a constraint row of a [`GeneralLp`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum RowSense {
    /// The row requires equality.
    Equal,
    /// The row is a `<=` constraint.
    Less,
    /// The row is a `>=` constraint.
    Greater,
}

/// A linear program in standard form.
///
/// All rows are equations and all variables have a zero lower bound.
/// An upper bound of [`unbounded`] means the variable is unbounded
/// above.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct StandardLp<F> {
    /// The constraint matrix.
    pub matrix: SparseMatrix<F>,
    /// The right-hand sides of the equations.
    pub rhs: Vec<F>,
    /// The objective coefficients.
    pub costs: Vec<F>,
    /// The variable upper bounds.
    pub upper: Vec<F>,
}

impl<F> StandardLp<F>
where
    F: NumAssign + PartialOrd + Copy,
{
    /// Create a standard form program.
    ///
    /// Verifies that the dimensions agree and that no upper bound is
    /// negative.
    pub fn new(matrix: SparseMatrix<F>, rhs: Vec<F>, costs: Vec<F>, upper: Vec<F>) -> Result<Self, ModelError> {
        if rhs.len() != matrix.nr_rows() {
            return Err(ModelError::Shape {
                what: "right-hand side",
                expected: matrix.nr_rows(),
                got: rhs.len(),
            });
        }
        if costs.len() != matrix.nr_columns() {
            return Err(ModelError::Shape {
                what: "costs",
                expected: matrix.nr_columns(),
                got: costs.len(),
            });
        }
        if upper.len() != matrix.nr_columns() {
            return Err(ModelError::Shape {
                what: "upper bounds",
                expected: matrix.nr_columns(),
                got: upper.len(),
            });
        }
        if let Some(j) = upper.iter().position(|&u| u < F::zero()) {
            return Err(ModelError::Negative {
                what: "upper bound",
                index: j,
            });
        }
        Ok(StandardLp {
            matrix,
            rhs,
            costs,
            upper,
        })
    }

    pub fn nr_rows(&self) -> usize {
        self.matrix.nr_rows()
    }

    pub fn nr_variables(&self) -> usize {
        self.matrix.nr_columns()
    }

    /// The objective value of the point `x`.
    pub fn objective(&self, x: &[F]) -> F {
        debug_assert_eq!(x.len(), self.costs.len());
        let mut v = F::zero();
        for (&c, &xj) in self.costs.iter().zip(x) {
            v += c * xj;
        }
        v
    }
}

/// A linear program with row senses and general bounds.
///
/// ```text
/// min costs·x   s.t.   matrix·x {<=,=,>=} rhs,   lower <= x <= upper
/// ```
///
/// Lower bounds must be finite, upper bounds may be [`unbounded`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct GeneralLp<F> {
    /// The constraint matrix.
    pub matrix: SparseMatrix<F>,
    /// The right-hand sides.
    pub rhs: Vec<F>,
    /// The sense of each row.
    pub senses: Vec<RowSense>,
    /// The objective coefficients.
    pub costs: Vec<F>,
    /// The variable lower bounds.
    pub lower: Vec<F>,
    /// The variable upper bounds.
    pub upper: Vec<F>,
}

impl<F> GeneralLp<F>
where
    F: NumAssign + PartialOrd + Copy + Bounded + Signed,
{
    /// Create a general form program.
    pub fn new(
        matrix: SparseMatrix<F>,
        rhs: Vec<F>,
        senses: Vec<RowSense>,
        costs: Vec<F>,
        lower: Vec<F>,
        upper: Vec<F>,
    ) -> Result<Self, ModelError> {
        if rhs.len() != matrix.nr_rows() {
            return Err(ModelError::Shape {
                what: "right-hand side",
                expected: matrix.nr_rows(),
                got: rhs.len(),
            });
        }
        if senses.len() != matrix.nr_rows() {
            return Err(ModelError::Shape {
                what: "row senses",
                expected: matrix.nr_rows(),
                got: senses.len(),
            });
        }
        if costs.len() != matrix.nr_columns() {
            return Err(ModelError::Shape {
                what: "costs",
                expected: matrix.nr_columns(),
                got: costs.len(),
            });
        }
        if lower.len() != matrix.nr_columns() {
            return Err(ModelError::Shape {
                what: "lower bounds",
                expected: matrix.nr_columns(),
                got: lower.len(),
            });
        }
        if upper.len() != matrix.nr_columns() {
            return Err(ModelError::Shape {
                what: "upper bounds",
                expected: matrix.nr_columns(),
                got: upper.len(),
            });
        }
        if let Some(j) = (0..matrix.nr_columns()).find(|&j| lower[j] > upper[j]) {
            return Err(ModelError::Bound { index: j });
        }
        Ok(GeneralLp {
            matrix,
            rhs,
            senses,
            costs,
            lower,
            upper,
        })
    }

    pub fn nr_rows(&self) -> usize {
        self.matrix.nr_rows()
    }

    pub fn nr_variables(&self) -> usize {
        self.matrix.nr_columns()
    }

    /// Convert the program to standard form.
    ///
    /// Every variable is shifted by its lower bound and each
    /// inequality row gets one slack variable appended. The returned
    /// [`StandardForm`] maps points of the standard program back to
    /// the original variables.
    pub fn to_standard(&self) -> StandardForm<F> {
        let nr_structural = self.matrix.nr_columns();
        let mut matrix = self.matrix.clone();
        let mut rhs = self.rhs.clone();
        let mut costs = self.costs.clone();
        let mut upper = Vec::with_capacity(nr_structural);
        let mut offset = F::zero();

        for j in 0..nr_structural {
            let l = self.lower[j];
            if !l.is_zero() {
                self.matrix.add_column_times(j, -l, &mut rhs);
                offset += self.costs[j] * l;
            }
            let u = self.upper[j];
            upper.push(if u >= unbounded::<F>() { unbounded::<F>() } else { u - l });
        }

        for (i, &sense) in self.senses.iter().enumerate() {
            let a = match sense {
                RowSense::Equal => continue,
                RowSense::Less => F::one(),
                RowSense::Greater => -F::one(),
            };
            matrix.push_column(vec![(i, a)]);
            costs.push(F::zero());
            upper.push(unbounded::<F>());
        }

        StandardForm {
            lp: StandardLp {
                matrix,
                rhs,
                costs,
                upper,
            },
            shift: self.lower.clone(),
            nr_structural,
            offset,
        }
    }
}

/// The standard form view of a [`GeneralLp`].
#[derive(Clone, Debug)]
pub struct StandardForm<F> {
    /// The converted program.
    pub lp: StandardLp<F>,
    shift: Vec<F>,
    nr_structural: usize,
    offset: F,
}

impl<F> StandardForm<F>
where
    F: NumAssign + PartialOrd + Copy,
{
    /// The number of variables of the original program.
    pub fn nr_structural(&self) -> usize {
        self.nr_structural
    }

    /// Map a point of the standard program back to the original
    /// variables.
    ///
    /// Undoes the bound shift and drops the slack variables.
    pub fn recover_x(&self, x: &[F]) -> Vec<F> {
        debug_assert!(x.len() >= self.nr_structural);
        x[..self.nr_structural]
            .iter()
            .zip(&self.shift)
            .map(|(&xj, &l)| xj + l)
            .collect()
    }

    /// The objective value of the original program for a point of the
    /// standard program.
    pub fn recover_obj(&self, x: &[F]) -> F {
        self.lp.objective(x) + self.offset
    }
}

#[cfg(test)]
mod tests {

    use super::{unbounded, GeneralLp, ModelError, RowSense, StandardLp};
    use crate::sparse::SparseMatrix;

    #[test]
    fn test_standard_validation() {
        let mat = SparseMatrix::from_columns(2, vec![vec![(0, 1.0)], vec![(1, 1.0)]]);
        match StandardLp::new(mat.clone(), vec![1.0], vec![0.0, 0.0], vec![1.0, 1.0]) {
            Err(ModelError::Shape { what, expected, got }) => {
                assert_eq!(what, "right-hand side");
                assert_eq!(expected, 2);
                assert_eq!(got, 1);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        match StandardLp::new(mat, vec![1.0, 1.0], vec![0.0, 0.0], vec![1.0, -1.0]) {
            Err(ModelError::Negative { index, .. }) => assert_eq!(index, 1),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_objective() {
        let mat = SparseMatrix::from_columns(1, vec![vec![(0, 1.0)], vec![(0, 1.0)]]);
        let lp = StandardLp::new(mat, vec![1.0], vec![2.0, -1.0], vec![1.0, 1.0]).unwrap();
        assert_eq!(lp.objective(&[0.5, 1.0]), 0.0);
    }

    #[test]
    fn test_to_standard() {
        // min x0 + 2 x1   s.t.  x0 + x1 <= 7,  x0 - x1 >= 1,  1 <= x0 <= 4, 0 <= x1
        let mat = SparseMatrix::from_columns(2, vec![vec![(0, 1.0), (1, 1.0)], vec![(0, 1.0), (1, -1.0)]]);
        let glp = GeneralLp::new(
            mat,
            vec![7.0, 1.0],
            vec![RowSense::Less, RowSense::Greater],
            vec![1.0, 2.0],
            vec![1.0, 0.0],
            vec![4.0, unbounded()],
        )
        .unwrap();

        let form = glp.to_standard();
        let lp = &form.lp;
        assert_eq!(lp.nr_variables(), 4);
        assert_eq!(lp.rhs, vec![6.0, 0.0]);
        assert_eq!(lp.upper[0], 3.0);
        assert_eq!(lp.upper[1], unbounded::<f64>());
        assert_eq!(lp.costs[2..], [0.0, 0.0]);
        assert_eq!(lp.matrix.column(2), &[(0, 1.0)]);
        assert_eq!(lp.matrix.column(3), &[(1, -1.0)]);

        // the shifted point (1, 1) of the standard program is (2, 1)
        let x = form.recover_x(&[1.0, 1.0, 4.0, 0.0]);
        assert_eq!(x, vec![2.0, 1.0]);
        assert_eq!(form.recover_obj(&[1.0, 1.0, 4.0, 0.0]), 4.0);
    }

    #[test]
    fn test_crossing_bounds_rejected() {
        let mat = SparseMatrix::from_columns(1, vec![vec![(0, 1.0)]]);
        match GeneralLp::new(
            mat,
            vec![1.0],
            vec![RowSense::Equal],
            vec![0.0],
            vec![2.0],
            vec![1.0],
        ) {
            Err(ModelError::Bound { index }) => assert_eq!(index, 0),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
