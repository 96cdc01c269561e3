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

//! A simple column oriented sparse matrix.

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

use num_traits::NumAssign;

/// A sparse matrix stored as a list of columns.
///
/// Each column holds its non-zero entries as `(row, value)` pairs in
/// increasing row order. This is the natural layout for the algorithms
/// in this crate, which select, append and price whole columns.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SparseMatrix<F> {
    nr_rows: usize,
    columns: Vec<Vec<(usize, F)>>,
}

impl<F> SparseMatrix<F> {
    /// Create a matrix with `nr_rows` rows and no columns.
    pub fn new(nr_rows: usize) -> Self {
        SparseMatrix {
            nr_rows,
            columns: vec![],
        }
    }

    /// Create a matrix from prepared columns.
    ///
    /// Each column must hold its entries in increasing row order.
    pub fn from_columns(nr_rows: usize, columns: Vec<Vec<(usize, F)>>) -> Self {
        let mat = SparseMatrix { nr_rows, columns };
        debug_assert!(mat.columns.iter().all(|col| is_valid_column(col, mat.nr_rows)));
        mat
    }

    pub fn nr_rows(&self) -> usize {
        self.nr_rows
    }

    pub fn nr_columns(&self) -> usize {
        self.columns.len()
    }

    /// The non-zero entries of column `j` in increasing row order.
    pub fn column(&self, j: usize) -> &[(usize, F)] {
        &self.columns[j]
    }

    /// Append a column.
    pub fn push_column(&mut self, column: Vec<(usize, F)>) {
        debug_assert!(is_valid_column(&column, self.nr_rows));
        self.columns.push(column);
    }
}

fn is_valid_column<F>(column: &[(usize, F)], nr_rows: usize) -> bool {
    column.windows(2).all(|w| w[0].0 < w[1].0) && column.last().map(|&(i, _)| i < nr_rows).unwrap_or(true)
}

impl<F> SparseMatrix<F>
where
    F: Copy,
{
    /// The matrix consisting of the given columns in the given order.
    pub fn select_columns(&self, indices: &[usize]) -> Self {
        SparseMatrix {
            nr_rows: self.nr_rows,
            columns: indices.iter().map(|&j| self.columns[j].clone()).collect(),
        }
    }
}

impl<F> SparseMatrix<F>
where
    F: NumAssign + Copy,
{
    /// The scalar product of column `j` with the row vector `y`.
    pub fn column_dot(&self, j: usize, y: &[F]) -> F {
        let mut d = F::zero();
        for &(i, a) in &self.columns[j] {
            d += a * y[i];
        }
        d
    }

    /// Add `factor` times column `j` to the vector `out`.
    pub fn add_column_times(&self, j: usize, factor: F, out: &mut [F]) {
        for &(i, a) in &self.columns[j] {
            out[i] += a * factor;
        }
    }

    /// The matrix-vector product with `x`.
    pub fn times(&self, x: &[F]) -> Vec<F> {
        debug_assert_eq!(x.len(), self.nr_columns());
        let mut out = vec![F::zero(); self.nr_rows];
        for (j, &xj) in x.iter().enumerate() {
            if !xj.is_zero() {
                self.add_column_times(j, xj, &mut out);
            }
        }
        out
    }
}
