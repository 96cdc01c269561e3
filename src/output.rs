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

//! Solution data: variable statuses, bases, outputs and timing.

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

use std::time::{Duration, Instant};

/// The simplex status of a single variable.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum VariableStatus {
    /// The variable is in the basis.
    Basic,
    /// The variable is non-basic at its lower bound.
    AtLower,
    /// The variable is non-basic at its upper bound.
    AtUpper,
}

/// A simplex basis given by the status of every variable.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Basis {
    statuses: Vec<VariableStatus>,
}

impl Basis {
    /// Create a basis from a status vector.
    pub fn new(statuses: Vec<VariableStatus>) -> Self {
        Basis { statuses }
    }

    /// A basis with all `nr_variables` variables at their lower bound.
    pub fn at_lower(nr_variables: usize) -> Self {
        Basis {
            statuses: vec![VariableStatus::AtLower; nr_variables],
        }
    }

    /// The number of variables.
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// The status of variable `j`.
    pub fn status(&self, j: usize) -> VariableStatus {
        self.statuses[j]
    }

    /// Set the status of variable `j`.
    pub fn set(&mut self, j: usize, status: VariableStatus) {
        self.statuses[j] = status;
    }

    /// All statuses in variable order.
    pub fn statuses(&self) -> &[VariableStatus] {
        &self.statuses
    }

    /// Append a variable with the given status.
    pub fn push(&mut self, status: VariableStatus) {
        self.statuses.push(status);
    }

    /// Drop all variables behind the first `nr_variables`.
    pub fn truncate(&mut self, nr_variables: usize) {
        self.statuses.truncate(nr_variables);
    }

    /// The number of basic variables.
    pub fn nr_basic(&self) -> usize {
        self.statuses.iter().filter(|&&s| s == VariableStatus::Basic).count()
    }

    /// The indices of the basic variables in increasing order.
    pub fn basic_indices(&self) -> Vec<usize> {
        self.statuses
            .iter()
            .enumerate()
            .filter(|(_, &s)| s == VariableStatus::Basic)
            .map(|(j, _)| j)
            .collect()
    }
}

/// The result of a solver or crossover run.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Output<F> {
    /// The primal solution.
    pub x: Vec<F>,
    /// The dual solution, if the algorithm produced one.
    pub y: Option<Vec<F>>,
    /// The objective value of `x`.
    pub objective: F,
    /// The basis belonging to `x`.
    pub basis: Basis,
    /// The total wall clock time spent.
    pub runtime: Duration,
    /// The number of simplex iterations performed.
    pub iterations: usize,
}

/// A simple accumulating stop watch.
#[derive(Debug)]
pub struct Timer {
    total: Duration,
    started: Option<Instant>,
}

impl Timer {
    pub fn new() -> Self {
        Timer {
            total: Duration::default(),
            started: None,
        }
    }

    /// Start measuring. Has no effect if the timer is running.
    pub fn start(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    /// Stop measuring and add the elapsed span to the total.
    pub fn stop(&mut self) {
        if let Some(t0) = self.started.take() {
            self.total += t0.elapsed();
        }
    }

    /// Add an externally measured span to the total.
    pub fn add(&mut self, span: Duration) {
        self.total += span;
    }

    /// The accumulated time including a still running span.
    pub fn total(&self) -> Duration {
        self.total + self.started.map(|t0| t0.elapsed()).unwrap_or_default()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Timer::new()
    }
}
