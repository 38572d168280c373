//! Abstract optimizer.

pub mod algorithm;
pub mod mke;

use crate::{error::Result, objective::Objective, population::Best, task::Task};

/// Represents an abstract optimizer.
pub trait Optimizer {
  /// Runs `Optimizer` on `task` until the task's stopping condition is met,
  /// then returns the best solution found. Fitness is reported in the task's
  /// optimization direction.
  ///
  /// # Errors
  ///
  /// Any failure of the objective function aborts the run.
  fn run<O: Objective>(&mut self, task: &mut Task<O>) -> Result<Best>;
}
