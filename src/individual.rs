//! Candidate solutions carrying their own history.

use rand::Rng;

use crate::{
  error::Result,
  objective::{Fitness, Objective},
  task::Task,
};

/// A candidate solution: a position, its fitness, the best state it has ever
/// been in and a role flag.
///
/// `personal_best_fitness <= fitness` is only guaranteed right after
/// [`update_personal_best`](Individual::update_personal_best): it is refreshed
/// after each move, not before.
#[derive(Clone, PartialEq, Debug)]
pub struct Individual {
  /// Current position.
  pub position: Vec<f64>,
  /// Fitness of the current position.
  pub fitness: Fitness,
  /// Best position this individual has been in.
  pub personal_best_position: Vec<f64>,
  /// Fitness of the personal best position.
  pub personal_best_fitness: Fitness,
  /// Marks an individual which explores instead of following the global
  /// best. Called a "monkey king" by Monkey King Evolution.
  pub is_elite: bool,
}

impl Individual {
  /// Creates an individual at a uniformly random position inside the task's
  /// box and evaluates it once. Its personal best is its initial state.
  ///
  /// # Errors
  ///
  /// Propagates objective function failures.
  pub fn generate<O, R>(task: &mut Task<O>, rng: &mut R) -> Result<Self>
  where
    O: Objective,
    R: Rng + ?Sized,
  {
    let position: Vec<f64> = task
      .lower()
      .iter()
      .zip(task.range())
      .map(|(lo, range)| lo + range * rng.gen::<f64>())
      .collect();
    let fitness = task.evaluate(&position)?;
    Ok(Self {
      personal_best_position: position.clone(),
      personal_best_fitness: fitness,
      position,
      fitness,
      is_elite: false,
    })
  }

  /// Repairs the current position and evaluates it.
  pub fn evaluate<O, R>(
    &mut self,
    task: &mut Task<O>,
    rng: &mut R,
  ) -> Result<()>
  where
    O: Objective,
    R: Rng + ?Sized,
  {
    task.repair(&mut self.position, rng)?;
    self.fitness = task.evaluate(&self.position)?;
    Ok(())
  }

  /// Overwrites the personal best with the current state if the current
  /// fitness is strictly better. Ties keep the earlier best.
  pub fn update_personal_best(&mut self) {
    if self.fitness < self.personal_best_fitness {
      self.personal_best_position.clone_from(&self.position);
      self.personal_best_fitness = self.fitness;
    }
  }
}
