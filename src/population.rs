//! Populations, their initialization strategies and the global best.

use itertools::Itertools;
use ndarray::Array2;
use rand::Rng;

use crate::{
  error::Result,
  individual::Individual,
  objective::{Fitness, Objective},
  task::Task,
};

/// A population of solutions, either discrete individuals or rows of a
/// matrix.
pub trait Population {
  /// Returns the number of solutions.
  fn size(&self) -> usize;

  /// Returns a copy of the `index`-th solution's position.
  fn position(&self, index: usize) -> Vec<f64>;
}

impl Population for Vec<Individual> {
  fn size(&self) -> usize {
    self.len()
  }

  fn position(&self, index: usize) -> Vec<f64> {
    self[index].position.clone()
  }
}

impl Population for Array2<f64> {
  fn size(&self) -> usize {
    self.nrows()
  }

  fn position(&self, index: usize) -> Vec<f64> {
    self.row(index).to_vec()
  }
}

/// Returns the index of the lowest fitness. The first one wins on ties, NaN
/// is never preferred over a number.
pub(crate) fn argmin(fitness: &[Fitness]) -> Option<usize> {
  fitness.iter().position_min_by(|a, b| a.total_cmp(b))
}

/// Returns the index of the highest fitness. The first one wins on ties, NaN
/// is always preferred over a number.
pub(crate) fn argmax(fitness: &[Fitness]) -> Option<usize> {
  fitness.iter().position_min_by(|a, b| b.total_cmp(a))
}

/// The best position found so far together with its fitness.
#[derive(Clone, PartialEq, Debug)]
pub struct Best {
  /// Best position.
  pub position: Vec<f64>,
  /// Fitness of the best position.
  pub fitness: Fitness,
}

impl Best {
  /// Returns the best solution of a population, or `None` if it is empty.
  pub fn of<P: Population>(
    population: &P,
    fitness: &[Fitness],
  ) -> Option<Self> {
    argmin(fitness).map(|i| Self {
      position: population.position(i),
      fitness: fitness[i],
    })
  }

  /// Replaces `self` with the best solution of a population if it is strictly
  /// better. Returns `true` if it was replaced.
  pub fn update<P: Population>(
    &mut self,
    population: &P,
    fitness: &[Fitness],
  ) -> bool {
    match Self::of(population, fitness) {
      Some(best) if best.fitness < self.fitness => {
        *self = best;
        true
      }
      _ => false,
    }
  }
}

/// The state threaded through each iteration of a run.
#[derive(Clone, Debug)]
pub struct Generation<P, S> {
  /// Current population.
  pub population: P,
  /// Fitness of each member of `population`.
  pub fitness: Vec<Fitness>,
  /// Global best found so far.
  pub best: Best,
  /// Algorithm-specific bookkeeping carried between iterations.
  pub state: S,
}

/// A strategy that creates and evaluates an initial population.
pub trait Initialization: Default {
  /// Type of the population created.
  type Population: Population;

  /// Creates `size` solutions uniformly distributed inside the task's box
  /// and returns them along with their fitness.
  fn initialize<O, R>(
    &self,
    task: &mut Task<O>,
    size: usize,
    rng: &mut R,
  ) -> Result<(Self::Population, Vec<Fitness>)>
  where
    O: Objective,
    R: Rng + ?Sized;
}

/// Creates a vector of [`Individual`]s, generating each one in turn.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct IndividualInit;

impl Initialization for IndividualInit {
  type Population = Vec<Individual>;

  fn initialize<O, R>(
    &self,
    task: &mut Task<O>,
    size: usize,
    rng: &mut R,
  ) -> Result<(Self::Population, Vec<Fitness>)>
  where
    O: Objective,
    R: Rng + ?Sized,
  {
    let population = (0..size)
      .map(|_| Individual::generate(task, rng))
      .collect::<Result<Vec<_>>>()?;
    let fitness = population.iter().map(|i| i.fitness).collect();
    Ok((population, fitness))
  }
}

/// Draws a whole `size` x `dimension` matrix at once, then evaluates it row
/// by row.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct MatrixInit;

impl Initialization for MatrixInit {
  type Population = Array2<f64>;

  fn initialize<O, R>(
    &self,
    task: &mut Task<O>,
    size: usize,
    rng: &mut R,
  ) -> Result<(Self::Population, Vec<Fitness>)>
  where
    O: Objective,
    R: Rng + ?Sized,
  {
    let (lower, range) = (task.lower(), task.range());
    let population = Array2::from_shape_fn((size, task.dimension()), |(_, j)| {
      lower[j] + range[j] * rng.gen::<f64>()
    });
    let fitness = task.evaluate_rows(&population)?;
    Ok((population, fitness))
  }
}
