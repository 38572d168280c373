//! Independent runs of an optimizer.
//!
//! Metaheuristics are stochastic, so a single run says little about how well
//! an algorithm performs. An [`Experiment`] repeats a run with consecutive
//! seeds, each time on a fresh task, either sequentially or in parallel on
//! the [`rayon`] thread pool. Both ways produce identical results.

use rayon::prelude::*;
use tracing::info;
use typed_builder::TypedBuilder;

use crate::{
  error::Result,
  objective::Objective,
  optimizer::Optimizer,
  population::Best,
  task::Task,
};

/// A series of independent runs.
///
/// Run `i` is performed by an optimizer created by `algorithm` from the seed
/// `base_seed + i` on a task created by `task`.
///
/// # Examples
/// ```
/// # use mke::{experiment::Experiment, optimizer::mke::*, task::*};
/// let sphere = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
/// let experiment = Experiment::builder()
///   .runs(4)
///   .base_seed(10)
///   .algorithm(|seed| {
///     MonkeyKingEvolutionV1::new(MkeConfig::builder().seed(seed).build())
///   })
///   .task(|| {
///     Task::new(
///       sphere,
///       Bounds::uniform(3, -5.0, 5.0)?,
///       StoppingCriterion::Evaluations(500),
///     )
///   })
///   .build();
/// let results = experiment.par_run()?;
/// assert_eq!(results.len(), 4);
/// # Ok::<(), mke::Error>(())
/// ```
#[derive(TypedBuilder, Clone, Debug)]
pub struct Experiment<A, T> {
  /// Number of runs.
  #[builder(default = 1)]
  runs: usize,
  /// Seed of the first run.
  #[builder(default)]
  base_seed: u64,
  /// Creates an optimizer from a seed.
  algorithm: A,
  /// Creates a task for a single run.
  task: T,
}

impl<A, T> Experiment<A, T> {
  /// Returns the number of runs.
  pub fn runs(&self) -> usize {
    self.runs
  }

  /// Returns the seed of the run at `index`.
  pub fn seed(&self, index: usize) -> u64 {
    self.base_seed.wrapping_add(index as u64)
  }

  fn run_once<P, O>(&self, index: usize) -> Result<Best>
  where
    A: Fn(u64) -> Result<P>,
    P: Optimizer,
    T: Fn() -> Result<Task<O>>,
    O: Objective,
  {
    let seed = self.seed(index);
    let mut optimizer = (self.algorithm)(seed)?;
    let mut task = (self.task)()?;
    let best = optimizer.run(&mut task)?;
    info!(
      run = index,
      seed,
      evaluations = task.evaluations(),
      fitness = best.fitness,
      "experiment run finished"
    );
    Ok(best)
  }

  /// Performs every run one after another and returns the best solution of
  /// each, in run order.
  ///
  /// # Errors
  ///
  /// Stops at the first failed run and returns its error.
  pub fn run<P, O>(&self) -> Result<Vec<Best>>
  where
    A: Fn(u64) -> Result<P>,
    P: Optimizer,
    T: Fn() -> Result<Task<O>>,
    O: Objective,
  {
    (0..self.runs).map(|i| self.run_once(i)).collect()
  }

  /// Performs runs in parallel and returns the best solution of each, in
  /// run order.
  ///
  /// # Errors
  ///
  /// Returns the error of the failed run with the lowest index. Other runs
  /// are completed regardless.
  pub fn par_run<P, O>(&self) -> Result<Vec<Best>>
  where
    A: Fn(u64) -> Result<P> + Sync,
    P: Optimizer,
    T: Fn() -> Result<Task<O>> + Sync,
    O: Objective,
  {
    let results: Vec<Result<Best>> = (0..self.runs)
      .into_par_iter()
      .map(|i| self.run_once(i))
      .collect();
    results.into_iter().collect()
  }
}
