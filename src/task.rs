//! Optimization task: an objective function, its feasible box and a budget.

use std::time::{Duration, Instant};

use ndarray::{Array2, ArrayView1, ArrayViewMut1};
use rand::Rng;

use crate::{
  error::{Error, Result},
  objective::{Fitness, Objective},
  repair::Repair,
};

/// Lower and upper bounds of the feasible box.
#[derive(Clone, PartialEq, Debug)]
pub struct Bounds {
  lower: Vec<f64>,
  upper: Vec<f64>,
}

impl Bounds {
  /// Creates bounds from per-dimension vectors.
  ///
  /// # Errors
  ///
  /// Returns [`Error::Configuration`] if vectors are empty, differ in length,
  /// contain non-finite values or `lower[i] >= upper[i]` for some `i`.
  pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self> {
    if lower.is_empty() {
      return Err(Error::config("dimension must be positive"));
    }
    if lower.len() != upper.len() {
      return Err(Error::config(format!(
        "lower bound has {} components, upper bound has {}",
        lower.len(),
        upper.len()
      )));
    }
    for (i, (lo, hi)) in lower.iter().zip(&upper).enumerate() {
      if !lo.is_finite() || !hi.is_finite() {
        return Err(Error::config(format!(
          "bounds of dimension {i} are not finite"
        )));
      }
      if lo >= hi {
        return Err(Error::config(format!(
          "lower bound {lo} is not below upper bound {hi} in dimension {i}"
        )));
      }
    }
    Ok(Self { lower, upper })
  }

  /// Broadcasts scalar bounds to `dimension` components.
  pub fn uniform(dimension: usize, lower: f64, upper: f64) -> Result<Self> {
    Self::new(vec![lower; dimension], vec![upper; dimension])
  }

  /// Returns the number of dimensions.
  pub fn dimension(&self) -> usize {
    self.lower.len()
  }

  /// Returns lower bounds.
  pub fn lower(&self) -> &[f64] {
    &self.lower
  }

  /// Returns upper bounds.
  pub fn upper(&self) -> &[f64] {
    &self.upper
  }

  /// Returns `true` if every component of `position` lies inside the box.
  pub fn contains(&self, position: &[f64]) -> bool {
    position.len() == self.dimension()
      && position
        .iter()
        .zip(self.lower.iter().zip(&self.upper))
        .all(|(x, (lo, hi))| lo <= x && x <= hi)
  }
}

/// Condition that ends a run. A task is configured with exactly one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum StoppingCriterion {
  /// Stop once this many objective evaluations were consumed.
  Evaluations(u64),
  /// Stop once this many iterations were completed.
  Iterations(u64),
  /// Stop once this much time passed since the first evaluation.
  Elapsed(Duration),
}

/// Direction of optimization.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum OptimizationType {
  /// Lower values are better.
  #[default]
  Minimize,
  /// Higher values are better. Values are negated internally, so algorithms
  /// always minimize.
  Maximize,
}

impl OptimizationType {
  /// Converts a value between the caller's sign and the internal one.
  /// The conversion is its own inverse.
  pub fn apply(&self, value: Fitness) -> Fitness {
    match self {
      OptimizationType::Minimize => value,
      OptimizationType::Maximize => -value,
    }
  }
}

/// An optimization task.
///
/// Wraps an objective function together with its feasible box, a repair
/// strategy and an evaluation budget. A task tracks how many evaluations
/// and iterations were consumed and reports when the run must stop. It is
/// owned by a single run and must not be shared between concurrent runs.
///
/// # Examples
/// ```
/// # use mke::task::*;
/// let sphere = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
/// let mut task = Task::new(
///   sphere,
///   Bounds::uniform(2, -5.0, 5.0)?,
///   StoppingCriterion::Evaluations(1),
/// )?;
/// assert_eq!(task.evaluate(&[1.0, 2.0])?, 5.0);
/// assert!(task.stopping_condition());
/// # Ok::<(), mke::Error>(())
/// ```
#[derive(Debug)]
pub struct Task<O> {
  objective: O,
  bounds: Bounds,
  range: Vec<f64>,
  stopping: StoppingCriterion,
  target: Option<Fitness>,
  optimization: OptimizationType,
  repair: Repair,
  evaluations: u64,
  iterations: u64,
  started: Option<Instant>,
  best: Fitness,
  convergence: Vec<(u64, Fitness)>,
}

impl<O: Objective> Task<O> {
  /// Creates a new task.
  ///
  /// # Errors
  ///
  /// Returns [`Error::Configuration`] if the stopping budget is zero.
  pub fn new(
    objective: O,
    bounds: Bounds,
    stopping: StoppingCriterion,
  ) -> Result<Self> {
    let empty_budget = match stopping {
      StoppingCriterion::Evaluations(n) | StoppingCriterion::Iterations(n) => {
        n == 0
      }
      StoppingCriterion::Elapsed(d) => d.is_zero(),
    };
    if empty_budget {
      return Err(Error::config("stopping budget must be positive"));
    }
    let range = bounds
      .upper
      .iter()
      .zip(&bounds.lower)
      .map(|(hi, lo)| hi - lo)
      .collect();
    Ok(Self {
      objective,
      bounds,
      range,
      stopping,
      target: None,
      optimization: OptimizationType::default(),
      repair: Repair::default(),
      evaluations: 0,
      iterations: 0,
      started: None,
      best: Fitness::INFINITY,
      convergence: Vec::new(),
    })
  }

  /// Sets the repair strategy. Defaults to [`Repair::Clip`].
  pub fn with_repair(mut self, repair: Repair) -> Self {
    self.repair = repair;
    self
  }

  /// Sets the optimization direction. Defaults to minimization.
  pub fn with_optimization_type(
    mut self,
    optimization: OptimizationType,
  ) -> Self {
    self.optimization = optimization;
    self
  }

  /// Stops the run as soon as a fitness at least as good as `target` is
  /// found, regardless of the remaining budget.
  pub fn with_target(mut self, target: Fitness) -> Self {
    self.target = Some(target);
    self
  }

  /// Evaluates `position`, consuming one evaluation.
  ///
  /// Returns fitness in the internal (minimized) sign.
  ///
  /// # Errors
  ///
  /// Returns [`Error::DimensionMismatch`] if `position` has a wrong length and
  /// [`Error::Evaluation`] if the objective function fails.
  pub fn evaluate(&mut self, position: &[f64]) -> Result<Fitness> {
    self.check_dimension(position.len())?;
    self.started.get_or_insert_with(Instant::now);
    self.evaluations += 1;
    let value =
      self
        .objective
        .evaluate(position)
        .map_err(|source| Error::Evaluation {
          evaluations: self.evaluations,
          source,
        })?;
    let fitness = self.optimization.apply(value);
    if fitness < self.best {
      self.best = fitness;
      self.convergence.push((self.evaluations, value));
    }
    Ok(fitness)
  }

  /// Evaluates a row of a matrix population.
  pub fn evaluate_row(&mut self, row: ArrayView1<f64>) -> Result<Fitness> {
    match row.as_slice() {
      Some(position) => self.evaluate(position),
      None => self.evaluate(&row.to_vec()),
    }
  }

  /// Evaluates every row of a matrix population.
  pub fn evaluate_rows(&mut self, rows: &Array2<f64>) -> Result<Vec<Fitness>> {
    self.check_dimension(rows.ncols())?;
    rows.rows().into_iter().map(|r| self.evaluate_row(r)).collect()
  }

  /// Checks `dimension` against the task's dimension.
  fn check_dimension(&self, dimension: usize) -> Result<()> {
    if dimension != self.dimension() {
      return Err(Error::DimensionMismatch {
        expected: self.dimension(),
        actual: dimension,
      });
    }
    Ok(())
  }

  /// Repairs `position` in place with the task's repair strategy.
  ///
  /// # Errors
  ///
  /// Returns [`Error::DimensionMismatch`] if `position` has a wrong length.
  pub fn repair<R: Rng + ?Sized>(
    &self,
    position: &mut [f64],
    rng: &mut R,
  ) -> Result<()> {
    self.check_dimension(position.len())?;
    self.repair.apply(
      position.iter_mut(),
      &self.bounds.lower,
      &self.bounds.upper,
      rng,
    );
    Ok(())
  }

  /// Repairs a row of a matrix population in place.
  pub fn repair_row<R: Rng + ?Sized>(
    &self,
    mut row: ArrayViewMut1<f64>,
    rng: &mut R,
  ) -> Result<()> {
    self.check_dimension(row.len())?;
    self.repair.apply(
      row.iter_mut(),
      &self.bounds.lower,
      &self.bounds.upper,
      rng,
    );
    Ok(())
  }

  /// Repairs every row of a matrix population in place.
  pub fn repair_rows<R: Rng + ?Sized>(
    &self,
    rows: &mut Array2<f64>,
    rng: &mut R,
  ) -> Result<()> {
    self.check_dimension(rows.ncols())?;
    for row in rows.rows_mut() {
      self.repair_row(row, rng)?;
    }
    Ok(())
  }

  /// Returns `true` once the run must stop: the budget is exhausted or the
  /// target fitness was reached.
  pub fn stopping_condition(&self) -> bool {
    let exhausted = match self.stopping {
      StoppingCriterion::Evaluations(n) => self.evaluations >= n,
      StoppingCriterion::Iterations(n) => self.iterations >= n,
      StoppingCriterion::Elapsed(limit) => {
        self.started.is_some_and(|t| t.elapsed() >= limit)
      }
    };
    exhausted
      || self
        .target
        .is_some_and(|t| self.best <= self.optimization.apply(t))
  }

  /// Marks an iteration as completed.
  pub fn next_iteration(&mut self) {
    self.iterations += 1;
  }
}

impl<O> Task<O> {
  /// Returns the number of dimensions.
  pub fn dimension(&self) -> usize {
    self.bounds.dimension()
  }

  /// Returns the feasible box.
  pub fn bounds(&self) -> &Bounds {
    &self.bounds
  }

  /// Returns lower bounds.
  pub fn lower(&self) -> &[f64] {
    &self.bounds.lower
  }

  /// Returns upper bounds.
  pub fn upper(&self) -> &[f64] {
    &self.bounds.upper
  }

  /// Returns `upper - lower` for each dimension.
  pub fn range(&self) -> &[f64] {
    &self.range
  }

  /// Returns the stopping criterion.
  pub fn stopping_criterion(&self) -> StoppingCriterion {
    self.stopping
  }

  /// Returns the optimization direction.
  pub fn optimization_type(&self) -> OptimizationType {
    self.optimization
  }

  /// Returns the number of evaluations consumed so far.
  pub fn evaluations(&self) -> u64 {
    self.evaluations
  }

  /// Returns the number of completed iterations.
  pub fn iterations(&self) -> u64 {
    self.iterations
  }

  /// Returns `(evaluation, fitness)` pairs recorded each time an evaluation
  /// strictly improved on all previous ones. Fitness is in the caller's sign.
  pub fn convergence(&self) -> &[(u64, Fitness)] {
    &self.convergence
  }
}
