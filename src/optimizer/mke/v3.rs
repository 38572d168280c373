use ndarray::{aview1, Array2, Axis};
use rand::{seq::SliceRandom, Rng};
use tracing::trace;

use super::MkeConfig;
use crate::{
  error::Result,
  objective::{Fitness, Objective},
  optimizer::algorithm::{
    Algorithm,
    AlgorithmBase,
    GenerationOf,
    PopulationOf,
  },
  population::{argmax, argmin, Generation, MatrixInit},
  task::Task,
};

/// Monkey King Evolution version 3.
///
/// The population is a plain matrix whose rows are solutions, there are no
/// monkey kings and no personal bests. Each iteration:
/// 1. `ceil(c * dimension)` candidates `best + fc * (x_a - x_b)` are built
///    from randomly drawn rows and evaluated
/// 2. every row is blended with the global best through a shuffled
///    triangular mask and evaluated
/// 3. the best candidate replaces the worst row if it is no worse
///
/// `population_rate` and `fluctuation_coeff` are not used.
///
/// # Examples
/// ```
/// # use mke::{optimizer::{mke::*, Optimizer}, task::*};
/// let sphere = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
/// let mut task = Task::new(
///   sphere,
///   Bounds::uniform(5, -10.0, 10.0)?,
///   StoppingCriterion::Iterations(50),
/// )?;
/// let config = MkeConfig::builder().seed(1).build();
/// let best = MonkeyKingEvolutionV3::new(config)?.run(&mut task)?;
/// assert!(best.fitness >= 0.0);
/// # Ok::<(), mke::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct MonkeyKingEvolutionV3 {
  config: MkeConfig,
  base: AlgorithmBase,
}

impl MonkeyKingEvolutionV3 {
  /// Creates a new optimizer.
  ///
  /// # Errors
  ///
  /// Returns [`Error::Configuration`](crate::Error::Configuration) if
  /// `config` is invalid.
  pub fn new(config: MkeConfig) -> Result<Self> {
    config.validate()?;
    Ok(Self {
      base: AlgorithmBase::new(config.population_size, config.seed)?,
      config,
    })
  }

  /// Returns hyperparameters.
  pub fn config(&self) -> &MkeConfig {
    &self.config
  }
}

/// Constants computed once per run.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct V3State {
  /// Number of triangular blocks the mask is made of,
  /// `ceil(population_size / dimension)`.
  pub block_count: usize,
  /// Number of candidates built from the global best each iteration,
  /// `ceil(c * dimension)`.
  pub candidate_count: usize,
}

/// Draws `count` row indices below `size`, with replacement.
fn draw_rows<R: Rng + ?Sized>(
  count: usize,
  size: usize,
  rng: &mut R,
) -> Vec<usize> {
  (0..count).map(|_| rng.gen_range(0..size)).collect()
}

/// Builds a `rows` x `cols` mask of `block_count` stacked lower-triangular
/// blocks of ones, each row shuffled independently. The last block is cut
/// short if `rows` is not a multiple of `cols`.
fn triangular_mask<R: Rng + ?Sized>(
  rows: usize,
  cols: usize,
  block_count: usize,
  rng: &mut R,
) -> Array2<f64> {
  let mut mask = Array2::zeros((rows, cols));
  for mut block in mask.axis_chunks_iter_mut(Axis(0), cols).take(block_count) {
    for (i, mut row) in block.rows_mut().into_iter().enumerate() {
      let mut pattern: Vec<f64> =
        (0..cols).map(|j| if j <= i { 1.0 } else { 0.0 }).collect();
      pattern.shuffle(rng);
      row.assign(&aview1(&pattern));
    }
  }
  mask
}

/// Replaces the worst row of `population` with the best candidate if the
/// candidate is not worse. Returns `true` if it was replaced.
fn inject_best_candidate(
  population: &mut Array2<f64>,
  fitness: &mut [Fitness],
  candidates: &Array2<f64>,
  candidate_fitness: &[Fitness],
) -> bool {
  let (Some(worst), Some(candidate)) =
    (argmax(fitness), argmin(candidate_fitness))
  else {
    return false;
  };
  let injected = candidate_fitness[candidate] <= fitness[worst];
  trace!(
    row = worst,
    worst = fitness[worst],
    candidate = candidate_fitness[candidate],
    injected,
    "best candidate compared against worst row"
  );
  if injected {
    population.row_mut(worst).assign(&candidates.row(candidate));
    fitness[worst] = candidate_fitness[candidate];
  }
  injected
}

impl Algorithm for MonkeyKingEvolutionV3 {
  type Init = MatrixInit;
  type State = V3State;

  fn name(&self) -> &'static str {
    "MonkeyKingEvolutionV3"
  }

  fn base(&mut self) -> &mut AlgorithmBase {
    &mut self.base
  }

  fn init_population<O: Objective>(
    &mut self,
    task: &mut Task<O>,
  ) -> Result<(PopulationOf<Self>, Vec<Fitness>, Self::State)> {
    let (population, fitness) = self.initial_population(task)?;
    let dimension = task.dimension();
    let state = V3State {
      block_count: population.nrows().div_ceil(dimension),
      candidate_count: (self.config.c * dimension as f64).ceil() as usize,
    };
    Ok((population, fitness, state))
  }

  fn run_iteration<O: Objective>(
    &mut self,
    task: &mut Task<O>,
    generation: GenerationOf<Self>,
  ) -> Result<GenerationOf<Self>> {
    let Generation {
      population,
      mut best,
      state,
      ..
    } = generation;
    let rng = &mut self.base.rng;
    let (size, dimension) = population.dim();

    let a = draw_rows(state.candidate_count, size, rng);
    let b = draw_rows(state.candidate_count, size, rng);
    let mut candidates = (&population.select(Axis(0), &a)
      - &population.select(Axis(0), &b))
      * self.config.fc
      + &aview1(&best.position);
    task.repair_rows(&mut candidates, rng)?;
    let candidate_fitness = task.evaluate_rows(&candidates)?;
    best.update(&candidates, &candidate_fitness);

    let mask = triangular_mask(size, dimension, state.block_count, rng);
    let mut population = &mask * &population
      + &mask.mapv(|m| if m == 1.0 { 0.0 } else { 1.0 })
        * &aview1(&best.position);
    task.repair_rows(&mut population, rng)?;
    let mut fitness = task.evaluate_rows(&population)?;
    best.update(&population, &fitness);

    inject_best_candidate(
      &mut population,
      &mut fitness,
      &candidates,
      &candidate_fitness,
    );
    Ok(Generation {
      population,
      fitness,
      best,
      state,
    })
  }
}

#[cfg(test)]
mod tests {
  use ndarray::array;
  use rand::{rngs::StdRng, SeedableRng};

  use super::*;
  use crate::{
    optimizer::{
      mke::tests::{config, sphere, sphere_task},
      Optimizer,
    },
    population::{Best, Population},
    task::{Bounds, OptimizationType, StoppingCriterion},
  };

  #[test]
  fn test_initial_state() {
    let mut task = sphere_task();
    let mut mke = MonkeyKingEvolutionV3::new(config(0)).unwrap();
    let (population, fitness, state) = mke.init_population(&mut task).unwrap();
    assert_eq!(population.dim(), (40, 10));
    assert_eq!(fitness.len(), 40);
    assert_eq!(
      state,
      V3State {
        block_count: 4,
        candidate_count: 30
      }
    );

    let config = MkeConfig {
      population_size: 7,
      c: 0.1,
      ..config(0)
    };
    let mut mke = MonkeyKingEvolutionV3::new(config).unwrap();
    let (_, _, state) = mke.init_population(&mut sphere_task()).unwrap();
    assert_eq!(
      state,
      V3State {
        block_count: 1,
        candidate_count: 1
      }
    );
  }

  #[test]
  fn test_triangular_mask() {
    let mut rng = StdRng::seed_from_u64(2);
    let mask = triangular_mask(7, 3, 3, &mut rng);
    assert_eq!(mask.dim(), (7, 3));
    assert!(mask.iter().all(|m| *m == 0.0 || *m == 1.0));
    let ones: Vec<f64> = mask.rows().into_iter().map(|r| r.sum()).collect();
    assert_eq!(ones, vec![1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 1.0]);
  }

  #[test]
  fn test_triangular_mask_rows_are_shuffled() {
    let mut rng = StdRng::seed_from_u64(3);
    let mask = triangular_mask(50, 10, 5, &mut rng);
    // rows of an unshuffled mask start with all of their ones
    let shuffled = mask.rows().into_iter().any(|row| {
      let ones = row.sum() as usize;
      row.iter().take(ones).any(|m| *m == 0.0)
    });
    assert!(shuffled);
  }

  #[test]
  fn test_injection_replaces_worst_row() {
    let mut population = array![[1.0, 1.0], [3.0, 3.0], [2.0, 2.0]];
    let mut fitness = vec![2.0, 18.0, 8.0];
    let candidates = array![[4.0, 0.0], [0.0, 3.0]];

    // ties are injected
    assert!(inject_best_candidate(
      &mut population,
      &mut fitness,
      &candidates,
      &[20.0, 18.0],
    ));
    assert_eq!(population.row(1), aview1(&[0.0, 3.0]));
    assert_eq!(fitness, vec![2.0, 18.0, 8.0]);

    assert!(!inject_best_candidate(
      &mut population,
      &mut fitness,
      &candidates,
      &[20.0, 19.0],
    ));
    assert_eq!(population.row(1), aview1(&[0.0, 3.0]));

    assert!(inject_best_candidate(
      &mut population,
      &mut fitness,
      &candidates,
      &[1.0, 19.0],
    ));
    assert_eq!(population.row(1), aview1(&[4.0, 0.0]));
    assert_eq!(fitness, vec![2.0, 1.0, 8.0]);
  }

  #[test]
  fn test_injection_never_raises_worst_fitness() {
    let mut rng = StdRng::seed_from_u64(4);
    for _ in 0..100 {
      let mut population = Array2::from_shape_fn((5, 2), |_| rng.gen::<f64>());
      let mut fitness: Vec<f64> = (0..5).map(|_| rng.gen()).collect();
      let candidates = Array2::from_shape_fn((3, 2), |_| rng.gen::<f64>());
      let candidate_fitness: Vec<f64> = (0..3).map(|_| rng.gen()).collect();
      let worst = fitness.iter().copied().fold(f64::NEG_INFINITY, f64::max);
      inject_best_candidate(
        &mut population,
        &mut fitness,
        &candidates,
        &candidate_fitness,
      );
      assert!(fitness.iter().all(|f| *f <= worst));
    }
  }

  #[test]
  fn test_sphere_improves_on_initial_population() {
    let mut task = sphere_task();
    let (_, fitness, _) = MonkeyKingEvolutionV3::new(config(1))
      .unwrap()
      .init_population(&mut task)
      .unwrap();
    let initial_best = fitness.iter().copied().fold(f64::INFINITY, f64::min);

    let mut task = sphere_task();
    let best = MonkeyKingEvolutionV3::new(config(1))
      .unwrap()
      .run(&mut task)
      .unwrap();
    assert!(best.fitness < initial_best);
    assert!(best.fitness >= 0.0);
    assert_eq!(best.fitness, sphere(&best.position));
    assert!(task.bounds().contains(&best.position));
  }

  #[test]
  fn test_run_is_deterministic() {
    let run = |seed| {
      let mut task = sphere_task();
      let best = MonkeyKingEvolutionV3::new(config(seed))
        .unwrap()
        .run(&mut task)
        .unwrap();
      (best, task.evaluations(), task.convergence().to_vec())
    };
    assert_eq!(run(3), run(3));
    assert_ne!(run(3).0, run(4).0);
  }

  #[test]
  fn test_iterations_keep_invariants() {
    let mut task = sphere_task();
    let mut mke = MonkeyKingEvolutionV3::new(config(5)).unwrap();
    let (population, fitness, state) = mke.init_population(&mut task).unwrap();
    let best = Best::of(&population, &fitness).unwrap();
    let mut generation = Generation {
      population,
      fitness,
      best,
      state,
    };

    let mut evaluations = task.evaluations();
    for _ in 0..10 {
      let previous_best = generation.best.fitness;
      generation = mke.run_iteration(&mut task, generation).unwrap();

      assert_eq!(task.evaluations() - evaluations, 30 + 40);
      evaluations = task.evaluations();
      assert_eq!(generation.state, state);
      assert!(generation.best.fitness <= previous_best);
      for (i, f) in generation.fitness.iter().enumerate() {
        let position = generation.population.position(i);
        assert!(task.bounds().contains(&position));
        assert_eq!(sphere(&position), *f);
        assert!(generation.best.fitness <= *f);
      }
    }
  }

  #[test]
  fn test_maximization() {
    let mut task = Task::new(
      |x: &[f64]| -sphere(x),
      Bounds::uniform(4, -3.0, 3.0).unwrap(),
      StoppingCriterion::Iterations(30),
    )
    .unwrap()
    .with_optimization_type(OptimizationType::Maximize);
    let best = MonkeyKingEvolutionV3::new(config(6))
      .unwrap()
      .run(&mut task)
      .unwrap();
    assert_eq!(task.iterations(), 30);
    assert!(best.fitness <= 0.0);
    assert_eq!(best.fitness, -sphere(&best.position));
  }
}
