//! Population-based algorithms and the run loop they share.

use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info};

use super::Optimizer;
use crate::{
  error::{Error, Result},
  objective::{Fitness, Objective},
  population::{Best, Generation, Initialization, Population},
  task::Task,
};

/// An alias for the population type of an [`Algorithm`].
pub type PopulationOf<A> =
  <<A as Algorithm>::Init as Initialization>::Population;

/// An alias for the generation type threaded through an [`Algorithm`]'s run.
pub type GenerationOf<A> = Generation<PopulationOf<A>, <A as Algorithm>::State>;

/// State every population-based algorithm owns: a population size and a
/// random source.
#[derive(Clone, Debug)]
pub struct AlgorithmBase {
  pub(crate) population_size: usize,
  pub(crate) rng: StdRng,
}

impl AlgorithmBase {
  /// Creates a new base. The random source is seeded with `seed`, or from
  /// system entropy if there is none.
  ///
  /// # Errors
  ///
  /// Returns [`Error::Configuration`] if `population_size` is zero.
  pub fn new(population_size: usize, seed: Option<u64>) -> Result<Self> {
    if population_size == 0 {
      return Err(Error::config("population size must be positive"));
    }
    let rng = match seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_entropy(),
    };
    Ok(Self {
      population_size,
      rng,
    })
  }

  /// Returns the population size.
  pub fn population_size(&self) -> usize {
    self.population_size
  }

  /// Returns the random source.
  pub fn rng(&mut self) -> &mut StdRng {
    &mut self.rng
  }
}

/// Represents an abstract population-based algorithm.
///
/// Implementors only describe how a population is created and how it evolves
/// in a single iteration. The run loop itself is provided by the blanket
/// [`Optimizer`] implementation and is shared by every algorithm:
/// 1. initialize the population
/// 2. pick the best solution
/// 3. run iterations until the task tells to stop
/// 4. return the best solution
pub trait Algorithm {
  /// Strategy that creates the initial population.
  type Init: Initialization;

  /// Bookkeeping carried between iterations.
  type State;

  /// Returns the algorithm's name.
  fn name(&self) -> &'static str;

  /// Returns the population size and the random source.
  fn base(&mut self) -> &mut AlgorithmBase;

  /// Creates and evaluates `population_size` solutions with the configured
  /// [`Initialization`] strategy.
  fn initial_population<O: Objective>(
    &mut self,
    task: &mut Task<O>,
  ) -> Result<(PopulationOf<Self>, Vec<Fitness>)> {
    let base = self.base();
    let size = base.population_size;
    Self::Init::default().initialize(task, size, &mut base.rng)
  }

  /// Creates the initial population, its fitness and the initial state.
  fn init_population<O: Objective>(
    &mut self,
    task: &mut Task<O>,
  ) -> Result<(PopulationOf<Self>, Vec<Fitness>, Self::State)>;

  /// Evolves `generation` by a single iteration.
  fn run_iteration<O: Objective>(
    &mut self,
    task: &mut Task<O>,
    generation: GenerationOf<Self>,
  ) -> Result<GenerationOf<Self>>;
}

impl<A: Algorithm> Optimizer for A {
  fn run<O: Objective>(&mut self, task: &mut Task<O>) -> Result<Best> {
    let (population, fitness, state) = self.init_population(task)?;
    let best = Best::of(&population, &fitness)
      .ok_or_else(|| Error::config("initial population is empty"))?;
    info!(
      algorithm = self.name(),
      population_size = population.size(),
      fitness = task.optimization_type().apply(best.fitness),
      "run started"
    );

    let mut generation = Generation {
      population,
      fitness,
      best,
      state,
    };
    while !task.stopping_condition() {
      generation = self.run_iteration(task, generation)?;
      task.next_iteration();
      debug!(
        iteration = task.iterations(),
        evaluations = task.evaluations(),
        fitness = task.optimization_type().apply(generation.best.fitness),
        "iteration completed"
      );
    }

    let mut best = generation.best;
    best.fitness = task.optimization_type().apply(best.fitness);
    info!(
      algorithm = self.name(),
      iterations = task.iterations(),
      evaluations = task.evaluations(),
      fitness = best.fitness,
      "run finished"
    );
    Ok(best)
  }
}
