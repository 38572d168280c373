//! Implementations of algorithms of Monkey King Evolution family.
//!
//! Monkey King Evolution ([Meng & Pan, 2016]) splits a population into
//! ordinary monkeys, which are pulled towards the global best, and monkey
//! kings, which explore the neighbourhood of their own position. Three
//! variants are provided:
//! - [`MonkeyKingEvolutionV1`] - a monkey king spawns `c * dimension` radial
//!   offspring and takes the place of the best one
//! - [`MonkeyKingEvolutionV2`] - a monkey king tries `c * population_size`
//!   differential steps built from random pairs of the population
//! - [`MonkeyKingEvolutionV3`] - a matrix population without discrete roles,
//!   recombined with the global best through a randomized triangular mask
//!
//! All of them share [`MkeConfig`].
//!
//! [Meng & Pan, 2016]: https://doi.org/10.1016/j.knosys.2016.01.009

mod v1;
mod v2;
mod v3;

use std::marker::PhantomData;

use rand::{rngs::StdRng, seq::index, Rng};
use tracing::trace;
use typed_builder::TypedBuilder;
pub use v1::{MonkeyKingEvolutionV1, RadialMove};
pub use v2::{DifferentialMove, MonkeyKingEvolutionV2};
pub use v3::{MonkeyKingEvolutionV3, V3State};

use super::algorithm::{
  Algorithm,
  AlgorithmBase,
  GenerationOf,
  PopulationOf,
};
use crate::{
  error::{Error, Result},
  individual::Individual,
  objective::{Fitness, Objective},
  population::{Best, Generation, IndividualInit},
  task::Task,
};

/// Hyperparameters of Monkey King Evolution.
///
/// # Examples
/// ```
/// # use mke::optimizer::mke::MkeConfig;
/// let config = MkeConfig::builder().population_size(20).seed(1).build();
/// assert_eq!(config.fc, 0.5);
/// ```
#[derive(TypedBuilder, Clone, Copy, PartialEq, Debug)]
pub struct MkeConfig {
  /// Number of solutions in the population.
  #[builder(default = 40)]
  pub population_size: usize,
  /// Scale factor of ordinary monkeys' moves towards the global best.
  #[builder(default = 0.7)]
  pub fluctuation_coeff: f64,
  /// Fraction of the population chosen as monkey kings each iteration.
  /// Must lie in `[0, 1]`.
  #[builder(default = 0.3)]
  pub population_rate: f64,
  /// Multiplier of the number of candidates a monkey king tries.
  #[builder(default = 3.0)]
  pub c: f64,
  /// Scale factor of monkey kings' moves.
  #[builder(default = 0.5)]
  pub fc: f64,
  /// Seed of the random source. Drawn from system entropy if absent.
  #[builder(default, setter(strip_option))]
  pub seed: Option<u64>,
}

impl Default for MkeConfig {
  fn default() -> Self {
    Self::builder().build()
  }
}

impl MkeConfig {
  /// Checks every hyperparameter.
  ///
  /// # Errors
  ///
  /// Returns [`Error::Configuration`] describing the first invalid value.
  pub fn validate(&self) -> Result<()> {
    if self.population_size == 0 {
      return Err(Error::config("population size must be positive"));
    }
    if !(0.0..=1.0).contains(&self.population_rate) {
      return Err(Error::config(format!(
        "population rate {} is outside [0, 1]",
        self.population_rate
      )));
    }
    if !self.c.is_finite() || self.c <= 0.0 {
      return Err(Error::config(format!("c {} must be positive", self.c)));
    }
    if !self.fc.is_finite() || !self.fluctuation_coeff.is_finite() {
      return Err(Error::config("scale factors must be finite"));
    }
    Ok(())
  }

  /// Returns the number of monkey kings chosen among `size` individuals.
  pub fn king_count(&self, size: usize) -> usize {
    (self.population_rate * size as f64) as usize
  }
}

/// The way a monkey king explores the search space.
pub trait KingMove {
  /// Name of the algorithm using this move.
  const NAME: &'static str;

  /// Checks hyperparameters this move has extra requirements on.
  fn validate(_config: &MkeConfig) -> Result<()> {
    Ok(())
  }

  /// Returns the number of candidates a monkey king evaluates per move.
  fn candidate_count(
    config: &MkeConfig,
    dimension: usize,
    population_size: usize,
  ) -> usize;

  /// Returns the new position and fitness of the monkey king at `king`.
  ///
  /// The rest of `population` is left untouched.
  fn move_king<O: Objective>(
    config: &MkeConfig,
    population: &[Individual],
    king: usize,
    best: &Best,
    task: &mut Task<O>,
    rng: &mut StdRng,
  ) -> Result<(Vec<f64>, Fitness)>;
}

/// Monkey King Evolution over discrete [`Individual`]s.
///
/// Each iteration every ordinary monkey moves from its personal best towards
/// the global best, and every monkey king is moved by `M`. Then each
/// individual updates its personal best and a new set of monkey kings is
/// drawn from the whole population, regardless of fitness.
///
/// If `M` would evaluate no candidates, monkey kings move like ordinary
/// monkeys, so every iteration spends at least one evaluation.
#[derive(Clone, Debug)]
pub struct MonkeyKingEvolution<M> {
  config: MkeConfig,
  base: AlgorithmBase,
  _move: PhantomData<M>,
}

impl<M: KingMove> MonkeyKingEvolution<M> {
  /// Creates a new optimizer.
  ///
  /// # Errors
  ///
  /// Returns [`Error::Configuration`] if `config` is invalid.
  pub fn new(config: MkeConfig) -> Result<Self> {
    config.validate()?;
    M::validate(&config)?;
    Ok(Self {
      base: AlgorithmBase::new(config.population_size, config.seed)?,
      config,
      _move: PhantomData,
    })
  }

  /// Returns hyperparameters.
  pub fn config(&self) -> &MkeConfig {
    &self.config
  }
}

/// Moves an ordinary monkey:
/// `x = personal_best + fluctuation_coeff * r * (global_best - x)`,
/// where `r` is drawn uniformly from `[0, 1)` per component.
fn move_monkey<O: Objective>(
  individual: &mut Individual,
  fluctuation_coeff: f64,
  best: &Best,
  task: &mut Task<O>,
  rng: &mut StdRng,
) -> Result<()> {
  individual.position = individual
    .personal_best_position
    .iter()
    .zip(&individual.position)
    .zip(&best.position)
    .map(|((pb, x), b)| pb + fluctuation_coeff * rng.gen::<f64>() * (b - x))
    .collect();
  individual.evaluate(task, rng)
}

/// Flags `count` distinct individuals, chosen uniformly, as monkey kings.
fn crown_kings(population: &mut [Individual], count: usize, rng: &mut StdRng) {
  let kings = index::sample(rng, population.len(), count);
  trace!(kings = ?kings, "monkey kings chosen");
  for i in kings {
    population[i].is_elite = true;
  }
}

impl<M: KingMove> Algorithm for MonkeyKingEvolution<M> {
  type Init = IndividualInit;
  type State = ();

  fn name(&self) -> &'static str {
    M::NAME
  }

  fn base(&mut self) -> &mut AlgorithmBase {
    &mut self.base
  }

  fn init_population<O: Objective>(
    &mut self,
    task: &mut Task<O>,
  ) -> Result<(PopulationOf<Self>, Vec<Fitness>, Self::State)> {
    let (mut population, fitness) = self.initial_population(task)?;
    let count = self.config.king_count(population.len());
    crown_kings(&mut population, count, &mut self.base.rng);
    Ok((population, fitness, ()))
  }

  fn run_iteration<O: Objective>(
    &mut self,
    task: &mut Task<O>,
    generation: GenerationOf<Self>,
  ) -> Result<GenerationOf<Self>> {
    let Generation {
      mut population,
      mut best,
      ..
    } = generation;
    let rng = &mut self.base.rng;
    let kings_move =
      M::candidate_count(&self.config, task.dimension(), population.len()) > 0;

    for i in 0..population.len() {
      if population[i].is_elite && kings_move {
        let (position, fitness) =
          M::move_king(&self.config, &population, i, &best, task, rng)?;
        let king = &mut population[i];
        king.is_elite = false;
        king.position = position;
        king.fitness = fitness;
      } else {
        population[i].is_elite = false;
        move_monkey(
          &mut population[i],
          self.config.fluctuation_coeff,
          &best,
          task,
          rng,
        )?;
      }
      population[i].update_personal_best();
    }

    let count = self.config.king_count(population.len());
    crown_kings(&mut population, count, rng);
    let fitness: Vec<Fitness> = population.iter().map(|i| i.fitness).collect();
    best.update(&population, &fitness);
    Ok(Generation {
      population,
      fitness,
      best,
      state: (),
    })
  }
}
