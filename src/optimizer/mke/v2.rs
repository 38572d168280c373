use rand::{rngs::StdRng, seq::index};

use super::{KingMove, MkeConfig, MonkeyKingEvolution};
use crate::{
  error::{Error, Result},
  individual::Individual,
  objective::{Fitness, Objective},
  population::Best,
  task::Task,
};

/// Monkey King Evolution version 2.
///
/// Differs from [`MonkeyKingEvolutionV1`](super::MonkeyKingEvolutionV1) only
/// in the way monkey kings move, see [`DifferentialMove`].
pub type MonkeyKingEvolutionV2 = MonkeyKingEvolution<DifferentialMove>;

/// A monkey king tries `floor(c * population_size)` differential steps
/// `x - fc * (x_j - x_k)` with `j != k` drawn uniformly from the population,
/// and keeps a step only if it is strictly better than the best one so far.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct DifferentialMove;

impl KingMove for DifferentialMove {
  const NAME: &'static str = "MonkeyKingEvolutionV2";

  fn validate(config: &MkeConfig) -> Result<()> {
    if config.population_size < 2 {
      return Err(Error::config(
        "population size must be at least 2 to draw differential pairs",
      ));
    }
    Ok(())
  }

  fn candidate_count(
    config: &MkeConfig,
    _: usize,
    population_size: usize,
  ) -> usize {
    (config.c * population_size as f64) as usize
  }

  fn move_king<O: Objective>(
    config: &MkeConfig,
    population: &[Individual],
    king: usize,
    _: &Best,
    task: &mut Task<O>,
    rng: &mut StdRng,
  ) -> Result<(Vec<f64>, Fitness)> {
    let x = &population[king].position;
    let mut best = (x.clone(), population[king].fitness);
    let trials =
      Self::candidate_count(config, task.dimension(), population.len());
    for _ in 0..trials {
      let pair = index::sample(rng, population.len(), 2);
      let (j, k) = (&population[pair.index(0)], &population[pair.index(1)]);
      let mut candidate: Vec<f64> = x
        .iter()
        .zip(j.position.iter().zip(&k.position))
        .map(|(x, (xj, xk))| x - config.fc * (xj - xk))
        .collect();
      task.repair(&mut candidate, rng)?;
      let fitness = task.evaluate(&candidate)?;
      if fitness < best.1 {
        best = (candidate, fitness);
      }
    }
    Ok(best)
  }
}
