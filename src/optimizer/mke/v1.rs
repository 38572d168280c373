use rand::{rngs::StdRng, Rng};

use super::{KingMove, MkeConfig, MonkeyKingEvolution};
use crate::{
  error::Result,
  individual::Individual,
  objective::{Fitness, Objective},
  population::{argmin, Best},
  task::Task,
};

/// Monkey King Evolution version 1.
///
/// # Examples
/// ```
/// # use mke::{optimizer::{mke::*, Optimizer}, task::*};
/// let sphere = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
/// let mut task = Task::new(
///   sphere,
///   Bounds::uniform(5, -10.0, 10.0)?,
///   StoppingCriterion::Evaluations(2000),
/// )?;
/// let config = MkeConfig::builder().seed(1).build();
/// let best = MonkeyKingEvolutionV1::new(config)?.run(&mut task)?;
/// assert!(best.fitness >= 0.0);
/// # Ok::<(), mke::Error>(())
/// ```
pub type MonkeyKingEvolutionV1 = MonkeyKingEvolution<RadialMove>;

/// A monkey king spawns `floor(c * dimension)` offspring
/// `x + fc * r * x`, where `r` is drawn uniformly from `[0, 1)` per
/// component, and moves to the best of them even if it is worse than its
/// current position.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct RadialMove;

impl KingMove for RadialMove {
  const NAME: &'static str = "MonkeyKingEvolutionV1";

  fn candidate_count(config: &MkeConfig, dimension: usize, _: usize) -> usize {
    (config.c * dimension as f64) as usize
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
    let count =
      Self::candidate_count(config, task.dimension(), population.len());
    let mut offspring = Vec::with_capacity(count);
    let mut fitness = Vec::with_capacity(count);
    for _ in 0..count {
      let mut child: Vec<f64> =
        x.iter().map(|v| v + config.fc * rng.gen::<f64>() * v).collect();
      task.repair(&mut child, rng)?;
      fitness.push(task.evaluate(&child)?);
      offspring.push(child);
    }
    Ok(match argmin(&fitness) {
      Some(i) => (offspring.swap_remove(i), fitness[i]),
      None => (x.clone(), population[king].fitness),
    })
  }
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;

  use rand::SeedableRng;

  use super::*;
  use crate::{
    optimizer::{
      algorithm::Algorithm,
      mke::tests::{config, sphere, sphere_task},
      Optimizer,
    },
    population::{Generation, IndividualInit, Initialization},
    task::{Bounds, StoppingCriterion},
  };

  #[test]
  fn test_sphere_improves_on_initial_population() {
    let mut task = sphere_task();
    let (_, fitness, _) = MonkeyKingEvolutionV1::new(config(1))
      .unwrap()
      .init_population(&mut task)
      .unwrap();
    let initial_best = fitness.iter().copied().fold(f64::INFINITY, f64::min);

    let mut task = sphere_task();
    let mut mke = MonkeyKingEvolutionV1::new(config(1)).unwrap();
    let best = mke.run(&mut task).unwrap();
    assert!(best.fitness < initial_best);
    assert!(best.fitness >= 0.0);
    assert_eq!(best.fitness, sphere(&best.position));
    assert!(task.evaluations() >= 5000);
    assert!(task.convergence().iter().all(|(_, f)| *f >= 0.0));
  }

  #[test]
  fn test_run_is_deterministic() {
    let run = |seed| {
      let mut task = sphere_task();
      let best = MonkeyKingEvolutionV1::new(config(seed))
        .unwrap()
        .run(&mut task)
        .unwrap();
      (best, task.evaluations(), task.convergence().to_vec())
    };
    assert_eq!(run(1), run(1));
    assert_ne!(run(1).0, run(2).0);
  }

  #[test]
  fn test_iterations_keep_invariants() {
    let mut task = sphere_task();
    let mut mke = MonkeyKingEvolutionV1::new(config(5)).unwrap();
    let (population, fitness, state) = mke.init_population(&mut task).unwrap();
    assert_eq!(population.iter().filter(|i| i.is_elite).count(), 12);
    let best = Best::of(&population, &fitness).unwrap();
    let mut generation = Generation {
      population,
      fitness,
      best,
      state,
    };

    let mut evaluations = task.evaluations();
    for _ in 0..10 {
      let personal_bests: Vec<f64> = generation
        .population
        .iter()
        .map(|i| i.personal_best_fitness)
        .collect();
      let kings = generation.population.iter().filter(|i| i.is_elite).count();
      let previous_best = generation.best.fitness;

      generation = mke.run_iteration(&mut task, generation).unwrap();

      // each king spawns 3 * 10 offspring, each monkey is evaluated once
      let spent = task.evaluations() - evaluations;
      assert_eq!(spent, (kings * 30 + 40 - kings) as u64);
      evaluations = task.evaluations();
      assert!(generation.best.fitness <= previous_best);
      let population = &generation.population;
      assert_eq!(population.iter().filter(|i| i.is_elite).count(), 12);
      for (individual, previous) in population.iter().zip(personal_bests) {
        assert!(task.bounds().contains(&individual.position));
        assert!(individual.personal_best_fitness <= individual.fitness);
        assert!(individual.personal_best_fitness <= previous);
      }
      let population_best =
        generation.fitness.iter().copied().fold(f64::INFINITY, f64::min);
      assert!(generation.best.fitness <= population_best);
    }
  }

  #[test]
  fn test_move_king_picks_best_offspring() {
    let seen = RefCell::new(Vec::new());
    let objective = |x: &[f64]| {
      let f = sphere(x);
      seen.borrow_mut().push(f);
      f
    };
    let mut task = Task::new(
      objective,
      Bounds::uniform(2, -10.0, 10.0).unwrap(),
      StoppingCriterion::Evaluations(100),
    )
    .unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    let (population, fitness) =
      IndividualInit.initialize(&mut task, 4, &mut rng).unwrap();
    let best = Best::of(&population, &fitness).unwrap();
    seen.borrow_mut().clear();

    let (position, fitness) = RadialMove::move_king(
      &config(0),
      &population,
      2,
      &best,
      &mut task,
      &mut rng,
    )
    .unwrap();
    let offspring = seen.borrow();
    assert_eq!(offspring.len(), 6);
    assert_eq!(fitness, sphere(&position));
    assert!(offspring.iter().all(|f| fitness <= *f));
    assert!(task.bounds().contains(&position));
  }

  #[test]
  fn test_move_king_without_offspring_stays() {
    let mut task = Task::new(
      sphere,
      Bounds::uniform(2, -10.0, 10.0).unwrap(),
      StoppingCriterion::Evaluations(100),
    )
    .unwrap();
    let mut rng = StdRng::seed_from_u64(4);
    let (population, fitness) =
      IndividualInit.initialize(&mut task, 2, &mut rng).unwrap();
    let best = Best::of(&population, &fitness).unwrap();
    let config = MkeConfig {
      c: 0.25,
      ..config(0)
    };
    let moved =
      RadialMove::move_king(&config, &population, 1, &best, &mut task, &mut rng)
        .unwrap();
    assert_eq!(moved, (population[1].position.clone(), population[1].fitness));
    assert_eq!(task.evaluations(), 2);
  }

  #[test]
  fn test_kings_without_offspring_move_like_monkeys() {
    // a single king in one dimension has no offspring with c = 0.5
    let config = MkeConfig::builder()
      .population_size(1)
      .population_rate(1.0)
      .c(0.5)
      .seed(1)
      .build();
    assert_eq!(RadialMove::candidate_count(&config, 1, 1), 0);
    let mut task = Task::new(
      sphere,
      Bounds::uniform(1, -5.0, 5.0).unwrap(),
      StoppingCriterion::Evaluations(300),
    )
    .unwrap();
    let best = MonkeyKingEvolutionV1::new(config)
      .unwrap()
      .run(&mut task)
      .unwrap();
    assert_eq!(task.evaluations(), 300);
    assert_eq!(task.iterations(), 299);
    assert_eq!(best.fitness, sphere(&best.position));
  }
}
