//! **MKE** is an implementation of the Monkey King Evolution family of
//! metaheuristics for continuous single-objective optimization, built on top
//! of a small population-based optimization framework. It strives to be
//! simple, reproducible and to work with plain closures.
//!
//! Here's a [quick start example](#example) for the impatient.
//!
//! The crate is built around a few abstractions:
//! - **Task** - an objective function, the box it is defined on, a repair
//!   strategy for positions that leave the box and a budget: a number of
//!   evaluations, a number of iterations or a duration
//! - **Algorithm** - describes how a population is created and how it evolves
//!   during a single iteration
//! - **Optimizer** - runs an algorithm on a task. Every [`Algorithm`] is an
//!   [`Optimizer`] that runs the same loop:
//!   1. **Initialize** a population and pick the best solution
//!   2. **Iterate**: evolve the population, keeping track of the best
//!      solution ever found
//!   3. **Stop** once the task's budget is exhausted or a target fitness is
//!      reached, returning the best solution
//!
//! # Algorithms
//!
//! Monkey King Evolution ([Meng & Pan, 2016]) is a particle swarm relative.
//! Ordinary monkeys move from their personal best towards the global best,
//! while a random subset of the population - monkey kings - explores the
//! surroundings of their own positions. This crate features three versions:
//! - [`MonkeyKingEvolutionV1`], where a monkey king takes the place of the
//!   best of its radial offspring
//! - [`MonkeyKingEvolutionV2`], where a monkey king tries differential steps
//!   built from random pairs of the population
//! - [`MonkeyKingEvolutionV3`], which drops individuals altogether and evolves
//!   a matrix of positions by blending it with the global best
//!
//! All of them are configured with [`MkeConfig`], which is built with a
//! builder with compile time verification from the `typed-builder` crate.
//! Hyperparameters are validated once, when an algorithm is created, before
//! any evaluation is spent.
//!
//! If you happen to implement another population-based algorithm using this
//! framework, [`Algorithm`] is the trait to implement. The run loop comes for
//! free.
//!
//! # Closures
//!
//! [`Objective`] is implemented for every closure of type
//! `Fn(&[f64]) -> f64`. An objective that may fail, like a simulation or a
//! remote call, can be wrapped in [`Fallible`], which accepts closures of
//! type `Fn(&[f64]) -> Result<f64, E>`. A failure aborts the run with
//! [`Error::Evaluation`]. There is no retry.
//!
//! # Reproducibility and parallelization
//!
//! Each algorithm owns its random source. Two runs with the same seed on
//! equal tasks produce identical trajectories, so every run can be
//! reproduced. A single run is sequential, but independent runs are
//! embarrassingly parallel: [`Experiment`] performs a series of runs with
//! consecutive seeds, either one after another or on the `rayon` thread pool,
//! with identical results.
//!
//! # Logging
//!
//! The crate emits `tracing` events: runs are reported at the `INFO` level,
//! iterations at `DEBUG` and decisions of the algorithms at `TRACE`. Install a
//! subscriber to see them.
//!
//! # Example
//!
//! Minimize the sphere function in 10 dimensions with 10000 evaluations.
//! ```
//! use mke::{
//!   Bounds,
//!   MkeConfig,
//!   MonkeyKingEvolutionV1,
//!   Optimizer,
//!   StoppingCriterion,
//!   Task,
//! };
//! // objective function `f(x) = sum(x_i^2)`
//! let sphere = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
//! // defined on `[-100, 100]^10`, with a budget of 10000 evaluations
//! let mut task = Task::new(
//!   sphere,
//!   Bounds::uniform(10, -100.0, 100.0)?,
//!   StoppingCriterion::Evaluations(10_000),
//! )?;
//! // default hyperparameters and a fixed seed
//! let config = MkeConfig::builder().seed(42).build();
//! let mut mke = MonkeyKingEvolutionV1::new(config)?;
//! // upon termination optimizer returns the best solution it has found
//! let best = mke.run(&mut task)?;
//! assert!(task.evaluations() >= 10_000);
//! assert!(task.bounds().contains(&best.position));
//! assert_eq!(best.fitness, sphere(&best.position));
//! # Ok::<(), mke::Error>(())
//! ```
//!
//! You can find a runnable demo in the *demos* folder in the root of the
//! project.
//!
//! # Common pitfalls
//!
//! - The budget is only checked between iterations, so a run usually spends
//!   a few evaluations more than it was given. Monkey kings of versions 1 and
//!   2 are especially greedy: each one evaluates `c * dimension` or
//!   `c * population_size` candidates per iteration.
//! - Maximized objectives are negated internally. Fitness returned by
//!   [`Optimizer::run`] is in the caller's sign, but fitness stored in a
//!   population during a run is not.
//! - A [`Task`] counts evaluations and tracks the best fitness it has seen.
//!   Create a fresh one for every run.
//!
//! [Meng & Pan, 2016]: https://doi.org/10.1016/j.knosys.2016.01.009
//! [`Algorithm`]: crate::optimizer::algorithm::Algorithm

#![warn(missing_docs)]

pub mod error;
pub mod experiment;
pub mod individual;
pub mod objective;
pub mod optimizer;
pub mod population;
pub mod repair;
pub mod task;

pub use error::{Error, Result};
pub use experiment::Experiment;
pub use individual::Individual;
pub use objective::{Fallible, Fitness, Objective};
pub use optimizer::{
  mke::{
    MkeConfig,
    MonkeyKingEvolutionV1,
    MonkeyKingEvolutionV2,
    MonkeyKingEvolutionV3,
  },
  Optimizer,
};
pub use population::Best;
pub use repair::Repair;
pub use task::{Bounds, OptimizationType, StoppingCriterion, Task};
