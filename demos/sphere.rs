use mke::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
  // `RUST_LOG=debug` shows every iteration, `RUST_LOG=trace` shows decisions
  // of the algorithms as well
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .init();

  // objective function f(x) = sum(x_i^2), minimum 0 at the origin
  let sphere = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
  let task = || {
    Task::new(
      sphere,
      Bounds::uniform(10, -100.0, 100.0)?,
      StoppingCriterion::Evaluations(20_000),
    )
  };
  let config = |seed| MkeConfig::builder().seed(seed).build();

  // a single run of each version
  let best = MonkeyKingEvolutionV1::new(config(1))?.run(&mut task()?)?;
  println!("v1: {:.6e}", best.fitness);
  let best = MonkeyKingEvolutionV2::new(config(1))?.run(&mut task()?)?;
  println!("v2: {:.6e}", best.fitness);
  let mut v3_task = task()?;
  let best = MonkeyKingEvolutionV3::new(config(1))?.run(&mut v3_task)?;
  println!("v3: {:.6e}", best.fitness);

  // convergence of the last run: evaluation index and best fitness so far
  println!(" evaluations | fitness");
  for (evaluations, fitness) in v3_task.convergence().iter().step_by(10) {
    println!("{evaluations:>12} | {fitness:.6e}");
  }

  // and a series of 20 independent runs, executed in parallel
  let experiment = Experiment::builder()
    .runs(20)
    .base_seed(100)
    .algorithm(|seed| MonkeyKingEvolutionV3::new(config(seed)))
    .task(task)
    .build();
  let mut results: Vec<f64> =
    experiment.par_run()?.into_iter().map(|b| b.fitness).collect();
  results.sort_by(f64::total_cmp);
  let mean = results.iter().sum::<f64>() / results.len() as f64;
  println!(
    "20 runs of v3: best {:.6e}, median {:.6e}, mean {:.6e}, worst {:.6e}",
    results[0],
    results[results.len() / 2],
    mean,
    results[results.len() - 1],
  );
  Ok(())
}
