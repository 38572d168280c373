//! Objective functions.

use crate::error::BoxError;

/// An alias for a fitness value. Lower is better.
pub type Fitness = f64;

/// A black-box function to be minimized over a bounded real vector space.
///
/// Implemented by every closure of type `Fn(&[f64]) -> f64`. Objectives that
/// can fail should be wrapped in [`Fallible`].
///
/// # Examples
/// ```
/// # use mke::objective::*;
/// let sphere = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
/// assert_eq!(sphere.evaluate(&[1.0, 2.0]).ok(), Some(5.0));
/// ```
///
/// **Note that you always can implement this trait instead of using closures.**
pub trait Objective {
  /// Returns the fitness of given position.
  fn evaluate(&self, position: &[f64]) -> Result<Fitness, BoxError>;
}

impl<F> Objective for F
where
  F: Fn(&[f64]) -> Fitness,
{
  fn evaluate(&self, position: &[f64]) -> Result<Fitness, BoxError> {
    Ok(self(position))
  }
}

/// A wrapper around a closure of type `Fn(&[f64]) -> Result<f64, E>`.
///
/// An `Err` returned by the closure aborts the run with
/// [`Error::Evaluation`](crate::Error::Evaluation).
///
/// # Examples
/// ```
/// # use mke::objective::*;
/// let log_sum = Fallible(|x: &[f64]| {
///   let s = x.iter().sum::<f64>();
///   if s > 0.0 { Ok(s.ln()) } else { Err("sum must be positive") }
/// });
/// assert!(log_sum.evaluate(&[-1.0]).is_err());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Fallible<F>(pub F);

impl<F, E> Objective for Fallible<F>
where
  F: Fn(&[f64]) -> Result<Fitness, E>,
  E: Into<BoxError>,
{
  fn evaluate(&self, position: &[f64]) -> Result<Fitness, BoxError> {
    (self.0)(position).map_err(Into::into)
  }
}
