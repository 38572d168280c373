//! Error type shared by tasks, algorithms and experiments.

use thiserror::Error;

/// A boxed error returned by a fallible objective function.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An alias for results returned throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that may abort construction of a task or an algorithm, or a run.
///
/// There is no recovery inside a run: once an error is returned, the run is
/// considered failed and should be repeated from a fresh seed.
#[derive(Debug, Error)]
pub enum Error {
  /// Invalid hyperparameters or bounds. Raised before any evaluation.
  #[error("invalid configuration: {0}")]
  Configuration(String),

  /// A position vector whose length differs from the task's dimension.
  #[error("position has {actual} components, but task dimension is {expected}")]
  DimensionMismatch {
    /// Task dimension.
    expected: usize,
    /// Length of the offending position.
    actual: usize,
  },

  /// The objective function itself failed.
  #[error("objective function failed at evaluation {evaluations}")]
  Evaluation {
    /// Number of evaluations consumed, including the failed one.
    evaluations: u64,
    /// Error returned by the objective function.
    #[source]
    source: BoxError,
  },
}

impl Error {
  pub(crate) fn config(message: impl Into<String>) -> Self {
    Self::Configuration(message.into())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_messages() {
    let e = Error::DimensionMismatch {
      expected: 3,
      actual: 2,
    };
    assert_eq!(
      e.to_string(),
      "position has 2 components, but task dimension is 3"
    );
    assert_eq!(
      Error::config("population size must be positive").to_string(),
      "invalid configuration: population size must be positive"
    );
  }

  #[test]
  fn test_evaluation_error_has_source() {
    use std::error::Error as _;
    let e = Error::Evaluation {
      evaluations: 7,
      source: "domain error".into(),
    };
    assert_eq!(e.source().map(|s| s.to_string()), Some("domain error".into()));
  }
}
