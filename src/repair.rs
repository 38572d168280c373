//! Boundary repair strategies.
//!
//! Moving a solution through the search space regularly pushes some of its
//! components out of the feasible box. That is an expected transient state, not
//! an error: a [`Repair`] strategy puts every such component back between its
//! lower and upper bound. Components already inside the box are left untouched.

use rand::Rng;

/// A strategy that brings out-of-bounds components back into the feasible box.
///
/// Every strategy guarantees that a repaired component lies within
/// `[lower, upper]`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Repair {
  /// Clips a component to the nearest bound.
  #[default]
  Clip,
  /// Sets a component below the lower bound to the upper bound and vice versa.
  Inverse,
  /// Wraps a component around the box: `lower + (x - lower) mod range`.
  Wrap,
  /// Mirrors a component at the violated bound, clipping the mirrored value
  /// at the opposite bound.
  Wang,
  /// Redraws a component uniformly between its bounds.
  Random,
}

impl Repair {
  /// Repairs a single component. Deterministic for every strategy except
  /// [`Repair::Random`], which is the only one to draw from `rng`.
  pub fn component<R: Rng + ?Sized>(
    &self,
    x: f64,
    lower: f64,
    upper: f64,
    rng: &mut R,
  ) -> f64 {
    if x >= lower && x <= upper {
      return x;
    }
    match self {
      Repair::Clip => x.clamp(lower, upper),
      Repair::Inverse => {
        if x < lower {
          upper
        } else {
          lower
        }
      }
      Repair::Wrap => {
        let range = upper - lower;
        // `rem_euclid` may round up to `range`, which is still `upper`
        (lower + (x - lower).rem_euclid(range)).clamp(lower, upper)
      }
      Repair::Wang => {
        if x < lower {
          upper.min(2.0 * lower - x)
        } else {
          lower.max(2.0 * upper - x)
        }
      }
      Repair::Random => rng.gen_range(lower..upper),
    }
  }

  /// Repairs each value yielded by `values` against respective bounds.
  pub(crate) fn apply<'a, I, R>(
    &self,
    values: I,
    lower: &[f64],
    upper: &[f64],
    rng: &mut R,
  ) where
    I: IntoIterator<Item = &'a mut f64>,
    R: Rng + ?Sized,
  {
    values
      .into_iter()
      .zip(lower.iter().zip(upper))
      .for_each(|(x, (&lo, &hi))| *x = self.component(*x, lo, hi, rng));
  }
}

#[cfg(test)]
mod tests {
  use rand::{rngs::StdRng, SeedableRng};

  use super::*;

  const STRATEGIES: [Repair; 5] = [
    Repair::Clip,
    Repair::Inverse,
    Repair::Wrap,
    Repair::Wang,
    Repair::Random,
  ];

  #[test]
  fn test_in_bounds_components_are_untouched() {
    let mut rng = StdRng::seed_from_u64(0);
    for strategy in STRATEGIES {
      for x in [-1.0, -0.5, 0.0, 0.75, 1.0] {
        assert_eq!(strategy.component(x, -1.0, 1.0, &mut rng), x);
      }
    }
  }

  #[test]
  fn test_repaired_components_are_in_bounds() {
    let mut rng = StdRng::seed_from_u64(1);
    for strategy in STRATEGIES {
      for x in [-1e9, -250.0, -100.5, 100.5, 399.0, 1e9] {
        let y = strategy.component(x, -100.0, 100.0, &mut rng);
        assert!((-100.0..=100.0).contains(&y), "{strategy:?}: {x} -> {y}");
      }
    }
  }

  #[test]
  fn test_clip() {
    let mut rng = StdRng::seed_from_u64(2);
    assert_eq!(Repair::Clip.component(5.0, 0.0, 1.0, &mut rng), 1.0);
    assert_eq!(Repair::Clip.component(-5.0, 0.0, 1.0, &mut rng), 0.0);
  }

  #[test]
  fn test_inverse() {
    let mut rng = StdRng::seed_from_u64(3);
    assert_eq!(Repair::Inverse.component(5.0, 0.0, 1.0, &mut rng), 0.0);
    assert_eq!(Repair::Inverse.component(-5.0, 0.0, 1.0, &mut rng), 1.0);
  }

  #[test]
  fn test_wrap() {
    let mut rng = StdRng::seed_from_u64(4);
    assert_eq!(Repair::Wrap.component(12.0, 0.0, 10.0, &mut rng), 2.0);
    assert_eq!(Repair::Wrap.component(-3.0, 0.0, 10.0, &mut rng), 7.0);
  }

  #[test]
  fn test_wang() {
    let mut rng = StdRng::seed_from_u64(5);
    assert_eq!(Repair::Wang.component(12.0, 0.0, 10.0, &mut rng), 8.0);
    assert_eq!(Repair::Wang.component(-3.0, 0.0, 10.0, &mut rng), 3.0);
    // mirrored past the opposite bound
    assert_eq!(Repair::Wang.component(25.0, 0.0, 10.0, &mut rng), 0.0);
    assert_eq!(Repair::Wang.component(-25.0, 0.0, 10.0, &mut rng), 10.0);
  }

  #[test]
  fn test_apply() {
    let mut rng = StdRng::seed_from_u64(6);
    let mut x = [-2.0, 0.5, 3.0];
    Repair::Clip.apply(&mut x, &[-1.0, 0.0, 0.0], &[1.0, 1.0, 2.0], &mut rng);
    assert_eq!(x, [-1.0, 0.5, 2.0]);
  }
}
