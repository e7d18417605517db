// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Phenocluster Authors

//! Euclidean distance over named attributes.
//!
//! Observations and centroids are both [`Attributes`]: a mapping from an
//! attribute name to its numeric value. Two mappings are only comparable when
//! they carry exactly the same attribute names; comparing anything else yields
//! `+inf`, so an incompatible point is simply the farthest one.

use std::collections::BTreeMap;
use std::iter::Sum;

use num_traits::real::Real;

/// Named numeric dimensions of an observation or a centroid.
pub type Attributes = BTreeMap<String, f64>;

/// Calculate the squared L2 distance between two vectors.
pub trait L2 {
    type Output;

    /// Squared L2 distance, or `None` when the two sides are not comparable.
    fn l2(&self, other: &Self) -> Option<Self::Output>;
}

/// Squared L2 distance over two value sequences of the same length, using
/// scalar operations.
#[inline]
fn l2_scalar<'a, T: Real + Sum + 'a>(
    from: impl Iterator<Item = &'a T>,
    to: impl Iterator<Item = &'a T>,
) -> T {
    from.zip(to).map(|(&a, &b)| (a - b).powi(2)).sum::<T>()
}

impl L2 for Attributes {
    type Output = f64;

    fn l2(&self, other: &Self) -> Option<f64> {
        // Both maps iterate in key order.
        self.keys()
            .eq(other.keys())
            .then(|| l2_scalar(self.values(), other.values()))
    }
}

/// Euclidean distance between two attribute mappings.
///
/// Returns `f64::INFINITY` when `a` and `b` do not have identical key sets.
#[inline]
pub fn euclidean_distance(a: &Attributes, b: &Attributes) -> f64 {
    a.l2(b).map_or(f64::INFINITY, f64::sqrt)
}

/// Squared euclidean distance, `+inf` for incomparable mappings.
#[inline]
pub fn squared_distance(a: &Attributes, b: &Attributes) -> f64 {
    a.l2(b).unwrap_or(f64::INFINITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn attrs(pairs: &[(&str, f64)]) -> Attributes {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_euclidean_distance() {
        let a = attrs(&[("Value", 0.0), ("SecondValue", 0.0)]);
        let b = attrs(&[("Value", 3.0), ("SecondValue", 4.0)]);
        assert_relative_eq!(euclidean_distance(&a, &b), 5.0);
        assert_relative_eq!(squared_distance(&a, &b), 25.0);
        assert_eq!(euclidean_distance(&a, &a), 0.0);
    }

    #[test]
    fn test_mismatched_keys_are_infinitely_far() {
        let a = attrs(&[("Value", 1.0), ("SecondValue", 0.0)]);
        let renamed = attrs(&[("Value", 1.0), ("Other", 0.0)]);
        let shorter = attrs(&[("Value", 1.0)]);
        assert_eq!(euclidean_distance(&a, &renamed), f64::INFINITY);
        assert_eq!(euclidean_distance(&a, &shorter), f64::INFINITY);
        assert_eq!(euclidean_distance(&shorter, &a), f64::INFINITY);
        assert_eq!(euclidean_distance(&Attributes::new(), &a), f64::INFINITY);
    }

    fn arbitrary_pair() -> impl Strategy<Value = (Attributes, Attributes)> {
        (1_usize..6).prop_flat_map(|dim| {
            (
                proptest::collection::vec(-1e6..1e6_f64, dim),
                proptest::collection::vec(-1e6..1e6_f64, dim),
            )
                .prop_map(|(x, y)| {
                    let to_attrs = |v: Vec<f64>| {
                        v.into_iter()
                            .enumerate()
                            .map(|(i, v)| (format!("attr{}", i), v))
                            .collect::<Attributes>()
                    };
                    (to_attrs(x), to_attrs(y))
                })
        })
    }

    proptest::proptest! {
        #[test]
        fn test_distance_symmetric_and_non_negative((a, b) in arbitrary_pair()) {
            let ab = euclidean_distance(&a, &b);
            let ba = euclidean_distance(&b, &a);
            prop_assert!(ab >= 0.0);
            prop_assert_eq!(ab, ba);
            prop_assert_eq!(euclidean_distance(&a, &a), 0.0);
            prop_assert_eq!(euclidean_distance(&b, &b), 0.0);
        }
    }
}
