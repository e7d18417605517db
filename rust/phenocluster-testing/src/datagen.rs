// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Phenocluster Authors

//! Data generation utilities for unit tests and benchmarks.

use rand::{distributions::Uniform, prelude::Distribution, rngs::StdRng, Rng, SeedableRng};

/// One generated observation: `(uri, value, second_value)`.
pub type ObservationTuple = (String, f64, Option<f64>);

/// Build the URI of the `i`-th generated observation.
pub fn observation_uri(i: usize) -> String {
    format!("http://phenome.example.org/id/data/{}", i)
}

/// Generate `n` observations with values drawn uniformly from `range`.
///
/// Every other observation carries a second value, so that the default of
/// `0.0` for a missing one gets exercised too.
pub fn generate_observations(
    n: usize,
    range: std::ops::Range<f64>,
    seed: u64,
) -> Vec<ObservationTuple> {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Uniform::new(range.start, range.end);
    (0..n)
        .map(|i| {
            let value = dist.sample(&mut rng);
            let second = if i % 2 == 0 {
                Some(dist.sample(&mut rng))
            } else {
                None
            };
            (observation_uri(i), value, second)
        })
        .collect()
}

/// Generate well separated one dimensional blobs.
///
/// Returns the observations together with the index of the center each
/// observation was drawn around.
pub fn generate_blobs(
    centers: &[f64],
    per_blob: usize,
    spread: f64,
    seed: u64,
) -> (Vec<ObservationTuple>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut observations = Vec::with_capacity(centers.len() * per_blob);
    let mut labels = Vec::with_capacity(centers.len() * per_blob);
    for (label, center) in centers.iter().enumerate() {
        for _ in 0..per_blob {
            let value = center + rng.gen_range(-spread..=spread);
            observations.push((observation_uri(observations.len()), value, None));
            labels.push(label);
        }
    }
    (observations, labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_observations_is_seeded() {
        let a = generate_observations(16, -5.0..5.0, 42);
        let b = generate_observations(16, -5.0..5.0, 42);
        assert_eq!(a, b);
        assert!(a
            .iter()
            .all(|(_, v, s)| (-5.0..5.0).contains(v) && s.map_or(true, |s| (-5.0..5.0).contains(&s))));
        assert_eq!(a.iter().filter(|(_, _, s)| s.is_none()).count(), 8);
    }

    #[test]
    fn test_generate_blobs() {
        let (observations, labels) = generate_blobs(&[0.0, 100.0], 5, 1.0, 7);
        assert_eq!(observations.len(), 10);
        assert_eq!(labels, vec![0, 0, 0, 0, 0, 1, 1, 1, 1, 1]);
        for ((_, v, _), label) in observations.iter().zip(labels) {
            assert!((v - [0.0, 100.0][label]).abs() <= 1.0);
        }
    }
}
