// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Phenocluster Authors

// Kept in its own test binary: it mutates process environment variables that
// `KMeansParams::default()` reads.

use phenocluster_linalg::dataset::DataSet;
use phenocluster_linalg::kmeans::{KMeans, KMeansParams, MAX_ITERS_ENV, PRECISION_ENV};
use phenocluster_testing::datagen::generate_observations;
use phenocluster_testing::util::EnvVarGuard;
use rand::{rngs::StdRng, SeedableRng};

#[test]
fn test_params_from_env() {
    let defaults = KMeansParams::default();
    assert_eq!(defaults.precision, 0.0);
    assert_eq!(defaults.max_iters, 100);

    {
        let _precision = EnvVarGuard::new(PRECISION_ENV, "0.25");
        let _iters = EnvVarGuard::new(MAX_ITERS_ENV, "1");
        let params = KMeansParams::default();
        assert_eq!(params.precision, 0.25);
        assert_eq!(params.max_iters, 1);

        let data = DataSet::try_new(generate_observations(100, 0.0..100.0, 9)).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let result = KMeans::new(4).fit_with_rng(&data, &mut rng).unwrap();
        assert_eq!(result.iterations(), 1);
    }

    {
        let _bad = EnvVarGuard::new(MAX_ITERS_ENV, "lots");
        assert_eq!(KMeansParams::default().max_iters, 100);
    }
}
