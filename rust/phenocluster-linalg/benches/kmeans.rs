// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Phenocluster Authors

use criterion::{criterion_group, criterion_main, Criterion};
#[cfg(target_os = "linux")]
use pprof::criterion::{Output, PProfProfiler};
use rand::{rngs::StdRng, SeedableRng};

use phenocluster_linalg::{DataSet, EmptyClusterPolicy, KMeans, KMeansParams};
use phenocluster_testing::datagen::generate_observations;

fn bench_train(c: &mut Criterion) {
    let params = [(1024, 4), (4 * 1024, 8), (16 * 1024, 16)];
    for (n, k) in params {
        let data = DataSet::try_new(generate_observations(n, 0.0..1000.0, 42)).unwrap();
        let kmeans = KMeans::new_with_params(
            k,
            KMeansParams::default().with_empty_cluster_policy(EmptyClusterPolicy::KeepPrevious),
        );

        c.bench_function(&format!("train_{}k_k{}", n / 1024, k), |b| {
            b.iter(|| {
                let mut rng = StdRng::seed_from_u64(7);
                kmeans.fit_with_rng(&data, &mut rng).unwrap();
            })
        });
    }
}

#[cfg(target_os = "linux")]
criterion_group!(
    name=benches;
    config = Criterion::default().significance_level(0.1).sample_size(10)
    .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)));
    targets = bench_train);

// Non-linux version does not support pprof.
#[cfg(not(target_os = "linux"))]
criterion_group!(
    name=benches;
    config = Criterion::default().significance_level(0.1).sample_size(10);
    targets = bench_train);
criterion_main!(benches);
