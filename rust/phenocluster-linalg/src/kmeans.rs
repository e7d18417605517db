// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Phenocluster Authors

//! K-means clustering of a [`DataSet`].
//!
//! Centroids are seeded with K-means++ (or uniformly inside the data bounds)
//! and refined by Lloyd's iteration: assign every observation to its nearest
//! centroid, recompute the centroids, and stop as soon as the total SSE fails
//! to improve by more than [`KMeansParams::precision`].

use log::{debug, info, warn};
use phenocluster_core::{utils::env::env_or, Error, Result};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde::Deserialize;
use tracing::instrument;

use crate::assignments::{ClusterAssignment, ClusterAssignments};
use crate::dataset::DataSet;
use crate::distance::{euclidean_distance, Attributes};
use crate::kernels::argmin_float;

/// Environment variable overriding the default [`KMeansParams::precision`].
pub const PRECISION_ENV: &str = "PHENOCLUSTER_KMEANS_PRECISION";
/// Environment variable overriding the default [`KMeansParams::max_iters`].
pub const MAX_ITERS_ENV: &str = "PHENOCLUSTER_KMEANS_MAX_ITERS";

const DEFAULT_PRECISION: f64 = 0.0;
const DEFAULT_MAX_ITERS: u32 = 100;

/// KMeans initialization method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KMeansInit {
    /// Seeds drawn uniformly inside the per-attribute `[min, max]` box.
    Random,
    #[serde(rename = "kmeansPlusPlus")]
    KMeansPlusPlus,
}

/// What to do with a cluster that lost all of its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmptyClusterPolicy {
    /// Abort the run with a degenerate cluster error.
    Fail,
    /// Keep the centroid the cluster had before it emptied.
    KeepPrevious,
    /// Move the centroid onto a uniformly chosen observation.
    Reseed,
}

/// KMeans Training Parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KMeansParams {
    /// Stop once the total SSE improves by no more than this amount.
    ///
    /// `0.0` stops as soon as the SSE fails to strictly decrease.
    pub precision: f64,

    /// Upper bound on refinement iterations.
    pub max_iters: u32,

    /// Init methods.
    pub init: KMeansInit,

    pub empty_cluster_policy: EmptyClusterPolicy,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self {
            precision: env_or(PRECISION_ENV, DEFAULT_PRECISION),
            max_iters: env_or(MAX_ITERS_ENV, DEFAULT_MAX_ITERS),
            init: KMeansInit::KMeansPlusPlus,
            empty_cluster_policy: EmptyClusterPolicy::Fail,
        }
    }
}

impl KMeansParams {
    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_max_iters(mut self, max_iters: u32) -> Self {
        self.max_iters = max_iters;
        self
    }

    pub fn with_init(mut self, init: KMeansInit) -> Self {
        self.init = init;
        self
    }

    pub fn with_empty_cluster_policy(mut self, policy: EmptyClusterPolicy) -> Self {
        self.empty_cluster_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.precision.is_finite() || self.precision < 0.0 {
            return Err(Error::invalid_parameter(format!(
                "KMeans: precision must be a finite non-negative number, got {}",
                self.precision
            )));
        }
        if self.max_iters == 0 {
            return Err(Error::invalid_parameter(
                "KMeans: max_iters must be at least 1",
            ));
        }
        Ok(())
    }
}

/// KMeans solver for a [`DataSet`].
#[derive(Debug, Clone)]
pub struct KMeans {
    /// The number of clusters
    pub k: usize,

    pub params: KMeansParams,
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        Self::new_with_params(k, KMeansParams::default())
    }

    pub fn new_with_params(k: usize, params: KMeansParams) -> Self {
        Self { k, params }
    }

    /// Cluster `data`, drawing seeds from an entropy seeded generator.
    pub fn fit(&self, data: &DataSet) -> Result<ClusterAssignments> {
        let mut rng = SmallRng::from_entropy();
        self.fit_with_rng(data, &mut rng)
    }

    /// Cluster `data` with the given random source.
    ///
    /// The same generator state, data and parameters always produce the same
    /// assignments.
    #[instrument(level = "debug", skip_all, fields(k = self.k, n = data.len()))]
    pub fn fit_with_rng(&self, data: &DataSet, rng: &mut impl Rng) -> Result<ClusterAssignments> {
        self.params.validate()?;
        let k = self.k;
        let n = data.len();
        if k == 0 {
            return Err(Error::invalid_parameter(
                "KMeans: the number of clusters must be positive",
            ));
        }
        if n < k {
            return Err(Error::invalid_parameter(format!(
                "KMeans: training does not have sufficient data points: n({}) is smaller than k({})",
                n, k
            )));
        }

        let mut centroids = match self.params.init {
            KMeansInit::KMeansPlusPlus => kmeans_plusplus(data, k, rng)?,
            KMeansInit::Random => kmeans_random_init(data, k, rng)?,
        };

        let mut membership = vec![0_usize; n];
        let mut sse_history = Vec::new();
        let mut previous_sse = f64::INFINITY;
        let mut converged = false;
        for i in 1..=self.params.max_iters {
            if i % 10 == 0 {
                info!("KMeans training: iteration {} / {}", i, self.params.max_iters);
            }
            membership = compute_membership(data, &centroids, &membership);
            let mut new_centroids = data.all_centroids(&membership, k);
            let reseeded =
                self.resolve_empty_clusters(data, &mut new_centroids, &centroids, rng)?;
            centroids = new_centroids;

            let sse = data.total_sse(&centroids, &membership);
            sse_history.push(sse);
            // A reseeded centroid has no members yet, give it an assign step.
            if sse == 0.0 || (!reseeded && previous_sse - sse <= self.params.precision) {
                info!(
                    "KMeans training: converged at iteration {} / {}, sse={}",
                    i, self.params.max_iters, sse
                );
                converged = true;
                break;
            }
            previous_sse = sse;
        }
        if !converged {
            warn!(
                "KMeans training: stopped after {} iterations without converging, sse={}",
                self.params.max_iters, previous_sse
            );
        }

        let assignments = data
            .observations()
            .iter()
            .zip(membership)
            .map(|(observation, cluster_id)| ClusterAssignment {
                uri: observation.uri.clone(),
                cluster_id,
            })
            .collect();
        Ok(ClusterAssignments::new(k, assignments, sse_history, converged))
    }

    /// Replace the `NaN` centroids of empty clusters according to the
    /// configured [`EmptyClusterPolicy`].
    ///
    /// Returns true when at least one centroid was reseeded.
    fn resolve_empty_clusters(
        &self,
        data: &DataSet,
        centroids: &mut [Attributes],
        previous: &[Attributes],
        rng: &mut impl Rng,
    ) -> Result<bool> {
        let mut reseeded = false;
        for (cluster, centroid) in centroids.iter_mut().enumerate() {
            if !centroid.values().any(|v| v.is_nan()) {
                continue;
            }
            warn!("KMeans: cluster {} is empty", cluster);
            match self.params.empty_cluster_policy {
                EmptyClusterPolicy::Fail => {
                    return Err(Error::degenerate_cluster(
                        cluster,
                        "no observation is assigned to it",
                    ));
                }
                EmptyClusterPolicy::KeepPrevious => {
                    *centroid = previous[cluster].clone();
                }
                EmptyClusterPolicy::Reseed => {
                    let idx = data
                        .random_observation(rng)
                        .ok_or_else(|| Error::invalid_parameter("KMeans: empty dataset"))?;
                    debug!("KMeans: reseeding cluster {} on observation {}", cluster, idx);
                    *centroid = data.observations()[idx].attributes.clone();
                    reseeded = true;
                }
            }
        }
        Ok(reseeded)
    }
}

/// Initialize using kmean++, and returns the centroids of k clusters.
///
/// The first seed is a uniformly chosen observation, every further seed is
/// drawn by [`DataSet::weighted_farthest_observation`].
fn kmeans_plusplus(data: &DataSet, k: usize, rng: &mut impl Rng) -> Result<Vec<Attributes>> {
    let first = data
        .random_observation(rng)
        .ok_or_else(|| Error::invalid_parameter("KMeans: empty dataset"))?;
    let mut selected = Vec::with_capacity(k);
    selected.push(first);
    while selected.len() < k {
        if data
            .weighted_farthest_observation(&mut selected, rng)
            .is_none()
        {
            return Err(Error::invalid_parameter(format!(
                "KMeans: cannot pick {} distinct seeds out of {} observations",
                k,
                data.len()
            )));
        }
    }
    debug!("KMeans++: seeded on observations {:?}", selected);
    Ok(selected
        .into_iter()
        .map(|idx| data.observations()[idx].attributes.clone())
        .collect())
}

/// Randomly initialize kmeans centroids inside the bounds of the data.
fn kmeans_random_init(data: &DataSet, k: usize, rng: &mut impl Rng) -> Result<Vec<Attributes>> {
    (0..k)
        .map(|_| {
            data.random_point_in_bounds(rng)
                .ok_or_else(|| Error::invalid_parameter("KMeans: empty dataset"))
        })
        .collect()
}

/// Assign every observation to its nearest centroid.
///
/// Ties go to the lowest cluster index and `NaN` distances never win. An
/// observation with no finite distance to any centroid keeps its previous
/// cluster.
#[instrument(level = "debug", skip_all)]
fn compute_membership(data: &DataSet, centroids: &[Attributes], previous: &[usize]) -> Vec<usize> {
    data.observations()
        .iter()
        .zip(previous)
        .map(|(observation, &prev)| {
            argmin_float(
                centroids
                    .iter()
                    .map(|centroid| euclidean_distance(&observation.attributes, centroid)),
            )
            .map_or(prev, |idx| idx as usize)
        })
        .collect()
}
