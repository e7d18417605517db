// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Phenocluster Authors

use std::collections::HashMap;
use std::fmt;

use phenocluster_core::ObservationUri;
use serde::Serialize;

/// The cluster one observation ended up in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterAssignment {
    pub uri: ObservationUri,
    pub cluster_id: usize,
}

/// A caller side record that can receive a cluster id, matched by URI.
pub trait ClusterTarget {
    fn uri(&self) -> &ObservationUri;

    fn set_cluster_id(&mut self, cluster_id: usize);
}

/// Outcome of one K-means run.
///
/// Holds one assignment per input observation, in dataset order, plus the
/// SSE recorded after every refinement iteration. Callers should join results
/// on [`ClusterAssignment::uri`], not on position.
#[derive(Debug, Clone)]
pub struct ClusterAssignments {
    k: usize,
    assignments: Vec<ClusterAssignment>,
    positions: HashMap<ObservationUri, usize>,
    sse_history: Vec<f64>,
    converged: bool,
}

impl ClusterAssignments {
    pub(crate) fn new(
        k: usize,
        assignments: Vec<ClusterAssignment>,
        sse_history: Vec<f64>,
        converged: bool,
    ) -> Self {
        let positions = assignments
            .iter()
            .enumerate()
            .map(|(pos, a)| (a.uri.clone(), pos))
            .collect();
        Self {
            k,
            assignments,
            positions,
            sse_history,
            converged,
        }
    }

    /// Number of clusters requested.
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClusterAssignment> {
        self.assignments.iter()
    }

    /// Cluster of the observation identified by `uri`.
    pub fn get(&self, uri: &ObservationUri) -> Option<usize> {
        self.positions
            .get(uri)
            .map(|&pos| self.assignments[pos].cluster_id)
    }

    /// Cluster of the observation at position `idx` of the clustered dataset.
    pub fn cluster_of(&self, idx: usize) -> Option<usize> {
        self.assignments.get(idx).map(|a| a.cluster_id)
    }

    pub fn to_map(&self) -> HashMap<ObservationUri, usize> {
        self.assignments
            .iter()
            .map(|a| (a.uri.clone(), a.cluster_id))
            .collect()
    }

    /// Number of observations in each cluster.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k];
        for a in self.assignments.iter() {
            sizes[a.cluster_id] += 1;
        }
        sizes
    }

    /// SSE after the last refinement iteration.
    pub fn sse(&self) -> f64 {
        self.sse_history.last().copied().unwrap_or(f64::NAN)
    }

    /// SSE after each refinement iteration, in order.
    pub fn sse_history(&self) -> &[f64] {
        &self.sse_history
    }

    /// Number of refinement iterations that ran.
    pub fn iterations(&self) -> usize {
        self.sse_history.len()
    }

    /// False when the run stopped on the iteration cap instead of on SSE.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Set the cluster id on every target whose URI was clustered.
    ///
    /// Returns how many targets were updated; targets with an unknown URI are
    /// left untouched.
    pub fn apply_to<T: ClusterTarget>(&self, targets: &mut [T]) -> usize {
        let mut updated = 0;
        for target in targets.iter_mut() {
            if let Some(cluster_id) = self.get(target.uri()) {
                target.set_cluster_id(cluster_id);
                updated += 1;
            }
        }
        updated
    }
}

impl fmt::Display for ClusterAssignments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for a in self.assignments.iter() {
            writeln!(f, "cluster {}: {}", a.cluster_id, a.uri)?;
        }
        Ok(())
    }
}

impl Serialize for ClusterAssignments {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.assignments.serialize(serializer)
    }
}
