// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Phenocluster Authors

//! Clustering of phenotyping observations.
//!
//! Build a [`DataSet`] from `(uri, value, second_value)` rows, run [`KMeans`]
//! on it and join the resulting [`ClusterAssignments`] back on URI:
//!
//! ```
//! use phenocluster_linalg::{DataSet, KMeans};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let data = DataSet::try_new([
//!     ("http://phenome.example.org/id/data/1", 0.0),
//!     ("http://phenome.example.org/id/data/2", 0.2),
//!     ("http://phenome.example.org/id/data/3", 9.8),
//! ])
//! .unwrap();
//! let mut rng = StdRng::seed_from_u64(42);
//! let clusters = KMeans::new(2).fit_with_rng(&data, &mut rng).unwrap();
//! assert_eq!(clusters.cluster_sizes().iter().sum::<usize>(), 3);
//! ```

pub mod assignments;
pub mod dataset;
pub mod distance;
pub mod kernels;
pub mod kmeans;

pub use assignments::{ClusterAssignment, ClusterAssignments, ClusterTarget};
pub use dataset::{DataSet, Observation, ObservationInput};
pub use kmeans::{EmptyClusterPolicy, KMeans, KMeansInit, KMeansParams};
pub use phenocluster_core::{Error, Result};
