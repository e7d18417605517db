// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Phenocluster Authors

//! The observation store clustered by [`crate::kmeans::KMeans`].
//!
//! A [`DataSet`] owns the observations of one clustering run together with a
//! running minimum and maximum per attribute. Cluster membership is not stored
//! on the observations: the solver owns a membership vector (one cluster index
//! per observation, in dataset order) and passes it to the statistics helpers
//! below, so a dataset can be clustered several times without aliasing.

use std::collections::{BTreeMap, HashSet};

use log::{debug, warn};
use phenocluster_core::{Error, ObservationUri, Result, SECOND_VALUE, VALUE};
use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::Rng;
use serde::Deserialize;

use crate::distance::{euclidean_distance, squared_distance, Attributes};

/// One caller supplied row: the observation URI, its value and an optional
/// second value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationInput {
    pub uri: String,
    pub value: f64,
    #[serde(default)]
    pub second_value: Option<f64>,
}

impl<S: Into<String>> From<(S, f64, Option<f64>)> for ObservationInput {
    fn from((uri, value, second_value): (S, f64, Option<f64>)) -> Self {
        Self {
            uri: uri.into(),
            value,
            second_value,
        }
    }
}

impl<S: Into<String>> From<(S, f64)> for ObservationInput {
    fn from((uri, value): (S, f64)) -> Self {
        Self {
            uri: uri.into(),
            value,
            second_value: None,
        }
    }
}

/// A single data point.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub uri: ObservationUri,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Default)]
pub struct DataSet {
    observations: Vec<Observation>,
    attribute_names: Vec<String>,
    minimums: Attributes,
    maximums: Attributes,
}

impl DataSet {
    /// Build a dataset with the `Value` / `SecondValue` attributes.
    ///
    /// A missing second value is stored as `0.0`.
    pub fn try_new<I, T>(inputs: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<ObservationInput>,
    {
        let names = vec![VALUE.to_string(), SECOND_VALUE.to_string()];
        Self::try_new_with_attributes(
            names,
            inputs.into_iter().map(|input| {
                let input = input.into();
                let values = vec![input.value, input.second_value.unwrap_or(0.0)];
                (input.uri, values)
            }),
        )
    }

    /// Build a dataset over an arbitrary set of named attributes.
    ///
    /// Every row must provide exactly one value per attribute name, in the
    /// order of `attribute_names`.
    pub fn try_new_with_attributes<I, S>(attribute_names: Vec<String>, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: AsRef<str>,
    {
        if attribute_names.is_empty() {
            return Err(Error::invalid_parameter(
                "DataSet: at least one attribute is required",
            ));
        }
        let unique = attribute_names.iter().collect::<HashSet<_>>();
        if unique.len() != attribute_names.len() {
            return Err(Error::invalid_parameter(format!(
                "DataSet: duplicated attribute names in {:?}",
                attribute_names
            )));
        }

        let mut dataset = Self {
            attribute_names,
            ..Default::default()
        };
        let mut seen = HashSet::new();
        for (uri, values) in rows {
            let uri = ObservationUri::parse(uri.as_ref())?;
            if !seen.insert(uri.clone()) {
                return Err(Error::invalid_parameter(format!(
                    "DataSet: observation {} appears more than once",
                    uri
                )));
            }
            dataset.push(uri, values)?;
        }
        debug!(
            "DataSet: loaded {} observations over {:?}",
            dataset.len(),
            dataset.attribute_names
        );
        Ok(dataset)
    }

    /// Build a dataset from a JSON array of `{"uri", "value", "secondValue"}`
    /// objects.
    pub fn from_json(json: &str) -> Result<Self> {
        let inputs: Vec<ObservationInput> = serde_json::from_str(json)?;
        Self::try_new(inputs)
    }

    fn push(&mut self, uri: ObservationUri, values: Vec<f64>) -> Result<()> {
        if values.len() != self.attribute_names.len() {
            return Err(Error::invalid_parameter(format!(
                "DataSet: observation {} has {} values, expected {}",
                uri,
                values.len(),
                self.attribute_names.len()
            )));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(Error::invalid_parameter(format!(
                "DataSet: observation {} has a non-finite value {}",
                uri, bad
            )));
        }

        let attributes = self
            .attribute_names
            .iter()
            .cloned()
            .zip(values)
            .collect::<Attributes>();
        for (name, &value) in attributes.iter() {
            update_min(&mut self.minimums, name, value);
            update_max(&mut self.maximums, name, value);
        }
        self.observations.push(Observation { uri, attributes });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Attribute names, in the order they were declared.
    pub fn attribute_names(&self) -> &[String] {
        &self.attribute_names
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn uri(&self, idx: usize) -> Option<&ObservationUri> {
        self.observations.get(idx).map(|o| &o.uri)
    }

    pub fn attributes(&self, idx: usize) -> Option<&Attributes> {
        self.observations.get(idx).map(|o| &o.attributes)
    }

    /// Smallest value seen for `name`.
    pub fn min(&self, name: &str) -> Option<f64> {
        self.minimums.get(name).copied()
    }

    /// Largest value seen for `name`.
    pub fn max(&self, name: &str) -> Option<f64> {
        self.maximums.get(name).copied()
    }

    /// Arithmetic mean of `name` over the observations at `indices`.
    ///
    /// Out of range indices contribute nothing to the sum but still count in
    /// the divisor. Returns `NaN` for an empty index set or an unknown
    /// attribute.
    pub fn mean_of_attribute(&self, name: &str, indices: &[usize]) -> f64 {
        let mut sum = 0.0;
        for &idx in indices {
            if let Some(observation) = self.observations.get(idx) {
                match observation.attributes.get(name) {
                    Some(value) => sum += value,
                    None => return f64::NAN,
                }
            }
        }
        sum / indices.len() as f64
    }

    /// Indices of the observations assigned to `cluster`.
    pub fn members(&self, membership: &[usize], cluster: usize) -> Vec<usize> {
        membership
            .iter()
            .take(self.len())
            .enumerate()
            .filter_map(|(idx, &c)| (c == cluster).then_some(idx))
            .collect()
    }

    /// The mean of every attribute over the members of `cluster`.
    ///
    /// All attributes are `NaN` when the cluster has no members.
    pub fn centroid_for(&self, membership: &[usize], cluster: usize) -> Attributes {
        let members = self.members(membership, cluster);
        self.attribute_names
            .iter()
            .map(|name| (name.clone(), self.mean_of_attribute(name, &members)))
            .collect()
    }

    /// Exactly `k` centroids, one per cluster index.
    pub fn all_centroids(&self, membership: &[usize], k: usize) -> Vec<Attributes> {
        (0..k)
            .map(|cluster| self.centroid_for(membership, cluster))
            .collect()
    }

    /// Sum of squared distances between `centroid` and the members of `cluster`.
    pub fn cluster_sse(&self, centroid: &Attributes, membership: &[usize], cluster: usize) -> f64 {
        self.observations
            .iter()
            .zip(membership)
            .filter(|(_, &c)| c == cluster)
            .map(|(observation, _)| squared_distance(centroid, &observation.attributes))
            .sum()
    }

    /// Sum of [`Self::cluster_sse`] over all clusters, `centroids[i]` being the
    /// centroid of cluster `i`.
    pub fn total_sse(&self, centroids: &[Attributes], membership: &[usize]) -> f64 {
        centroids
            .iter()
            .enumerate()
            .map(|(cluster, centroid)| self.cluster_sse(centroid, membership, cluster))
            .sum()
    }

    /// Index of a uniformly chosen observation, `None` on an empty dataset.
    pub fn random_observation(&self, rng: &mut impl Rng) -> Option<usize> {
        (!self.is_empty()).then(|| rng.gen_range(0..self.len()))
    }

    /// A point drawn uniformly inside the per-attribute `[min, max]` box.
    pub fn random_point_in_bounds(&self, rng: &mut impl Rng) -> Option<Attributes> {
        if self.is_empty() {
            return None;
        }
        Some(
            self.attribute_names
                .iter()
                .map(|name| {
                    let min = self.minimums[name];
                    let max = self.maximums[name];
                    let u = rng.gen::<f64>();
                    // Interpolate instead of scaling `max - min`, which can
                    // overflow for finite extremes.
                    (name.clone(), (min * (1.0 - u) + max * u).clamp(min, max))
                })
                .collect(),
        )
    }

    /// Pick the next K-means++ seed by roulette-wheel sampling.
    ///
    /// Every observation not yet in `selected` is weighted by its distance to
    /// the nearest selected observation. A threshold is drawn uniformly in
    /// `[0, total_weight)` and the first candidate whose cumulative weight
    /// exceeds it wins. When all candidates have zero weight, nothing is
    /// selected yet, or the weights overflow, the pick is uniform among the
    /// candidates.
    ///
    /// The winner is appended to `selected`. Returns `None` once every
    /// observation has been selected.
    pub fn weighted_farthest_observation(
        &self,
        selected: &mut Vec<usize>,
        rng: &mut impl Rng,
    ) -> Option<usize> {
        let chosen = selected.iter().copied().collect::<HashSet<_>>();
        let candidates = (0..self.len())
            .filter(|idx| !chosen.contains(idx))
            .map(|idx| {
                let weight = selected
                    .iter()
                    .map(|&s| {
                        euclidean_distance(
                            &self.observations[idx].attributes,
                            &self.observations[s].attributes,
                        )
                    })
                    .fold(f64::INFINITY, f64::min);
                (idx, weight)
            })
            .collect::<Vec<_>>();
        if candidates.is_empty() {
            return None;
        }

        let total_weight = candidates.iter().map(|(_, w)| w).sum::<f64>();
        let weighted = if total_weight.is_finite() {
            match WeightedIndex::new(candidates.iter().map(|(_, w)| *w)) {
                Ok(dist) => Some(dist.sample(rng)),
                Err(WeightedError::AllWeightsZero) => None,
                Err(e) => {
                    warn!("DataSet: cannot weight the seed candidates: {}", e);
                    None
                }
            }
        } else {
            debug!("DataSet: seed weights are not finite, picking uniformly");
            None
        };
        let pos = weighted.unwrap_or_else(|| rng.gen_range(0..candidates.len()));
        let picked = candidates[pos].0;
        selected.push(picked);
        Some(picked)
    }

    /// Group observation indices by cluster, for diagnostics.
    pub fn clusters(&self, membership: &[usize]) -> BTreeMap<usize, Vec<usize>> {
        let mut clusters = BTreeMap::<usize, Vec<usize>>::new();
        for (idx, &cluster) in membership.iter().take(self.len()).enumerate() {
            clusters.entry(cluster).or_default().push(idx);
        }
        clusters
    }
}

fn update_min(minimums: &mut Attributes, name: &str, value: f64) {
    match minimums.get_mut(name) {
        Some(min) if value < *min => *min = value,
        Some(_) => {}
        None => {
            minimums.insert(name.to_string(), value);
        }
    }
}

fn update_max(maximums: &mut Attributes, name: &str, value: f64) {
    match maximums.get_mut(name) {
        Some(max) if value > *max => *max = value,
        Some(_) => {}
        None => {
            maximums.insert(name.to_string(), value);
        }
    }
}
