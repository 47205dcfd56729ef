use std::collections::VecDeque;

use geo::{HaversineDistance, Point};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::logging::{self, DataSource};
use crate::model::{ClusterError, ClusterResult, NOISE};

/// How the distance between two `[latitude, longitude]` pairs is measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Planar distance in degrees. Distorts ground distance away from the
    /// equator.
    #[default]
    Euclidean,
    /// Great-circle distance; `eps` is then in kilometres.
    Haversine,
}

/// Validated DBSCAN parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterParams {
    eps: f64,
    min_samples: usize,
    metric: DistanceMetric,
}

impl ClusterParams {
    /// Rejects a non-positive or non-finite `eps` and a zero `min_samples`.
    pub fn new(eps: f64, min_samples: usize) -> Result<Self, ClusterError> {
        if !eps.is_finite() || eps <= 0.0 {
            return Err(ClusterError::InvalidEps(eps));
        }
        if min_samples == 0 {
            return Err(ClusterError::InvalidMinSamples(min_samples));
        }
        Ok(ClusterParams {
            eps,
            min_samples,
            metric: DistanceMetric::Euclidean,
        })
    }

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    fn within(&self, a: &[f64; 2], b: &[f64; 2]) -> bool {
        match self.metric {
            DistanceMetric::Euclidean => squared_euclidean(a, b) <= self.eps * self.eps,
            DistanceMetric::Haversine => {
                let pa = Point::new(a[1], a[0]);
                let pb = Point::new(b[1], b[0]);
                pa.haversine_distance(&pb) <= self.eps * 1000.0
            }
        }
    }
}

/// Clusters `[latitude, longitude]` points and derives the summary counts.
///
/// An empty input returns an empty result without running DBSCAN.
pub fn cluster_coordinates(points: &[[f64; 2]], params: &ClusterParams) -> ClusterResult {
    if points.is_empty() {
        logging::info(DataSource::Cluster, None, "No valid coordinates found for clustering");
        return ClusterResult::default();
    }

    let result = ClusterResult::from_labels(dbscan(points, params));

    logging::info(
        DataSource::Cluster,
        None,
        &format!(
            "{} points: {} clusters, {} noise (eps={}, min_samples={})",
            points.len(),
            result.cluster_count,
            result.noise_count,
            params.eps,
            params.min_samples
        ),
    );

    result
}

/// Run DBSCAN density-based clustering.
///
/// A point is a core point when at least `min_samples` points (itself
/// included) lie within `eps`. Returns one label per input point, `NOISE`
/// for points reachable from no core point. Cluster ids are assigned in
/// order of the first core point encountered, so identical input yields
/// identical labels.
pub fn dbscan(points: &[[f64; 2]], params: &ClusterParams) -> Vec<i32> {
    let n = points.len();
    if n == 0 {
        return Vec::new();
    }

    // Pre-compute neighbor lists; collect keeps index order so the result
    // does not depend on thread scheduling.
    let neighbors: Vec<Vec<usize>> = (0..n)
        .into_par_iter()
        .map(|i| {
            (0..n)
                .filter(|&j| params.within(&points[i], &points[j]))
                .collect()
        })
        .collect();

    let mut labels: Vec<Option<i32>> = vec![None; n];
    let mut visited = vec![false; n];
    let mut current_cluster: i32 = 0;

    for i in 0..n {
        if visited[i] {
            continue;
        }
        visited[i] = true;

        if neighbors[i].len() < params.min_samples {
            // Tentatively noise; may be claimed as a border point later.
            continue;
        }

        labels[i] = Some(current_cluster);

        let mut queue: VecDeque<usize> = neighbors[i].iter().copied().filter(|&j| j != i).collect();

        while let Some(j) = queue.pop_front() {
            if labels[j].is_none() {
                labels[j] = Some(current_cluster);
            }

            if visited[j] {
                continue;
            }
            visited[j] = true;

            if neighbors[j].len() >= params.min_samples {
                for &nb in &neighbors[j] {
                    if labels[nb].is_none() {
                        queue.push_back(nb);
                    }
                }
            }
        }

        current_cluster += 1;
    }

    labels.into_iter().map(|l| l.unwrap_or(NOISE)).collect()
}

/// Squared Euclidean distance between two coordinate pairs.
#[inline]
fn squared_euclidean(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    let d0 = a[0] - b[0];
    let d1 = a[1] - b[1];
    d0 * d0 + d1 * d1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(eps: f64, min_samples: usize) -> ClusterParams {
        ClusterParams::new(eps, min_samples).unwrap()
    }

    /// Five points within a 0.02-degree box around `(lat, lon)`.
    fn tight_group(lat: f64, lon: f64) -> Vec<[f64; 2]> {
        vec![
            [lat, lon],
            [lat + 0.01, lon],
            [lat, lon + 0.01],
            [lat + 0.01, lon + 0.01],
            [lat + 0.005, lon + 0.005],
        ]
    }

    #[test]
    fn test_invalid_params_fail_fast() {
        assert_eq!(ClusterParams::new(0.0, 3), Err(ClusterError::InvalidEps(0.0)));
        assert_eq!(ClusterParams::new(-0.5, 3), Err(ClusterError::InvalidEps(-0.5)));
        assert!(ClusterParams::new(f64::NAN, 3).is_err());
        assert!(ClusterParams::new(f64::INFINITY, 3).is_err());
        assert_eq!(ClusterParams::new(0.1, 0), Err(ClusterError::InvalidMinSamples(0)));
    }

    #[test]
    fn test_empty_input() {
        let result = cluster_coordinates(&[], &params(0.1, 3));
        assert!(result.labels.is_empty());
        assert_eq!(result.cluster_count, 0);
        assert_eq!(result.noise_count, 0);
    }

    #[test]
    fn test_two_tight_clusters_and_one_outlier() {
        let mut points = tight_group(40.0, -100.0);
        points.extend(tight_group(35.0, -90.0));
        points.push([45.0, -120.0]);

        let result = cluster_coordinates(&points, &params(0.1, 3));

        assert_eq!(result.cluster_count, 2);
        assert_eq!(result.noise_count, 1);
        assert_eq!(result.labels.len(), 11);
        assert!(result.labels[..5].iter().all(|&l| l == result.labels[0]));
        assert!(result.labels[5..10].iter().all(|&l| l == result.labels[5]));
        assert_ne!(result.labels[0], result.labels[5]);
        assert_eq!(result.labels[10], NOISE);
    }

    #[test]
    fn test_labels_are_deterministic() {
        let mut points = tight_group(40.0, -100.0);
        points.extend(tight_group(40.05, -100.05));
        points.push([10.0, 10.0]);

        let p = params(0.1, 3);
        assert_eq!(dbscan(&points, &p), dbscan(&points, &p));
    }

    #[test]
    fn test_cluster_ids_follow_first_core_point() {
        let mut points = tight_group(35.0, -90.0);
        points.extend(tight_group(40.0, -100.0));
        let labels = dbscan(&points, &params(0.1, 3));
        assert_eq!(labels[0], 0);
        assert_eq!(labels[5], 1);
    }

    #[test]
    fn test_single_point_is_noise() {
        let result = cluster_coordinates(&[[0.0, 0.0]], &params(1.0, 2));
        assert_eq!(result.labels, vec![NOISE]);
        assert_eq!(result.cluster_count, 0);
        assert_eq!(result.noise_count, 1);
    }

    #[test]
    fn test_min_samples_counts_the_point_itself() {
        // Two points within eps: each has 2 neighbours including itself.
        let points = [[0.0, 0.0], [0.0, 0.05]];
        assert_eq!(dbscan(&points, &params(0.1, 2)), vec![0, 0]);
        assert_eq!(dbscan(&points, &params(0.1, 3)), vec![NOISE, NOISE]);
    }

    #[test]
    fn test_chain_connectivity() {
        let points: Vec<[f64; 2]> = (0..10).map(|i| [0.0, i as f64 * 0.08]).collect();
        let result = cluster_coordinates(&points, &params(0.1, 2));
        assert_eq!(result.cluster_count, 1);
        assert_eq!(result.noise_count, 0);
    }

    #[test]
    fn test_border_point_assigned_to_cluster() {
        // [0.0, 0.18] has only one neighbour besides itself, but that
        // neighbour is a core point.
        let points = [[0.0, 0.0], [0.0, 0.05], [0.0, 0.1], [0.0, 0.18]];
        let labels = dbscan(&points, &params(0.1, 3));
        assert_eq!(labels, vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_eps_boundary_is_inclusive() {
        let points = [[0.0, 0.0], [0.0, 0.5]];
        assert_eq!(dbscan(&points, &params(0.5, 2)), vec![0, 0]);
    }

    #[test]
    fn test_haversine_metric_uses_kilometres() {
        // 0.1 degrees of latitude is about 11.1 km everywhere.
        let points = [[60.0, 10.0], [60.1, 10.0]];
        let near = params(12.0, 2).with_metric(DistanceMetric::Haversine);
        let far = params(10.0, 2).with_metric(DistanceMetric::Haversine);
        assert_eq!(dbscan(&points, &near), vec![0, 0]);
        assert_eq!(dbscan(&points, &far), vec![NOISE, NOISE]);
    }
}
