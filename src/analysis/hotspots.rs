//! Per-cluster summaries for map rendering.
//!
//! A hotspot is one cluster reduced to a single marker: the mean position
//! of its members plus a breakdown of the warning categories inside it.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;

use crate::model::NormalizedEvent;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hotspot {
    pub cluster_id: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub event_count: usize,
    pub event_types: BTreeMap<String, usize>,
}

/// Builds one `Hotspot` per cluster id found on the events, ordered by
/// cluster id. Unlabeled (noise) events are ignored.
pub fn summarize_hotspots(events: &IndexMap<String, Vec<NormalizedEvent>>) -> Vec<Hotspot> {
    let mut by_cluster: BTreeMap<i32, Hotspot> = BTreeMap::new();

    for event in events.values().flatten() {
        let Some(cluster_id) = event.cluster_id else {
            continue;
        };
        let hotspot = by_cluster.entry(cluster_id).or_insert_with(|| Hotspot {
            cluster_id,
            latitude: 0.0,
            longitude: 0.0,
            event_count: 0,
            event_types: BTreeMap::new(),
        });
        // Running sums; divided below.
        hotspot.latitude += event.latitude;
        hotspot.longitude += event.longitude;
        hotspot.event_count += 1;
        *hotspot.event_types.entry(event.event_type.clone()).or_insert(0) += 1;
    }

    by_cluster
        .into_values()
        .map(|mut h| {
            h.latitude /= h.event_count as f64;
            h.longitude /= h.event_count as f64;
            h
        })
        .collect()
}
