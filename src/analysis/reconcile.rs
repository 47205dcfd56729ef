//! Writes cluster labels back onto the events that produced them.
//!
//! Matching is positional: label `i` belongs to coordinate `i`, and the
//! aggregation knows which event created coordinate `i`. Duplicate
//! coordinates in different categories or layers therefore keep their
//! own labels.

use crate::analysis::aggregate::Aggregation;
use crate::logging::{self, DataSource};
use crate::model::{ClusterResult, NOISE};

/// Assigns `cluster_id` on every non-noise event and returns how many
/// events received a label. Noise events keep `cluster_id == None`.
pub fn reconcile_labels(aggregation: &mut Aggregation, result: &ClusterResult) -> usize {
    if result.labels.len() != aggregation.total_events() {
        logging::warn(
            DataSource::Cluster,
            None,
            &format!(
                "label count {} does not match event count {}; extra entries ignored",
                result.labels.len(),
                aggregation.total_events()
            ),
        );
    }

    let mut assigned = 0;
    for (index, &label) in result.labels.iter().enumerate() {
        if label == NOISE {
            continue;
        }
        if let Some(event) = aggregation.event_at_mut(index) {
            event.cluster_id = Some(label);
            assigned += 1;
        }
    }
    assigned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PropertyBag, RawFeature, RawGeometry};
    use serde_json::json;

    fn point(event: &str, lat: f64, lon: f64) -> RawFeature {
        let mut properties = PropertyBag::new();
        properties.insert("Event".to_string(), json!(event));
        RawFeature {
            geometry: Some(RawGeometry::Point { x: lon, y: lat }),
            properties,
        }
    }

    #[test]
    fn test_labels_land_on_originating_events() {
        let mut agg = Aggregation::new();
        agg.ingest_layer(
            1,
            vec![
                point("Flood Watch", 1.0, 1.0),
                point("Flood Warning", 2.0, 2.0),
                point("Flood Watch", 3.0, 3.0),
            ],
            "Event",
        );

        let result = ClusterResult::from_labels(vec![4, NOISE, 7]);
        assert_eq!(reconcile_labels(&mut agg, &result), 2);

        assert_eq!(agg.events["Flood Watch"][0].cluster_id, Some(4));
        assert_eq!(agg.events["Flood Watch"][1].cluster_id, Some(7));
        assert_eq!(agg.events["Flood Warning"][0].cluster_id, None, "noise stays unlabeled");
    }

    #[test]
    fn test_duplicate_coordinates_get_their_own_labels() {
        // Same position, different categories and layers.
        let mut agg = Aggregation::new();
        agg.ingest_layer(1, vec![point("Flood Watch", 5.0, 5.0)], "Event");
        agg.ingest_layer(2, vec![point("Flood Warning", 5.0, 5.0)], "Event");

        let result = ClusterResult::from_labels(vec![NOISE, 0]);
        reconcile_labels(&mut agg, &result);

        assert_eq!(agg.events["Flood Watch"][0].cluster_id, None);
        assert_eq!(agg.events["Flood Warning"][0].cluster_id, Some(0));
    }

    #[test]
    fn test_extra_labels_are_ignored() {
        let mut agg = Aggregation::new();
        agg.ingest_layer(1, vec![point("Flood Watch", 1.0, 1.0)], "Event");
        let result = ClusterResult::from_labels(vec![0, 0, 0]);
        assert_eq!(reconcile_labels(&mut agg, &result), 1);
    }

    #[test]
    fn test_empty_result_changes_nothing() {
        let mut agg = Aggregation::new();
        assert_eq!(reconcile_labels(&mut agg, &ClusterResult::default()), 0);
    }
}
