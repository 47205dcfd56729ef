//! Event aggregation across layers.
//!
//! Drives fetch and normalization layer by layer and builds the three
//! structures the rest of the pipeline consumes: events grouped by
//! category, the flat coordinate sequence fed to clustering, and per-layer
//! counters.
//!
//! Coordinates are appended at the moment each event is created, together
//! with an origin record pointing back at that event. Reconciliation is
//! therefore a positional lookup and never depends on coordinate values or
//! on map iteration order.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::analysis::geometry::normalize_feature;
use crate::ingest::arcgis::{FeatureQuery, LayerSource, fetch_layer};
use crate::layers::FeatureLayer;
use crate::logging::{self, DataSource};
use crate::model::{LayerId, LayerSummary, NormalizedEvent, RawFeature};

/// Where the i-th coordinate's event lives inside `Aggregation::events`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EventOrigin {
    category: usize,
    position: usize,
}

/// Everything collected from one ingest pass.
#[derive(Debug, Default)]
pub struct Aggregation {
    /// Category name → events, categories in first-seen order.
    pub events: IndexMap<String, Vec<NormalizedEvent>>,
    /// `[latitude, longitude]` per event, in creation order.
    pub coordinates: Vec<[f64; 2]>,
    pub layer_summaries: BTreeMap<LayerId, LayerSummary>,
    /// Layers whose query failed outright.
    pub failed_layers: Vec<LayerId>,
    origins: Vec<EventOrigin>,
}

impl Aggregation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes one layer's features and folds them in.
    ///
    /// Features that fail normalization are dropped and counted in the
    /// layer's `invalid_geometries`.
    pub fn ingest_layer(&mut self, layer_id: LayerId, features: Vec<RawFeature>, category_field: &str) {
        let mut summary = LayerSummary {
            total_features: features.len(),
            ..LayerSummary::default()
        };
        let layer_tag = layer_id.to_string();

        for feature in features {
            match normalize_feature(feature, layer_id, category_field, self.coordinates.len()) {
                Ok(event) => {
                    self.push_event(event);
                    summary.valid_coordinates += 1;
                }
                Err(e) => {
                    logging::debug(DataSource::Warnings, Some(&layer_tag), &format!("Skipping feature: {}", e));
                    summary.invalid_geometries += 1;
                }
            }
        }

        let entry = self.layer_summaries.entry(layer_id).or_default();
        entry.total_features += summary.total_features;
        entry.valid_coordinates += summary.valid_coordinates;
        entry.invalid_geometries += summary.invalid_geometries;
    }

    fn push_event(&mut self, event: NormalizedEvent) {
        self.coordinates.push(event.coordinate());

        let entry = self.events.entry(event.event_type.clone());
        let category = entry.index();
        let bucket = entry.or_default();
        self.origins.push(EventOrigin {
            category,
            position: bucket.len(),
        });
        bucket.push(event);
    }

    /// Records a layer that could not be queried. Its summary shows zero
    /// features.
    pub fn record_failed_layer(&mut self, layer_id: LayerId) {
        self.layer_summaries.entry(layer_id).or_default();
        self.failed_layers.push(layer_id);
    }

    pub fn total_events(&self) -> usize {
        self.coordinates.len()
    }

    /// The event that produced coordinate `index`.
    pub fn event_at(&self, index: usize) -> Option<&NormalizedEvent> {
        let origin = self.origins.get(index)?;
        let (_, events) = self.events.get_index(origin.category)?;
        events.get(origin.position)
    }

    pub fn event_at_mut(&mut self, index: usize) -> Option<&mut NormalizedEvent> {
        let origin = *self.origins.get(index)?;
        let (_, events) = self.events.get_index_mut(origin.category)?;
        events.get_mut(origin.position)
    }
}

/// Fetches and normalizes every layer in order, one query per layer.
pub fn aggregate_layers<S: LayerSource + ?Sized>(
    source: &S,
    layers: &[FeatureLayer],
    category_field: &str,
) -> Aggregation {
    let mut aggregation = Aggregation::new();

    for layer in layers {
        let query = FeatureQuery::geojson(layer.filter.clone());
        match fetch_layer(source, DataSource::Warnings, layer.id, &query) {
            Ok(features) => aggregation.ingest_layer(layer.id, features, category_field),
            Err(_) => aggregation.record_failed_layer(layer.id),
        }
    }

    let failed = aggregation.failed_layers.len();
    logging::log_ingest_summary(DataSource::Warnings, layers.len(), layers.len() - failed, failed);

    aggregation
}
