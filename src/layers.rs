/// Feature layer registry for the NWS watches/warnings service.
///
/// Defines the canonical list of layers queried on every run and the
/// allow-list of warning categories that are worth clustering. This is the
/// single source of truth for layer ids and category names: configuration
/// defaults are built from here rather than hardcoding them elsewhere.

use crate::ingest::arcgis::build_where_clause;
use crate::model::LayerId;

// ---------------------------------------------------------------------------
// Service endpoints
// ---------------------------------------------------------------------------

/// FeatureServer hosting the NWS watches and warnings layers.
pub const NWS_WARNINGS_URL: &str = "https://services9.arcgis.com/RHVPKKiFTONKtxq3/ArcGIS/rest/services/NWS_Watches_Warnings_v1/FeatureServer";

/// FeatureServer hosting the US Drought Monitor intensity polygons.
pub const DROUGHT_URL: &str = "https://services9.arcgis.com/RHVPKKiFTONKtxq3/arcgis/rest/services/US_Drought_Intensity_v1/FeatureServer";

/// Layer inside `DROUGHT_URL` holding the current drought polygons.
pub const DROUGHT_LAYER: LayerId = 3;

// ---------------------------------------------------------------------------
// Layer and category registry
// ---------------------------------------------------------------------------

/// Warning layers queried on every run. Layer 7 carries no hydrologic
/// products and is skipped.
pub static DEFAULT_LAYER_IDS: &[LayerId] = &[1, 2, 3, 4, 5, 6, 8, 9, 10, 11, 12];

/// Warning categories kept by the layer filter: flood and hydrologic
/// products, plus dust storms.
pub static INTERESTED_EVENTS: &[&str] = &[
    "Flash Flood Warning",
    "Hydrologic Advisory",
    "Hydrologic Outlook",
    "Low Water Advisory",
    "Flash Flood Statement",
    "Flash Flood Watch",
    "Flood Advisory",
    "Flood Statement",
    "Flood Warning",
    "Flood Watch",
    "Dust Storm Warning",
];

/// A queryable layer paired with the filter it is queried with.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureLayer {
    pub id: LayerId,
    /// Boolean filter expression, e.g. `Event IN ('Flood Watch')`.
    pub filter: String,
}

/// Builds one `FeatureLayer` per id, all sharing the same category filter.
pub fn feature_layers(ids: &[LayerId], category_field: &str, events: &[String]) -> Vec<FeatureLayer> {
    let filter = build_where_clause(category_field, events);
    ids.iter()
        .map(|&id| FeatureLayer {
            id,
            filter: filter.clone(),
        })
        .collect()
}

/// The default allow-list as owned strings, suitable for configuration.
pub fn default_events() -> Vec<String> {
    INTERESTED_EVENTS.iter().map(|e| e.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
