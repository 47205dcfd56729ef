/// Feature layer ingestion.
///
/// Submodules:
/// - `arcgis`   - ArcGIS FeatureServer query construction, fetch, and
///   GeoJSON / Esri JSON parsing into `RawFeature`s.
/// - `fixtures` (test only) - representative query response payloads.

pub mod arcgis;

#[cfg(test)]
pub mod fixtures;
