/// hotspot_service: NWS hydrologic warning ingestion and hotspot clustering.
///
/// # Module structure
///
/// ```text
/// hotspot_service
/// ├── model       - shared data types (RawFeature, NormalizedEvent, LayerSummary, …)
/// ├── layers      - warning layer ids, category allow-list, service endpoints
/// ├── config      - TOML configuration with validated defaults
/// ├── logging     - console/file logging with layer context
/// ├── ingest
/// │   ├── arcgis  - FeatureServer query construction, fetch, GeoJSON/Esri parsing
/// │   └── fixtures (test only) - representative query responses
/// ├── analysis
/// │   ├── geometry  - representative coordinate per feature
/// │   ├── aggregate - per-category grouping + flat coordinate list
/// │   ├── dbscan    - density-based clustering
/// │   ├── reconcile - cluster labels back onto events
/// │   └── hotspots  - one summary marker per cluster
/// ├── drought     - drought intensity polygons
/// └── pipeline    - end-to-end warnings pass and report
/// ```

pub mod analysis;
pub mod config;
pub mod drought;
pub mod ingest;
pub mod layers;
pub mod logging;
pub mod model;
pub mod pipeline;
