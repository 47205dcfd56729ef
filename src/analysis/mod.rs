/// Normalization, aggregation, and clustering of warning events.
///
/// Submodules, in pipeline order:
/// - `geometry`  - reduces a feature's geometry to one coordinate.
/// - `aggregate` - groups normalized events by category across layers.
/// - `dbscan`    - density-based clustering of the flat coordinate list.
/// - `reconcile` - writes cluster labels back onto their events.
/// - `hotspots`  - one summary marker per cluster.

pub mod aggregate;
pub mod dbscan;
pub mod geometry;
pub mod hotspots;
pub mod reconcile;
