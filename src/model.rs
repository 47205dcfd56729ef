/// Core data types for the warning hotspot service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no I/O, only types and the error enums each pipeline
/// stage reports.

use serde::Serialize;
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Identifiers and constants
// ---------------------------------------------------------------------------

/// Numeric identifier of a layer within an ArcGIS FeatureServer.
pub type LayerId = u32;

/// Open-ended attribute bag carried by every feature.
pub type PropertyBag = Map<String, Value>;

/// Cluster label assigned to points that belong to no cluster.
pub const NOISE: i32 = -1;

/// Property key holding the warning category on NWS features.
pub const DEFAULT_CATEGORY_FIELD: &str = "Event";

// ---------------------------------------------------------------------------
// Raw features
// ---------------------------------------------------------------------------

/// A ring is an ordered list of `[x, y]` (longitude, latitude) positions.
pub type Ring = Vec<[f64; 2]>;

/// Geometry as delivered by a layer query, before normalization.
///
/// Positions keep the wire order `[x, y]` = `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq)]
pub enum RawGeometry {
    Point { x: f64, y: f64 },
    /// Exterior ring first, holes after.
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
    /// Any other geometry tag (LineString, MultiPoint, ...). Keeps the tag
    /// for diagnostics.
    Unsupported(String),
}

/// One record returned by a layer query. Transient: it only lives between
/// fetch and normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFeature {
    pub geometry: Option<RawGeometry>,
    pub properties: PropertyBag,
}

// ---------------------------------------------------------------------------
// Normalized output
// ---------------------------------------------------------------------------

/// A warning reduced to a single representative coordinate.
///
/// `index` is the event's position in the flat coordinate sequence handed
/// to the cluster engine; `cluster_id` is filled in by reconciliation and
/// stays `None` for noise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedEvent {
    pub event_type: String,
    pub layer_id: LayerId,
    pub latitude: f64,
    pub longitude: f64,
    pub properties: PropertyBag,
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<i32>,
}

impl NormalizedEvent {
    pub fn coordinate(&self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }
}

/// Per-layer ingestion counters.
///
/// Invariant: `valid_coordinates + invalid_geometries == total_features`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LayerSummary {
    pub total_features: usize,
    pub valid_coordinates: usize,
    pub invalid_geometries: usize,
}

/// Output of the cluster engine.
///
/// `labels[i]` belongs to the i-th coordinate fed to the engine; `NOISE`
/// marks points reachable from no core point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClusterResult {
    pub labels: Vec<i32>,
    pub cluster_count: usize,
    pub noise_count: usize,
}

impl ClusterResult {
    /// Builds a result from raw labels, deriving both counts from them.
    pub fn from_labels(labels: Vec<i32>) -> Self {
        let mut distinct: Vec<i32> = labels.iter().copied().filter(|&l| l != NOISE).collect();
        distinct.sort_unstable();
        distinct.dedup();
        let noise_count = labels.iter().filter(|&&l| l == NOISE).count();
        ClusterResult {
            cluster_count: distinct.len(),
            noise_count,
            labels,
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when querying a feature layer.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Non-2xx HTTP response from the feature service.
    Http(u16),
    /// The request never produced a response (DNS, connect, timeout).
    Transport(String),
    /// The response body could not be interpreted as a feature collection.
    Parse(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Http(code) => write!(f, "HTTP error: {}", code),
            FetchError::Transport(msg) => write!(f, "Transport error: {}", msg),
            FetchError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

/// Why a single feature could not be turned into a `NormalizedEvent`.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizeError {
    MissingGeometry,
    UnsupportedGeometry(String),
    /// Polygon with no rings or rings with no positions.
    EmptyGeometry,
    NonFiniteCoordinate,
    /// The property bag lacks the category field (or it is not a string).
    MissingCategory(String),
}

impl std::fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizeError::MissingGeometry => write!(f, "feature has no geometry"),
            NormalizeError::UnsupportedGeometry(kind) => {
                write!(f, "unsupported geometry type: {}", kind)
            }
            NormalizeError::EmptyGeometry => write!(f, "geometry has no positions"),
            NormalizeError::NonFiniteCoordinate => write!(f, "coordinate is not finite"),
            NormalizeError::MissingCategory(field) => {
                write!(f, "missing category field '{}'", field)
            }
        }
    }
}

impl std::error::Error for NormalizeError {}

/// Invalid clustering parameters. Raised when parameters are built, never
/// during clustering itself.
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterError {
    InvalidEps(f64),
    InvalidMinSamples(usize),
}

impl std::fmt::Display for ClusterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterError::InvalidEps(eps) => {
                write!(f, "eps must be a positive finite number, got {}", eps)
            }
            ClusterError::InvalidMinSamples(n) => {
                write!(f, "min_samples must be at least 1, got {}", n)
            }
        }
    }
}

impl std::error::Error for ClusterError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
