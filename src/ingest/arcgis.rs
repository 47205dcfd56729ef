/// ArcGIS FeatureServer Query Client
///
/// Queries individual layers of an ArcGIS FeatureServer and turns the
/// response into `RawFeature`s. Both response encodings the services offer
/// are understood:
///
/// - `f=pgeojson`: GeoJSON features (`geometry.type` + `coordinates`,
///   attributes under `properties`)
/// - `f=json`: Esri JSON features (`geometry.x/y` or `geometry.rings`,
///   attributes under `attributes`)
///
/// API Documentation: https://developers.arcgis.com/rest/services-reference/enterprise/query-feature-service-layer/

use std::time::Duration;

use serde_json::Value;

use crate::logging::{self, DataSource};
use crate::model::{FetchError, LayerId, RawFeature, RawGeometry, Ring};

// ============================================================================
// Query description
// ============================================================================

/// Response encoding requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    GeoJson,
    EsriJson,
}

impl ResponseFormat {
    fn as_param(&self) -> &'static str {
        match self {
            ResponseFormat::GeoJson => "pgeojson",
            ResponseFormat::EsriJson => "json",
        }
    }
}

/// Parameters of a single layer query. Every query asks for all attributes
/// and full geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureQuery {
    pub where_clause: String,
    pub format: ResponseFormat,
    /// `resultRecordCount`; the service default applies when `None`.
    pub max_records: Option<u32>,
    /// `outSR` well-known id for the returned geometry.
    pub out_sr: Option<u32>,
}

impl FeatureQuery {
    pub fn geojson(where_clause: impl Into<String>) -> Self {
        FeatureQuery {
            where_clause: where_clause.into(),
            format: ResponseFormat::GeoJson,
            max_records: None,
            out_sr: None,
        }
    }

    pub fn esri_json(where_clause: impl Into<String>) -> Self {
        FeatureQuery {
            format: ResponseFormat::EsriJson,
            ..FeatureQuery::geojson(where_clause)
        }
    }
}

/// Anything that can answer a layer query. `ArcGisClient` talks to the
/// real service; tests substitute in-memory sources.
pub trait LayerSource {
    fn query(&self, layer: LayerId, query: &FeatureQuery) -> Result<Vec<RawFeature>, FetchError>;
}

// ============================================================================
// Filter and URL construction
// ============================================================================

/// Quotes a category name as a SQL string literal. Embedded single quotes
/// are doubled.
pub fn quote_category(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// Renders the category allow-list as `<field> IN ('A','B',...)`.
///
/// The clause is plain text here; it is percent-encoded when placed in the
/// query URL by `build_query_url`.
pub fn build_where_clause(field: &str, events: &[String]) -> String {
    let quoted: Vec<String> = events.iter().map(|e| quote_category(e)).collect();
    format!("{} IN ({})", field, quoted.join(","))
}

/// Builds the full query URL for one layer:
/// `{base}/{layer}/query?where=..&outFields=*&returnGeometry=true&f=..`
pub fn build_query_url(base_url: &str, layer: LayerId, query: &FeatureQuery) -> Result<String, FetchError> {
    let endpoint = format!("{}/{}/query", base_url.trim_end_matches('/'), layer);

    let mut params: Vec<(&str, String)> = vec![
        ("where", query.where_clause.clone()),
        ("outFields", "*".to_string()),
        ("returnGeometry", "true".to_string()),
        ("f", query.format.as_param().to_string()),
    ];
    if let Some(n) = query.max_records {
        params.push(("resultRecordCount", n.to_string()));
    }
    if let Some(sr) = query.out_sr {
        params.push(("outSR", sr.to_string()));
    }

    reqwest::Url::parse_with_params(&endpoint, &params)
        .map(|url| url.to_string())
        .map_err(|e| FetchError::Transport(format!("invalid query URL {}: {}", endpoint, e)))
}

// ============================================================================
// HTTP client
// ============================================================================

/// Blocking client bound to one FeatureServer.
pub struct ArcGisClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl ArcGisClient {
    /// Creates a client whose every request is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(ArcGisClient {
            client,
            base_url: base_url.to_string(),
        })
    }
}

impl LayerSource for ArcGisClient {
    fn query(&self, layer: LayerId, query: &FeatureQuery) -> Result<Vec<RawFeature>, FetchError> {
        let url = build_query_url(&self.base_url, layer, query)?;

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Http(response.status().as_u16()));
        }

        let body = response
            .text()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        parse_feature_collection(&body)
    }
}

/// Queries one layer, logging the outcome against the layer id.
///
/// Failures are logged with their classification and handed back so the
/// caller can record them; nothing is retried.
pub fn fetch_layer<S: LayerSource + ?Sized>(
    source: &S,
    data_source: DataSource,
    layer: LayerId,
    query: &FeatureQuery,
) -> Result<Vec<RawFeature>, FetchError> {
    let layer_tag = layer.to_string();
    match source.query(layer, query) {
        Ok(features) => {
            logging::info(
                data_source,
                Some(&layer_tag),
                &format!("Found {} features", features.len()),
            );
            Ok(features)
        }
        Err(e) => {
            logging::log_layer_failure(data_source, &layer_tag, "Layer query", &e);
            Err(e)
        }
    }
}

/// Queries one layer and swallows any failure.
///
/// A failing layer contributes no features, so one bad layer never aborts
/// ingestion of the others.
pub fn fetch_layer_or_empty<S: LayerSource + ?Sized>(
    source: &S,
    data_source: DataSource,
    layer: LayerId,
    query: &FeatureQuery,
) -> Vec<RawFeature> {
    fetch_layer(source, data_source, layer, query).unwrap_or_default()
}

// ============================================================================
// Response parsing
// ============================================================================

/// Parses a query response body into raw features.
///
/// A body without a `features` array yields no features. ArcGIS signals
/// query errors with a 200 status and an `error` object; that is mapped to
/// `FetchError::Http` with the embedded code.
pub fn parse_feature_collection(body: &str) -> Result<Vec<RawFeature>, FetchError> {
    let json: Value = serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    if let Some(err) = json.get("error") {
        let code = err.get("code").and_then(Value::as_u64).unwrap_or(500);
        return Err(FetchError::Http(u16::try_from(code).unwrap_or(500)));
    }

    let Some(features) = json.get("features").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    Ok(features.iter().map(parse_feature).collect())
}

fn parse_feature(feature: &Value) -> RawFeature {
    let properties = feature
        .get("properties")
        .or_else(|| feature.get("attributes"))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let geometry = feature
        .get("geometry")
        .filter(|g| !g.is_null())
        .map(parse_geometry);

    RawFeature { geometry, properties }
}

fn parse_geometry(geom: &Value) -> RawGeometry {
    if let Some(kind) = geom.get("type").and_then(Value::as_str) {
        return parse_geojson_geometry(kind, geom.get("coordinates"))
            .unwrap_or_else(|| RawGeometry::Unsupported(format!("malformed {}", kind)));
    }

    // Esri JSON geometries carry no type tag; the member names identify them.
    if let (Some(x), Some(y)) = (
        geom.get("x").and_then(Value::as_f64),
        geom.get("y").and_then(Value::as_f64),
    ) {
        return RawGeometry::Point { x, y };
    }
    if let Some(rings) = geom.get("rings").and_then(Value::as_array) {
        return match rings.iter().map(parse_ring).collect::<Option<Vec<Ring>>>() {
            Some(rings) => esri_rings_to_geometry(rings),
            None => RawGeometry::Unsupported("malformed rings".to_string()),
        };
    }
    if geom.get("paths").is_some() {
        return RawGeometry::Unsupported("Polyline".to_string());
    }
    if geom.get("points").is_some() {
        return RawGeometry::Unsupported("Multipoint".to_string());
    }

    RawGeometry::Unsupported("unknown".to_string())
}

fn parse_geojson_geometry(kind: &str, coordinates: Option<&Value>) -> Option<RawGeometry> {
    match kind {
        "Point" => {
            let [x, y] = parse_position(coordinates?)?;
            Some(RawGeometry::Point { x, y })
        }
        "Polygon" => parse_polygon(coordinates?).map(RawGeometry::Polygon),
        "MultiPolygon" => coordinates?
            .as_array()?
            .iter()
            .map(parse_polygon)
            .collect::<Option<Vec<_>>>()
            .map(RawGeometry::MultiPolygon),
        other => Some(RawGeometry::Unsupported(other.to_string())),
    }
}

/// `[x, y]` or `[x, y, z]`; any elevation is dropped.
fn parse_position(value: &Value) -> Option<[f64; 2]> {
    let arr = value.as_array()?;
    if arr.len() < 2 {
        return None;
    }
    Some([arr[0].as_f64()?, arr[1].as_f64()?])
}

fn parse_ring(value: &Value) -> Option<Ring> {
    value.as_array()?.iter().map(parse_position).collect()
}

fn parse_polygon(value: &Value) -> Option<Vec<Ring>> {
    value.as_array()?.iter().map(parse_ring).collect()
}

/// Twice the shoelace area; positive for counter-clockwise rings.
fn signed_area(ring: &[[f64; 2]]) -> f64 {
    ring.windows(2)
        .map(|w| w[0][0] * w[1][1] - w[1][0] * w[0][1])
        .sum()
}

/// Groups a flat Esri ring list into polygons.
///
/// Esri orders each exterior ring clockwise, followed by its holes
/// counter-clockwise. A counter-clockwise ring before any exterior is
/// treated as an exterior.
fn esri_rings_to_geometry(rings: Vec<Ring>) -> RawGeometry {
    let mut polygons: Vec<Vec<Ring>> = Vec::new();

    for ring in rings {
        let is_hole = signed_area(&ring) > 0.0;
        match polygons.last_mut() {
            Some(polygon) if is_hole => polygon.push(ring),
            _ => polygons.push(vec![ring]),
        }
    }

    if polygons.len() == 1 {
        RawGeometry::Polygon(polygons.remove(0))
    } else if polygons.is_empty() {
        RawGeometry::Polygon(Vec::new())
    } else {
        RawGeometry::MultiPolygon(polygons)
    }
}

// ============================================================================
// Tests
// ============================================================================
