//! Geometry normalization: one representative coordinate per feature.
//!
//! Points are used as-is. Polygons and multipolygons are reduced to their
//! area-weighted planar centroid (holes subtracted), not a vertex average.
//! Everything else is rejected and counted by the caller.

use geo::{Centroid, LineString, MultiPolygon, Polygon};

use crate::model::{LayerId, NormalizeError, NormalizedEvent, RawFeature, RawGeometry, Ring};

/// Returns the `(latitude, longitude)` that represents `geometry`.
///
/// Wire positions are `[x, y]`, so latitude is `y` and longitude is `x`.
pub fn representative_coordinate(geometry: &RawGeometry) -> Result<(f64, f64), NormalizeError> {
    let (x, y) = match geometry {
        RawGeometry::Point { x, y } => (*x, *y),
        RawGeometry::Polygon(rings) => {
            let polygon = to_geo_polygon(rings).ok_or(NormalizeError::EmptyGeometry)?;
            let c = polygon.centroid().ok_or(NormalizeError::EmptyGeometry)?;
            (c.x(), c.y())
        }
        RawGeometry::MultiPolygon(polygons) => {
            let parts: Vec<Polygon<f64>> = polygons.iter().filter_map(|p| to_geo_polygon(p)).collect();
            if parts.is_empty() {
                return Err(NormalizeError::EmptyGeometry);
            }
            let c = MultiPolygon::new(parts)
                .centroid()
                .ok_or(NormalizeError::EmptyGeometry)?;
            (c.x(), c.y())
        }
        RawGeometry::Unsupported(kind) => {
            return Err(NormalizeError::UnsupportedGeometry(kind.clone()));
        }
    };

    if !x.is_finite() || !y.is_finite() {
        return Err(NormalizeError::NonFiniteCoordinate);
    }

    Ok((y, x))
}

fn to_geo_polygon(rings: &[Ring]) -> Option<Polygon<f64>> {
    let (exterior, holes) = rings.split_first()?;
    if exterior.is_empty() {
        return None;
    }
    let interiors = holes
        .iter()
        .filter(|ring| !ring.is_empty())
        .map(|ring| LineString::from(ring.clone()))
        .collect();
    Some(Polygon::new(LineString::from(exterior.clone()), interiors))
}

/// Reads the category name from the property bag.
pub fn category_of(feature: &RawFeature, category_field: &str) -> Result<String, NormalizeError> {
    feature
        .properties
        .get(category_field)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| NormalizeError::MissingCategory(category_field.to_string()))
}

/// Turns one raw feature into a `NormalizedEvent`, or explains why not.
///
/// `index` is the position the event will take in the flat coordinate
/// sequence; the aggregator supplies it.
pub fn normalize_feature(
    feature: RawFeature,
    layer_id: LayerId,
    category_field: &str,
    index: usize,
) -> Result<NormalizedEvent, NormalizeError> {
    let geometry = feature.geometry.as_ref().ok_or(NormalizeError::MissingGeometry)?;
    let (latitude, longitude) = representative_coordinate(geometry)?;
    let event_type = category_of(&feature, category_field)?;

    Ok(NormalizedEvent {
        event_type,
        layer_id,
        latitude,
        longitude,
        properties: feature.properties,
        index,
        cluster_id: None,
    })
}
