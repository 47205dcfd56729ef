/// US Drought Monitor intensity polygons.
///
/// The drought layer is an Esri JSON polygon service with one feature per
/// intensity band per region. Each polygon is reduced to a representative
/// coordinate with the same centroid rule used for warnings, so drought
/// areas can be drawn next to warning hotspots.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::analysis::geometry::representative_coordinate;
use crate::config::DroughtConfig;
use crate::ingest::arcgis::{FeatureQuery, LayerSource, fetch_layer_or_empty};
use crate::logging::{self, DataSource};
use crate::model::{NormalizeError, RawFeature, RawGeometry, Ring};

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Drought Monitor intensity, from the `dm` attribute (0-4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum DroughtCategory {
    D0,
    D1,
    D2,
    D3,
    D4,
    Unknown,
}

impl DroughtCategory {
    pub fn from_dm(dm: Option<i64>) -> Self {
        match dm {
            Some(0) => DroughtCategory::D0,
            Some(1) => DroughtCategory::D1,
            Some(2) => DroughtCategory::D2,
            Some(3) => DroughtCategory::D3,
            Some(4) => DroughtCategory::D4,
            _ => DroughtCategory::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DroughtCategory::D0 => "D0 (Abnormally Dry)",
            DroughtCategory::D1 => "D1 (Moderate Drought)",
            DroughtCategory::D2 => "D2 (Severe Drought)",
            DroughtCategory::D3 => "D3 (Extreme Drought)",
            DroughtCategory::D4 => "D4 (Exceptional Drought)",
            DroughtCategory::Unknown => "Unknown",
        }
    }

    /// Map fill color, RGB.
    pub fn color(&self) -> [u8; 3] {
        match self {
            DroughtCategory::D0 => [255, 255, 0],
            DroughtCategory::D1 => [255, 165, 0],
            DroughtCategory::D2 => [255, 0, 0],
            DroughtCategory::D3 => [139, 0, 0],
            DroughtCategory::D4 => [128, 0, 128],
            DroughtCategory::Unknown => [128, 128, 128],
        }
    }
}

// ---------------------------------------------------------------------------
// Areas
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroughtArea {
    pub object_id: Option<i64>,
    /// Map release date as published, e.g. "20240507".
    pub period: Option<String>,
    pub category: DroughtCategory,
    pub label: &'static str,
    pub color: [u8; 3],
    /// `None` when the feature carries no usable polygon.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Every ring of the feature in service order, exteriors followed by
    /// their holes.
    pub rings: Vec<Ring>,
    pub area: Option<f64>,
    pub length: Option<f64>,
}

fn geometry_rings(geometry: Option<&RawGeometry>) -> Vec<Ring> {
    match geometry {
        Some(RawGeometry::Polygon(rings)) => rings.clone(),
        Some(RawGeometry::MultiPolygon(polygons)) => polygons.iter().flatten().cloned().collect(),
        _ => Vec::new(),
    }
}

/// Converts one drought feature. Every feature yields an area; one without
/// usable polygon geometry has no coordinate and no rings.
pub fn drought_area(feature: &RawFeature) -> DroughtArea {
    let attrs = &feature.properties;
    let geometry = feature.geometry.as_ref();

    let coordinate = geometry
        .ok_or(NormalizeError::MissingGeometry)
        .and_then(representative_coordinate);
    let (latitude, longitude) = match coordinate {
        Ok((lat, lon)) => (Some(lat), Some(lon)),
        Err(e) => {
            logging::debug(
                DataSource::Drought,
                None,
                &format!("No centroid for feature {:?}: {}", attrs.get("OBJECTID"), e),
            );
            (None, None)
        }
    };

    // `period` is a string on the current service but was numeric on older
    // releases.
    let period = attrs.get("period").and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });
    let category = DroughtCategory::from_dm(attrs.get("dm").and_then(Value::as_i64));

    DroughtArea {
        object_id: attrs.get("OBJECTID").and_then(Value::as_i64),
        period,
        category,
        label: category.label(),
        color: category.color(),
        latitude,
        longitude,
        rings: geometry_rings(geometry),
        area: attrs.get("Shape__Area").and_then(Value::as_f64),
        length: attrs.get("Shape__Length").and_then(Value::as_f64),
    }
}

/// Queries the drought layer once and converts every returned feature, in
/// service order. A failed query yields an empty list.
pub fn fetch_drought_areas<S: LayerSource + ?Sized>(source: &S, config: &DroughtConfig) -> Vec<DroughtArea> {
    let query = FeatureQuery {
        max_records: Some(config.max_records),
        out_sr: Some(config.out_sr),
        ..FeatureQuery::esri_json("1=1")
    };

    fetch_layer_or_empty(source, DataSource::Drought, config.layer, &query)
        .iter()
        .map(drought_area)
        .collect()
}

/// Number of areas per category.
pub fn drought_category_counts(areas: &[DroughtArea]) -> BTreeMap<DroughtCategory, usize> {
    let mut counts = BTreeMap::new();
    for area in areas {
        *counts.entry(area.category).or_insert(0) += 1;
    }
    counts
}

/// Console summary of a drought pass.
pub fn print_drought_summary(areas: &[DroughtArea]) {
    println!("\n═══════════════════════════════════════════════════════════");
    println!("DROUGHT INTENSITY SUMMARY");
    println!("═══════════════════════════════════════════════════════════");
    if areas.is_empty() {
        println!("No drought areas available.");
    }
    for (category, count) in drought_category_counts(areas) {
        println!("  {:<28} {:>5} areas", category.label(), count);
    }
    println!("═══════════════════════════════════════════════════════════");
}
