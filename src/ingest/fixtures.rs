//! Canned ArcGIS query responses used by unit tests across the crate.
//!
//! Trimmed from real NWS_Watches_Warnings_v1 and US_Drought_Intensity_v1
//! responses; attribute lists are shortened to what the service reads.

/// `f=pgeojson` response with one of each geometry kind the normalizer has
/// to handle, plus the malformed cases it must reject.
pub const WARNINGS_GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "id": 101,
      "geometry": { "type": "Point", "coordinates": [-100.0, 40.0] },
      "properties": { "Event": "Flood Warning", "Severity": "Moderate" }
    },
    {
      "type": "Feature",
      "id": 102,
      "geometry": {
        "type": "Polygon",
        "coordinates": [[[-90.0, 38.0], [-88.0, 38.0], [-88.0, 40.0], [-90.0, 40.0], [-90.0, 38.0]]]
      },
      "properties": { "Event": "Flash Flood Watch", "Severity": "Severe" }
    },
    {
      "type": "Feature",
      "id": 103,
      "geometry": {
        "type": "MultiPolygon",
        "coordinates": [
          [[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0], [0.0, 0.0]]],
          [[[10.0, 0.0], [12.0, 0.0], [12.0, 2.0], [10.0, 2.0], [10.0, 0.0]]]
        ]
      },
      "properties": { "Event": "Flood Watch" }
    },
    {
      "type": "Feature",
      "id": 104,
      "geometry": { "type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]] },
      "properties": { "Event": "Flood Statement" }
    },
    {
      "type": "Feature",
      "id": 105,
      "geometry": null,
      "properties": { "Event": "Flood Advisory" }
    },
    {
      "type": "Feature",
      "id": 106,
      "geometry": { "type": "Point", "coordinates": [-95.0, 35.0] },
      "properties": { "Severity": "Minor" }
    }
  ]
}"#;

/// `f=json` (Esri JSON) drought response. The second feature has an outer
/// ring with a hole followed by a second, separate outer ring.
pub const DROUGHT_ESRI_JSON: &str = r#"{
  "objectIdFieldName": "OBJECTID",
  "geometryType": "esriGeometryPolygon",
  "spatialReference": { "wkid": 4326 },
  "features": [
    {
      "attributes": {
        "OBJECTID": 1, "period": "20240507", "dm": 0,
        "Shape__Area": 4.0, "Shape__Length": 8.0
      },
      "geometry": {
        "rings": [[[-100.0, 40.0], [-100.0, 42.0], [-98.0, 42.0], [-98.0, 40.0], [-100.0, 40.0]]]
      }
    },
    {
      "attributes": {
        "OBJECTID": 2, "period": "20240507", "dm": 3,
        "Shape__Area": 12.0, "Shape__Length": 24.0
      },
      "geometry": {
        "rings": [
          [[0.0, 0.0], [0.0, 4.0], [4.0, 4.0], [4.0, 0.0], [0.0, 0.0]],
          [[1.0, 1.0], [2.0, 1.0], [2.0, 2.0], [1.0, 2.0], [1.0, 1.0]],
          [[10.0, 0.0], [10.0, 2.0], [12.0, 2.0], [12.0, 0.0], [10.0, 0.0]]
        ]
      }
    },
    {
      "attributes": { "OBJECTID": 3, "period": "20240507", "dm": 9 },
      "geometry": { "rings": [] }
    }
  ]
}"#;

/// ArcGIS reports query errors with HTTP 200 and an `error` object.
pub const ARCGIS_ERROR_BODY: &str = r#"{
  "error": { "code": 400, "message": "Unable to complete operation.", "details": ["Invalid query"] }
}"#;

/// A valid JSON response without a `features` member.
pub const NO_FEATURES_BODY: &str = r#"{ "type": "FeatureCollection" }"#;
