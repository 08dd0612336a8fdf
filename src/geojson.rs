//! Conversion between the selection feature set and GeoJSON.
//!
//! Only the geometry kinds the drawing tools can produce are supported:
//! Point, LineString and Polygon (boxes are Polygons). Anything else is
//! skipped on import and written as a `null` geometry on export.

use crate::models::feature::Feature;
use anyhow::{Context, bail};
use geo_types::Geometry;
use serde_json::Value;
use tracing::warn;

fn is_selection_kind(geometry: &Geometry<f64>) -> bool {
    matches!(
        geometry,
        Geometry::Point(_) | Geometry::LineString(_) | Geometry::Polygon(_)
    )
}

fn check_position(position: &[f64]) -> anyhow::Result<()> {
    if position.len() < 2 {
        bail!("invalid position {:?}", position);
    }
    Ok(())
}

/// A selection kind with at least x and y in every position.
fn check_value(value: &::geojson::Value) -> anyhow::Result<()> {
    match value {
        ::geojson::Value::Point(position) => check_position(position),
        ::geojson::Value::LineString(line) => line.iter().try_for_each(|p| check_position(p)),
        ::geojson::Value::Polygon(rings) => {
            if rings.is_empty() {
                bail!("polygon without rings");
            }
            rings.iter().flatten().try_for_each(|p| check_position(p))
        }
        _ => bail!("only Point, LineString and Polygon geometries are supported"),
    }
}

fn to_geo(geometry: ::geojson::Geometry) -> anyhow::Result<Geometry<f64>> {
    check_value(&geometry.value)?;
    let geometry: Geometry<f64> = geometry.try_into()?;
    Ok(geometry)
}

fn to_geojson(geometry: &Geometry<f64>) -> Option<::geojson::Geometry> {
    is_selection_kind(geometry)
        .then(|| ::geojson::Geometry::new(::geojson::Value::from(geometry)))
}

/// GeoJSON geometry object, `None` for kinds the selection does not produce.
pub fn geometry_to_value(geometry: &Geometry<f64>) -> Option<Value> {
    to_geojson(geometry).and_then(|g| serde_json::to_value(g).ok())
}

pub fn geometry_from_value(value: &Value) -> anyhow::Result<Geometry<f64>> {
    let geometry = ::geojson::Geometry::from_json_value(value.clone())
        .context("malformed geometry")?;
    to_geo(geometry)
}

fn feature_to_value(feature: &Feature) -> Value {
    let exported = ::geojson::Feature {
        bbox: None,
        geometry: to_geojson(&feature.geometry),
        id: feature.id.clone(),
        properties: feature.properties.clone(),
        foreign_members: None,
    };
    let mut value = serde_json::to_value(exported).unwrap_or(Value::Null);
    if let (Value::Object(object), None) = (&mut value, &feature.properties) {
        object.insert("properties".into(), Value::Null);
    }
    value
}

fn feature_from_value(value: &Value) -> anyhow::Result<Feature> {
    let parsed = ::geojson::Feature::from_json_value(value.clone()).context("malformed feature")?;
    let geometry = parsed.geometry.context("feature without geometry")?;
    Ok(Feature {
        id: parsed.id,
        geometry: to_geo(geometry)?,
        properties: parsed.properties,
    })
}

fn keep_valid(feature: anyhow::Result<Feature>) -> Option<Feature> {
    feature
        .inspect_err(|err| warn!("skipping GeoJSON feature: {:#}", err))
        .ok()
}

/// Serialize the feature set as a FeatureCollection.
pub fn write_features(features: &[Feature]) -> Value {
    serde_json::json!({
        "type": "FeatureCollection",
        "features": features.iter().map(feature_to_value).collect::<Vec<_>>(),
    })
}

pub fn write_features_string(features: &[Feature]) -> anyhow::Result<String> {
    Ok(serde_json::to_string(&write_features(features))?)
}

/// Read a FeatureCollection, a single Feature or a bare geometry. Features
/// whose geometry is missing or unsupported are skipped; an object that is
/// not GeoJSON at all is an error.
pub fn read_features(value: &Value) -> anyhow::Result<Vec<Feature>> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .context("GeoJSON object without a type")?;

    match kind {
        "FeatureCollection" => {
            let members = value
                .get("features")
                .and_then(Value::as_array)
                .context("FeatureCollection without a features array")?;
            Ok(members
                .iter()
                .filter_map(|member| keep_valid(feature_from_value(member)))
                .collect())
        }
        "Feature" => Ok(keep_valid(feature_from_value(value)).into_iter().collect()),
        _ => Ok(vec![Feature::new(geometry_from_value(value)?)]),
    }
}

pub fn read_features_str(text: &str) -> anyhow::Result<Vec<Feature>> {
    let value: Value = serde_json::from_str(text).context("invalid GeoJSON text")?;
    read_features(&value)
}
