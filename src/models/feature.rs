use geo_types::Geometry;
use geojson::feature::Id;
use serde_json::{Map, Value};

/// One selection geometry plus whatever attributes it was imported with.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<Id>,
    pub geometry: Geometry<f64>,
    pub properties: Option<Map<String, Value>>,
}

impl Feature {
    pub fn new(geometry: impl Into<Geometry<f64>>) -> Self {
        Feature {
            id: None,
            geometry: geometry.into(),
            properties: None,
        }
    }
}
