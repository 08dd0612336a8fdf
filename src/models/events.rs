//! Messages exchanged with the application event bus.
//!
//! Inbound [`MapEvent`]s are what the controller listens to, outbound
//! [`Notification`]s are what it publishes. Both map onto the bus topics the
//! rest of the client uses, so a transport can decode and encode them from
//! `(topic, JSON payload)` pairs.

use crate::geojson;
use crate::models::{geometry::Extent, time::TimeWindow};
use anyhow::{Context, anyhow, bail};
use geo_types::{Coord, Geometry};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod topics {
    pub const MAP_CENTER: &str = "map:center";
    pub const MAP_LAYER_CHANGE: &str = "map:layer:change";
    pub const MAP_SET_EXTENT: &str = "map:set:extent";
    pub const PRODUCTS_SORT_UPDATED: &str = "productCollection:sortUpdated";
    pub const PRODUCTS_UPDATE_OPACITY: &str = "productCollection:updateOpacity";
    pub const SELECTION_ACTIVATED: &str = "selection:activated";
    pub const MAP_LOAD_GEOJSON: &str = "map:load:geojson";
    pub const MAP_EXPORT_GEOJSON: &str = "map:export:geojson";
    pub const TIME_CHANGE: &str = "time:change";

    pub const ROUTER_SET_URL: &str = "router:setUrl";
    pub const MAP_POSITION_CHANGE: &str = "map:position:change";
    pub const SELECTION_CHANGED: &str = "selection:changed";

    pub const GET_EXTENT: &str = "map:get:extent";
    pub const GET_SELECTION_JSON: &str = "get:selection:json";
}

/// `map:center` payload. Values usually come straight from the URL router,
/// so they may be JSON numbers or numeric strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenterRequest {
    pub x: Value,
    pub y: Value,
    pub l: Value,
}

impl CenterRequest {
    pub fn new(x: f64, y: f64, zoom: i32) -> Self {
        CenterRequest {
            x: Value::from(x),
            y: Value::from(y),
            l: Value::from(zoom),
        }
    }

    /// Parse all three fields up front so a bad one leaves nothing half-applied.
    pub fn parse(&self) -> anyhow::Result<(Coord<f64>, i32)> {
        let x = parse_float(&self.x).context("invalid center x")?;
        let y = parse_float(&self.y).context("invalid center y")?;
        let zoom = parse_int(&self.l).context("invalid zoom level")?;
        Ok((Coord { x, y }, zoom))
    }
}

fn parse_float(value: &Value) -> anyhow::Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => bail!("expected a finite number, got {}", value),
    }
}

fn parse_int(value: &Value) -> anyhow::Result<i32> {
    if let Some(i) = value.as_i64() {
        return i32::try_from(i).map_err(|_| anyhow!("zoom {} out of range", i));
    }
    if let Value::String(s) = value {
        if let Ok(i) = s.trim().parse::<i32>() {
            return Ok(i);
        }
    }
    let v = parse_float(value)?;
    if v.abs() > i32::MAX as f64 {
        bail!("zoom {} out of range", v);
    }
    Ok(v.trunc() as i32)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerChange {
    pub id: String,
    #[serde(default)]
    pub is_base_layer: bool,
    #[serde(default)]
    pub visible: bool,
}

/// `productCollection:updateOpacity`; `model` names the product by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpacityUpdate {
    #[serde(rename = "model")]
    pub product_id: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionActivation {
    pub active: bool,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub selection_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    Center(CenterRequest),
    LayerChange(LayerChange),
    SetExtent(Extent),
    ProductsSorted,
    UpdateOpacity(OpacityUpdate),
    SelectionActivated(SelectionActivation),
    LoadGeoJson(Value),
    ExportGeoJson,
    TimeChange(TimeWindow),
}

impl MapEvent {
    pub fn topic(&self) -> &'static str {
        match self {
            MapEvent::Center(_) => topics::MAP_CENTER,
            MapEvent::LayerChange(_) => topics::MAP_LAYER_CHANGE,
            MapEvent::SetExtent(_) => topics::MAP_SET_EXTENT,
            MapEvent::ProductsSorted => topics::PRODUCTS_SORT_UPDATED,
            MapEvent::UpdateOpacity(_) => topics::PRODUCTS_UPDATE_OPACITY,
            MapEvent::SelectionActivated(_) => topics::SELECTION_ACTIVATED,
            MapEvent::LoadGeoJson(_) => topics::MAP_LOAD_GEOJSON,
            MapEvent::ExportGeoJson => topics::MAP_EXPORT_GEOJSON,
            MapEvent::TimeChange(_) => topics::TIME_CHANGE,
        }
    }

    /// Decode a bus message. Unknown topics are an error; the controller
    /// only subscribes to the topics listed in [`topics`].
    pub fn decode(topic: &str, payload: Value) -> anyhow::Result<Self> {
        let event = match topic {
            topics::MAP_CENTER => MapEvent::Center(serde_json::from_value(payload)?),
            topics::MAP_LAYER_CHANGE => MapEvent::LayerChange(serde_json::from_value(payload)?),
            topics::MAP_SET_EXTENT => MapEvent::SetExtent(serde_json::from_value(payload)?),
            topics::PRODUCTS_SORT_UPDATED => MapEvent::ProductsSorted,
            topics::PRODUCTS_UPDATE_OPACITY => {
                MapEvent::UpdateOpacity(serde_json::from_value(payload)?)
            }
            topics::SELECTION_ACTIVATED => {
                MapEvent::SelectionActivated(serde_json::from_value(payload)?)
            }
            topics::MAP_LOAD_GEOJSON => MapEvent::LoadGeoJson(payload),
            topics::MAP_EXPORT_GEOJSON => MapEvent::ExportGeoJson,
            topics::TIME_CHANGE => MapEvent::TimeChange(serde_json::from_value(payload)?),
            other => bail!("no handler for topic '{}'", other),
        };
        Ok(event)
    }
}

/// Everything the controller publishes.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    SetUrl { x: f64, y: f64, l: i32 },
    PositionChange(Extent),
    SelectionChanged(Option<Geometry<f64>>),
    LayerChange(LayerChange),
}

impl Notification {
    pub fn topic(&self) -> &'static str {
        match self {
            Notification::SetUrl { .. } => topics::ROUTER_SET_URL,
            Notification::PositionChange(_) => topics::MAP_POSITION_CHANGE,
            Notification::SelectionChanged(_) => topics::SELECTION_CHANGED,
            Notification::LayerChange(_) => topics::MAP_LAYER_CHANGE,
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            Notification::SetUrl { x, y, l } => serde_json::json!({ "x": x, "y": y, "l": l }),
            Notification::PositionChange(extent) => serde_json::json!({
                "left": extent.left,
                "bottom": extent.bottom,
                "right": extent.right,
                "top": extent.top,
            }),
            Notification::SelectionChanged(geometry) => geometry
                .as_ref()
                .and_then(geojson::geometry_to_value)
                .unwrap_or(Value::Null),
            Notification::LayerChange(change) => serde_json::json!({
                "id": change.id,
                "isBaseLayer": change.is_base_layer,
                "visible": change.visible,
            }),
        }
    }
}
