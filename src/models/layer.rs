use serde::{Deserialize, Serialize};
use std::fmt;

/// Tile protocol a descriptor is served with. Anything the registry cannot
/// build a source for lands in `Unsupported` and is skipped at build time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Protocol {
    Wms,
    Wmts,
    Unsupported(String),
}

impl From<String> for Protocol {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "WMS" => Protocol::Wms,
            "WMTS" => Protocol::Wmts,
            _ => Protocol::Unsupported(value),
        }
    }
}

impl From<Protocol> for String {
    fn from(protocol: Protocol) -> Self {
        protocol.to_string()
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Wms => f.write_str("WMS"),
            Protocol::Wmts => f.write_str("WMTS"),
            Protocol::Unsupported(name) => f.write_str(name),
        }
    }
}

/// Which group a layer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerRole {
    Base,
    Product,
    Overlay,
}

impl LayerRole {
    pub const ALL: [LayerRole; 3] = [LayerRole::Base, LayerRole::Product, LayerRole::Overlay];
}

impl fmt::Display for LayerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerRole::Base => f.write_str("base"),
            LayerRole::Product => f.write_str("product"),
            LayerRole::Overlay => f.write_str("overlay"),
        }
    }
}

/// Static description of a layer before it is materialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDescriptor {
    pub id: String,
    pub protocol: Protocol,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub visible: bool,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub matrix_set: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub projection: Option<String>,
    #[serde(default)]
    pub attribution: Option<String>,
    #[serde(default)]
    pub time_enabled: bool,
}

fn default_opacity() -> f64 {
    1.0
}

impl LayerDescriptor {
    pub fn new(id: impl Into<String>, protocol: Protocol, urls: Vec<String>) -> Self {
        LayerDescriptor {
            id: id.into(),
            protocol,
            urls,
            visible: false,
            opacity: default_opacity(),
            style: None,
            matrix_set: None,
            format: None,
            projection: None,
            attribution: None,
            time_enabled: false,
        }
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn time_enabled(mut self, time_enabled: bool) -> Self {
        self.time_enabled = time_enabled;
        self
    }

    pub fn with_matrix_set(mut self, matrix_set: impl Into<String>) -> Self {
        self.matrix_set = Some(matrix_set.into());
        self
    }

    pub fn with_attribution(mut self, attribution: impl Into<String>) -> Self {
        self.attribution = Some(attribution.into());
        self
    }
}
