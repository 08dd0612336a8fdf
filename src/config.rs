use crate::models::layer::LayerDescriptor;
use serde::Deserialize;

/// How drawn and imported selection features are styled by the engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelectionStyle {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub point_radius: f64,
}

impl Default for SelectionStyle {
    fn default() -> Self {
        SelectionStyle {
            fill: "rgba(255, 255, 255, 0.2)".to_string(),
            stroke: "#ffcc33".to_string(),
            stroke_width: 2.0,
            point_radius: 7.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub center: (f64, f64),
    pub zoom: i32,
    /// Viewport size in pixels.
    pub size: (u32, u32),
    pub base_layers: Vec<LayerDescriptor>,
    pub products: Vec<LayerDescriptor>,
    pub overlays: Vec<LayerDescriptor>,
    pub selection_style: SelectionStyle,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            center: (9.0, 45.0),
            zoom: 6,
            size: (1024, 768),
            base_layers: Vec::new(),
            products: Vec::new(),
            overlays: Vec::new(),
            selection_style: SelectionStyle::default(),
        }
    }
}
