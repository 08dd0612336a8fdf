pub mod grid;
pub mod registry;
pub mod source;

use crate::models::layer::{LayerDescriptor, LayerRole};
use grid::TileGrid;
use source::TileSource;
use std::rc::Rc;

/// Materialized, renderable counterpart of a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveLayer {
    pub id: String,
    pub visible: bool,
    pub opacity: f64,
    pub attribution: Option<String>,
    pub source: TileSource,
}

impl LiveLayer {
    pub fn build(desc: &LayerDescriptor, grid: &Rc<TileGrid>) -> Option<Self> {
        let source = TileSource::for_descriptor(desc, grid)?;
        Some(LiveLayer {
            id: desc.id.clone(),
            visible: desc.visible,
            opacity: desc.opacity,
            attribution: desc.attribution.clone(),
            source,
        })
    }

    fn mirror(&mut self, desc: &LayerDescriptor) {
        self.visible = desc.visible;
        self.opacity = desc.opacity;
    }
}

/// Live layers of one role, bottom first: the last layer draws on top.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerGroup {
    role: LayerRole,
    layers: Vec<LiveLayer>,
}

impl LayerGroup {
    /// One live layer per descriptor, in descriptor order. Descriptors that
    /// cannot be built are left out.
    pub fn build(role: LayerRole, descriptors: &[LayerDescriptor], grid: &Rc<TileGrid>) -> Self {
        let layers = descriptors
            .iter()
            .filter_map(|desc| LiveLayer::build(desc, grid))
            .collect();
        LayerGroup { role, layers }
    }

    pub fn role(&self) -> LayerRole {
        self.role
    }

    pub fn layers(&self) -> &[LiveLayer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&LiveLayer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut LiveLayer> {
        self.layers.iter_mut().find(|layer| layer.id == id)
    }

    /// Layer ids bottom to top.
    pub fn ids(&self) -> Vec<&str> {
        self.layers.iter().map(|layer| layer.id.as_str()).collect()
    }
}
