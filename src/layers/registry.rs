//! Descriptor collections per role and the live layer groups built from them.

use crate::layers::{LayerGroup, grid::TileGrid};
use crate::models::{
    layer::{LayerDescriptor, LayerRole},
    time::TimeWindow,
};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct RoleSet {
    descriptors: Vec<LayerDescriptor>,
    group: LayerGroup,
}

/// Hide every visible base descriptor after the first one.
fn keep_first_visible(descriptors: &mut [LayerDescriptor]) {
    let mut seen_visible = false;
    for desc in descriptors.iter_mut().filter(|desc| desc.visible) {
        if seen_visible {
            warn!("base layer '{}' visible as well, hiding it", desc.id);
            desc.visible = false;
        }
        seen_visible = true;
    }
}

impl RoleSet {
    fn build(role: LayerRole, mut descriptors: Vec<LayerDescriptor>, grid: &Rc<TileGrid>) -> Self {
        if role == LayerRole::Base {
            keep_first_visible(&mut descriptors);
        }
        let group = LayerGroup::build(role, &descriptors, grid);
        RoleSet { descriptors, group }
    }

    /// Mirror the descriptors onto the live layers. Base descriptors are
    /// brought back to at most one visible first.
    fn sync(&mut self) {
        if self.group.role() == LayerRole::Base {
            keep_first_visible(&mut self.descriptors);
        }
        for desc in &self.descriptors {
            if let Some(layer) = self.group.get_mut(&desc.id) {
                layer.mirror(desc);
            }
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.descriptors.iter().any(|desc| desc.id == id)
    }
}

/// Owns every descriptor and every live layer. Base layers behave like radio
/// buttons, products and overlays like check boxes.
#[derive(Debug, Clone)]
pub struct LayerRegistry {
    grid: Rc<TileGrid>,
    base: RoleSet,
    products: RoleSet,
    overlays: RoleSet,
}

impl LayerRegistry {
    pub fn new(
        base: Vec<LayerDescriptor>,
        products: Vec<LayerDescriptor>,
        overlays: Vec<LayerDescriptor>,
    ) -> Self {
        let grid = Rc::new(TileGrid::geographic());
        LayerRegistry {
            base: RoleSet::build(LayerRole::Base, base, &grid),
            products: RoleSet::build(LayerRole::Product, products, &grid),
            overlays: RoleSet::build(LayerRole::Overlay, overlays, &grid),
            grid,
        }
    }

    fn set(&self, role: LayerRole) -> &RoleSet {
        match role {
            LayerRole::Base => &self.base,
            LayerRole::Product => &self.products,
            LayerRole::Overlay => &self.overlays,
        }
    }

    fn set_mut(&mut self, role: LayerRole) -> &mut RoleSet {
        match role {
            LayerRole::Base => &mut self.base,
            LayerRole::Product => &mut self.products,
            LayerRole::Overlay => &mut self.overlays,
        }
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn group(&self, role: LayerRole) -> &LayerGroup {
        &self.set(role).group
    }

    pub fn descriptors(&self, role: LayerRole) -> &[LayerDescriptor] {
        &self.set(role).descriptors
    }

    /// Mutable access to a descriptor collection, e.g. for re-sorting the
    /// products. Follow up with [`LayerRegistry::reorder`] or
    /// [`LayerRegistry::sync`] so the live layers catch up.
    pub fn descriptors_mut(&mut self, role: LayerRole) -> &mut Vec<LayerDescriptor> {
        &mut self.set_mut(role).descriptors
    }

    /// Which role holds `id`; products win over overlays, overlays over base.
    pub fn find_role(&self, id: &str) -> Option<LayerRole> {
        [LayerRole::Product, LayerRole::Overlay, LayerRole::Base]
            .into_iter()
            .find(|role| self.set(*role).contains(id))
    }

    pub fn visible_base(&self) -> Option<&str> {
        self.base
            .descriptors
            .iter()
            .find(|desc| desc.visible)
            .map(|desc| desc.id.as_str())
    }

    /// Re-mirror visibility and opacity from the descriptors of `role`. For
    /// the base role only the first visible descriptor stays visible.
    pub fn sync(&mut self, role: LayerRole) {
        self.set_mut(role).sync();
    }

    /// Returns false when `id` is not a descriptor of `role`.
    pub fn set_visibility(&mut self, role: LayerRole, id: &str, visible: bool) -> bool {
        let set = self.set_mut(role);
        if !set.contains(id) {
            warn!("no {} layer '{}', visibility unchanged", role, id);
            return false;
        }

        for desc in &mut set.descriptors {
            if desc.id == id {
                desc.visible = visible;
            } else if role == LayerRole::Base {
                desc.visible = false;
            }
        }
        set.sync();
        debug!("{} layer '{}' visible={}", role, id, visible);
        true
    }

    /// Opacity of a product layer, clamped to [0, 1].
    pub fn set_opacity(&mut self, product_id: &str, opacity: f64) -> bool {
        if opacity.is_nan() {
            warn!("ignoring NaN opacity for '{}'", product_id);
            return false;
        }
        let opacity = opacity.clamp(0.0, 1.0);
        let set = &mut self.products;
        let Some(desc) = set.descriptors.iter_mut().find(|d| d.id == product_id) else {
            debug!("no product '{}', opacity unchanged", product_id);
            return false;
        };
        desc.opacity = opacity;
        match set.group.get_mut(product_id) {
            Some(layer) => {
                layer.opacity = opacity;
                true
            }
            None => false,
        }
    }

    /// Re-derive the stacking order of `role` from its descriptor order: the
    /// first descriptor ends up on top. Stable, so repeating it is a no-op.
    pub fn reorder(&mut self, role: LayerRole) {
        let set = self.set_mut(role);
        let count = set.descriptors.len();
        let ranks: HashMap<&str, usize> = set
            .descriptors
            .iter()
            .enumerate()
            .map(|(i, desc)| (desc.id.as_str(), count - (i + 1)))
            .collect();

        set.group
            .layers
            .sort_by_key(|layer| match ranks.get(layer.id.as_str()) {
                Some(rank) => (false, *rank),
                None => (true, 0),
            });
        set.sync();
        debug!("{} layers sorted: {:?}", role, set.group.ids());
    }

    /// Push the interval to every time-enabled layer. Returns how many
    /// sources were updated.
    pub fn set_time_window(&mut self, window: &TimeWindow) -> usize {
        let interval = window.interval();
        let mut updated = 0;
        for role in LayerRole::ALL {
            let RoleSet { descriptors, group } = self.set_mut(role);
            for desc in descriptors.iter().filter(|desc| desc.time_enabled) {
                if let Some(layer) = group.get_mut(&desc.id) {
                    layer.source.set_time(&interval);
                    updated += 1;
                }
            }
        }
        debug!("time window {} applied to {} layers", interval, updated);
        updated
    }
}
