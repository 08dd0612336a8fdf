use crate::layers::registry::LayerRegistry;
use crate::models::layer::LayerRole;
use comfy_table::{Attribute, Cell, CellAlignment, Table};

fn header(name: &str) -> Cell {
    Cell::new(name)
        .add_attribute(Attribute::Bold)
        .set_alignment(CellAlignment::Center)
}

fn flag(value: bool) -> Cell {
    Cell::new(if value { "✅" } else { "" }).set_alignment(CellAlignment::Center)
}

/// One row per configured descriptor, in descriptor order within each role,
/// with a warning marker for descriptors that produced no live layer.
pub fn layer_summary(registry: &LayerRegistry) -> Table {
    let mut table = Table::new();
    table
        .set_header(vec![
            header(""),
            header("Role"),
            header("Layer"),
            header("Protocol"),
            header("Visible"),
            header("Opacity"),
            header("Time"),
        ])
        .load_preset(comfy_table::presets::ASCII_BORDERS_ONLY_CONDENSED);

    for role in LayerRole::ALL {
        for desc in registry.descriptors(role) {
            let built = registry.group(role).get(&desc.id).is_some();
            table.add_row(vec![
                Cell::new(if built { "✅" } else { "⚠️" }).set_alignment(CellAlignment::Center),
                Cell::new(role),
                Cell::new(&desc.id),
                Cell::new(&desc.protocol).set_alignment(CellAlignment::Center),
                flag(desc.visible),
                Cell::new(format!("{:.2}", desc.opacity)).set_alignment(CellAlignment::Center),
                flag(desc.time_enabled),
            ]);
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::layer::{LayerDescriptor, Protocol};

    #[test]
    fn lists_every_descriptor() {
        let registry = LayerRegistry::new(
            vec![LayerDescriptor::new("terrain", Protocol::Wmts, vec!["u".into()]).visible(true)],
            vec![LayerDescriptor::new("ndvi", Protocol::Wms, vec!["u".into()])],
            vec![LayerDescriptor::new("grid", Protocol::from("KML".to_string()), Vec::new())],
        );
        let table = layer_summary(&registry);
        assert_eq!(table.row_iter().count(), 3);

        let rendered = table.to_string();
        assert!(rendered.contains("terrain"));
        assert!(rendered.contains("ndvi"));
        assert!(rendered.contains("KML"));
        assert!(rendered.contains("⚠️"));
    }
}
