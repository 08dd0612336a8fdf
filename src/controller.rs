//! The map view: viewport, layer groups and selection wired to the bus.

use crate::config::{Config, SelectionStyle};
use crate::geojson;
use crate::layers::registry::LayerRegistry;
use crate::models::{
    events::{
        CenterRequest, LayerChange, MapEvent, Notification, OpacityUpdate, SelectionActivation,
        topics,
    },
    geometry::Extent,
    layer::LayerRole,
    time::TimeWindow,
    viewport::Viewport,
};
use crate::selection::{
    SelectionController,
    tool::{DrawingTool, SelectionMode},
};
use crate::traits::{EventBus, FileSaver};
use crate::utils::{coordinates::format_coordinate, status::layer_summary};
use anyhow::{Context, anyhow};
use geo::BoundingRect;
use geo_types::{Coord, Geometry};
use serde_json::Value;
use tracing::{debug, info, warn};

pub const EXPORT_FILE_NAME: &str = "selection.geojson";
pub const EXPORT_MIME_TYPE: &str = "text/plain;charset=utf-8";

pub struct MapController<B, S> {
    viewport: Viewport,
    registry: LayerRegistry,
    selection: SelectionController,
    selection_style: SelectionStyle,
    bus: B,
    saver: S,
}

impl<B: EventBus, S: FileSaver> MapController<B, S> {
    /// Build the layer groups, mount them and announce the products that
    /// start out visible.
    pub fn new(config: Config, bus: B, saver: S) -> Self {
        let registry = LayerRegistry::new(config.base_layers, config.products, config.overlays);
        debug!("layers:\n{}", layer_summary(&registry));

        let (x, y) = config.center;
        let mut controller = MapController {
            viewport: Viewport::new(Coord { x, y }, config.zoom, config.size),
            registry,
            selection: SelectionController::new(),
            selection_style: config.selection_style,
            bus,
            saver,
        };

        let visible_products: Vec<String> = controller
            .registry
            .descriptors(LayerRole::Product)
            .iter()
            .filter(|desc| desc.visible)
            .map(|desc| desc.id.clone())
            .collect();
        for id in visible_products {
            controller.bus.publish(Notification::LayerChange(LayerChange {
                id,
                is_base_layer: false,
                visible: true,
            }));
        }
        controller.registry.reorder(LayerRole::Product);

        info!(
            "map mounted at {} zoom {}",
            format_coordinate(controller.viewport.center()),
            controller.viewport.zoom()
        );
        controller
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    /// Descriptor edits made through here should be followed by the matching
    /// bus event (e.g. `productCollection:sortUpdated`).
    pub fn registry_mut(&mut self) -> &mut LayerRegistry {
        &mut self.registry
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn selection_style(&self) -> &SelectionStyle {
        &self.selection_style
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn saver(&self) -> &S {
        &self.saver
    }

    /// Dispatch one inbound bus event. Errors are contract violations by the
    /// sender (bad center input, unknown tool) or a failed export; the
    /// controller state is unchanged in the first two cases.
    pub fn handle(&mut self, event: MapEvent) -> anyhow::Result<()> {
        debug!("handling {}", event.topic());
        match event {
            MapEvent::Center(request) => self.center_map(&request)?,
            MapEvent::LayerChange(change) => {
                self.change_layer(&change);
            }
            MapEvent::SetExtent(extent) => {
                self.set_extent(&extent);
            }
            MapEvent::ProductsSorted => self.sort_products(),
            MapEvent::UpdateOpacity(update) => {
                self.update_opacity(&update);
            }
            MapEvent::SelectionActivated(activation) => self.selection_activated(&activation)?,
            MapEvent::LoadGeoJson(payload) => {
                self.load_geojson(&payload);
            }
            MapEvent::ExportGeoJson => self.export_geojson()?,
            MapEvent::TimeChange(window) => {
                self.change_time(&window);
            }
        }
        Ok(())
    }

    /// Decode and dispatch a raw `(topic, payload)` bus message.
    pub fn handle_message(&mut self, topic: &str, payload: Value) -> anyhow::Result<()> {
        let event = MapEvent::decode(topic, payload)
            .with_context(|| format!("Failed to decode '{}' payload", topic))?;
        self.handle(event)
    }

    /// Synchronous request/response handlers.
    pub fn request(&self, topic: &str) -> Option<Value> {
        match topic {
            topics::GET_EXTENT => serde_json::to_value(self.get_extent()).ok(),
            topics::GET_SELECTION_JSON => Some(self.get_selection_json()),
            _ => None,
        }
    }

    fn moved(&mut self) {
        let center = self.viewport.center();
        self.bus.publish(Notification::SetUrl {
            x: center.x,
            y: center.y,
            l: self.viewport.zoom(),
        });
        self.bus
            .publish(Notification::PositionChange(self.viewport.extent()));
    }

    fn flush_selection(&mut self) {
        for change in self.selection.take_changes() {
            self.bus.publish(Notification::SelectionChanged(change));
        }
    }

    /// Pan/zoom by the user.
    pub fn move_to(&mut self, center: Coord<f64>, zoom: i32) {
        self.viewport.set_center(center);
        self.viewport.set_zoom(zoom);
        self.moved();
    }

    pub fn center_map(&mut self, request: &CenterRequest) -> anyhow::Result<()> {
        let (center, zoom) = request.parse()?;
        self.move_to(center, zoom);
        Ok(())
    }

    /// Fit the view to `extent` at the current pixel size. False when the
    /// extent cannot be fitted.
    pub fn set_extent(&mut self, extent: &Extent) -> bool {
        if !self.viewport.fit(extent) {
            warn!("cannot fit view to {:?}", extent);
            return false;
        }
        self.moved();
        true
    }

    pub fn get_extent(&self) -> Extent {
        self.viewport.extent()
    }

    pub fn change_layer(&mut self, change: &LayerChange) -> bool {
        if change.is_base_layer {
            return self
                .registry
                .set_visibility(LayerRole::Base, &change.id, change.visible);
        }
        match self.registry.find_role(&change.id) {
            Some(role @ (LayerRole::Product | LayerRole::Overlay)) => {
                self.registry.set_visibility(role, &change.id, change.visible)
            }
            _ => {
                warn!("no product or overlay '{}'", change.id);
                false
            }
        }
    }

    pub fn sort_products(&mut self) {
        self.registry.reorder(LayerRole::Product);
    }

    pub fn update_opacity(&mut self, update: &OpacityUpdate) -> bool {
        self.registry.set_opacity(&update.product_id, update.value)
    }

    pub fn change_time(&mut self, window: &TimeWindow) -> usize {
        self.registry.set_time_window(window)
    }

    pub fn activate_tool(&mut self, tool: DrawingTool, mode: SelectionMode) {
        self.selection.activate(tool, mode);
        self.flush_selection();
    }

    pub fn deactivate_tool(&mut self) {
        self.selection.deactivate();
        self.flush_selection();
    }

    pub fn selection_activated(&mut self, activation: &SelectionActivation) -> anyhow::Result<()> {
        if !activation.active {
            self.deactivate_tool();
            return Ok(());
        }
        let id = activation
            .id
            .as_deref()
            .ok_or_else(|| anyhow!("selection activated without a tool id"))?;
        let tool = id.parse::<DrawingTool>().inspect_err(|err| warn!("{}", err))?;
        self.activate_tool(tool, SelectionMode::from_bus(activation.selection_type.as_deref()));
        Ok(())
    }

    /// Sketch completed by the active point, line or polygon tool.
    pub fn finish_sketch(&mut self, geometry: Geometry<f64>) -> bool {
        let accepted = self.selection.finish_sketch(geometry);
        self.flush_selection();
        accepted
    }

    pub fn box_start(&mut self, coord: Coord<f64>) -> bool {
        self.selection.box_start(coord)
    }

    pub fn box_end(&mut self, coord: Coord<f64>) -> bool {
        let accepted = self.selection.box_end(coord);
        self.flush_selection();
        accepted
    }

    /// Replace the selection with the features of a GeoJSON object and fit
    /// the view around them. Returns the number of features loaded; invalid
    /// input loads none and leaves the view alone.
    pub fn load_geojson(&mut self, payload: &Value) -> usize {
        let features = geojson::read_features(payload).unwrap_or_else(|err| {
            warn!("ignoring GeoJSON import: {:#}", err);
            Vec::new()
        });

        let bounds = features
            .iter()
            .filter_map(|feature| feature.geometry.bounding_rect())
            .map(Extent::from)
            .reduce(|acc, extent| acc.extend(&extent));

        let count = features.len();
        self.selection.replace_features(features);
        self.flush_selection();

        if let Some(bounds) = bounds {
            self.set_extent(&bounds);
        }
        info!("loaded {} features from GeoJSON", count);
        count
    }

    pub fn get_selection_json(&self) -> Value {
        geojson::write_features(self.selection.features())
    }

    pub fn export_geojson(&mut self) -> anyhow::Result<()> {
        let text = geojson::write_features_string(self.selection.features())?;
        self.saver
            .save(EXPORT_FILE_NAME, EXPORT_MIME_TYPE, text.as_bytes())
            .context("Failed to save selection export")
    }

    /// Pointer coordinate readout.
    pub fn pointer_position(&self, coord: Coord<f64>) -> String {
        format_coordinate(coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::MemoryBus;
    use crate::models::layer::{LayerDescriptor, Protocol};
    use crate::utils::files::DiskSaver;
    use geo_types::{Point, coord, line_string};
    use serde_json::json;

    #[derive(Default)]
    struct RecordingSaver {
        saved: Vec<(String, String, Vec<u8>)>,
    }

    impl FileSaver for RecordingSaver {
        fn save(&mut self, file_name: &str, mime_type: &str, contents: &[u8]) -> anyhow::Result<()> {
            self.saved
                .push((file_name.to_string(), mime_type.to_string(), contents.to_vec()));
            Ok(())
        }
    }

    fn config() -> Config {
        Config {
            base_layers: vec![
                LayerDescriptor::new("terrain", Protocol::Wmts, vec!["https://t.example".into()])
                    .visible(true),
                LayerDescriptor::new("imagery", Protocol::Wmts, vec!["https://i.example".into()]),
            ],
            products: vec![
                LayerDescriptor::new("ndvi", Protocol::Wms, vec!["https://p.example/ows".into()])
                    .time_enabled(true)
                    .visible(true),
                LayerDescriptor::new("sst", Protocol::Wmts, vec!["https://p.example/wmts".into()])
                    .time_enabled(true),
                LayerDescriptor::new("landcover", Protocol::Wms, vec!["https://p.example/ows".into()]),
            ],
            overlays: vec![LayerDescriptor::new(
                "borders",
                Protocol::Wms,
                vec!["https://o.example/ows".into()],
            )],
            ..Config::default()
        }
    }

    fn controller() -> MapController<MemoryBus, RecordingSaver> {
        let mut map = MapController::new(config(), MemoryBus::new(), RecordingSaver::default());
        map.bus_mut().drain();
        map
    }

    fn last_selection(map: &MapController<MemoryBus, RecordingSaver>) -> Option<Value> {
        map.bus()
            .on_topic(topics::SELECTION_CHANGED)
            .last()
            .map(Notification::payload)
    }

    #[test]
    fn mount_announces_visible_products_and_sorts() {
        let map = MapController::new(config(), MemoryBus::new(), RecordingSaver::default());
        let announced: Vec<_> = map.bus().on_topic(topics::MAP_LAYER_CHANGE).collect();
        assert_eq!(announced.len(), 1);
        assert_eq!(
            announced[0].payload(),
            json!({ "id": "ndvi", "isBaseLayer": false, "visible": true })
        );
        assert_eq!(
            map.registry().group(LayerRole::Product).ids(),
            vec!["landcover", "sst", "ndvi"]
        );
        assert_eq!(map.viewport().center(), coord! { x: 9.0, y: 45.0 });
        assert_eq!(map.viewport().zoom(), 6);
        assert_eq!(map.selection_style().point_radius, 7.0);
    }

    #[test]
    fn center_publishes_url_and_position() {
        let mut map = controller();
        map.handle_message("map:center", json!({ "x": "12.5", "y": "41.9", "l": "8" }))
            .unwrap();
        assert_eq!(map.viewport().center(), coord! { x: 12.5, y: 41.9 });
        assert_eq!(map.viewport().zoom(), 8);

        let published = map.bus().published();
        assert_eq!(published.len(), 2);
        assert_eq!(
            published[0],
            Notification::SetUrl {
                x: 12.5,
                y: 41.9,
                l: 8
            }
        );
        assert_eq!(published[1], Notification::PositionChange(map.get_extent()));
    }

    #[test]
    fn invalid_center_fails_without_change() {
        let mut map = controller();
        let before = map.viewport().clone();
        let result = map.handle(MapEvent::Center(CenterRequest {
            x: json!(10),
            y: json!("north"),
            l: json!(4),
        }));
        assert!(result.is_err());
        assert_eq!(map.viewport(), &before);
        assert!(map.bus().published().is_empty());
    }

    #[test]
    fn user_moves_publish_too() {
        let mut map = controller();
        map.move_to(coord! { x: 0.0, y: 0.0 }, 2);
        assert_eq!(map.bus().on_topic(topics::ROUTER_SET_URL).count(), 1);
        assert_eq!(map.bus().on_topic(topics::MAP_POSITION_CHANGE).count(), 1);
    }

    #[test]
    fn set_extent_fits_and_extent_request_answers() {
        let mut map = controller();
        let target = Extent::from((10.0, 40.0, 20.0, 45.0));
        map.handle_message(
            "map:set:extent",
            json!({ "left": 10.0, "bottom": 40.0, "right": 20.0, "top": 45.0 }),
        )
        .unwrap();
        assert!(map.get_extent().contains(&target));
        assert_eq!(map.viewport().size(), (1024, 768));

        let answer = map.request("map:get:extent").unwrap();
        assert_eq!(answer["left"], json!(map.get_extent().left));
        assert_eq!(answer["top"], json!(map.get_extent().top));
        assert!(map.request("map:get:zoom").is_none());
    }

    #[test]
    fn layer_changes_route_by_role() {
        let mut map = controller();
        map.handle_message(
            "map:layer:change",
            json!({ "id": "imagery", "isBaseLayer": true, "visible": true }),
        )
        .unwrap();
        assert_eq!(map.registry().visible_base(), Some("imagery"));
        assert!(!map.registry().group(LayerRole::Base).get("terrain").unwrap().visible);

        map.handle_message(
            "map:layer:change",
            json!({ "id": "borders", "isBaseLayer": false, "visible": true }),
        )
        .unwrap();
        assert!(map.registry().group(LayerRole::Overlay).get("borders").unwrap().visible);

        map.handle_message(
            "map:layer:change",
            json!({ "id": "ndvi", "isBaseLayer": false, "visible": false }),
        )
        .unwrap();
        assert!(!map.registry().group(LayerRole::Product).get("ndvi").unwrap().visible);

        assert!(!map.change_layer(&LayerChange {
            id: "nowhere".into(),
            is_base_layer: false,
            visible: true,
        }));
    }

    #[test]
    fn sort_and_opacity_events() {
        let mut map = controller();
        let products = map.registry_mut().descriptors_mut(LayerRole::Product);
        products.reverse();
        map.handle(MapEvent::ProductsSorted).unwrap();
        assert_eq!(
            map.registry().group(LayerRole::Product).ids(),
            vec!["ndvi", "sst", "landcover"]
        );

        map.handle_message(
            "productCollection:updateOpacity",
            json!({ "model": "sst", "value": 0.3 }),
        )
        .unwrap();
        assert_eq!(map.registry().group(LayerRole::Product).get("sst").unwrap().opacity, 0.3);
    }

    #[test]
    fn time_change_updates_time_enabled_layers() {
        let mut map = controller();
        map.handle_message(
            "time:change",
            json!({ "start": "2020-01-01T00:00:00Z", "end": "2020-01-02T00:00:00Z" }),
        )
        .unwrap();
        let products = map.registry().group(LayerRole::Product);
        for id in ["ndvi", "sst"] {
            assert_eq!(
                products.get(id).unwrap().source.time(),
                Some("2020-01-01T00:00:00Z/2020-01-02T00:00:00Z")
            );
        }
        assert!(products.get("landcover").unwrap().source.time().is_none());
    }

    #[test]
    fn single_selection_reports_the_last_drawing() {
        let mut map = controller();
        map.handle_message(
            "selection:activated",
            json!({ "active": true, "id": "pointSelection", "selectionType": "single" }),
        )
        .unwrap();
        assert_eq!(last_selection(&map), Some(Value::Null));

        assert!(map.finish_sketch(Point::new(1.0, 2.0).into()));
        assert!(map.finish_sketch(Point::new(3.0, 4.0).into()));
        assert_eq!(map.selection().features().len(), 1);
        assert_eq!(
            last_selection(&map),
            Some(json!({ "type": "Point", "coordinates": [3.0, 4.0] }))
        );
    }

    #[test]
    fn box_drag_in_single_mode() {
        let mut map = controller();
        map.activate_tool(DrawingTool::Box, SelectionMode::Single);
        assert!(map.box_start(coord! { x: 0.0, y: 0.0 }));
        assert!(map.box_end(coord! { x: 10.0, y: 20.0 }));

        assert_eq!(map.selection().features().len(), 1);
        assert_eq!(
            last_selection(&map),
            Some(json!({
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0], [0.0, 20.0], [10.0, 20.0], [10.0, 0.0], [0.0, 0.0]]]
            }))
        );
    }

    #[test]
    fn deactivation_and_unknown_tools() {
        let mut map = controller();
        map.activate_tool(DrawingTool::Polygon, SelectionMode::Multi);
        map.bus_mut().drain();

        let err = map.handle_message(
            "selection:activated",
            json!({ "active": true, "id": "lassoSelection", "selectionType": "single" }),
        );
        assert!(err.is_err());
        assert_eq!(map.selection().active_tool(), Some(DrawingTool::Polygon));
        assert!(map.bus().published().is_empty());

        map.handle_message("selection:activated", json!({ "active": false }))
            .unwrap();
        assert!(map.selection().active_tool().is_none());
        assert_eq!(last_selection(&map), Some(Value::Null));
    }

    #[test]
    fn load_geojson_replaces_features_and_fits() {
        let mut map = controller();
        map.activate_tool(DrawingTool::Point, SelectionMode::Multi);
        map.finish_sketch(Point::new(50.0, 50.0).into());
        map.bus_mut().drain();

        let loaded = map.load_geojson(&json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [10.0, 40.0] }, "properties": null },
                { "type": "Feature", "geometry": { "type": "LineString", "coordinates": [[12.0, 41.0], [20.0, 45.0]] }, "properties": null }
            ]
        }));
        assert_eq!(loaded, 2);
        assert_eq!(map.selection().features().len(), 2);
        assert!(map.get_extent().contains(&Extent::from((10.0, 40.0, 20.0, 45.0))));
        assert_eq!(map.viewport().center(), coord! { x: 15.0, y: 42.5 });
        assert_eq!(
            last_selection(&map),
            Some(json!({ "type": "LineString", "coordinates": [[12.0, 41.0], [20.0, 45.0]] }))
        );
        assert_eq!(map.bus().on_topic(topics::ROUTER_SET_URL).count(), 1);
    }

    #[test]
    fn empty_or_invalid_geojson_clears_without_moving() {
        let mut map = controller();
        map.finish_sketch(Point::new(1.0, 1.0).into());
        map.load_geojson(&json!({
            "type": "FeatureCollection",
            "features": [{ "type": "Feature", "geometry": { "type": "Point", "coordinates": [1.0, 1.0] }, "properties": null }]
        }));
        let view = map.viewport().clone();
        map.bus_mut().drain();

        assert_eq!(
            map.load_geojson(&json!({ "type": "FeatureCollection", "features": [] })),
            0
        );
        assert!(map.selection().features().is_empty());
        assert_eq!(map.viewport(), &view);
        assert_eq!(map.bus().on_topic(topics::MAP_POSITION_CHANGE).count(), 0);

        assert_eq!(map.load_geojson(&json!("not geojson")), 0);
        assert!(map.selection().features().is_empty());
        assert_eq!(map.viewport(), &view);
    }

    #[test]
    fn export_hands_text_to_the_saver() {
        let mut map = controller();
        map.activate_tool(DrawingTool::Point, SelectionMode::Multi);
        map.finish_sketch(Point::new(9.5, 45.5).into());
        map.handle(MapEvent::ExportGeoJson).unwrap();

        let (name, mime, contents) = &map.saver().saved[0];
        assert_eq!(name, "selection.geojson");
        assert_eq!(mime, "text/plain;charset=utf-8");
        let written: Value = serde_json::from_slice(contents).unwrap();
        assert_eq!(written, map.get_selection_json());
        assert_eq!(map.request("get:selection:json"), Some(written));
    }

    #[test]
    fn export_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut map = MapController::new(config(), MemoryBus::new(), DiskSaver::new(dir.path()));
        map.activate_tool(DrawingTool::Line, SelectionMode::Single);
        map.finish_sketch(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)].into());
        map.export_geojson().unwrap();

        let text = std::fs::read_to_string(dir.path().join(EXPORT_FILE_NAME)).unwrap();
        let features = geojson::read_features_str(&text).unwrap();
        assert_eq!(features, map.selection().features());
    }

    #[test]
    fn pointer_readout() {
        let map = controller();
        assert_eq!(map.pointer_position(coord! { x: 9.0, y: 45.0 }), "9.0000, 45.0000");
    }
}
