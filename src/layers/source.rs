use crate::layers::grid::TileGrid;
use crate::models::layer::{LayerDescriptor, Protocol};
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::warn;

pub const TIME_PARAM: &str = "TIME";
const WMS_VERSION: &str = "1.1.0";
const DEFAULT_FORMAT: &str = "image/png";

/// Tiled WMS: one endpoint, request parameters sent with every GetMap.
#[derive(Debug, Clone, PartialEq)]
pub struct WmsSource {
    url: String,
    params: BTreeMap<String, String>,
    cross_origin: &'static str,
    wrap_x: bool,
    revision: u64,
}

impl WmsSource {
    pub fn new(desc: &LayerDescriptor) -> Option<Self> {
        let url = desc.urls.first()?.clone();
        let params = BTreeMap::from([
            ("LAYERS".to_string(), desc.id.clone()),
            ("VERSION".to_string(), WMS_VERSION.to_string()),
            ("FORMAT".to_string(), DEFAULT_FORMAT.to_string()),
        ]);
        Some(WmsSource {
            url,
            params,
            cross_origin: "anonymous",
            wrap_x: true,
            revision: 0,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn cross_origin(&self) -> &str {
        self.cross_origin
    }

    pub fn wraps_x(&self) -> bool {
        self.wrap_x
    }

    /// Merge `updates` into the request parameters. Tiles are refetched by
    /// the engine when the revision moves.
    pub fn update_params<K, V>(&mut self, updates: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in updates {
            self.params.insert(k.into(), v.into());
        }
        self.revision += 1;
    }
}

/// WMTS: tile matrix set addressed through the shared grid, temporal
/// selection through dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct WmtsSource {
    urls: Vec<String>,
    layer: String,
    matrix_set: Option<String>,
    format: String,
    projection: Option<String>,
    style: Option<String>,
    grid: Rc<TileGrid>,
    dimensions: BTreeMap<String, String>,
    wrap_x: bool,
    revision: u64,
}

impl WmtsSource {
    pub fn new(desc: &LayerDescriptor, grid: Rc<TileGrid>) -> Option<Self> {
        if desc.urls.is_empty() {
            return None;
        }
        Some(WmtsSource {
            urls: desc.urls.clone(),
            layer: desc.id.clone(),
            matrix_set: desc.matrix_set.clone(),
            format: desc
                .format
                .clone()
                .unwrap_or_else(|| DEFAULT_FORMAT.to_string()),
            projection: desc.projection.clone(),
            style: desc.style.clone(),
            grid,
            dimensions: BTreeMap::new(),
            wrap_x: true,
            revision: 0,
        })
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn layer(&self) -> &str {
        &self.layer
    }

    pub fn matrix_set(&self) -> Option<&str> {
        self.matrix_set.as_deref()
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn projection(&self) -> Option<&str> {
        self.projection.as_deref()
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn dimensions(&self) -> &BTreeMap<String, String> {
        &self.dimensions
    }

    pub fn wraps_x(&self) -> bool {
        self.wrap_x
    }

    pub fn update_dimensions<K, V>(&mut self, updates: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in updates {
            self.dimensions.insert(k.into(), v.into());
        }
        self.revision += 1;
    }
}

/// Uniform handle over the per-protocol sources. Supporting a new protocol
/// means a new variant here plus its constructor.
#[derive(Debug, Clone, PartialEq)]
pub enum TileSource {
    Wms(WmsSource),
    Wmts(WmtsSource),
}

impl TileSource {
    /// `None` when the descriptor's protocol is unsupported or the descriptor
    /// lacks what the protocol needs (an endpoint URL).
    pub fn for_descriptor(desc: &LayerDescriptor, grid: &Rc<TileGrid>) -> Option<Self> {
        let source = match &desc.protocol {
            Protocol::Wms => WmsSource::new(desc).map(TileSource::Wms),
            Protocol::Wmts => WmtsSource::new(desc, Rc::clone(grid)).map(TileSource::Wmts),
            Protocol::Unsupported(name) => {
                warn!("layer '{}': unsupported protocol '{}', skipped", desc.id, name);
                return None;
            }
        };
        if source.is_none() {
            warn!("layer '{}': no endpoint URL configured, skipped", desc.id);
        }
        source
    }

    pub fn protocol(&self) -> Protocol {
        match self {
            TileSource::Wms(_) => Protocol::Wms,
            TileSource::Wmts(_) => Protocol::Wmts,
        }
    }

    /// Point the source at a new time interval: a `TIME` request parameter
    /// for WMS, a `TIME` dimension for WMTS.
    pub fn set_time(&mut self, interval: &str) {
        match self {
            TileSource::Wms(source) => source.update_params([(TIME_PARAM, interval)]),
            TileSource::Wmts(source) => source.update_dimensions([(TIME_PARAM, interval)]),
        }
    }

    pub fn time(&self) -> Option<&str> {
        let value = match self {
            TileSource::Wms(source) => source.params.get(TIME_PARAM),
            TileSource::Wmts(source) => source.dimensions.get(TIME_PARAM),
        };
        value.map(String::as_str)
    }

    pub fn revision(&self) -> u64 {
        match self {
            TileSource::Wms(source) => source.revision,
            TileSource::Wmts(source) => source.revision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Rc<TileGrid> {
        Rc::new(TileGrid::geographic())
    }

    #[test]
    fn wms_carries_layer_params() {
        let desc = LayerDescriptor::new(
            "ndvi",
            Protocol::Wms,
            vec!["https://a.example/ows".into(), "https://b.example/ows".into()],
        );
        let Some(TileSource::Wms(source)) = TileSource::for_descriptor(&desc, &grid()) else {
            panic!("expected a WMS source");
        };
        assert_eq!(source.url(), "https://a.example/ows");
        assert_eq!(source.params()["LAYERS"], "ndvi");
        assert_eq!(source.params()["VERSION"], "1.1.0");
        assert_eq!(source.params()["FORMAT"], "image/png");
        assert_eq!(source.cross_origin(), "anonymous");
        assert!(source.wraps_x());
    }

    #[test]
    fn wmts_shares_the_grid() {
        let grid = grid();
        let desc = LayerDescriptor::new("terrain", Protocol::Wmts, vec!["https://t.example".into()])
            .with_matrix_set("WGS84");
        let Some(TileSource::Wmts(source)) = TileSource::for_descriptor(&desc, &grid) else {
            panic!("expected a WMTS source");
        };
        assert_eq!(source.layer(), "terrain");
        assert_eq!(source.matrix_set(), Some("WGS84"));
        assert_eq!(source.format(), "image/png");
        assert_eq!(source.grid(), grid.as_ref());
        assert_eq!(Rc::strong_count(&grid), 2);
    }

    #[test]
    fn unsupported_or_urlless_is_skipped() {
        let xyz = LayerDescriptor::new("osm", Protocol::from("XYZ".to_string()), vec!["u".into()]);
        assert!(TileSource::for_descriptor(&xyz, &grid()).is_none());

        let empty = LayerDescriptor::new("ndvi", Protocol::Wms, Vec::new());
        assert!(TileSource::for_descriptor(&empty, &grid()).is_none());
    }

    #[test]
    fn time_goes_to_param_or_dimension() {
        let grid = grid();
        let mut wms = TileSource::for_descriptor(
            &LayerDescriptor::new("a", Protocol::Wms, vec!["u".into()]),
            &grid,
        )
        .unwrap();
        let mut wmts = TileSource::for_descriptor(
            &LayerDescriptor::new("b", Protocol::Wmts, vec!["u".into()]),
            &grid,
        )
        .unwrap();

        wms.set_time("2020-01-01T00:00:00Z/2020-01-02T00:00:00Z");
        wmts.set_time("2020-01-01T00:00:00Z/2020-01-02T00:00:00Z");

        assert_eq!(wms.time(), wmts.time());
        assert_eq!(wms.revision(), 1);
        let TileSource::Wmts(inner) = &wmts else {
            unreachable!()
        };
        assert_eq!(inner.dimensions()["TIME"], "2020-01-01T00:00:00Z/2020-01-02T00:00:00Z");
    }
}
