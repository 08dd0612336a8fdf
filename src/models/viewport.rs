use crate::models::geometry::Extent;
use geo_types::Coord;

/// Geographic world bounds the view and every tile grid are derived from.
pub const WORLD_EXTENT: Extent = Extent {
    left: -180.0,
    bottom: -90.0,
    right: 180.0,
    top: 90.0,
};
pub const TILE_SIZE: f64 = 256.0;
pub const MIN_ZOOM: i32 = 0;
pub const MAX_ZOOM: i32 = 28;

/// Map units per pixel at zoom 0.
pub fn max_resolution() -> f64 {
    WORLD_EXTENT.width() / TILE_SIZE
}

pub fn resolution_for_zoom(zoom: i32) -> f64 {
    max_resolution() / 2f64.powi(zoom)
}

/// Snapshot of the view published to the rest of the application.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub center: Coord<f64>,
    pub zoom: i32,
    pub extent: Extent,
}

/// Center, integer zoom and pixel size of the map view. The extent is always
/// derived from those three.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    center: Coord<f64>,
    zoom: i32,
    size: (u32, u32),
}

impl Viewport {
    pub fn new(center: Coord<f64>, zoom: i32, size: (u32, u32)) -> Self {
        Viewport {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            size: (size.0.max(1), size.1.max(1)),
        }
    }

    pub fn center(&self) -> Coord<f64> {
        self.center
    }

    pub fn zoom(&self) -> i32 {
        self.zoom
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn resolution(&self) -> f64 {
        resolution_for_zoom(self.zoom)
    }

    pub fn set_center(&mut self, center: Coord<f64>) {
        self.center = center;
    }

    pub fn set_zoom(&mut self, zoom: i32) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn extent(&self) -> Extent {
        let res = self.resolution();
        let half_w = self.size.0 as f64 * res / 2.0;
        let half_h = self.size.1 as f64 * res / 2.0;
        Extent::from((
            self.center.x - half_w,
            self.center.y - half_h,
            self.center.x + half_w,
            self.center.y + half_h,
        ))
    }

    pub fn state(&self) -> ViewportState {
        ViewportState {
            center: self.center,
            zoom: self.zoom,
            extent: self.extent(),
        }
    }

    /// Center on `extent` and pick the deepest zoom whose view still covers
    /// it at the current pixel size. Returns false and leaves the view alone
    /// for non-finite or inverted boxes.
    pub fn fit(&mut self, extent: &Extent) -> bool {
        if !extent.is_finite() || extent.width() < 0.0 || extent.height() < 0.0 {
            return false;
        }

        let needed = (extent.width() / self.size.0 as f64).max(extent.height() / self.size.1 as f64);
        let zoom = if needed <= 0.0 {
            MAX_ZOOM
        } else {
            (max_resolution() / needed).log2().floor() as i32
        };

        self.center = extent.center();
        self.set_zoom(zoom);
        true
    }
}
