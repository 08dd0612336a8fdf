use crate::models::{
    geometry::Extent,
    viewport::{TILE_SIZE, WORLD_EXTENT},
};
use geo_types::Coord;

/// Number of zoom levels every tiled source is published with.
pub const GRID_LEVELS: usize = 18;

/// Resolution ladder, origin and matrix identifiers shared by every tiled
/// layer. Level `j` has resolution `width / 256 / 2^(j + 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    extent: Extent,
    origin: Coord<f64>,
    resolutions: Vec<f64>,
    matrix_ids: Vec<String>,
}

impl TileGrid {
    pub fn for_extent(extent: Extent, levels: usize) -> Self {
        let base = extent.width() / TILE_SIZE;
        let resolutions = (0..levels)
            .map(|level| base / 2f64.powi(level as i32 + 1))
            .collect();
        let matrix_ids = (0..levels).map(|level| level.to_string()).collect();

        TileGrid {
            extent,
            origin: extent.top_left(),
            resolutions,
            matrix_ids,
        }
    }

    /// Grid over the geographic world extent.
    pub fn geographic() -> Self {
        Self::for_extent(WORLD_EXTENT, GRID_LEVELS)
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn origin(&self) -> Coord<f64> {
        self.origin
    }

    pub fn resolutions(&self) -> &[f64] {
        &self.resolutions
    }

    pub fn matrix_ids(&self) -> &[String] {
        &self.matrix_ids
    }
}
