use geo_types::Coord;

/// Pointer readout, `x, y` with four decimals.
pub fn format_coordinate(coord: Coord<f64>) -> String {
    format!("{:.4}, {:.4}", coord.x, coord.y)
}
