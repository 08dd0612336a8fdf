use geo_types::{Coord, Rect};
use serde::{Deserialize, Serialize};

/// Axis aligned bounding box in map units, named the way the bus carries it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl From<(f64, f64, f64, f64)> for Extent {
    fn from(extent: (f64, f64, f64, f64)) -> Self {
        Extent {
            left: extent.0,   // minx
            bottom: extent.1, // miny
            right: extent.2,  // maxx
            top: extent.3,    // maxy
        }
    }
}

impl From<Rect<f64>> for Extent {
    fn from(rect: Rect<f64>) -> Self {
        let (min, max) = (rect.min(), rect.max());
        Extent::from((min.x, min.y, max.x, max.y))
    }
}

impl Extent {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    pub fn center(&self) -> Coord<f64> {
        Coord {
            x: (self.left + self.right) / 2.0,
            y: (self.bottom + self.top) / 2.0,
        }
    }

    pub fn top_left(&self) -> Coord<f64> {
        Coord {
            x: self.left,
            y: self.top,
        }
    }

    /// Smallest extent covering both `self` and `other`.
    pub fn extend(&self, other: &Extent) -> Extent {
        Extent {
            left: self.left.min(other.left),
            bottom: self.bottom.min(other.bottom),
            right: self.right.max(other.right),
            top: self.top.max(other.top),
        }
    }

    pub fn contains(&self, other: &Extent) -> bool {
        self.left <= other.left
            && self.bottom <= other.bottom
            && self.right >= other.right
            && self.top >= other.top
    }

    pub fn is_finite(&self) -> bool {
        [self.left, self.bottom, self.right, self.top]
            .iter()
            .all(|v| v.is_finite())
    }
}
