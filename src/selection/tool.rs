use anyhow::anyhow;
use geo_types::Geometry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Geometry a generic draw interaction produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
}

impl GeometryKind {
    pub fn matches(&self, geometry: &Geometry<f64>) -> bool {
        matches!(
            (self, geometry),
            (GeometryKind::Point, Geometry::Point(_))
                | (GeometryKind::LineString, Geometry::LineString(_))
                | (GeometryKind::Polygon, Geometry::Polygon(_))
        )
    }
}

/// What gets installed on the map while a tool is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interaction {
    Draw(GeometryKind),
    DragBox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawingTool {
    Point,
    Line,
    Polygon,
    Box,
}

// rows follow variant order
static TOOLS: [(DrawingTool, &str, Interaction); 4] = [
    (
        DrawingTool::Point,
        "pointSelection",
        Interaction::Draw(GeometryKind::Point),
    ),
    (
        DrawingTool::Line,
        "lineSelection",
        Interaction::Draw(GeometryKind::LineString),
    ),
    (
        DrawingTool::Polygon,
        "polygonSelection",
        Interaction::Draw(GeometryKind::Polygon),
    ),
    (DrawingTool::Box, "bboxSelection", Interaction::DragBox),
];

impl DrawingTool {
    pub const ALL: [DrawingTool; 4] = [
        DrawingTool::Point,
        DrawingTool::Line,
        DrawingTool::Polygon,
        DrawingTool::Box,
    ];

    fn entry(&self) -> &'static (DrawingTool, &'static str, Interaction) {
        &TOOLS[*self as usize]
    }

    /// Identifier the selection panel uses on the bus.
    pub fn id(&self) -> &'static str {
        self.entry().1
    }

    pub fn interaction(&self) -> Interaction {
        self.entry().2
    }
}

impl FromStr for DrawingTool {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TOOLS
            .iter()
            .find(|(_, id, _)| *id == s)
            .map(|(tool, _, _)| *tool)
            .ok_or_else(|| anyhow!("unknown selection tool '{}'", s))
    }
}

impl fmt::Display for DrawingTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Whether a new feature replaces the selection or joins it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    Single,
    #[default]
    Multi,
}

impl SelectionMode {
    /// Bus values are loose: anything but `single` has always meant
    /// multi-select, so unknown values fall back to `Multi` with a warning.
    pub fn from_bus(value: Option<&str>) -> Self {
        match value {
            Some("single") => SelectionMode::Single,
            Some("multi") | Some("multiple") | None => SelectionMode::Multi,
            Some(other) => {
                warn!("unknown selection type '{}', using multi", other);
                SelectionMode::Multi
            }
        }
    }
}
