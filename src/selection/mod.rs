//! Drawing tools and the selection feature set.
//!
//! At most one tool is active. Switching or dropping the tool clears the
//! features. Every change to the feature set queues the current selection
//! (the most recently added geometry, or `None`) for the controller to
//! publish.

pub mod tool;

use crate::models::feature::Feature;
use geo_types::{Coord, Geometry, Polygon};
use tool::{DrawingTool, Interaction, SelectionMode};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Inactive,
    ToolActive(DrawingTool),
}

#[derive(Debug, Default)]
pub struct SelectionController {
    state: SelectionState,
    mode: SelectionMode,
    features: Vec<Feature>,
    box_start: Option<Coord<f64>>,
    changes: Vec<Option<Geometry<f64>>>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn active_tool(&self) -> Option<DrawingTool> {
        match self.state {
            SelectionState::Inactive => None,
            SelectionState::ToolActive(tool) => Some(tool),
        }
    }

    /// Interaction currently installed on the map.
    pub fn interaction(&self) -> Option<Interaction> {
        self.active_tool().map(|tool| tool.interaction())
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Geometry of the most recently added feature.
    pub fn current_selection(&self) -> Option<&Geometry<f64>> {
        self.features.last().map(|feature| &feature.geometry)
    }

    /// Selection notifications queued since the last call, oldest first.
    pub fn take_changes(&mut self) -> Vec<Option<Geometry<f64>>> {
        std::mem::take(&mut self.changes)
    }

    fn changed(&mut self) {
        let current = self.current_selection().cloned();
        self.changes.push(current);
    }

    /// Drop every feature and queue a cleared selection.
    pub fn clear(&mut self) {
        self.features.clear();
        self.changed();
    }

    pub fn activate(&mut self, tool: DrawingTool, mode: SelectionMode) {
        if let Some(previous) = self.active_tool() {
            debug!("removing {:?} interaction of {}", previous.interaction(), previous);
        }
        self.box_start = None;
        self.clear();
        self.state = SelectionState::ToolActive(tool);
        self.mode = mode;
        debug!("installed {:?} interaction for {} ({:?})", tool.interaction(), tool, mode);
    }

    /// Activate by bus identifier. An unknown identifier changes nothing.
    pub fn activate_by_id(&mut self, id: &str, mode: SelectionMode) -> anyhow::Result<()> {
        let tool = id.parse::<DrawingTool>()?;
        self.activate(tool, mode);
        Ok(())
    }

    pub fn deactivate(&mut self) {
        if let Some(previous) = self.active_tool() {
            debug!("removing {:?} interaction of {}", previous.interaction(), previous);
        }
        self.state = SelectionState::Inactive;
        self.box_start = None;
        self.clear();
    }

    fn add(&mut self, feature: Feature) {
        if self.mode == SelectionMode::Single {
            self.clear();
        }
        self.features.push(feature);
        self.changed();
    }

    /// A point, line or polygon sketch was finished by the active draw
    /// interaction. Rejected when no draw tool of that kind is active.
    pub fn finish_sketch(&mut self, geometry: Geometry<f64>) -> bool {
        match self.interaction() {
            Some(Interaction::Draw(kind)) if kind.matches(&geometry) => {
                self.add(Feature::new(geometry));
                true
            }
            other => {
                warn!("sketch ignored, active interaction is {:?}", other);
                false
            }
        }
    }

    pub fn box_start(&mut self, coord: Coord<f64>) -> bool {
        if self.interaction() != Some(Interaction::DragBox) {
            return false;
        }
        self.box_start = Some(coord);
        true
    }

    /// Close the drag box. The rectangle runs start, (start.x, end.y), end,
    /// (end.x, start.y).
    pub fn box_end(&mut self, end: Coord<f64>) -> bool {
        if self.interaction() != Some(Interaction::DragBox) {
            return false;
        }
        let Some(start) = self.box_start.take() else {
            warn!("box end without box start, ignored");
            return false;
        };
        let ring = vec![
            start,
            Coord {
                x: start.x,
                y: end.y,
            },
            end,
            Coord {
                x: end.x,
                y: start.y,
            },
        ];
        self.add(Feature::new(Polygon::new(ring.into(), Vec::new())));
        true
    }

    /// Swap the whole feature set, as a GeoJSON import does. Independent of
    /// the active tool.
    pub fn replace_features(&mut self, features: Vec<Feature>) {
        self.clear();
        if !features.is_empty() {
            self.features = features;
            self.changed();
        }
    }
}
