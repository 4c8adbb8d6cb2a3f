//! Area selection on the map: draw-mode tracking, polygon/rectangle
//! finalization and point filtering.

use chrono::Utc;
use tracing::debug;

use crate::constants::MIN_POLYGON_VERTICES;

use super::types::{BBox, LngLat, PointFeature, SelectedArea, SelectionKind};

/// Current drawing mode of the selection tool
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum DrawMode {
    #[default]
    None,
    Polygon,
    Rectangle,
}

/// Selection controller behind the map's area tools.
///
/// Holds at most one finalized [`SelectedArea`]; each new selection replaces
/// the previous one.
#[derive(Debug, Default)]
pub struct AreaSelector {
    mode: DrawMode,
    /// Vertices accumulated while drawing a polygon
    vertices: Vec<LngLat>,
    selected: Option<SelectedArea>,
}

impl AreaSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    pub fn vertices(&self) -> &[LngLat] {
        &self.vertices
    }

    pub fn selected_area(&self) -> Option<&SelectedArea> {
        self.selected.as_ref()
    }

    /// Whether a polygon is currently being drawn
    pub fn is_drawing(&self) -> bool {
        self.mode == DrawMode::Polygon && !self.vertices.is_empty()
    }

    /// Switch drawing mode. Any vertices accumulated so far are discarded.
    pub fn on_mode_change(&mut self, mode: DrawMode) {
        if !self.vertices.is_empty() {
            debug!(
                "Discarding {} pending vertices on switch to {:?}",
                self.vertices.len(),
                mode
            );
        }
        self.vertices.clear();
        self.mode = mode;
    }

    /// Record a clicked vertex. Only accepted in polygon mode.
    pub fn add_vertex(&mut self, point: LngLat) -> bool {
        if self.mode != DrawMode::Polygon {
            return false;
        }
        self.vertices.push(point);
        true
    }

    /// Close the polygon being drawn and make it the current selection.
    ///
    /// With fewer than three vertices the drawing is abandoned and `None` is
    /// returned; the previous selection is left untouched in that case.
    pub fn finish_polygon(&mut self) -> Option<&SelectedArea> {
        let mut ring = std::mem::take(&mut self.vertices);
        self.mode = DrawMode::None;

        // A click back on the first vertex is a closing repeat, not a new vertex
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }

        if ring.len() < MIN_POLYGON_VERTICES {
            debug!("Polygon abandoned with {} vertices", ring.len());
            return None;
        }

        ring.push(ring[0]);
        let area = SelectedArea::from_ring(SelectionKind::Polygon, ring, Utc::now());
        debug!("Polygon selection {} covers {:.1} m²", area.id(), area.area());

        self.selected = Some(area);
        self.selected.as_ref()
    }

    /// Build an axis-aligned rectangle selection from two opposite corners.
    pub fn create_rectangle(&mut self, start: LngLat, end: LngLat) -> &SelectedArea {
        self.vertices.clear();
        self.mode = DrawMode::None;

        let bbox = BBox::from_corners(start, end);
        let ring = vec![
            LngLat::new(bbox.min_lng, bbox.min_lat),
            LngLat::new(bbox.max_lng, bbox.min_lat),
            LngLat::new(bbox.max_lng, bbox.max_lat),
            LngLat::new(bbox.min_lng, bbox.max_lat),
            LngLat::new(bbox.min_lng, bbox.min_lat),
        ];
        let area = SelectedArea::from_ring(SelectionKind::Rectangle, ring, Utc::now());
        debug!("Rectangle selection {} covers {:.1} m²", area.id(), area.area());

        self.selected.insert(area)
    }

    /// Drop the current selection and any in-progress drawing
    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.vertices.clear();
        self.mode = DrawMode::None;
    }

    /// Points lying inside (or on the boundary of) the current selection.
    ///
    /// Recomputed on every call; empty when nothing is selected.
    pub fn points_in_selection<'a>(&self, points: &'a [PointFeature]) -> Vec<&'a PointFeature> {
        let Some(area) = &self.selected else {
            return Vec::new();
        };

        points
            .iter()
            .filter(|p| area.contains(&p.coordinates))
            .collect()
    }
}
