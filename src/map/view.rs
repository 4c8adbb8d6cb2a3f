//! In-memory map view state: camera position, visible layers and point filters.

use std::collections::BTreeSet;

use crate::config::MapDefaults;
use crate::constants::{MAX_ZOOM, MIN_ZOOM};

use super::types::{LngLat, PointFeature};

/// Overlay layers that can be toggled on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapLayer {
    BreedingSites,
    Cases,
    RiskAreas,
    Municipalities,
}

/// Property-based point filters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointFilters {
    /// Matches the `municipio` property
    pub municipality: Option<String>,
    /// Matches the `status` property
    pub status: Option<String>,
}

impl PointFilters {
    pub fn is_empty(&self) -> bool {
        self.municipality.is_none() && self.status.is_none()
    }

    pub fn matches(&self, point: &PointFeature) -> bool {
        matches_property(point, "municipio", self.municipality.as_deref())
            && matches_property(point, "status", self.status.as_deref())
    }

    pub fn apply<'a>(&self, points: &'a [PointFeature]) -> Vec<&'a PointFeature> {
        points.iter().filter(|p| self.matches(p)).collect()
    }
}

fn matches_property(point: &PointFeature, key: &str, wanted: Option<&str>) -> bool {
    let Some(wanted) = wanted else {
        return true;
    };
    point
        .property_text(key)
        .is_some_and(|v| v.eq_ignore_ascii_case(wanted))
}

#[derive(Debug, Clone)]
pub struct MapViewState {
    pub center: LngLat,
    zoom: f64,
    layers: BTreeSet<MapLayer>,
    pub filters: PointFilters,
}

impl MapViewState {
    pub fn new(defaults: &MapDefaults) -> Self {
        Self {
            center: LngLat::from(defaults.center),
            zoom: defaults.zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            layers: [MapLayer::BreedingSites, MapLayer::Municipalities]
                .into_iter()
                .collect(),
            filters: PointFilters::default(),
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set zoom, clamped to the supported range
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn fly_to(&mut self, center: LngLat, zoom: Option<f64>) {
        self.center = center;
        if let Some(zoom) = zoom {
            self.set_zoom(zoom);
        }
    }

    pub fn is_layer_visible(&self, layer: MapLayer) -> bool {
        self.layers.contains(&layer)
    }

    /// Toggle a layer, returning whether it is now visible
    pub fn toggle_layer(&mut self, layer: MapLayer) -> bool {
        if !self.layers.remove(&layer) {
            self.layers.insert(layer);
            return true;
        }
        false
    }

    /// Points passing the active filters
    pub fn visible_points<'a>(&self, points: &'a [PointFeature]) -> Vec<&'a PointFeature> {
        self.filters.apply(points)
    }
}

impl Default for MapViewState {
    fn default() -> Self {
        Self::new(&MapDefaults::default())
    }
}
