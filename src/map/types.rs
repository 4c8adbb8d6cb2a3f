//! Core geographic types shared by selection, filtering and export.

use chrono::{DateTime, Utc};
use geo::orient::{Direction, Orient};
use geo::{Area, BoundingRect, Centroid, Coord, GeodesicArea, Intersects, LineString, Point, Polygon};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A geographic position, serialized as `[lng, lat]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl From<[f64; 2]> for LngLat {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(p: LngLat) -> Self {
        [p.lng, p.lat]
    }
}

impl From<LngLat> for Coord<f64> {
    fn from(p: LngLat) -> Self {
        Coord { x: p.lng, y: p.lat }
    }
}

/// Bounding box, serialized as `[minLng, minLat, maxLng, maxLat]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BBox {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl BBox {
    /// Smallest box containing both corners
    pub fn from_corners(a: LngLat, b: LngLat) -> Self {
        Self {
            min_lng: a.lng.min(b.lng),
            min_lat: a.lat.min(b.lat),
            max_lng: a.lng.max(b.lng),
            max_lat: a.lat.max(b.lat),
        }
    }

    pub fn center(&self) -> LngLat {
        LngLat::new(
            (self.min_lng + self.max_lng) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    pub fn width(&self) -> f64 {
        self.max_lng - self.min_lng
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}

impl From<[f64; 4]> for BBox {
    fn from([min_lng, min_lat, max_lng, max_lat]: [f64; 4]) -> Self {
        Self {
            min_lng,
            min_lat,
            max_lng,
            max_lat,
        }
    }
}

impl From<BBox> for [f64; 4] {
    fn from(b: BBox) -> Self {
        [b.min_lng, b.min_lat, b.max_lng, b.max_lat]
    }
}

/// How a selection was drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionKind {
    Polygon,
    Rectangle,
}

impl SelectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionKind::Polygon => "polygon",
            SelectionKind::Rectangle => "rectangle",
        }
    }
}

/// A finalized area selection.
///
/// Immutable once built; a new selection replaces it wholesale. The ring is
/// always closed (first == last) and wound counter-clockwise, whichever way
/// it was drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedArea {
    id: String,
    #[serde(rename = "type")]
    kind: SelectionKind,
    coordinates: Vec<LngLat>,
    /// Geodesic area in square metres
    area: f64,
    #[serde(skip)]
    planar_area: f64,
    center: LngLat,
    bbox: BBox,
    created_at: DateTime<Utc>,
    #[serde(skip)]
    polygon: Polygon<f64>,
}

impl SelectedArea {
    /// Build a selection from a closed ring, computing its metrics.
    pub(crate) fn from_ring(kind: SelectionKind, ring: Vec<LngLat>, created_at: DateTime<Utc>) -> Self {
        let polygon = ring_to_polygon(&ring).orient(Direction::Default);
        let ring: Vec<LngLat> = polygon
            .exterior()
            .coords()
            .map(|c| LngLat::new(c.x, c.y))
            .collect();

        let bbox = polygon
            .bounding_rect()
            .map(|r| BBox {
                min_lng: r.min().x,
                min_lat: r.min().y,
                max_lng: r.max().x,
                max_lat: r.max().y,
            })
            .unwrap_or_else(|| BBox::from_corners(ring[0], ring[0]));

        let center = match kind {
            SelectionKind::Rectangle => bbox.center(),
            SelectionKind::Polygon => polygon
                .centroid()
                .map(|p| LngLat::new(p.x(), p.y()))
                .unwrap_or_else(|| bbox.center()),
        };

        Self {
            id: format!("area-{}", created_at.timestamp_millis()),
            kind,
            area: polygon.geodesic_area_unsigned(),
            planar_area: polygon.unsigned_area(),
            coordinates: ring,
            center,
            bbox,
            created_at,
            polygon,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> SelectionKind {
        self.kind
    }

    /// Closed ring of `[lng, lat]` positions
    pub fn coordinates(&self) -> &[LngLat] {
        &self.coordinates
    }

    /// Area in square metres
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Area in squared degrees, as computed on the raw coordinates
    pub fn planar_area(&self) -> f64 {
        self.planar_area
    }

    pub fn center(&self) -> LngLat {
        self.center
    }

    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    /// Boundary-inclusive point-in-polygon test
    pub fn contains(&self, point: &LngLat) -> bool {
        self.polygon.intersects(&Point::new(point.lng, point.lat))
    }
}

fn ring_to_polygon(ring: &[LngLat]) -> Polygon<f64> {
    let exterior: LineString<f64> = ring.iter().map(|&p| Coord::from(p)).collect();
    Polygon::new(exterior, vec![])
}

/// A mapped location (e.g. a breeding site) owned by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointFeature {
    pub id: String,
    pub coordinates: LngLat,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl PointFeature {
    pub fn new(id: impl Into<String>, coordinates: LngLat) -> Self {
        Self {
            id: id.into(),
            coordinates,
            properties: Map::new(),
        }
    }

    pub fn with_property(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    /// Property rendered as plain text; `None` for missing or null values
    pub fn property_text(&self, key: &str) -> Option<String> {
        match self.properties.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
