//! Map-side logic of the dashboard.
//!
//! This module handles:
//! - Polygon and rectangle area selection
//! - Filtering mapped points by selection and by property filters
//! - GeoJSON / CSV export of a selection

mod export;
mod selection;
mod types;
mod view;

#[cfg(test)]
mod tests;

pub use export::{
    to_csv, to_geojson, to_geojson_string, write_export, ExportError, ExportFormat, GeoJson,
    Geometry,
};
pub use selection::{AreaSelector, DrawMode};
pub use types::{BBox, LngLat, PointFeature, SelectedArea, SelectionKind};
pub use view::{MapLayer, MapViewState, PointFilters};
