//! GeoJSON and CSV encoders for a selection and the points inside it.

use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

use crate::constants::CSV_COORD_PRECISION;

use super::types::{LngLat, PointFeature, SelectedArea};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode GeoJSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output format of a selection export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    GeoJson,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::GeoJson => "geojson",
            ExportFormat::Csv => "csv",
        }
    }
}

/// Geometry subset needed for selection exports (RFC 7946 shaped)
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon { coordinates: Vec<Vec<LngLat>> },
    Point { coordinates: LngLat },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum GeoJson {
    Feature {
        geometry: Geometry,
        properties: Map<String, Value>,
    },
    FeatureCollection {
        features: Vec<GeoJson>,
    },
}

impl GeoJson {
    /// Features of a collection; empty for a single feature
    pub fn features(&self) -> &[GeoJson] {
        match self {
            GeoJson::FeatureCollection { features } => features,
            GeoJson::Feature { .. } => &[],
        }
    }
}

/// Encode the selection polygon followed by one feature per contained point.
pub fn to_geojson(area: &SelectedArea, points: &[&PointFeature]) -> GeoJson {
    let mut selection_props = Map::new();
    selection_props.insert("id".into(), area.id().into());
    selection_props.insert("type".into(), area.kind().as_str().into());
    selection_props.insert("area".into(), area.area().into());
    selection_props.insert("pointCount".into(), points.len().into());
    selection_props.insert("createdAt".into(), area.created_at().to_rfc3339().into());

    let mut features = Vec::with_capacity(points.len() + 1);
    features.push(GeoJson::Feature {
        geometry: Geometry::Polygon {
            coordinates: vec![area.coordinates().to_vec()],
        },
        properties: selection_props,
    });

    features.extend(points.iter().map(|point| {
        let mut properties = point.properties.clone();
        properties.insert("id".into(), point.id.clone().into());
        GeoJson::Feature {
            geometry: Geometry::Point {
                coordinates: point.coordinates,
            },
            properties,
        }
    }));

    GeoJson::FeatureCollection { features }
}

/// Pretty-printed GeoJSON text
pub fn to_geojson_string(area: &SelectedArea, points: &[&PointFeature]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(&to_geojson(area, points))?)
}

/// Encode points as CSV: `ID,Latitude,Longitude` plus any extra property
/// columns, one row per point. Values are joined as-is without quoting.
pub fn to_csv(points: &[&PointFeature], extra_columns: &[&str]) -> String {
    let mut header = vec!["ID", "Latitude", "Longitude"];
    header.extend_from_slice(extra_columns);

    let mut lines = Vec::with_capacity(points.len() + 1);
    lines.push(header.join(","));

    for point in points {
        let mut row = vec![
            point.id.clone(),
            format!("{:.*}", CSV_COORD_PRECISION, point.coordinates.lat),
            format!("{:.*}", CSV_COORD_PRECISION, point.coordinates.lng),
        ];
        row.extend(
            extra_columns
                .iter()
                .map(|col| point.property_text(col).unwrap_or_default()),
        );
        lines.push(row.join(","));
    }

    lines.join("\n")
}

/// Write an export into `dir` under a timestamped file name.
pub fn write_export(dir: &Path, format: ExportFormat, contents: &str) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;

    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let path = dir.join(format!("selecao-{}.{}", timestamp, format.extension()));

    if let Err(e) = std::fs::write(&path, contents) {
        error!("Failed to write export {:?}: {}", path, e);
        return Err(e.into());
    }

    info!("Exported selection to {:?}", path);
    Ok(path)
}
