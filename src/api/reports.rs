//! Report endpoints (`/relatorios/*`) and their spreadsheet export.
//!
//! Each report kind has its own row type. Payloads are validated when
//! decoded, so a response of the wrong shape surfaces as
//! [`ApiError::Decode`] instead of a half-filled table.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::map::{LngLat, PointFeature};

use super::client::ApiClient;
use super::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Field activity per municipality
    Municipal,
    /// Identified breeding sites (criadouros)
    BreedingSites,
    /// Follow-up records on breeding sites (devolutivas)
    Feedback,
}

impl ReportKind {
    pub fn path(&self) -> &'static str {
        match self {
            ReportKind::Municipal => "/relatorios/municipios",
            ReportKind::BreedingSites => "/relatorios/criadouros",
            ReportKind::Feedback => "/relatorios/devolutivas",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::Municipal => "Municipal activity",
            ReportKind::BreedingSites => "Breeding sites",
            ReportKind::Feedback => "Feedback records",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilter {
    pub municipality: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ReportFilter {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(m) = &self.municipality {
            query.push(("municipio", m.clone()));
        }
        if let Some(from) = self.from {
            query.push(("data_inicio", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.to {
            query.push(("data_fim", to.format("%Y-%m-%d").to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MunicipalActivityRow {
    #[serde(alias = "municipio")]
    pub municipality: String,
    #[serde(default, alias = "imoveis_visitados")]
    pub properties_visited: u32,
    #[serde(default, alias = "criadouros_encontrados")]
    pub breeding_sites_found: u32,
    #[serde(default, alias = "criadouros_tratados")]
    pub breeding_sites_treated: u32,
    #[serde(default, alias = "amostras_coletadas")]
    pub samples_collected: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedingSiteRow {
    pub id: String,
    #[serde(alias = "municipio")]
    pub municipality: String,
    #[serde(default, alias = "tipo")]
    pub kind: String,
    #[serde(default)]
    pub status: String,
    pub coordinates: LngLat,
    #[serde(default, alias = "identificado_em")]
    pub found_at: Option<DateTime<Utc>>,
}

impl BreedingSiteRow {
    /// Map point for this site, keeping the report fields as properties
    pub fn to_point_feature(&self) -> PointFeature {
        let mut point = PointFeature::new(self.id.clone(), self.coordinates)
            .with_property("municipio", self.municipality.clone())
            .with_property("tipo", self.kind.clone())
            .with_property("status", self.status.clone());
        if let Some(found_at) = self.found_at {
            point = point.with_property("identificado_em", found_at.to_rfc3339());
        }
        point
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRow {
    pub id: String,
    #[serde(alias = "criadouro_id")]
    pub breeding_site_id: String,
    #[serde(alias = "municipio")]
    pub municipality: String,
    #[serde(default, alias = "mensagem")]
    pub message: String,
    #[serde(alias = "criado_em")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Municipal(Vec<MunicipalActivityRow>),
    BreedingSites(Vec<BreedingSiteRow>),
    Feedback(Vec<FeedbackRow>),
}

impl Report {
    pub fn kind(&self) -> ReportKind {
        match self {
            Report::Municipal(_) => ReportKind::Municipal,
            Report::BreedingSites(_) => ReportKind::BreedingSites,
            Report::Feedback(_) => ReportKind::Feedback,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Report::Municipal(rows) => rows.len(),
            Report::BreedingSites(rows) => rows.len(),
            Report::Feedback(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column headers and stringified cells
    pub fn to_table(&self) -> (Vec<&'static str>, Vec<Vec<String>>) {
        match self {
            Report::Municipal(rows) => (
                vec!["Municipality", "Properties visited", "Breeding sites found", "Breeding sites treated", "Samples collected"],
                rows.iter()
                    .map(|r| {
                        vec![
                            r.municipality.clone(),
                            r.properties_visited.to_string(),
                            r.breeding_sites_found.to_string(),
                            r.breeding_sites_treated.to_string(),
                            r.samples_collected.to_string(),
                        ]
                    })
                    .collect(),
            ),
            Report::BreedingSites(rows) => (
                vec!["ID", "Municipality", "Type", "Status", "Latitude", "Longitude", "Found at"],
                rows.iter()
                    .map(|r| {
                        vec![
                            r.id.clone(),
                            r.municipality.clone(),
                            r.kind.clone(),
                            r.status.clone(),
                            format!("{:.6}", r.coordinates.lat),
                            format!("{:.6}", r.coordinates.lng),
                            r.found_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
                        ]
                    })
                    .collect(),
            ),
            Report::Feedback(rows) => (
                vec!["ID", "Breeding site", "Municipality", "Message", "Created at"],
                rows.iter()
                    .map(|r| {
                        vec![
                            r.id.clone(),
                            r.breeding_site_id.clone(),
                            r.municipality.clone(),
                            r.message.clone(),
                            r.created_at.to_rfc3339(),
                        ]
                    })
                    .collect(),
            ),
        }
    }

    /// Spreadsheet-friendly CSV; cells containing separators are quoted
    pub fn to_csv(&self) -> String {
        let (headers, rows) = self.to_table();
        let mut lines = Vec::with_capacity(rows.len() + 1);
        lines.push(headers.iter().map(|h| csv_cell(h)).collect::<Vec<_>>().join(","));
        for row in &rows {
            lines.push(row.iter().map(|c| csv_cell(c)).collect::<Vec<_>>().join(","));
        }
        lines.join("\n")
    }
}

fn csv_cell(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Reports come either as a bare array or wrapped in `{ "data": [...] }`
fn unwrap_rows(value: Value) -> Value {
    match value {
        Value::Object(mut obj) if obj.contains_key("data") => obj.remove("data").unwrap_or(Value::Null),
        other => other,
    }
}

fn decode_rows<T: serde::de::DeserializeOwned>(value: Value) -> Result<Vec<T>, ApiError> {
    serde_json::from_value(unwrap_rows(value)).map_err(|e| ApiError::Decode(e.to_string()))
}

pub fn fetch_report(client: &ApiClient, kind: ReportKind, filter: &ReportFilter) -> Result<Report, ApiError> {
    let value: Value = client.get_with_query(kind.path(), &filter.to_query())?;
    parse_report(kind, value)
}

/// Validate a raw report payload against the row type of `kind`
pub fn parse_report(kind: ReportKind, value: Value) -> Result<Report, ApiError> {
    Ok(match kind {
        ReportKind::Municipal => Report::Municipal(decode_rows(value)?),
        ReportKind::BreedingSites => Report::BreedingSites(decode_rows(value)?),
        ReportKind::Feedback => Report::Feedback(decode_rows(value)?),
    })
}
