//! Dashboard figures: general facts, dengue case summary and municipal risk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::map::PointFeature;

use super::client::ApiClient;
use super::error::ApiError;
use super::reports::{fetch_report, Report, ReportFilter, ReportKind};

pub const FACTS_PATH: &str = "/facts";
pub const DENGUE_PATH: &str = "/dengue";
pub const RISK_DASHBOARD_PATH: &str = "/api/v1/risk/dashboard";

/// A headline figure shown on the dashboard cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub label: String,
    pub value: f64,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DengueSummary {
    pub total_cases: u64,
    pub confirmed: u64,
    pub suspected: u64,
    pub deaths: u64,
    /// Cases per 100k inhabitants
    pub incidence_rate: f64,
    pub weekly: Vec<WeeklyCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyCount {
    /// Epidemiological week number
    pub week: u32,
    pub cases: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[serde(alias = "baixo")]
    Low,
    #[serde(alias = "medio", alias = "médio")]
    Medium,
    #[serde(alias = "alto")]
    High,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MunicipalityRisk {
    #[serde(alias = "codigo_ibge")]
    pub code: String,
    #[serde(alias = "municipio")]
    pub name: String,
    #[serde(default)]
    pub level: RiskLevel,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSummary {
    pub high: u32,
    pub medium: u32,
    pub low: u32,
    pub total_municipalities: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskDashboard {
    pub summary: RiskSummary,
    pub municipalities: Vec<MunicipalityRisk>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl RiskDashboard {
    /// Municipalities at the given level, highest score first
    pub fn at_level(&self, level: RiskLevel) -> Vec<&MunicipalityRisk> {
        let mut found: Vec<&MunicipalityRisk> = self
            .municipalities
            .iter()
            .filter(|m| m.level == level)
            .collect();
        found.sort_by(|a, b| b.score.total_cmp(&a.score));
        found
    }
}

pub fn fetch_facts(client: &ApiClient) -> Result<Vec<Fact>, ApiError> {
    client.get(FACTS_PATH)
}

pub fn fetch_dengue(client: &ApiClient) -> Result<DengueSummary, ApiError> {
    client.get(DENGUE_PATH)
}

pub fn fetch_risk_dashboard(client: &ApiClient) -> Result<RiskDashboard, ApiError> {
    client.get(RISK_DASHBOARD_PATH)
}

/// Unwrap a fetch result, degrading to empty data on failure
pub fn or_default<T: Default>(result: Result<T, ApiError>, what: &str) -> T {
    result.unwrap_or_else(|e| {
        warn!("Falling back to empty {what}: {e}");
        T::default()
    })
}

/// Where the dashboard screens get their data from
pub trait DashboardSource {
    fn facts(&self) -> Vec<Fact>;
    fn dengue(&self) -> DengueSummary;
    fn risk_dashboard(&self) -> RiskDashboard;
    /// Breeding sites to plot on the map
    fn breeding_sites(&self) -> Vec<PointFeature>;
}

/// Dashboard data served by the backend, with empty fallbacks on failure
pub struct RemoteDashboard {
    client: ApiClient,
}

impl RemoteDashboard {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl DashboardSource for RemoteDashboard {
    fn facts(&self) -> Vec<Fact> {
        or_default(fetch_facts(&self.client), "facts")
    }

    fn dengue(&self) -> DengueSummary {
        or_default(fetch_dengue(&self.client), "dengue summary")
    }

    fn risk_dashboard(&self) -> RiskDashboard {
        or_default(fetch_risk_dashboard(&self.client), "risk dashboard")
    }

    fn breeding_sites(&self) -> Vec<PointFeature> {
        match fetch_report(&self.client, ReportKind::BreedingSites, &ReportFilter::default()) {
            Ok(Report::BreedingSites(rows)) => rows.iter().map(|r| r.to_point_feature()).collect(),
            Ok(_) => Vec::new(),
            Err(e) => {
                warn!("Falling back to no breeding sites: {e}");
                Vec::new()
            }
        }
    }
}
