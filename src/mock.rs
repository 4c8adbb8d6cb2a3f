//! Built-in sample data for running the dashboard without a backend.

use chrono::{TimeZone, Utc};

use crate::api::{
    DashboardSource, DengueSummary, Fact, MunicipalityRisk, RiskDashboard, RiskLevel, RiskSummary,
    WeeklyCount,
};
use crate::map::{LngLat, PointFeature};

/// Dashboard source serving fixed sample values
#[derive(Debug, Default, Clone, Copy)]
pub struct MockDashboard;

impl DashboardSource for MockDashboard {
    fn facts(&self) -> Vec<Fact> {
        vec![
            Fact {
                label: "Active breeding sites".to_string(),
                value: 128.0,
                unit: None,
            },
            Fact {
                label: "Properties visited".to_string(),
                value: 4312.0,
                unit: None,
            },
            Fact {
                label: "Treated sites".to_string(),
                value: 87.5,
                unit: Some("%".to_string()),
            },
        ]
    }

    fn dengue(&self) -> DengueSummary {
        DengueSummary {
            total_cases: 1530,
            confirmed: 912,
            suspected: 603,
            deaths: 15,
            incidence_rate: 92.4,
            weekly: (1..=6)
                .map(|week| WeeklyCount {
                    week,
                    cases: 180 + u64::from(week) * 25,
                })
                .collect(),
        }
    }

    fn risk_dashboard(&self) -> RiskDashboard {
        let municipalities = vec![
            municipality("2611606", "Recife", RiskLevel::High, 0.82),
            municipality("2607901", "Jaboatão dos Guararapes", RiskLevel::High, 0.74),
            municipality("2609600", "Olinda", RiskLevel::Medium, 0.55),
            municipality("2610707", "Paulista", RiskLevel::Low, 0.21),
        ];
        RiskDashboard {
            summary: RiskSummary {
                high: 2,
                medium: 1,
                low: 1,
                total_municipalities: 4,
            },
            municipalities,
            updated_at: Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).single(),
        }
    }

    fn breeding_sites(&self) -> Vec<PointFeature> {
        [
            ("c-001", -34.8811, -8.0539, "Recife", "pneu", "ativo"),
            ("c-002", -34.9015, -8.0631, "Recife", "caixa d'agua", "tratado"),
            ("c-003", -34.8553, -8.0089, "Olinda", "vaso de planta", "ativo"),
            ("c-004", -34.9286, -8.1128, "Jaboatão dos Guararapes", "calha", "ativo"),
            ("c-005", -34.8731, -7.9408, "Paulista", "entulho", "eliminado"),
        ]
        .into_iter()
        .map(|(id, lng, lat, municipio, tipo, status)| {
            PointFeature::new(id, LngLat::new(lng, lat))
                .with_property("municipio", municipio)
                .with_property("tipo", tipo)
                .with_property("status", status)
        })
        .collect()
    }
}

fn municipality(code: &str, name: &str, level: RiskLevel, score: f64) -> MunicipalityRisk {
    MunicipalityRisk {
        code: code.to_string(),
        name: name.to_string(),
        level,
        score,
    }
}
