//! REST services consumed by the dashboard.
//!
//! All calls are blocking and go through [`ApiClient`]. Typed fetchers return
//! `Result<_, ApiError>`; screens that prefer empty data over an error use
//! [`or_default`] or a [`DashboardSource`].

mod client;
mod dashboard;
mod error;
mod notifications;
mod reports;


pub use client::ApiClient;
pub use dashboard::{
    fetch_dengue, fetch_facts, fetch_risk_dashboard, or_default, DashboardSource, DengueSummary,
    Fact, MunicipalityRisk, RemoteDashboard, RiskDashboard, RiskLevel, RiskSummary, WeeklyCount,
};
pub use error::{normalize_error_body, ApiError, ErrorKind};
pub use notifications::{
    delete_notification, get_preferences, list_notifications, mark_all_read, mark_read,
    update_preferences, NotificationPreferences,
};
pub use reports::{
    fetch_report, parse_report, BreedingSiteRow, FeedbackRow, MunicipalActivityRow, Report,
    ReportFilter, ReportKind,
};
