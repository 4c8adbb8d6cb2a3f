//! Notification inbox and preference endpoints.

use serde::{Deserialize, Serialize};

use crate::notifications::Notification;

use super::client::ApiClient;
use super::error::ApiError;

pub const NOTIFICATIONS_PATH: &str = "/notificacoes";
pub const PREFERENCES_PATH: &str = "/notificacoes/preferencias";

/// Channels and topics a user wants to be notified about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationPreferences {
    pub email: bool,
    pub push: bool,
    pub sms: bool,
    /// Municipality risk level changes
    pub risk_alerts: bool,
    /// New breeding sites in the user's municipalities
    pub new_breeding_sites: bool,
    /// Generated reports ready to download
    pub report_ready: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            sms: false,
            risk_alerts: true,
            new_breeding_sites: true,
            report_ready: true,
        }
    }
}

pub fn list_notifications(client: &ApiClient) -> Result<Vec<Notification>, ApiError> {
    client.get(NOTIFICATIONS_PATH)
}

pub fn mark_read(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    client.send("PATCH", &format!("{NOTIFICATIONS_PATH}/{id}/lida"))
}

pub fn mark_all_read(client: &ApiClient) -> Result<(), ApiError> {
    client.send("POST", &format!("{NOTIFICATIONS_PATH}/marcar-todas-lidas"))
}

pub fn delete_notification(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    client.send("DELETE", &format!("{NOTIFICATIONS_PATH}/{id}"))
}

pub fn get_preferences(client: &ApiClient) -> Result<NotificationPreferences, ApiError> {
    client.get(PREFERENCES_PATH)
}

/// Save preferences, returning what the server stored
pub fn update_preferences(
    client: &ApiClient,
    preferences: &NotificationPreferences,
) -> Result<NotificationPreferences, ApiError> {
    client.put(PREFERENCES_PATH, preferences)
}
