//! Notification payloads and server frame parsing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::NotifyError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    #[serde(alias = "sucesso")]
    Success,
    #[serde(alias = "aviso")]
    Warning,
    #[serde(alias = "alerta")]
    Alert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(alias = "titulo")]
    pub title: String,
    #[serde(default, alias = "mensagem")]
    pub message: String,
    #[serde(default, alias = "tipo")]
    pub kind: NotificationKind,
    #[serde(default, alias = "lida")]
    pub read: bool,
    #[serde(alias = "criado_em")]
    pub created_at: DateTime<Utc>,
}

impl Notification {
    fn validate(&self) -> Result<(), NotifyError> {
        if self.id.trim().is_empty() {
            return Err(NotifyError::MalformedMessage("notification without id".into()));
        }
        if self.title.trim().is_empty() {
            return Err(NotifyError::MalformedMessage(format!(
                "notification {} without title",
                self.id
            )));
        }
        Ok(())
    }
}

/// Frames pushed by the server: `{ "type": "...", "payload": {...} }`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    Notification(Notification),
}

/// Parse and validate a text frame. Unknown types, missing fields and
/// blank identifiers are rejected rather than defaulted.
pub fn parse_server_message(text: &str) -> Result<ServerMessage, NotifyError> {
    let message: ServerMessage =
        serde_json::from_str(text).map_err(|e| NotifyError::MalformedMessage(e.to_string()))?;

    match &message {
        ServerMessage::Notification(notification) => notification.validate()?,
    }

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_notification() {
        let text = r#"{
            "type": "notification",
            "payload": {
                "id": "n-1",
                "titulo": "Novo foco identificado",
                "mensagem": "Criadouro registrado em Boa Viagem",
                "tipo": "alerta",
                "lida": false,
                "criado_em": "2024-03-05T12:00:00Z"
            }
        }"#;

        let ServerMessage::Notification(n) = parse_server_message(text).unwrap();
        assert_eq!(n.id, "n-1");
        assert_eq!(n.title, "Novo foco identificado");
        assert_eq!(n.kind, NotificationKind::Alert);
        assert!(!n.read);
    }

    #[test]
    fn test_parse_minimal_english_fields() {
        let text = r#"{"type":"notification","payload":{"id":"n-2","title":"Report ready","created_at":"2024-03-05T12:00:00Z"}}"#;
        let ServerMessage::Notification(n) = parse_server_message(text).unwrap();
        assert_eq!(n.kind, NotificationKind::Info);
        assert!(n.message.is_empty());
    }

    #[test]
    fn test_reject_unknown_type() {
        let text = r#"{"type":"presence","payload":{}}"#;
        assert!(matches!(
            parse_server_message(text),
            Err(NotifyError::MalformedMessage(_))
        ));
    }

    #[test]
    fn test_reject_missing_fields() {
        let text = r#"{"type":"notification","payload":{"id":"n-3"}}"#;
        assert!(parse_server_message(text).is_err());
        assert!(parse_server_message("not json").is_err());
    }

    #[test]
    fn test_reject_blank_id() {
        let text = r#"{"type":"notification","payload":{"id":"  ","title":"x","created_at":"2024-03-05T12:00:00Z"}}"#;
        assert!(parse_server_message(text).is_err());
    }
}
