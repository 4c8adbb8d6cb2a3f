//! Live notifications.
//!
//! This module handles:
//! - Parsing and validating server frames
//! - The WebSocket client with reconnect backoff
//! - The in-memory inbox shown in the UI

mod backoff;
mod center;
mod client;
mod message;


use thiserror::Error;

pub use backoff::ReconnectPolicy;
pub use center::NotificationCenter;
pub use client::{
    url_with_token, Connection, ConnectionState, Connector, NotificationClient,
    NotificationEvent, WsConnection, WsConnector,
};
pub use message::{parse_server_message, Notification, NotificationKind, ServerMessage};

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Could not connect: {0}")]
    Connect(String),

    #[error("Connection closed: {0}")]
    Closed(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed message: {0}")]
    MalformedMessage(String),
}
