//! Client core for the dengue surveillance dashboard.
//!
//! The crate holds the logic that sits behind the dashboard screens:
//! - [`map`]: polygon/rectangle area selection, point filtering and GeoJSON/CSV export
//! - [`api`]: REST services for dashboard figures, reports and notification settings
//! - [`notifications`]: live notification feed over WebSocket with reconnect backoff
//! - [`auth`]: access token inspection
//! - [`config`] and [`paths`]: persisted settings in platform-appropriate locations

pub mod api;
pub mod auth;
pub mod config;
pub mod constants;
pub mod map;
pub mod mock;
pub mod notifications;
pub mod paths;
