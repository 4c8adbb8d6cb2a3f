//! Centralized constants used across the application.
//!
//! This module contains magic numbers and configuration values that are used
//! in multiple places or would benefit from being named constants.

/// Minimum number of distinct vertices for a polygon selection
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Decimal places used for coordinates in CSV exports
pub const CSV_COORD_PRECISION: usize = 6;

/// Maximum WebSocket reconnect attempts before giving up
pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Delay before the first reconnect attempt, doubled on each further attempt
pub const INITIAL_RECONNECT_DELAY_MS: u64 = 1000;

/// How often the notification worker wakes up to check for shutdown while reading
pub const SOCKET_POLL_INTERVAL_MS: u64 = 250;

/// Upper bound for opening the notification socket and completing its handshake
pub const SOCKET_CONNECT_TIMEOUT_MS: u64 = 3000;

/// Default HTTP request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of notifications kept in the in-memory inbox
pub const MAX_INBOX_SIZE: usize = 100;

/// Zoom limits for the map view
pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 20.0;

/// Grace period applied when checking token expiry, in seconds
pub const TOKEN_EXPIRY_LEEWAY_SECS: i64 = 30;
