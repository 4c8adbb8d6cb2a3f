use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, warn};

use denguewatch::api::{ApiClient, DashboardSource, RemoteDashboard, RiskLevel};
use denguewatch::auth::{is_token_expired, time_until_expiry};
use denguewatch::config::{self, LoadConfigResult};
use denguewatch::constants::TOKEN_EXPIRY_LEEWAY_SECS;
use denguewatch::map::MapViewState;
use denguewatch::mock::MockDashboard;
use denguewatch::notifications::{NotificationCenter, NotificationClient, NotificationEvent};
use denguewatch::paths;

/// Set up stdout logging plus a log file for debug builds
#[cfg(debug_assertions)]
fn setup_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use std::fs::OpenOptions;
    use std::io::Write;
    use tracing_subscriber::prelude::*;

    let logs_dir = paths::logs_dir();
    if std::fs::create_dir_all(&logs_dir).is_err() {
        eprintln!("Failed to create logs directory");
        return None;
    }

    let log_file_path = logs_dir.join("denguewatch.log");

    // Append session separator to existing log file
    if let Ok(mut file) = OpenOptions::new().append(true).open(&log_file_path) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let separator = "=".repeat(80);
        let _ = writeln!(
            file,
            "\n\n{}\n=== New Session Started at {} ===\n{}\n",
            separator, timestamp, separator
        );
    }

    let file_appender = tracing_appender::rolling::never(&logs_dir, "denguewatch.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Configure file layer (no ANSI colors for file output)
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Some(guard)
}

#[cfg(not(debug_assertions))]
fn setup_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::prelude::*;

    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    None
}

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,denguewatch=debug"))
}

/// Token from the environment, dropped if it is already expired
fn valid_token() -> Option<String> {
    let token = config::access_token()?;
    let now = Utc::now();

    if is_token_expired(&token, now, chrono::Duration::seconds(TOKEN_EXPIRY_LEEWAY_SECS)) {
        warn!("Access token is expired or unreadable, continuing without it");
        return None;
    }
    if let Some(left) = time_until_expiry(&token, now) {
        info!("Access token valid for {} more minutes", left.num_minutes());
    }
    Some(token)
}

fn log_dashboard(source: &dyn DashboardSource, view: &MapViewState) {
    for fact in source.facts() {
        info!(
            "{}: {}{}",
            fact.label,
            fact.value,
            fact.unit.as_deref().unwrap_or("")
        );
    }

    let dengue = source.dengue();
    info!(
        "Dengue: {} cases ({} confirmed, {} suspected), incidence {:.1}/100k",
        dengue.total_cases, dengue.confirmed, dengue.suspected, dengue.incidence_rate
    );

    let risk = source.risk_dashboard();
    info!(
        "Risk: {} high, {} medium, {} low of {} municipalities",
        risk.summary.high, risk.summary.medium, risk.summary.low, risk.summary.total_municipalities
    );
    for m in risk.at_level(RiskLevel::High) {
        info!("  high risk: {} ({:.2})", m.name, m.score);
    }

    let sites = source.breeding_sites();
    info!(
        "{} breeding sites on the map ({} after filters)",
        sites.len(),
        view.visible_points(&sites).len()
    );
}

/// Follow the live notification feed until the client gives up
fn follow_notifications(client: &mut NotificationClient, token: &str) {
    if let Err(e) = client.connect(token) {
        error!("{e}");
        return;
    }

    let mut inbox = NotificationCenter::default();
    loop {
        let Some(event) = client.wait_event(Duration::from_secs(60)) else {
            if !client.is_running() {
                warn!("Notification worker stopped ({:?})", client.state());
                break;
            }
            continue;
        };

        if inbox.apply_event(&event).is_some() {
            let unread = inbox.unread_count();
            if let Some(n) = inbox.iter().next() {
                info!("[{:?}] {}: {} ({} unread)", n.kind, n.title, n.message, unread);
            }
        }
        if event == NotificationEvent::GaveUp {
            warn!("Live notifications unavailable");
            break;
        }
    }

    client.disconnect();
}

fn main() {
    // Keep the guard alive for the duration of the program
    let _log_guard = setup_logging();

    if let Err(e) = paths::ensure_directories() {
        warn!("Failed to create data directories: {}", e);
    }

    let LoadConfigResult {
        mut config,
        reset_reason,
    } = config::load_config();
    if let Some(reason) = reset_reason {
        warn!("{reason}; defaults restored");
        config.dirty = true;
    }

    let token = valid_token();
    let view = MapViewState::new(&config.data.map);

    if config.data.use_mock_data {
        info!("Using built-in sample data");
        log_dashboard(&MockDashboard, &view);
    } else {
        let mut client = ApiClient::from_config(&config.data);
        client.set_token(token.clone());
        log_dashboard(&RemoteDashboard::new(client), &view);
    }

    config.save_if_dirty();

    match token {
        Some(token) => {
            let mut notifications = NotificationClient::from_config(&config.data);
            follow_notifications(&mut notifications, &token);
        }
        None => info!("No access token, skipping live notifications"),
    }
}
