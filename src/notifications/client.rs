//! Live notification feed over WebSocket.
//!
//! The client owns a worker thread that keeps the socket open, parses frames
//! and reconnects with exponential backoff. Results are handed back through a
//! channel and collected with [`NotificationClient::poll_events`].

use std::net::{TcpStream, ToSocketAddrs};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use tungstenite::client::{uri_mode, IntoClientRequest};
use tungstenite::stream::{MaybeTlsStream, Mode};
use tungstenite::{Message, WebSocket};

use crate::config::AppConfigData;
use crate::constants::{SOCKET_CONNECT_TIMEOUT_MS, SOCKET_POLL_INTERVAL_MS};

use super::backoff::ReconnectPolicy;
use super::message::{parse_server_message, Notification, ServerMessage};
use super::NotifyError;

/// An open connection yielding text frames
pub trait Connection: Send {
    /// Next text frame, or `Ok(None)` if nothing arrived within the poll interval
    fn next_text(&mut self) -> Result<Option<String>, NotifyError>;

    fn close(&mut self);
}

/// Opens connections to the notification endpoint
pub trait Connector: Clone + Send + 'static {
    type Conn: Connection;

    fn connect(&mut self, url: &str) -> Result<Self::Conn, NotifyError>;
}

/// Connector backed by a blocking `tungstenite` socket
#[derive(Debug, Clone)]
pub struct WsConnector {
    poll_interval: Duration,
    /// Bounds the TCP connect and every handshake read/write
    connect_timeout: Duration,
}

impl Default for WsConnector {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(SOCKET_POLL_INTERVAL_MS),
            connect_timeout: Duration::from_millis(SOCKET_CONNECT_TIMEOUT_MS),
        }
    }
}

impl WsConnector {
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    fn open_stream(&self, host: &str, port: u16) -> Result<TcpStream, NotifyError> {
        let addrs = (host, port)
            .to_socket_addrs()
            .map_err(|e| NotifyError::Connect(format!("Failed to resolve {host}: {e}")))?;

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_error = Some(e),
            }
        }
        Err(NotifyError::Connect(match last_error {
            Some(e) => e.to_string(),
            None => format!("No address found for {host}"),
        }))
    }
}

pub struct WsConnection {
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
}

impl Connector for WsConnector {
    type Conn = WsConnection;

    fn connect(&mut self, url: &str) -> Result<WsConnection, NotifyError> {
        let request = url
            .into_client_request()
            .map_err(|e| NotifyError::Connect(e.to_string()))?;
        let uri = request.uri();
        let mode = uri_mode(uri).map_err(|e| NotifyError::Connect(e.to_string()))?;
        let host = uri
            .host()
            .map(|h| h.trim_start_matches('[').trim_end_matches(']').to_string())
            .ok_or_else(|| NotifyError::Connect(format!("No host in {url}")))?;
        let port = uri.port_u16().unwrap_or(match mode {
            Mode::Plain => 80,
            Mode::Tls => 443,
        });

        // A server that accepts TCP but never answers must not pin the worker
        let stream = self.open_stream(&host, port)?;
        stream
            .set_read_timeout(Some(self.connect_timeout))
            .and_then(|()| stream.set_write_timeout(Some(self.connect_timeout)))
            .map_err(|e| NotifyError::Connect(e.to_string()))?;

        let (socket, response) = tungstenite::client_tls(request, stream)
            .map_err(|e| NotifyError::Connect(format!("Handshake failed: {e}")))?;
        debug!("Notification handshake answered {}", response.status());

        // Reads time out so the worker can notice shutdown requests
        set_read_timeout(socket.get_ref(), self.poll_interval)
            .map_err(|e| NotifyError::Connect(e.to_string()))?;

        Ok(WsConnection { socket })
    }
}

fn set_read_timeout(stream: &MaybeTlsStream<TcpStream>, timeout: Duration) -> std::io::Result<()> {
    match stream {
        MaybeTlsStream::Plain(s) => s.set_read_timeout(Some(timeout)),
        MaybeTlsStream::Rustls(s) => s.get_ref().set_read_timeout(Some(timeout)),
        _ => Ok(()),
    }
}

impl Connection for WsConnection {
    fn next_text(&mut self) -> Result<Option<String>, NotifyError> {
        match self.socket.read() {
            Ok(Message::Text(text)) => Ok(Some(text)),
            Ok(Message::Close(frame)) => Err(NotifyError::Closed(
                frame
                    .map(|f| f.reason.to_string())
                    .unwrap_or_else(|| "closed by server".to_string()),
            )),
            Ok(_) => Ok(None),
            Err(tungstenite::Error::Io(e))
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                Ok(None)
            }
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                Err(NotifyError::Closed("connection closed".to_string()))
            }
            Err(e) => Err(NotifyError::Transport(e.to_string())),
        }
    }

    fn close(&mut self) {
        let _ = self.socket.close(None);
        let _ = self.socket.flush();
    }
}

/// Connection lifecycle as seen by the UI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    /// Reconnect budget exhausted
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    Connected,
    Notification(Notification),
    Disconnected { reason: String },
    Reconnecting { attempt: u32, delay: Duration },
    GaveUp,
}

struct Worker {
    /// Dropping this sender asks the worker to stop
    shutdown: Sender<()>,
    handle: JoinHandle<()>,
}

/// Append the access token as the `token` query parameter
pub fn url_with_token(base: &str, token: &str) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}token={token}")
}

pub struct NotificationClient<C: Connector = WsConnector> {
    url: String,
    policy: ReconnectPolicy,
    connector: C,
    state: Arc<Mutex<ConnectionState>>,
    events_tx: Sender<NotificationEvent>,
    events_rx: Receiver<NotificationEvent>,
    worker: Option<Worker>,
}

impl NotificationClient<WsConnector> {
    pub fn from_config(config: &AppConfigData) -> Self {
        Self::new(
            config.ws_url.clone(),
            ReconnectPolicy::from(&config.reconnect),
            WsConnector::default(),
        )
    }
}

impl<C: Connector> NotificationClient<C> {
    pub fn new(url: impl Into<String>, policy: ReconnectPolicy, connector: C) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            url: url.into(),
            policy,
            connector,
            state: Arc::new(Mutex::new(ConnectionState::Disconnected)),
            events_tx,
            events_rx,
            worker: None,
        }
    }

    /// Start the worker. Does nothing if it is already running; a worker
    /// that gave up is replaced.
    pub fn connect(&mut self, token: &str) -> Result<(), NotifyError> {
        if let Some(worker) = &self.worker {
            if !worker.handle.is_finished() {
                debug!("Notification client already running");
                return Ok(());
            }
            self.disconnect();
        }

        let (shutdown, shutdown_rx) = mpsc::channel();
        let url = url_with_token(&self.url, token);
        let connector = self.connector.clone();
        let policy = self.policy;
        let events = self.events_tx.clone();
        let state = Arc::clone(&self.state);

        set_state(&self.state, ConnectionState::Connecting);
        let handle = std::thread::Builder::new()
            .name("notifications".into())
            .spawn(move || run_worker(connector, url, policy, shutdown_rx, events, state))
            .map_err(|e| {
                set_state(&self.state, ConnectionState::Failed);
                NotifyError::Connect(format!("Failed to start notification worker: {e}"))
            })?;

        self.worker = Some(Worker { shutdown, handle });
        Ok(())
    }

    /// Stop the worker and close the socket
    pub fn disconnect(&mut self) {
        if let Some(worker) = self.worker.take() {
            drop(worker.shutdown);
            if worker.handle.join().is_err() {
                error!("Notification worker panicked");
            }
            info!("Notification client disconnected");
        }
        set_state(&self.state, ConnectionState::Disconnected);
    }

    pub fn state(&self) -> ConnectionState {
        self.state
            .lock()
            .map(|s| *s)
            .unwrap_or(ConnectionState::Failed)
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Whether a worker thread is alive. False once it gave up, was stopped
    /// or panicked.
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.handle.is_finished())
    }

    /// Drain all pending events without blocking
    pub fn poll_events(&self) -> Vec<NotificationEvent> {
        self.events_rx.try_iter().collect()
    }

    /// Wait up to `timeout` for the next event
    pub fn wait_event(&self, timeout: Duration) -> Option<NotificationEvent> {
        self.events_rx.recv_timeout(timeout).ok()
    }
}

impl<C: Connector> Drop for NotificationClient<C> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn set_state(state: &Mutex<ConnectionState>, value: ConnectionState) {
    if let Ok(mut current) = state.lock() {
        *current = value;
    }
}

enum PumpExit {
    Shutdown,
    Lost(String),
}

fn run_worker<C: Connector>(
    mut connector: C,
    url: String,
    policy: ReconnectPolicy,
    shutdown: Receiver<()>,
    events: Sender<NotificationEvent>,
    state: Arc<Mutex<ConnectionState>>,
) {
    let mut attempt = 0;

    loop {
        let reason = match connector.connect(&url) {
            Ok(mut conn) => {
                info!("Notification socket connected");
                attempt = 0;
                set_state(&state, ConnectionState::Connected);
                let _ = events.send(NotificationEvent::Connected);

                match pump(&mut conn, &shutdown, &events) {
                    PumpExit::Shutdown => {
                        conn.close();
                        return;
                    }
                    PumpExit::Lost(reason) => reason,
                }
            }
            Err(e) => e.to_string(),
        };

        warn!("Notification socket unavailable: {reason}");
        let _ = events.send(NotificationEvent::Disconnected { reason });

        let Some(delay) = policy.delay_for(attempt) else {
            error!("Giving up on notifications after {attempt} reconnect attempts");
            set_state(&state, ConnectionState::Failed);
            let _ = events.send(NotificationEvent::GaveUp);
            return;
        };
        attempt += 1;

        info!(
            "Reconnecting in {:?} (attempt {}/{})",
            delay, attempt, policy.max_attempts
        );
        set_state(&state, ConnectionState::Reconnecting);
        let _ = events.send(NotificationEvent::Reconnecting { attempt, delay });

        match shutdown.recv_timeout(delay) {
            Err(RecvTimeoutError::Timeout) => {}
            _ => return,
        }
    }
}

fn pump<T: Connection>(
    conn: &mut T,
    shutdown: &Receiver<()>,
    events: &Sender<NotificationEvent>,
) -> PumpExit {
    loop {
        match shutdown.try_recv() {
            Err(TryRecvError::Empty) => {}
            _ => return PumpExit::Shutdown,
        }

        match conn.next_text() {
            Ok(Some(text)) => match parse_server_message(&text) {
                Ok(ServerMessage::Notification(notification)) => {
                    debug!("Notification {} received", notification.id);
                    let _ = events.send(NotificationEvent::Notification(notification));
                }
                Err(e) => warn!("Ignoring notification frame: {e}"),
            },
            Ok(None) => {}
            Err(e) => return PumpExit::Lost(e.to_string()),
        }
    }
}
