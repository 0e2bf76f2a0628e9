//! Keep-connected manager interface client
//!
//! [`AmiClient::connect`] returns immediately with the client handle and the
//! receiving end of the event channel. A background task owns the TCP
//! session: it logs in, routes responses to the action waiting on them and
//! forwards every event, then reconnects after a pause whenever the link
//! drops.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, Notify};
use tracing::{debug, error, info, trace, warn};

use crate::config::AmiConfig;
use crate::error::{ManagerError, Result};
use crate::message::{parse_header_line, Action, Headers, ManagerEvent, ManagerMessage, ManagerResponse};

/// The narrow action interface the dial engine consumes
#[async_trait]
pub trait ManagerClient: Send + Sync {
    /// Submit an action and wait for the switch to accept or reject it
    async fn send_action(&self, action: Action) -> Result<ManagerResponse>;

    /// Whether an authenticated session is currently up
    fn is_connected(&self) -> bool;
}

/// Manager interface client over TCP
#[derive(Clone)]
pub struct AmiClient {
    inner: Arc<AmiClientInner>,
}

struct AmiClientInner {
    config: AmiConfig,
    connected: AtomicBool,
    closed: AtomicBool,
    shutdown: Notify,
    next_action_id: AtomicU64,
    writer: Mutex<Option<mpsc::UnboundedSender<String>>>,
    pending: DashMap<String, oneshot::Sender<ManagerResponse>>,
    events_tx: mpsc::UnboundedSender<ManagerEvent>,
}

impl AmiClient {
    /// Start the connection task and return the client with its event stream.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(config: AmiConfig) -> (Self, mpsc::UnboundedReceiver<ManagerEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let client = AmiClient {
            inner: Arc::new(AmiClientInner {
                config,
                connected: AtomicBool::new(false),
                closed: AtomicBool::new(false),
                shutdown: Notify::new(),
                next_action_id: AtomicU64::new(1),
                writer: Mutex::new(None),
                pending: DashMap::new(),
                events_tx,
            }),
        };

        client.spawn_connection_loop();

        (client, events_rx)
    }

    pub fn config(&self) -> &AmiConfig {
        &self.inner.config
    }

    /// Stop reconnecting and drop the current session
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.shutdown.notify_one();
        self.mark_disconnected();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    fn next_action_id(&self) -> String {
        let seq = self.inner.next_action_id.fetch_add(1, Ordering::Relaxed);
        format!("autodial-{}", seq)
    }

    fn spawn_connection_loop(&self) {
        let client = self.clone();

        tokio::spawn(async move {
            let inner = &client.inner;

            while !inner.closed.load(Ordering::SeqCst) {
                let outcome = tokio::select! {
                    result = client.run_session() => result,
                    _ = inner.shutdown.notified() => Err(ManagerError::Closed),
                };

                client.mark_disconnected();

                match outcome {
                    Ok(()) => warn!("Manager interface closed the connection"),
                    Err(ManagerError::Closed) => break,
                    Err(e) => error!("AMI connection error: {}", e),
                }

                if inner.closed.load(Ordering::SeqCst) {
                    break;
                }

                let interval = inner.config.reconnect_interval();
                debug!("Reconnecting to manager interface in {:?}", interval);
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = inner.shutdown.notified() => break,
                }
            }

            info!("AMI connection loop terminated");
        });
    }

    async fn run_session(&self) -> Result<()> {
        let inner = &self.inner;
        let address = inner.config.address();
        debug!("Connecting to manager interface at {}", address);

        let stream = TcpStream::connect(&address).await?;
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        let mut buf = Vec::new();
        let Some(banner) = read_text_line(&mut reader, &mut buf).await? else {
            return Err(ManagerError::protocol("connection closed before banner"));
        };
        info!("Connected to {} ({})", address, banner.trim());

        let timeout = inner.config.action_timeout();
        match tokio::time::timeout(timeout, self.login(&mut reader, &mut write_half)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ManagerError::Timeout {
                    action_id: "login".to_string(),
                    millis: inner.config.action_timeout_ms,
                })
            }
        }

        let (writer_tx, writer_rx) = mpsc::unbounded_channel();
        let writer_task = tokio::spawn(write_loop(write_half, writer_rx));
        self.install_writer(writer_tx);
        info!("AMI is connected");

        let result = self.read_loop(&mut reader).await;
        writer_task.abort();
        result
    }

    async fn login<R, W>(&self, reader: &mut R, writer: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let config = &self.inner.config;
        let action_id = self.next_action_id();
        let action = Action::new("Login")
            .with_header("ActionID", &action_id)
            .with_header("Username", &config.username)
            .with_header("Secret", &config.secret)
            .with_header("Events", "on");

        writer.write_all(action.encode().as_bytes()).await?;

        loop {
            match read_message(reader).await? {
                None => return Err(ManagerError::protocol("connection closed during login")),
                Some(ManagerMessage::Response(response))
                    if response.action_id() == Some(action_id.as_str()) =>
                {
                    if response.is_success() {
                        debug!("Logged in as {}", config.username);
                        return Ok(());
                    }
                    return Err(ManagerError::AuthenticationFailed {
                        message: response.message().unwrap_or("rejected").to_string(),
                    });
                }
                Some(ManagerMessage::Response(response)) => {
                    trace!("Ignoring response {:?} during login", response.action_id());
                }
                Some(ManagerMessage::Event(event)) => self.forward_event(event),
            }
        }
    }

    async fn read_loop<R>(&self, reader: &mut R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        while let Some(message) = read_message(reader).await? {
            match message {
                ManagerMessage::Response(response) => self.resolve_pending(response),
                ManagerMessage::Event(event) => self.forward_event(event),
            }
        }
        Ok(())
    }

    fn resolve_pending(&self, response: ManagerResponse) {
        match response
            .action_id()
            .and_then(|id| self.inner.pending.remove(id))
        {
            Some((_, waiter)) => {
                let _ = waiter.send(response);
            }
            None => debug!("Response for unknown action {:?}", response.action_id()),
        }
    }

    fn forward_event(&self, event: ManagerEvent) {
        trace!("Event {}", event.name());
        if self.inner.events_tx.send(event).is_err() {
            trace!("Event receiver dropped");
        }
    }

    fn install_writer(&self, writer: mpsc::UnboundedSender<String>) {
        *self.inner.writer.lock() = Some(writer);
        self.inner.connected.store(true, Ordering::SeqCst);
    }

    fn enqueue(&self, frame: String) -> bool {
        match self.inner.writer.lock().as_ref() {
            Some(writer) => writer.send(frame).is_ok(),
            None => false,
        }
    }

    fn mark_disconnected(&self) {
        let was_connected = self.inner.connected.swap(false, Ordering::SeqCst);
        self.inner.writer.lock().take();
        // Dropping the senders wakes every waiter with ConnectionLost
        self.inner.pending.clear();
        if was_connected {
            warn!("AMI connection lost");
        }
    }
}

#[async_trait]
impl ManagerClient for AmiClient {
    async fn send_action(&self, mut action: Action) -> Result<ManagerResponse> {
        if self.is_closed() {
            return Err(ManagerError::Closed);
        }
        if !self.is_connected() {
            return Err(ManagerError::NotConnected);
        }

        let action_id = match action.action_id() {
            Some(id) => id.to_string(),
            None => {
                let id = self.next_action_id();
                action.set_header("ActionID", &id);
                id
            }
        };

        let (tx, rx) = oneshot::channel();
        self.inner.pending.insert(action_id.clone(), tx);

        if !self.enqueue(action.encode()) {
            self.inner.pending.remove(&action_id);
            return Err(ManagerError::NotConnected);
        }
        debug!("Sent action {}", action);

        let timeout = self.inner.config.action_timeout();
        let response = match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => return Err(ManagerError::ConnectionLost { action_id }),
            Err(_) => {
                self.inner.pending.remove(&action_id);
                return Err(ManagerError::Timeout {
                    action_id,
                    millis: self.inner.config.action_timeout_ms,
                });
            }
        };

        if response.is_success() {
            Ok(response)
        } else {
            Err(ManagerError::action_failed(
                action.name(),
                response.message().unwrap_or("unknown error"),
            ))
        }
    }

    fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }
}

async fn write_loop(mut writer: OwnedWriteHalf, mut frames: mpsc::UnboundedReceiver<String>) {
    while let Some(frame) = frames.recv().await {
        if let Err(e) = writer.write_all(frame.as_bytes()).await {
            error!("Error writing to manager interface: {}", e);
            break;
        }
    }
}

/// Read one response or event frame; `None` at end of stream.
///
/// Blocks with neither `Response` nor `Event` are skipped.
pub(crate) async fn read_message<R>(reader: &mut R) -> Result<Option<ManagerMessage>>
where
    R: AsyncBufRead + Unpin,
{
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut buf = Vec::new();

    loop {
        let Some(line) = read_text_line(reader, &mut buf).await? else {
            return Ok(None);
        };

        if line.trim().is_empty() {
            if pairs.is_empty() {
                continue;
            }
            match ManagerMessage::from_headers(Headers::from_pairs(pairs.drain(..))) {
                Some(message) => return Ok(Some(message)),
                None => {
                    trace!("Skipping unclassified frame");
                    continue;
                }
            }
        }

        if let Some((key, value)) = parse_header_line(&line) {
            pairs.push((key.to_string(), value.to_string()));
        }
    }
}

/// Read one line, decoding invalid UTF-8 lossily; `None` at end of stream.
///
/// Caller names arrive in whatever charset the peer used, often Latin-1.
async fn read_text_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}
