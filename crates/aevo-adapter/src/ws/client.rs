/*
[INPUT]:  WebSocket URL, optional credentials and subscription channels
[OUTPUT]: Real-time market data, order updates and command replies via a stream
[POS]:    WebSocket layer - session lifecycle and real-time data stream handling
[UPDATE]: When adding new channels or changing connection logic
*/

use std::pin::Pin;
use std::sync::{Arc, RwLock};
use std::task::{Context, Poll};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, Stream, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{Error as TungsteniteError, Message as WsMessage};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use crate::auth::{Credentials, OrderSigner};
use crate::http::{AevoError, Result};
use crate::types::{Environment, InstrumentType, OrderParams, SubmittedOrder};
use crate::ws::message::{Channel, WsCommand, WsEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, WsMessage>;
type WsSource = SplitStream<WsStream>;
type EventSender = mpsc::UnboundedSender<Result<WsEvent>>;

const MESSAGE_SAMPLE_LIMIT: usize = 3;
const OTHER_LOG_LIMIT: usize = 3;
const PARSE_FAIL_LOG_LIMIT: usize = 3;
const RAW_LOG_MAX_BYTES: usize = 1024;


/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Authenticated,
}

/// WebSocket session for the Aevo API
///
/// One socket, one reader task, one consumer. Commands are written from
/// the caller's task and each send completes before the next starts.
pub struct AevoWebSocket {
    url: String,
    credentials: Option<Credentials>,
    order_signer: Option<OrderSigner>,
    sink: Option<WsSink>,
    events: Option<mpsc::UnboundedReceiver<Result<WsEvent>>>,
    state: Arc<RwLock<ConnectionState>>,
    next_id: u64,
    reader: Option<JoinHandle<()>>,
}

impl AevoWebSocket {
    /// Public-only session
    pub fn new(environment: Environment) -> Self {
        Self::with_url(environment.ws_url())
    }

    /// Session that authenticates on connect and can place orders
    pub fn with_credentials(credentials: Credentials) -> Self {
        let mut ws = Self::with_url(credentials.ws_url());
        ws.order_signer = Some(OrderSigner::from_credentials(&credentials));
        ws.credentials = Some(credentials);
        ws
    }

    /// Session against an explicit URL (proxies, local servers)
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            credentials: None,
            order_signer: None,
            sink: None,
            events: None,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            next_id: 1,
            reader: None,
        }
    }

    /// Replace the URL, keeping credentials
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn state(&self) -> ConnectionState {
        read_state(&self.state)
    }

    pub fn is_connected(&self) -> bool {
        matches!(
            self.state(),
            ConnectionState::Connected | ConnectionState::Authenticated
        )
    }

    /// Connect and, when an API key pair is configured, send `auth`
    ///
    /// On failure, including a failed `auth` send, the session is left
    /// `Disconnected`.
    pub async fn open_connection(&mut self) -> Result<()> {
        if self.sink.is_some() && self.is_connected() {
            return Err(AevoError::WebSocket("WebSocket already connected".to_string()));
        }
        self.reset();

        write_state(&self.state, ConnectionState::Connecting);
        info!(url = %self.url, "websocket connecting");

        let ws_stream = match connect_async(self.url.as_str()).await {
            Ok((ws_stream, _response)) => ws_stream,
            Err(err) => {
                write_state(&self.state, ConnectionState::Disconnected);
                warn!(url = %self.url, error = %err, "websocket connect failed");
                return Err(AevoError::WebSocket(err.to_string()));
            }
        };

        let (write, read) = ws_stream.split();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let auth_id = match &self.credentials {
            Some(credentials) if credentials.has_api_key() => Some(self.next_request_id()),
            _ => None,
        };

        write_state(&self.state, ConnectionState::Connected);
        self.reader = Some(tokio::spawn(read_loop(
            read,
            event_tx,
            self.state.clone(),
            auth_id,
        )));
        self.sink = Some(write);
        self.events = Some(event_rx);
        info!(url = %self.url, "websocket connected");

        if let Some(id) = auth_id {
            self.authenticate(id).await?;
        }

        Ok(())
    }

    /// Send `auth`; a failed send tears the half-open connection down
    async fn authenticate(&mut self, id: u64) -> Result<()> {
        let command = match &self.credentials {
            Some(credentials) => WsCommand::auth(id, credentials.api_key(), credentials.api_secret()),
            None => return Err(AevoError::missing_credentials("auth")),
        };

        if let Err(err) = self.send_command(&command).await {
            warn!(url = %self.url, error = %err, "websocket auth send failed");
            self.reset();
            write_state(&self.state, ConnectionState::Disconnected);
            return Err(err);
        }
        Ok(())
    }

    /// Send a close frame and drop the write half
    pub async fn close_connection(&mut self) -> Result<()> {
        let result = match self.sink.take() {
            Some(mut sink) => match sink.close().await {
                Ok(()) | Err(TungsteniteError::ConnectionClosed | TungsteniteError::AlreadyClosed) => {
                    Ok(())
                }
                Err(err) => Err(AevoError::WebSocket(err.to_string())),
            },
            None => Ok(()),
        };
        write_state(&self.state, ConnectionState::Disconnected);
        info!(url = %self.url, "websocket closed");
        result
    }

    /// Decoded messages of the current connection, in arrival order
    ///
    /// Can be taken once per connection. Ends when the socket closes.
    pub fn read_messages(&mut self) -> Result<MessageStream> {
        self.events
            .take()
            .map(|receiver| MessageStream { receiver })
            .ok_or(AevoError::NotConnected)
    }

    pub async fn subscribe(&mut self, channels: &[Channel]) -> Result<u64> {
        let id = self.next_request_id();
        self.send_command(&WsCommand::subscribe(id, channels)).await?;
        for channel in channels {
            info!(id, channel = %channel, "ws subscription sent");
        }
        Ok(id)
    }

    pub async fn unsubscribe(&mut self, channels: &[Channel]) -> Result<u64> {
        let id = self.next_request_id();
        self.send_command(&WsCommand::unsubscribe(id, channels)).await?;
        for channel in channels {
            info!(id, channel = %channel, "ws unsubscription sent");
        }
        Ok(id)
    }

    /// `index:{asset}`
    pub async fn subscribe_index(&mut self, asset: &str) -> Result<u64> {
        self.subscribe(&[Channel::Index {
            asset: asset.to_string(),
        }])
        .await
    }

    /// Subscribe to a ticker channel by its full name
    pub async fn subscribe_ticker(&mut self, channel: &str) -> Result<u64> {
        self.subscribe(&[Channel::parse(channel)]).await
    }

    /// Option chain tickers: `ticker:{asset}:OPTION`
    pub async fn subscribe_tickers(&mut self, asset: &str) -> Result<u64> {
        self.subscribe(&[Channel::Ticker {
            asset: asset.to_string(),
            instrument_type: InstrumentType::Option,
        }])
        .await
    }

    /// `markprice:{asset}:OPTION`
    pub async fn subscribe_markprice(&mut self, asset: &str) -> Result<u64> {
        self.subscribe(&[Channel::MarkPrice {
            asset: asset.to_string(),
        }])
        .await
    }

    pub async fn subscribe_orderbook(&mut self, instrument_name: &str) -> Result<u64> {
        self.subscribe(&[Channel::Orderbook {
            instrument_name: instrument_name.to_string(),
        }])
        .await
    }

    pub async fn subscribe_trades(&mut self, instrument_name: &str) -> Result<u64> {
        self.subscribe(&[Channel::Trades {
            instrument_name: instrument_name.to_string(),
        }])
        .await
    }

    /// Private: requires an authenticated session
    pub async fn subscribe_orders(&mut self) -> Result<u64> {
        self.subscribe(&[Channel::Orders]).await
    }

    /// Private: requires an authenticated session
    pub async fn subscribe_fills(&mut self) -> Result<u64> {
        self.subscribe(&[Channel::Fills]).await
    }

    /// Sign and send `create_order`
    ///
    /// Returns the request id and the locally computed order id; the
    /// exchange reply arrives on the message stream.
    pub async fn create_order(&mut self, params: &OrderParams) -> Result<SubmittedOrder> {
        let signed = self.order_signer("create_order")?.sign_order_now(params)?;
        let id = self.next_request_id();
        let order_id = signed.order_id_hex();

        self.send_command(&WsCommand::create_order(id, signed.payload))
            .await?;
        info!(id, order_id = %order_id, instrument = params.instrument_id, "ws order submitted");

        Ok(SubmittedOrder {
            request_id: id,
            order_id,
        })
    }

    /// Replace an open order; the replacement gets a new order id
    pub async fn edit_order(&mut self, order_id: &str, params: &OrderParams) -> Result<SubmittedOrder> {
        let signed = self.order_signer("edit_order")?.sign_order_now(params)?;
        let id = self.next_request_id();
        let new_order_id = signed.order_id_hex();

        self.send_command(&WsCommand::edit_order(id, order_id, signed.payload))
            .await?;
        info!(id, order_id, new_order_id = %new_order_id, "ws order edit submitted");

        Ok(SubmittedOrder {
            request_id: id,
            order_id: new_order_id,
        })
    }

    pub async fn cancel_order(&mut self, order_id: &str) -> Result<u64> {
        if order_id.is_empty() {
            return Err(AevoError::Config("order_id must not be empty".to_string()));
        }
        self.order_signer("cancel_order")?;
        let id = self.next_request_id();
        self.send_command(&WsCommand::cancel_order(id, order_id))
            .await?;
        info!(id, order_id, "ws cancel submitted");
        Ok(id)
    }

    pub async fn cancel_all_orders(&mut self) -> Result<u64> {
        self.order_signer("cancel_all_orders")?;
        let id = self.next_request_id();
        self.send_command(&WsCommand::cancel_all_orders(id)).await?;
        info!(id, "ws cancel all submitted");
        Ok(id)
    }

    fn order_signer(&self, operation: &str) -> Result<&OrderSigner> {
        self.order_signer
            .as_ref()
            .ok_or_else(|| AevoError::missing_credentials(operation))
    }

    fn next_request_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    async fn send_command(&mut self, command: &WsCommand) -> Result<()> {
        let sink = self.sink.as_mut().ok_or(AevoError::NotConnected)?;
        let text = serde_json::to_string(command)?;

        sink.send(WsMessage::Text(text.into()))
            .await
            .map_err(|err| AevoError::WebSocket(err.to_string()))?;

        debug!(id = command.id, op = ?command.op, "ws command sent");
        Ok(())
    }

    fn reset(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        self.sink = None;
        self.events = None;
    }
}

impl std::fmt::Debug for AevoWebSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AevoWebSocket")
            .field("url", &self.url)
            .field("credentials", &self.credentials)
            .field("state", &self.state())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl Drop for AevoWebSocket {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

/// Stream of decoded events returned by [`AevoWebSocket::read_messages`]
///
/// Decode failures are yielded as `Err` items and the stream continues;
/// a transport failure is yielded once, then the stream ends.
#[derive(Debug)]
pub struct MessageStream {
    receiver: mpsc::UnboundedReceiver<Result<WsEvent>>,
}

impl Stream for MessageStream {
    type Item = Result<WsEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

async fn read_loop(
    mut read: WsSource,
    event_tx: EventSender,
    state: Arc<RwLock<ConnectionState>>,
    auth_id: Option<u64>,
) {
    let mut samples = LogSamples::default();
    while let Some(incoming) = read.next().await {
        let text = match incoming {
            Ok(WsMessage::Text(text)) => text.to_string(),
            Ok(WsMessage::Binary(bytes)) => match String::from_utf8(bytes.to_vec()) {
                Ok(text) => text,
                Err(err) => {
                    warn!(error = %err, bytes = bytes.len(), "ws binary frame is not utf-8");
                    continue;
                }
            },
            Ok(WsMessage::Close(frame)) => {
                info!(frame = ?frame, "websocket closed by server");
                break;
            }
            Ok(_) => continue,
            Err(TungsteniteError::ConnectionClosed | TungsteniteError::AlreadyClosed) => break,
            Err(err) => {
                warn!(error = %err, "websocket read failed");
                let _ = event_tx.send(Err(AevoError::WebSocket(err.to_string())));
                break;
            }
        };

        let event = match WsEvent::decode(&text) {
            Ok(event) => event,
            Err(err) => {
                samples.parse_failure(&err, &text);
                if event_tx
                    .send(Err(AevoError::InvalidResponse(err.to_string())))
                    .is_err()
                {
                    break;
                }
                continue;
            }
        };

        track_auth_reply(&event, auth_id, &state);
        if matches!(event, WsEvent::Other(_)) {
            samples.other_message(&text);
        } else {
            samples.message(&event);
        }

        if event_tx.send(Ok(event)).is_err() {
            break;
        }
    }

    write_state(&state, ConnectionState::Disconnected);
    debug!("websocket reader stopped");
}

fn track_auth_reply(event: &WsEvent, auth_id: Option<u64>, state: &RwLock<ConnectionState>) {
    let Some(auth_id) = auth_id else {
        return;
    };
    match event {
        WsEvent::Response { id, .. } if *id == auth_id => {
            write_state(state, ConnectionState::Authenticated);
            info!("websocket authenticated");
        }
        WsEvent::Error { id: Some(id), error } if *id == auth_id => {
            warn!(error = %error, "websocket authentication rejected");
        }
        _ => {}
    }
}

fn read_state(state: &RwLock<ConnectionState>) -> ConnectionState {
    match state.read() {
        Ok(guard) => *guard,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

fn write_state(state: &RwLock<ConnectionState>, next: ConnectionState) {
    match state.write() {
        Ok(mut guard) => *guard = next,
        Err(poisoned) => *poisoned.into_inner() = next,
    }
}

/// Per-connection counters for sampled logging
#[derive(Debug, Default)]
struct LogSamples {
    messages: usize,
    other: usize,
    parse_failures: usize,
}

impl LogSamples {
    fn message(&mut self, event: &WsEvent) {
        if let Some(index) = next_sample(&mut self.messages, MESSAGE_SAMPLE_LIMIT) {
            info!(
                sample_index = index,
                sample_limit = MESSAGE_SAMPLE_LIMIT,
                kind = event.kind(),
                "ws message sample"
            );
        }
    }

    fn other_message(&mut self, raw: &str) {
        if let Some(index) = next_sample(&mut self.other, OTHER_LOG_LIMIT) {
            let preview = truncate_for_log(raw, RAW_LOG_MAX_BYTES);
            debug!(
                sample_index = index,
                sample_limit = OTHER_LOG_LIMIT,
                bytes = raw.len(),
                message = %preview,
                "ws message channel unrecognized"
            );
        }
    }

    fn parse_failure(&mut self, err: &serde_json::Error, raw: &str) {
        if let Some(index) = next_sample(&mut self.parse_failures, PARSE_FAIL_LOG_LIMIT) {
            let preview = truncate_for_log(raw, RAW_LOG_MAX_BYTES);
            warn!(
                sample_index = index,
                sample_limit = PARSE_FAIL_LOG_LIMIT,
                error = %err,
                bytes = raw.len(),
                message = %preview,
                "ws message parse failed"
            );
        }
    }
}

/// 1-based sample index while under `limit`
fn next_sample(count: &mut usize, limit: usize) -> Option<usize> {
    if *count >= limit {
        return None;
    }
    *count += 1;
    Some(*count)
}

fn truncate_for_log(value: &str, max_len: usize) -> String {
    if value.len() <= max_len {
        return value.to_string();
    }
    let mut end = max_len;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = String::with_capacity(end + 3);
    out.push_str(&value[..end]);
    out.push_str("...");
    out
}
