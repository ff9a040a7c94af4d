/*
[INPUT]:  Raw WebSocket text frames and outgoing command parameters
[OUTPUT]: Channel names, serialized commands and decoded WsEvent values
[POS]:    WebSocket layer - message encoding, parsing and validation
[UPDATE]: When adding new channels, operations or event shapes
*/

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::types::{IndexPrice, InstrumentType, OrderPayload, OrderbookUpdate};

/// Subscription topic
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    Index { asset: String },
    Ticker { asset: String, instrument_type: InstrumentType },
    MarkPrice { asset: String },
    Orderbook { instrument_name: String },
    Trades { instrument_name: String },
    Orders,
    Fills,
    /// Any other topic, sent and matched verbatim
    Raw(String),
}

impl Channel {
    /// Parse a channel name; names with an unknown shape become `Raw`
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split(':');
        let channel = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some("index"), Some(asset), None, None) => Some(Channel::Index {
                asset: asset.to_string(),
            }),
            (Some("ticker"), Some(asset), Some(kind), None) => {
                parse_instrument_type(kind).map(|instrument_type| Channel::Ticker {
                    asset: asset.to_string(),
                    instrument_type,
                })
            }
            (Some("markprice"), Some(asset), Some("OPTION"), None) => Some(Channel::MarkPrice {
                asset: asset.to_string(),
            }),
            (Some("orderbook"), Some(name), None, None) => Some(Channel::Orderbook {
                instrument_name: name.to_string(),
            }),
            (Some("trades"), Some(name), None, None) => Some(Channel::Trades {
                instrument_name: name.to_string(),
            }),
            (Some("orders"), None, None, None) => Some(Channel::Orders),
            (Some("fills"), None, None, None) => Some(Channel::Fills),
            _ => None,
        };
        channel.unwrap_or_else(|| Channel::Raw(raw.to_string()))
    }

    /// Whether the channel needs an authenticated session
    pub fn is_private(&self) -> bool {
        matches!(self, Channel::Orders | Channel::Fills)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Index { asset } => write!(f, "index:{asset}"),
            Channel::Ticker {
                asset,
                instrument_type,
            } => write!(f, "ticker:{asset}:{instrument_type}"),
            Channel::MarkPrice { asset } => write!(f, "markprice:{asset}:OPTION"),
            Channel::Orderbook { instrument_name } => write!(f, "orderbook:{instrument_name}"),
            Channel::Trades { instrument_name } => write!(f, "trades:{instrument_name}"),
            Channel::Orders => f.write_str("orders"),
            Channel::Fills => f.write_str("fills"),
            Channel::Raw(raw) => f.write_str(raw),
        }
    }
}

fn parse_instrument_type(value: &str) -> Option<InstrumentType> {
    match value {
        "OPTION" => Some(InstrumentType::Option),
        "PERPETUAL" => Some(InstrumentType::Perpetual),
        "SPOT" => Some(InstrumentType::Spot),
        _ => None,
    }
}

/// Command operation tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Auth,
    Subscribe,
    Unsubscribe,
    CreateOrder,
    EditOrder,
    CancelOrder,
    CancelAllOrders,
}

/// API key pair sent with the `auth` command
#[derive(Clone, PartialEq, Serialize)]
pub struct AuthData {
    pub key: String,
    pub secret: String,
}

impl fmt::Debug for AuthData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthData")
            .field("key", &"<redacted>")
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Signed order plus the id of the order it replaces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditOrderData {
    pub order_id: String,
    #[serde(flatten)]
    pub order: OrderPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CancelOrderData {
    pub order_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandData {
    Auth(AuthData),
    Channels(Vec<String>),
    Order(OrderPayload),
    EditOrder(EditOrderData),
    CancelOrder(CancelOrderData),
    Empty(Map<String, Value>),
}

/// Client to server command: `{"id":N,"op":"...","data":...}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WsCommand {
    pub id: u64,
    pub op: Operation,
    pub data: CommandData,
}

impl WsCommand {
    pub fn auth(id: u64, key: &str, secret: &str) -> Self {
        Self {
            id,
            op: Operation::Auth,
            data: CommandData::Auth(AuthData {
                key: key.to_string(),
                secret: secret.to_string(),
            }),
        }
    }

    pub fn subscribe(id: u64, channels: &[Channel]) -> Self {
        Self {
            id,
            op: Operation::Subscribe,
            data: CommandData::Channels(channels.iter().map(ToString::to_string).collect()),
        }
    }

    pub fn unsubscribe(id: u64, channels: &[Channel]) -> Self {
        Self {
            id,
            op: Operation::Unsubscribe,
            data: CommandData::Channels(channels.iter().map(ToString::to_string).collect()),
        }
    }

    pub fn create_order(id: u64, order: OrderPayload) -> Self {
        Self {
            id,
            op: Operation::CreateOrder,
            data: CommandData::Order(order),
        }
    }

    pub fn edit_order(id: u64, order_id: &str, order: OrderPayload) -> Self {
        Self {
            id,
            op: Operation::EditOrder,
            data: CommandData::EditOrder(EditOrderData {
                order_id: order_id.to_string(),
                order,
            }),
        }
    }

    pub fn cancel_order(id: u64, order_id: &str) -> Self {
        Self {
            id,
            op: Operation::CancelOrder,
            data: CommandData::CancelOrder(CancelOrderData {
                order_id: order_id.to_string(),
            }),
        }
    }

    pub fn cancel_all_orders(id: u64) -> Self {
        Self {
            id,
            op: Operation::CancelAllOrders,
            data: CommandData::Empty(Map::new()),
        }
    }
}

/// Server to client message
///
/// Channel pushes are keyed by the `channel` prefix, command replies by
/// `id`, and anything carrying an `error` key becomes `Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum WsEvent {
    Index {
        asset: String,
        data: IndexPrice,
    },
    Ticker {
        channel: Channel,
        data: Value,
    },
    MarkPrice {
        asset: String,
        data: Value,
    },
    Orderbook {
        instrument_name: String,
        data: OrderbookUpdate,
    },
    Trades {
        instrument_name: String,
        data: Value,
    },
    Orders {
        data: Value,
    },
    Fills {
        data: Value,
    },
    /// Reply to a command, echoing its request id
    Response {
        id: u64,
        data: Value,
    },
    /// Exchange-reported error, passed through unmodified
    Error {
        id: Option<u64>,
        error: Value,
    },
    Other(Value),
}

impl WsEvent {
    /// Decode one text frame
    pub fn decode(text: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Classify a JSON object; known channel payloads are validated here
    pub fn from_value(mut value: Value) -> serde_json::Result<Self> {
        let id = value.get("id").and_then(Value::as_u64);

        if let Some(error) = value.get("error") {
            return Ok(WsEvent::Error {
                id,
                error: error.clone(),
            });
        }

        let channel = value
            .get("channel")
            .and_then(Value::as_str)
            .map(Channel::parse);

        let Some(channel) = channel else {
            return Ok(match id {
                Some(id) => WsEvent::Response {
                    id,
                    data: value.get_mut("data").map(Value::take).unwrap_or(Value::Null),
                },
                None => WsEvent::Other(value),
            });
        };

        let data = match value.get_mut("data") {
            Some(data) => data.take(),
            None => return Ok(WsEvent::Other(value)),
        };

        let event = match channel {
            Channel::Index { asset } => WsEvent::Index {
                asset,
                data: serde_json::from_value(data)?,
            },
            Channel::Orderbook { instrument_name } => WsEvent::Orderbook {
                instrument_name,
                data: serde_json::from_value(data)?,
            },
            Channel::Ticker { .. } => WsEvent::Ticker { channel, data },
            Channel::MarkPrice { asset } => WsEvent::MarkPrice { asset, data },
            Channel::Trades { instrument_name } => WsEvent::Trades {
                instrument_name,
                data,
            },
            Channel::Orders => WsEvent::Orders { data },
            Channel::Fills => WsEvent::Fills { data },
            Channel::Raw(_) => {
                if let Some(slot) = value.get_mut("data") {
                    *slot = data;
                }
                WsEvent::Other(value)
            }
        };
        Ok(event)
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            WsEvent::Index { .. } => "index",
            WsEvent::Ticker { .. } => "ticker",
            WsEvent::MarkPrice { .. } => "markprice",
            WsEvent::Orderbook { .. } => "orderbook",
            WsEvent::Trades { .. } => "trades",
            WsEvent::Orders { .. } => "orders",
            WsEvent::Fills { .. } => "fills",
            WsEvent::Response { .. } => "response",
            WsEvent::Error { .. } => "error",
            WsEvent::Other(_) => "other",
        }
    }
}
