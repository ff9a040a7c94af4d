/*
[INPUT]:  WebSocket configuration and subscription channels
[OUTPUT]: Real-time market data, order updates and command replies
[POS]:    WebSocket layer - real-time data streams
[UPDATE]: When adding new channels or changing connection logic
*/

pub mod client;
pub mod message;

pub use client::{AevoWebSocket, ConnectionState, MessageStream};
pub use message::{Channel, CommandData, Operation, WsCommand, WsEvent};
