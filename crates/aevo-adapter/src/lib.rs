/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public Aevo adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod auth;
pub mod http;
pub mod types;
pub mod ws;

// Re-export commonly used types from auth
pub use auth::{
    Credentials,
    Eip712Signer,
    EvmWalletSigner,
    OrderSigner,
    SignedOrder,
    SignedWithdraw,
    WithdrawSigner,
};

// Re-export commonly used types from http
pub use http::{
    AevoClient,
    AevoError,
    ClientConfig,
    Result,
};

// Re-export all types
pub use types::*;

// Re-export commonly used types from ws
pub use ws::{
    AevoWebSocket,
    Channel,
    ConnectionState,
    MessageStream,
    WsEvent,
};
