/*
[INPUT]:  Caller order/withdraw parameters and signer output
[OUTPUT]: Typed request structs with the exchange wire format
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use alloy_primitives::{Address, B256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::enums::{InstrumentType, StopType, TimeInForce};

/// Caller-facing order parameters
///
/// `limit_price == None` is a market order: the signer uses the widest
/// possible limit (2^256 - 1 for buys, 0 for sells).
#[derive(Debug, Clone, PartialEq)]
pub struct OrderParams {
    pub instrument_id: u64,
    pub is_buy: bool,
    pub quantity: Decimal,
    pub limit_price: Option<Decimal>,
    pub time_in_force: Option<TimeInForce>,
    pub post_only: bool,
    pub reduce_only: bool,
    pub close_position: bool,
    pub mmp: bool,
    pub stop: Option<StopTrigger>,
}

impl OrderParams {
    /// Post-only limit order, the exchange client default
    pub fn limit(instrument_id: u64, is_buy: bool, limit_price: Decimal, quantity: Decimal) -> Self {
        Self {
            instrument_id,
            is_buy,
            quantity,
            limit_price: Some(limit_price),
            time_in_force: None,
            post_only: true,
            reduce_only: false,
            close_position: false,
            mmp: true,
            stop: None,
        }
    }

    pub fn market(instrument_id: u64, is_buy: bool, quantity: Decimal) -> Self {
        Self {
            limit_price: None,
            post_only: false,
            ..Self::limit(instrument_id, is_buy, Decimal::ZERO, quantity)
        }
    }

    pub fn post_only(mut self, post_only: bool) -> Self {
        self.post_only = post_only;
        self
    }

    pub fn reduce_only(mut self, reduce_only: bool) -> Self {
        self.reduce_only = reduce_only;
        self
    }

    pub fn close_position(mut self, close_position: bool) -> Self {
        self.close_position = close_position;
        self
    }

    pub fn mmp(mut self, mmp: bool) -> Self {
        self.mmp = mmp;
        self
    }

    pub fn time_in_force(mut self, time_in_force: TimeInForce) -> Self {
        self.time_in_force = Some(time_in_force);
        self
    }

    pub fn stop(mut self, stop: StopTrigger) -> Self {
        self.stop = Some(stop);
        self
    }
}

/// Stop-loss / take-profit trigger attached to an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopTrigger {
    pub stop: StopType,
    #[serde(with = "rust_decimal::serde::str")]
    pub trigger: Decimal,
}

/// Signed order body sent to `POST /orders` and the `create_order` command
///
/// `limit_price`, `amount`, `salt` and `timestamp` are exactly the values
/// that went into the signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPayload {
    pub instrument: u64,
    pub maker: Address,
    pub is_buy: bool,
    pub amount: String,
    pub limit_price: String,
    pub salt: String,
    pub signature: String,
    pub post_only: bool,
    pub reduce_only: bool,
    pub close_position: bool,
    pub mmp: bool,
    pub timestamp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<TimeInForce>,
    #[serde(flatten)]
    pub stop: Option<StopTrigger>,
}

/// Body of `DELETE /orders-all`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CancelAllRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument_type: Option<InstrumentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
}

/// Caller-facing withdraw parameters
///
/// `collateral` and `to` default to the environment's L2 USDC and withdraw
/// proxy; `data` defaults to keccak256 of the empty byte string.
#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawParams {
    pub amount: Decimal,
    pub collateral: Option<Address>,
    pub to: Option<Address>,
    pub data: Option<B256>,
    pub amount_decimals: u32,
}

impl WithdrawParams {
    pub fn new(amount: Decimal) -> Self {
        Self {
            amount,
            collateral: None,
            to: None,
            data: None,
            amount_decimals: 6,
        }
    }
}

/// Signed body of `POST /withdraw`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawPayload {
    pub account: Address,
    pub collateral: Address,
    pub to: Address,
    pub amount: u64,
    pub salt: u64,
    pub signature: String,
    pub data: B256,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_order_defaults() {
        let params = OrderParams::market(2054, true, "0.5".parse().unwrap());
        assert_eq!(params.limit_price, None);
        assert!(!params.post_only);
        assert!(params.mmp);
    }

    #[test]
    fn test_order_payload_optional_fields() {
        let payload = OrderPayload {
            instrument: 1,
            maker: Address::ZERO,
            is_buy: true,
            amount: "10000000".to_string(),
            limit_price: "100000000".to_string(),
            salt: "42".to_string(),
            signature: "0x00".to_string(),
            post_only: true,
            reduce_only: false,
            close_position: false,
            mmp: true,
            timestamp: 1_700_000_000,
            time_in_force: None,
            stop: Some(StopTrigger {
                stop: StopType::StopLoss,
                trigger: "1500".parse().unwrap(),
            }),
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["stop"], "STOP_LOSS");
        assert_eq!(value["trigger"], "1500");
        assert!(value.get("time_in_force").is_none());
        assert_eq!(value["maker"], "0x0000000000000000000000000000000000000000");
    }

    #[test]
    fn test_cancel_all_request_skips_empty_filters() {
        let body = CancelAllRequest {
            instrument_type: Some(InstrumentType::Option),
            asset: None,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"instrument_type":"OPTION"}"#
        );
    }
}
