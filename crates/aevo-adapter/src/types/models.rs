/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::enums::{InstrumentType, OptionType};

/// Instrument descriptor returned by `GET /markets`
///
/// Only the identifying fields are typed. Everything else stays in `extra`
/// exactly as the exchange sent it, so a market serializes back to the
/// original object; use [`Market::decimal`] and friends to read numeric fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub instrument_id: String,
    pub instrument_name: String,
    pub instrument_type: InstrumentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_type: Option<OptionType>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Market {
    /// Read a numeric field sent either as a decimal string or a JSON number
    pub fn decimal(&self, key: &str) -> Option<Decimal> {
        match self.extra.get(key)? {
            Value::String(text) => text.parse().ok(),
            Value::Number(number) => number.to_string().parse().ok(),
            _ => None,
        }
    }

    pub fn price_step(&self) -> Option<Decimal> {
        self.decimal("price_step")
    }

    pub fn amount_step(&self) -> Option<Decimal> {
        self.decimal("amount_step")
    }

    pub fn mark_price(&self) -> Option<Decimal> {
        self.decimal("mark_price")
    }

    pub fn index_price(&self) -> Option<Decimal> {
        self.decimal("index_price")
    }

    pub fn strike(&self) -> Option<Decimal> {
        self.decimal("strike")
    }

    pub fn underlying_asset(&self) -> Option<&str> {
        self.extra.get("underlying_asset").and_then(Value::as_str)
    }
}

/// Index price for an underlying asset (REST `GET /index` and the `index:*` channel)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexPrice {
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub timestamp: String,
}

/// Orderbook snapshot or update pushed on the `orderbook:*` channel
///
/// Levels are `[price, amount]` or `[price, amount, iv]` for options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderbookUpdate {
    #[serde(rename = "type")]
    pub update_type: String,
    pub instrument_id: String,
    pub instrument_name: String,
    pub instrument_type: InstrumentType,
    #[serde(default)]
    pub bids: Vec<Vec<String>>,
    #[serde(default)]
    pub asks: Vec<Vec<String>>,
    pub last_updated: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_keeps_unknown_fields() {
        let raw = serde_json::json!({
            "instrument_id": "2054",
            "instrument_name": "ETH-PERP",
            "instrument_type": "PERPETUAL",
            "underlying_asset": "ETH",
            "quote_asset": "USDC",
            "price_step": "0.01",
            "amount_step": "0.01",
            "mark_price": "1850.25",
            "is_active": true,
            "max_notional_value": "1000000",
            "funding_rate": "0.00001"
        });

        let market: Market = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(market.instrument_name, "ETH-PERP");
        assert_eq!(market.instrument_type, InstrumentType::Perpetual);
        assert_eq!(market.is_active, Some(true));
        assert_eq!(market.mark_price(), Some("1850.25".parse().unwrap()));
        assert_eq!(market.underlying_asset(), Some("ETH"));
        assert_eq!(market.strike(), None);
        assert_eq!(market.extra.get("funding_rate"), Some(&Value::from("0.00001")));

        assert_eq!(serde_json::to_value(&market).unwrap(), raw);
    }

    #[test]
    fn test_sparse_market_serializes_unchanged() {
        let raw = serde_json::json!({
            "instrument_id": "2054",
            "instrument_name": "ETH-PERP",
            "instrument_type": "PERPETUAL",
            "price_step": "0.01",
            "quote_asset": "USDC",
            "underlying_asset": "ETH"
        });

        let market: Market = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(market.is_active, None);
        assert_eq!(market.amount_step(), None);
        assert_eq!(serde_json::to_value(&market).unwrap(), raw);
    }

    #[test]
    fn test_numeric_market_fields() {
        let raw = serde_json::json!({
            "instrument_id": "11660",
            "instrument_name": "ETH-30JUN23-1600-C",
            "instrument_type": "OPTION",
            "option_type": "call",
            "mark_price": 1850.25,
            "strike": 1600,
            "index_price": null
        });

        let market: Market = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(market.option_type, Some(OptionType::Call));
        assert_eq!(market.mark_price(), Some("1850.25".parse().unwrap()));
        assert_eq!(market.strike(), Some(Decimal::from(1600)));
        assert_eq!(market.index_price(), None);
        assert_eq!(serde_json::to_value(&market).unwrap(), raw);
    }

    #[test]
    fn test_orderbook_update_option_levels() {
        let raw = r#"{
            "type": "snapshot",
            "instrument_id": "11660",
            "instrument_name": "ETH-30JUN23-1600-C",
            "instrument_type": "OPTION",
            "bids": [["1.5", "10", "0.65"]],
            "asks": [],
            "last_updated": "1680000000000000000",
            "checksum": "2318477103"
        }"#;

        let book: OrderbookUpdate = serde_json::from_str(raw).unwrap();
        assert_eq!(book.update_type, "snapshot");
        assert_eq!(book.bids[0], vec!["1.5", "10", "0.65"]);
        assert!(book.asks.is_empty());
    }
}
