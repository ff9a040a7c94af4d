/*
[INPUT]:  Order parameters, salt, timestamp and the session signing key
[OUTPUT]: Signed order payloads ready for REST or WebSocket transport
[POS]:    Auth layer - order signer
[UPDATE]: When order scaling, the Order schema or payload fields change
*/

use alloy_primitives::{Address, B256, Signature, U256};
use chrono::Utc;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::auth::typed_data::schema;
use crate::auth::{Credentials, Eip712Signer, encode_signature};
use crate::http::{AevoError, Result};
use crate::types::{OrderParams, OrderPayload};

/// Prices are transmitted in 10^-6 units
pub const PRICE_DECIMALS: u32 = 6;
/// Quantities are transmitted in 10^-6 units
pub const AMOUNT_DECIMALS: u32 = 6;
/// Upper bound (inclusive) of the random order salt
pub const MAX_SALT: u64 = 10_000_000_000;

/// Order with its signature and the EIP-712 hash used as order id
#[derive(Debug, Clone, PartialEq)]
pub struct SignedOrder {
    pub order_id: B256,
    pub signature: Signature,
    pub payload: OrderPayload,
}

impl SignedOrder {
    /// Order id as sent back by the exchange (`0x`-prefixed hash)
    pub fn order_id_hex(&self) -> String {
        self.order_id.to_string()
    }

    /// Address that produced the signature
    pub fn recover_signer(&self) -> Result<Address> {
        self.signature
            .recover_address_from_prehash(&self.order_id)
            .map_err(|e| AevoError::Signing(format!("Failed to recover order signer: {}", e)))
    }
}

/// Builds and signs `Order` structs for one maker account
#[derive(Debug, Clone)]
pub struct OrderSigner {
    signer: Eip712Signer,
    maker: Address,
}

impl OrderSigner {
    pub fn new(signer: Eip712Signer, maker: Address) -> Self {
        Self { signer, maker }
    }

    pub fn from_credentials(credentials: &Credentials) -> Self {
        let signer = Eip712Signer::new(credentials.signing_key().clone(), credentials.environment());
        Self::new(signer, credentials.wallet_address())
    }

    pub fn maker(&self) -> Address {
        self.maker
    }

    pub fn signer_address(&self) -> Address {
        self.signer.address()
    }

    /// Sign an order with an explicit salt and unix timestamp (seconds)
    ///
    /// Pure: the same inputs always produce the same signature.
    pub fn sign_order(&self, params: &OrderParams, salt: u64, timestamp: u64) -> Result<SignedOrder> {
        let limit_price = match params.limit_price {
            Some(price) => order_units(price, PRICE_DECIMALS, params.is_buy, "limit_price")?,
            None if params.is_buy => U256::MAX,
            None => U256::ZERO,
        };
        let amount = order_units(params.quantity, AMOUNT_DECIMALS, params.is_buy, "quantity")?;

        let order = schema::Order {
            maker: self.maker,
            isBuy: params.is_buy,
            limitPrice: limit_price,
            amount,
            salt: U256::from(salt),
            instrument: U256::from(params.instrument_id),
            timestamp: U256::from(timestamp),
        };
        let (order_id, signature) = self.signer.sign(&order)?;

        debug!(
            instrument = params.instrument_id,
            is_buy = params.is_buy,
            %limit_price,
            %amount,
            salt,
            timestamp,
            order_id = %order_id,
            "order signed"
        );

        let payload = OrderPayload {
            instrument: params.instrument_id,
            maker: self.maker,
            is_buy: params.is_buy,
            amount: amount.to_string(),
            limit_price: limit_price.to_string(),
            salt: salt.to_string(),
            signature: encode_signature(&signature),
            post_only: params.post_only,
            reduce_only: params.reduce_only,
            close_position: params.close_position,
            mmp: params.mmp,
            timestamp,
            time_in_force: params.time_in_force,
            stop: params.stop.clone(),
        };

        Ok(SignedOrder {
            order_id,
            signature,
            payload,
        })
    }

    /// Sign with a fresh random salt and the current time
    pub fn sign_order_now(&self, params: &OrderParams) -> Result<SignedOrder> {
        self.sign_order(params, generate_salt(), unix_timestamp())
    }
}

/// Random salt in `0..=MAX_SALT`
pub fn generate_salt() -> u64 {
    rand::thread_rng().gen_range(0..=MAX_SALT)
}

pub(crate) fn unix_timestamp() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or_default()
}

/// Scale a decimal to integer units of `10^-decimals`, rounding half to even
pub(crate) fn to_units(value: Decimal, decimals: u32, field: &str) -> Result<U256> {
    let scaled = scale(value, decimals, field)?;
    into_u256(scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven), value, field)
}

/// Order-side scaling: sells round half to even, buys round to one decimal
/// place and then truncate
pub(crate) fn order_units(value: Decimal, decimals: u32, is_buy: bool, field: &str) -> Result<U256> {
    if !is_buy {
        return to_units(value, decimals, field);
    }
    let scaled = scale(value, decimals, field)?;
    into_u256(
        scaled
            .round_dp_with_strategy(1, RoundingStrategy::MidpointNearestEven)
            .trunc(),
        value,
        field,
    )
}

fn scale(value: Decimal, decimals: u32, field: &str) -> Result<Decimal> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AevoError::Config(format!("{field} must not be negative, got {value}")));
    }

    let factor = 10u64
        .checked_pow(decimals)
        .ok_or_else(|| AevoError::Config(format!("{field}: unsupported decimals {decimals}")))?;
    value
        .checked_mul(Decimal::from(factor))
        .ok_or_else(|| AevoError::Config(format!("{field} out of range: {value}")))
}

fn into_u256(units: Decimal, value: Decimal, field: &str) -> Result<U256> {
    units
        .to_u128()
        .map(U256::from)
        .ok_or_else(|| AevoError::Config(format!("{field} out of range: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{StopTrigger, StopType};
    use rstest::rstest;

    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    const WALLET_ADDRESS: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
    const SALT: u64 = 1_234_567;
    const TIMESTAMP: u64 = 1_700_000_000;

    fn dec(value: &str) -> Decimal {
        value.parse().expect("decimal")
    }

    fn signer() -> OrderSigner {
        let credentials = Credentials::new(TEST_KEY, TEST_ADDRESS, "key", "secret", "testnet")
            .expect("credentials");
        OrderSigner::from_credentials(&credentials)
    }

    fn base_order() -> OrderParams {
        OrderParams::limit(1, true, dec("100"), dec("10"))
    }

    #[test]
    fn test_sign_order_is_deterministic() {
        let signer = signer();
        let first = signer.sign_order(&base_order(), SALT, TIMESTAMP).unwrap();
        let second = signer.sign_order(&base_order(), SALT, TIMESTAMP).unwrap();

        assert_eq!(first.signature, second.signature);
        assert_eq!(first.order_id, second.order_id);
        assert_eq!(first.payload, second.payload);
    }

    #[rstest]
    #[case::price(OrderParams::limit(1, true, dec("100.5"), dec("10")))]
    #[case::quantity(OrderParams::limit(1, true, dec("100"), dec("11")))]
    #[case::side(OrderParams::limit(1, false, dec("100"), dec("10")))]
    #[case::instrument(OrderParams::limit(2, true, dec("100"), dec("10")))]
    fn test_changing_a_field_changes_signature(#[case] changed: OrderParams) {
        let signer = signer();
        let base = signer.sign_order(&base_order(), SALT, TIMESTAMP).unwrap();
        let other = signer.sign_order(&changed, SALT, TIMESTAMP).unwrap();

        assert_ne!(base.signature, other.signature);
        assert_ne!(base.order_id, other.order_id);
    }

    #[test]
    fn test_salt_and_timestamp_are_signed() {
        let signer = signer();
        let base = signer.sign_order(&base_order(), SALT, TIMESTAMP).unwrap();
        let other_salt = signer.sign_order(&base_order(), SALT + 1, TIMESTAMP).unwrap();
        let other_time = signer.sign_order(&base_order(), SALT, TIMESTAMP + 1).unwrap();

        assert_ne!(base.signature, other_salt.signature);
        assert_ne!(base.signature, other_time.signature);
    }

    #[test]
    fn test_flags_are_not_signed() {
        let signer = signer();
        let base = signer.sign_order(&base_order(), SALT, TIMESTAMP).unwrap();
        let flagged = signer
            .sign_order(&base_order().post_only(false).mmp(false), SALT, TIMESTAMP)
            .unwrap();

        assert_eq!(base.signature, flagged.signature);
        assert!(!flagged.payload.post_only);
    }

    #[test]
    fn test_signed_order_recovers_to_signing_key() {
        let signer = signer();
        let signed = signer.sign_order(&base_order(), SALT, TIMESTAMP).unwrap();

        let expected: Address = TEST_ADDRESS.parse().unwrap();
        assert_eq!(signed.recover_signer().unwrap(), expected);
        assert_eq!(signed.payload.maker, expected);
    }

    #[test]
    fn test_separate_signing_key_signs_for_wallet() {
        let credentials = Credentials::new(TEST_KEY, WALLET_ADDRESS, "key", "secret", "testnet")
            .expect("credentials");
        let signer = OrderSigner::from_credentials(&credentials);
        let signed = signer.sign_order(&base_order(), SALT, TIMESTAMP).unwrap();

        assert_eq!(signer.maker(), credentials.wallet_address());
        assert_eq!(signer.signer_address(), credentials.signer_address());
        assert_eq!(signed.payload.maker, WALLET_ADDRESS.parse::<Address>().unwrap());
        assert_eq!(signed.recover_signer().unwrap(), TEST_ADDRESS.parse::<Address>().unwrap());
        assert_ne!(signed.payload.maker, signed.recover_signer().unwrap());
    }

    #[test]
    fn test_payload_carries_signed_values() {
        let signer = signer();
        let signed = signer.sign_order(&base_order(), SALT, TIMESTAMP).unwrap();

        assert_eq!(signed.payload.instrument, 1);
        assert_eq!(signed.payload.limit_price, "100000000");
        assert_eq!(signed.payload.amount, "10000000");
        assert_eq!(signed.payload.salt, "1234567");
        assert_eq!(signed.payload.timestamp, TIMESTAMP);
        assert_eq!(signed.payload.signature, encode_signature(&signed.signature));
        assert!(signed.order_id_hex().starts_with("0x"));
        assert_eq!(signed.order_id_hex().len(), 66);
    }

    #[test]
    fn test_market_order_limits() {
        let signer = signer();
        let buy = signer
            .sign_order(&OrderParams::market(1, true, dec("1")), SALT, TIMESTAMP)
            .unwrap();
        let sell = signer
            .sign_order(&OrderParams::market(1, false, dec("1")), SALT, TIMESTAMP)
            .unwrap();

        assert_eq!(buy.payload.limit_price, U256::MAX.to_string());
        assert_eq!(sell.payload.limit_price, "0");
    }

    #[test]
    fn test_stop_trigger_passes_through() {
        let signer = signer();
        let params = base_order().stop(StopTrigger {
            stop: StopType::TakeProfit,
            trigger: dec("150"),
        });
        let signed = signer.sign_order(&params, SALT, TIMESTAMP).unwrap();
        assert_eq!(signed.payload.stop, params.stop);
    }

    #[rstest]
    #[case("0.01", "10000")]
    #[case("1200", "1200000000")]
    #[case("0.0000005", "0")]
    #[case("0.0000015", "2")]
    #[case("0.0000025", "2")]
    fn test_to_units(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(to_units(dec(value), 6, "value").unwrap().to_string(), expected);
    }

    #[rstest]
    #[case::sell_half_even_up("0.0000015", false, "2")]
    #[case::sell_half_even_down("0.0000025", false, "2")]
    #[case::sell_above_half("0.0000017", false, "2")]
    #[case::buy_half_truncates("0.0000015", true, "1")]
    #[case::buy_above_half_truncates("0.0000017", true, "1")]
    #[case::buy_second_decimal_rounds_up("0.00000199", true, "2")]
    #[case::buy_exact("1200", true, "1200000000")]
    fn test_order_units_by_side(#[case] value: &str, #[case] is_buy: bool, #[case] expected: &str) {
        assert_eq!(
            order_units(dec(value), 6, is_buy, "value").unwrap().to_string(),
            expected
        );
    }

    #[test]
    fn test_buy_order_truncates_scaled_values() {
        let signer = signer();
        let buy = OrderParams::limit(1, true, dec("100.0000006"), dec("0.0000017"));
        let sell = OrderParams::limit(1, false, dec("100.0000006"), dec("0.0000017"));

        let signed_buy = signer.sign_order(&buy, SALT, TIMESTAMP).unwrap();
        let signed_sell = signer.sign_order(&sell, SALT, TIMESTAMP).unwrap();

        assert_eq!(signed_buy.payload.limit_price, "100000000");
        assert_eq!(signed_buy.payload.amount, "1");
        assert_eq!(signed_sell.payload.limit_price, "100000001");
        assert_eq!(signed_sell.payload.amount, "2");
    }

    #[test]
    fn test_negative_values_are_rejected() {
        let signer = signer();
        let params = OrderParams::limit(1, true, dec("-1"), dec("10"));
        let err = signer.sign_order(&params, SALT, TIMESTAMP).unwrap_err();
        assert!(matches!(err, AevoError::Config(_)));
    }

    #[test]
    fn test_generate_salt_in_range() {
        for _ in 0..32 {
            assert!(generate_salt() <= MAX_SALT);
        }
    }
}
