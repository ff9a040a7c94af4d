/*
[INPUT]:  Order/withdraw parameters, API key headers and the signing keys
[OUTPUT]: Order acknowledgements, cancellations and withdraw results
[POS]:    HTTP layer - trading endpoints (require API key + typed-data signature)
[UPDATE]: When adding new trading endpoints or changing order flow
*/

use reqwest::Method;
use rust_decimal::Decimal;
use tracing::info;

use crate::auth::{WithdrawSigner, generate_salt};
use crate::http::{AevoClient, Result};
use crate::types::{
    CancelAllRequest, CancelOrderResponse, InstrumentType, OrderParams, OrderResponse,
    SuccessResponse, WithdrawParams,
};

impl AevoClient {
    /// Sign and submit an order
    ///
    /// POST /orders
    pub async fn create_order(&self, params: &OrderParams) -> Result<OrderResponse> {
        let signed = self.order_signer("create_order")?.sign_order_now(params)?;
        let builder = self
            .private_request(Method::POST, "/orders")?
            .json(&signed.payload);

        let response: OrderResponse = self.send_json(builder).await?;
        info!(
            order_id = %response.order_id,
            instrument = params.instrument_id,
            is_buy = params.is_buy,
            "order created"
        );
        Ok(response)
    }

    /// Market order: widest possible limit, not post-only
    pub async fn create_market_order(
        &self,
        instrument_id: u64,
        is_buy: bool,
        quantity: Decimal,
    ) -> Result<OrderResponse> {
        self.create_order(&OrderParams::market(instrument_id, is_buy, quantity))
            .await
    }

    /// DELETE /orders/{order_id}
    pub async fn cancel_order(&self, order_id: &str) -> Result<CancelOrderResponse> {
        let endpoint = format!("/orders/{}", order_id);
        let builder = self.private_request(Method::DELETE, &endpoint)?;
        let response: CancelOrderResponse = self.send_json(builder).await?;
        info!(order_id = %response.order_id, "order cancelled");
        Ok(response)
    }

    /// Cancel every open order, optionally narrowed by instrument type and asset
    ///
    /// DELETE /orders-all
    pub async fn cancel_all_orders(
        &self,
        instrument_type: Option<InstrumentType>,
        asset: Option<&str>,
    ) -> Result<SuccessResponse> {
        let body = CancelAllRequest {
            instrument_type,
            asset: asset.map(str::to_string),
        };
        let builder = self
            .private_request(Method::DELETE, "/orders-all")?
            .json(&body);
        self.send_json(builder).await
    }

    /// Sign a withdraw with the wallet private key and submit it
    ///
    /// POST /withdraw
    pub async fn withdraw(&self, params: &WithdrawParams) -> Result<SuccessResponse> {
        let credentials = self.require_credentials("withdraw")?;
        let signed = WithdrawSigner::from_credentials(credentials)?
            .sign_withdraw(params, generate_salt())?;
        let builder = self
            .private_request(Method::POST, "/withdraw")?
            .json(&signed.payload);

        let response: SuccessResponse = self.send_json(builder).await?;
        info!(withdraw_id = %signed.withdraw_id, amount = %params.amount, "withdraw submitted");
        Ok(response)
    }
}
