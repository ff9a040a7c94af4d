/*
[INPUT]:  API key headers
[OUTPUT]: Account data (account, portfolio, open orders) as raw JSON
[POS]:    HTTP layer - account endpoints (require API key)
[UPDATE]: When adding new account endpoints or typing their responses
*/

use reqwest::Method;
use serde_json::Value;

use crate::http::{AevoClient, Result};

impl AevoClient {
    /// GET /account
    pub async fn get_account(&self) -> Result<Value> {
        let builder = self.private_request(Method::GET, "/account")?;
        self.send_json(builder).await
    }

    /// GET /portfolio
    pub async fn get_portfolio(&self) -> Result<Value> {
        let builder = self.private_request(Method::GET, "/portfolio")?;
        self.send_json(builder).await
    }

    /// Open orders of the account
    ///
    /// GET /orders
    pub async fn get_open_orders(&self) -> Result<Value> {
        let builder = self.private_request(Method::GET, "/orders")?;
        self.send_json(builder).await
    }
}
