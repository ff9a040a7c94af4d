/*
[INPUT]:  Asset filters and query parameters
[OUTPUT]: Market data (instrument descriptors, index prices)
[POS]:    HTTP layer - public market data endpoints (no auth required)
[UPDATE]: When adding new public endpoints or changing response format
*/

use reqwest::Method;

use crate::http::{AevoClient, Result};
use crate::types::{IndexPrice, Market};

impl AevoClient {
    /// List instruments, optionally filtered by underlying asset
    ///
    /// GET /markets?asset={asset}
    pub async fn get_markets(&self, asset: Option<&str>) -> Result<Vec<Market>> {
        let mut builder = self.public_request(Method::GET, "/markets")?;
        if let Some(asset) = asset {
            builder = builder.query(&[("asset", asset)]);
        }
        self.send_json(builder).await
    }

    /// Current index price of an underlying asset
    ///
    /// GET /index?asset={asset}
    pub async fn get_index(&self, asset: &str) -> Result<IndexPrice> {
        let builder = self
            .public_request(Method::GET, "/index")?
            .query(&[("asset", asset)]);
        self.send_json(builder).await
    }
}
