/*
[INPUT]:  Underlying asset (e.g., "ETH")
[OUTPUT]: Market data (instruments, index price, live index stream)
[POS]:    Examples - public market data queries
[UPDATE]: When adding new market data endpoints or channels
*/

use aevo_adapter::*;
use futures_util::StreamExt;

/// Example: Query market data (no authentication required)
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
        .init();

    let asset = "ETH";
    let client = AevoClient::new(Environment::Testnet)?;

    let markets = client.get_markets(Some(asset)).await?;
    println!("{} {} instruments", markets.len(), asset);
    for market in markets.iter().filter(|m| m.instrument_type == InstrumentType::Perpetual) {
        println!(
            "  {} (id {}) mark {:?}",
            market.instrument_name,
            market.instrument_id,
            market.mark_price()
        );
    }

    let index = client.get_index(asset).await?;
    println!("{} index: {}", asset, index.price);

    let mut ws = AevoWebSocket::new(Environment::Testnet);
    ws.open_connection().await?;
    ws.subscribe_index(asset).await?;

    let mut messages = ws.read_messages()?.take(5);
    while let Some(event) = messages.next().await {
        match event? {
            WsEvent::Index { asset, data } => println!("index:{} {}", asset, data.price),
            other => println!("{:?}", other),
        }
    }

    ws.close_connection().await
}
