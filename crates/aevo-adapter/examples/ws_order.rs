/*
[INPUT]:  AEVO_* environment variables (keys, wallet, environment)
[OUTPUT]: Order create, edit and cancel commands over the WebSocket
[POS]:    Examples - authenticated WebSocket trading
[UPDATE]: When WebSocket order commands change
*/

use std::time::Duration;

use aevo_adapter::*;
use futures_util::StreamExt;
use rust_decimal::Decimal;

fn env_var(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}

/// Example: create, edit and cancel an order, then print the replies
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
        .init();

    let credentials = Credentials::new(
        &env_var("AEVO_SIGNING_KEY"),
        &env_var("AEVO_WALLET_ADDRESS"),
        env_var("AEVO_API_KEY"),
        env_var("AEVO_API_SECRET"),
        "testnet",
    )?;

    let mut ws = AevoWebSocket::with_credentials(credentials);
    ws.open_connection().await?;
    let mut messages = ws.read_messages()?;

    let quantity: Decimal = "0.01".parse().unwrap_or_default();
    let params = OrderParams::limit(2054, true, Decimal::from(1200), quantity).post_only(false);
    let created = ws.create_order(&params).await?;
    println!("create_order sent: request {} order {}", created.request_id, created.order_id);

    tokio::time::sleep(Duration::from_secs(1)).await;

    // Editing replaces the order, so the id changes
    let edited = ws
        .edit_order(
            &created.order_id,
            &OrderParams::limit(2054, true, Decimal::from(1500), quantity).post_only(false),
        )
        .await?;
    println!("edit_order sent: request {} order {}", edited.request_id, edited.order_id);

    ws.cancel_order(&edited.order_id).await?;

    let mut replies = 0;
    while let Some(event) = messages.next().await {
        println!("{:?}", event?);
        replies += 1;
        if replies == 4 {
            break;
        }
    }

    ws.close_connection().await
}
