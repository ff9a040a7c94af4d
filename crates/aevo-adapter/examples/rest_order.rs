/*
[INPUT]:  AEVO_* environment variables (keys, wallet, environment)
[OUTPUT]: A post-only limit order placed and cancelled over REST
[POS]:    Examples - authenticated REST trading
[UPDATE]: When the order flow or credential inputs change
*/

use aevo_adapter::*;
use rust_decimal::Decimal;

fn env_var(name: &str) -> String {
    std::env::var(name).unwrap_or_default()
}

/// Example: place and cancel a limit order on ETH-PERP (testnet id 2054)
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("aevo_adapter=debug"))
        .init();

    let credentials = Credentials::new(
        &env_var("AEVO_SIGNING_KEY"),
        &env_var("AEVO_WALLET_ADDRESS"),
        env_var("AEVO_API_KEY"),
        env_var("AEVO_API_SECRET"),
        "testnet",
    )?;
    let client = AevoClient::with_credentials(credentials)?;

    let params = OrderParams::limit(2054, true, Decimal::from(1200), "0.01".parse().unwrap_or_default());
    let order = client.create_order(&params).await?;
    println!("order created: {} {:?}", order.order_id, order.order_status);

    let cancelled = client.cancel_order(&order.order_id).await?;
    println!("order cancelled: {}", cancelled.order_id);

    let open_orders = client.get_open_orders().await?;
    println!("open orders: {}", open_orders);
    Ok(())
}
