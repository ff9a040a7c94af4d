/*
[INPUT]:  Parsed subcommands and CLI configuration
[OUTPUT]: Adapter calls with results printed to stdout
[POS]:    Command layer - one function per subcommand
[UPDATE]: When adding subcommands or changing their output
*/

use aevo_adapter::{AevoClient, AevoWebSocket, Channel, InstrumentType, OrderParams};
use anyhow::{Context, Result};
use futures_util::StreamExt;
use serde::Serialize;
use tracing::{info, warn};

use crate::AccountView;
use crate::config::CliConfig;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("render output")?);
    Ok(())
}

fn public_client(config: &CliConfig) -> Result<AevoClient> {
    AevoClient::new(config.environment).context("create REST client")
}

fn private_client(config: &CliConfig) -> Result<AevoClient> {
    let credentials = config.credentials()?;
    AevoClient::with_credentials(credentials).context("create REST client")
}

pub async fn markets(config: &CliConfig, asset: Option<&str>) -> Result<()> {
    let markets = public_client(config)?
        .get_markets(asset)
        .await
        .context("get markets")?;
    info!(count = markets.len(), "markets received");
    print_json(&markets)
}

pub async fn index(config: &CliConfig, asset: &str) -> Result<()> {
    let index = public_client(config)?
        .get_index(asset)
        .await
        .context("get index")?;
    print_json(&index)
}

pub async fn account(config: &CliConfig, view: AccountView) -> Result<()> {
    let client = private_client(config)?;
    let value = match view {
        AccountView::Account => client.get_account().await.context("get account")?,
        AccountView::Portfolio => client.get_portfolio().await.context("get portfolio")?,
        AccountView::Orders => client.get_open_orders().await.context("get open orders")?,
    };
    print_json(&value)
}

pub async fn create_order(config: &CliConfig, params: &OrderParams) -> Result<()> {
    let response = private_client(config)?
        .create_order(params)
        .await
        .context("create order")?;
    print_json(&response)
}

pub async fn cancel_order(config: &CliConfig, order_id: &str) -> Result<()> {
    let response = private_client(config)?
        .cancel_order(order_id)
        .await
        .context("cancel order")?;
    print_json(&response)
}

pub async fn cancel_all_orders(
    config: &CliConfig,
    instrument_type: Option<InstrumentType>,
    asset: Option<&str>,
) -> Result<()> {
    let response = private_client(config)?
        .cancel_all_orders(instrument_type, asset)
        .await
        .context("cancel all orders")?;
    print_json(&response)
}

/// Print events until `count` is reached, the socket closes or Ctrl-C
pub async fn stream(config: &CliConfig, channels: &[String], count: Option<usize>) -> Result<()> {
    let channels: Vec<Channel> = channels.iter().map(|raw| Channel::parse(raw)).collect();
    let needs_auth = channels.iter().any(Channel::is_private);

    let mut ws = if needs_auth || config.has_api_key() {
        AevoWebSocket::with_credentials(config.credentials()?)
    } else {
        AevoWebSocket::new(config.environment)
    };
    if needs_auth && !config.has_api_key() {
        warn!("private channels requested without an API key; the exchange will reject them");
    }

    ws.open_connection().await.context("open websocket")?;
    let mut messages = ws.read_messages().context("take message stream")?;
    ws.subscribe(&channels).await.context("subscribe")?;

    let mut received = 0usize;
    loop {
        tokio::select! {
            event = messages.next() => {
                let Some(event) = event else {
                    info!(received, "websocket stream ended");
                    break;
                };
                match event {
                    Ok(event) => println!("{:?}", event),
                    Err(err) => warn!(error = %err, "stream error"),
                }
                received += 1;
                if count.is_some_and(|limit| received >= limit) {
                    break;
                }
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(err) = signal {
                    warn!(error = %err, "failed to install SIGINT handler");
                }
                info!("received SIGINT");
                break;
            }
        }
    }

    ws.close_connection().await.context("close websocket")
}
