/*
[INPUT]:  CLI arguments, optional YAML configuration file, AEVO_* variables
[OUTPUT]: Market data, account data and order results printed as JSON
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, subcommands or startup flow
*/

mod commands;
mod config;

use std::path::PathBuf;

use aevo_adapter::InstrumentType;
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

#[derive(Parser, Debug)]
#[command(name = "aevo", version, about = "Aevo exchange command line client")]
struct Cli {
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List instruments
    Markets {
        #[arg(long)]
        asset: Option<String>,
    },
    /// Show the index price of an asset
    Index { asset: String },
    /// Show account, portfolio or open orders
    Account {
        #[arg(long, value_enum, default_value = "account")]
        view: AccountView,
    },
    /// Create or cancel orders over REST
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Subscribe to channels and print events
    Stream {
        /// Channel names, e.g. index:ETH orderbook:ETH-PERP fills
        #[arg(required = true)]
        channels: Vec<String>,
        /// Stop after this many events
        #[arg(long)]
        count: Option<usize>,
    },
}

#[derive(Subcommand, Debug)]
enum OrderAction {
    Create {
        #[arg(long)]
        instrument: u64,
        #[arg(long, value_enum)]
        side: OrderSide,
        #[arg(long)]
        quantity: Decimal,
        /// Limit price; omit for a market order
        #[arg(long)]
        price: Option<Decimal>,
        /// Allow the limit order to take liquidity (orders are post-only by default)
        #[arg(long)]
        no_post_only: bool,
        #[arg(long)]
        reduce_only: bool,
    },
    Cancel {
        order_id: String,
    },
    CancelAll {
        #[arg(long, value_enum)]
        instrument_type: Option<InstrumentKind>,
        #[arg(long)]
        asset: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum AccountView {
    Account,
    Portfolio,
    Orders,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OrderSide {
    Buy,
    Sell,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum InstrumentKind {
    Option,
    Perpetual,
    Spot,
}

impl From<InstrumentKind> for InstrumentType {
    fn from(kind: InstrumentKind) -> Self {
        match kind {
            InstrumentKind::Option => InstrumentType::Option,
            InstrumentKind::Perpetual => InstrumentType::Perpetual,
            InstrumentKind::Spot => InstrumentType::Spot,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    let config = CliConfig::load(args.config_path.as_deref()).context("load config")?;
    info!(environment = %config.environment, "configuration loaded");

    match args.command {
        Command::Markets { asset } => commands::markets(&config, asset.as_deref()).await,
        Command::Index { asset } => commands::index(&config, &asset).await,
        Command::Account { view } => commands::account(&config, view).await,
        Command::Order { action } => match action {
            OrderAction::Create {
                instrument,
                side,
                quantity,
                price,
                no_post_only,
                reduce_only,
            } => {
                let is_buy = side == OrderSide::Buy;
                let params = match price {
                    Some(price) => aevo_adapter::OrderParams::limit(instrument, is_buy, price, quantity)
                        .post_only(!no_post_only),
                    None => aevo_adapter::OrderParams::market(instrument, is_buy, quantity),
                }
                .reduce_only(reduce_only);
                commands::create_order(&config, &params).await
            }
            OrderAction::Cancel { order_id } => commands::cancel_order(&config, &order_id).await,
            OrderAction::CancelAll {
                instrument_type,
                asset,
            } => {
                commands::cancel_all_orders(&config, instrument_type.map(Into::into), asset.as_deref())
                    .await
            }
        },
        Command::Stream { channels, count } => commands::stream(&config, &channels, count).await,
    }
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}
