/*
[INPUT]:  Signing key, wallet address, API key/secret and environment name
[OUTPUT]: Immutable session credentials and per-environment endpoints
[POS]:    Auth layer - credential & session holder shared by REST and WebSocket
[UPDATE]: When endpoints, signing domains or credential fields change
*/

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, U256, address};
use alloy_sol_types::Eip712Domain;

use crate::auth::EvmWalletSigner;
use crate::http::{AevoError, Result};
use crate::types::Environment;

const TESTNET_REST_URL: &str = "https://api-testnet.aevo.xyz";
const TESTNET_WS_URL: &str = "wss://ws-testnet.aevo.xyz";
const MAINNET_REST_URL: &str = "https://api.aevo.xyz";
const MAINNET_WS_URL: &str = "wss://ws.aevo.xyz";

const SIGNING_DOMAIN_VERSION: &str = "1";
const TESTNET_CHAIN_ID: u64 = 11_155_111;
const MAINNET_CHAIN_ID: u64 = 1;

const TESTNET_L2_USDC: Address = address!("52623B37Ff81c53567D6D16fd94638734cCDCf27");
const TESTNET_L2_WITHDRAW_PROXY: Address = address!("870b65A0816B9e9A0dFCE08Fd18EFE20f245011f");
const MAINNET_L2_USDC: Address = address!("643aaB1618c600229785A5E06E4b2d13946F7a1A");
const MAINNET_L2_WITHDRAW_PROXY: Address = address!("4d44B9AbB13C80d2E376b7C5c982aa972239d845");

impl Environment {
    pub fn rest_url(self) -> &'static str {
        match self {
            Environment::Testnet => TESTNET_REST_URL,
            Environment::Mainnet => MAINNET_REST_URL,
        }
    }

    pub fn ws_url(self) -> &'static str {
        match self {
            Environment::Testnet => TESTNET_WS_URL,
            Environment::Mainnet => MAINNET_WS_URL,
        }
    }

    pub fn chain_id(self) -> u64 {
        match self {
            Environment::Testnet => TESTNET_CHAIN_ID,
            Environment::Mainnet => MAINNET_CHAIN_ID,
        }
    }

    /// EIP-712 domain: `EIP712Domain(string name,string version,uint256 chainId)`
    pub fn signing_domain(self) -> Eip712Domain {
        let name = match self {
            Environment::Testnet => "Aevo Testnet",
            Environment::Mainnet => "Aevo Mainnet",
        };

        Eip712Domain {
            name: Some(Cow::Borrowed(name)),
            version: Some(Cow::Borrowed(SIGNING_DOMAIN_VERSION)),
            chain_id: Some(U256::from(self.chain_id())),
            ..Eip712Domain::default()
        }
    }

    /// Default withdraw collateral (USDC on the exchange L2)
    pub fn l2_usdc(self) -> Address {
        match self {
            Environment::Testnet => TESTNET_L2_USDC,
            Environment::Mainnet => MAINNET_L2_USDC,
        }
    }

    /// Default withdraw destination (L2 withdraw proxy contract)
    pub fn l2_withdraw_proxy(self) -> Address {
        match self {
            Environment::Testnet => TESTNET_L2_WITHDRAW_PROXY,
            Environment::Mainnet => MAINNET_L2_WITHDRAW_PROXY,
        }
    }
}

/// Credentials for signed and authenticated requests
///
/// `signing_key` signs orders on behalf of `wallet_address` (the maker).
/// `wallet_private_key` is only needed for withdrawals.
#[derive(Clone)]
pub struct Credentials {
    signing_key: EvmWalletSigner,
    wallet_address: Address,
    api_key: String,
    api_secret: String,
    environment: Environment,
    wallet_private_key: Option<EvmWalletSigner>,
}

impl Credentials {
    /// Parse and validate all credential fields
    ///
    /// Fails on an unknown environment, a malformed signing key or a
    /// malformed wallet address.
    pub fn new(
        signing_key: &str,
        wallet_address: &str,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        environment: &str,
    ) -> Result<Self> {
        let environment = Environment::from_str(environment)?;
        let signing_key = EvmWalletSigner::new(signing_key)?;
        let wallet_address = parse_address(wallet_address)?;

        Ok(Self {
            signing_key,
            wallet_address,
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            environment,
            wallet_private_key: None,
        })
    }

    /// Attach the wallet's own private key (required for withdrawals)
    pub fn with_wallet_private_key(mut self, private_key: &str) -> Result<Self> {
        self.wallet_private_key = Some(EvmWalletSigner::new(private_key)?);
        Ok(self)
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn rest_url(&self) -> &'static str {
        self.environment.rest_url()
    }

    pub fn ws_url(&self) -> &'static str {
        self.environment.ws_url()
    }

    pub fn signing_domain(&self) -> Eip712Domain {
        self.environment.signing_domain()
    }

    /// Account (maker) address
    pub fn wallet_address(&self) -> Address {
        self.wallet_address
    }

    /// Address of the signing key
    pub fn signer_address(&self) -> Address {
        self.signing_key.address()
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }

    /// Whether an API key pair is configured for private endpoints
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }

    pub(crate) fn signing_key(&self) -> &EvmWalletSigner {
        &self.signing_key
    }

    pub(crate) fn wallet_private_key(&self) -> Option<&EvmWalletSigner> {
        self.wallet_private_key.as_ref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("signer_address", &self.signing_key.address())
            .field("wallet_address", &self.wallet_address)
            .field("api_key", &"<redacted>")
            .field("api_secret", &"<redacted>")
            .field("environment", &self.environment)
            .field("has_wallet_private_key", &self.wallet_private_key.is_some())
            .finish()
    }
}

pub(crate) fn parse_address(value: &str) -> Result<Address> {
    Address::from_str(value.trim())
        .map_err(|e| AevoError::Config(format!("Invalid wallet address '{value}': {e}")))
}
