/*
[INPUT]:  EIP-712 struct values and an EVM signer
[OUTPUT]: Signing hashes and signatures under the exchange domain
[POS]:    Auth layer - typed-data schemas and the generic EIP-712 signer
[UPDATE]: When a schema version or the domain layout changes
*/

use alloy_primitives::{Address, B256, Signature};
use alloy_sol_types::{Eip712Domain, SolStruct};

use crate::auth::EvmWalletSigner;
use crate::http::Result;
use crate::types::Environment;

/// Typed-data schemas. Field order is part of the signature; do not reorder.
pub mod schema {
    alloy_sol_types::sol! {
        #[derive(Debug, PartialEq, Eq)]
        struct Order {
            address maker;
            bool isBuy;
            uint256 limitPrice;
            uint256 amount;
            uint256 salt;
            uint256 instrument;
            uint256 timestamp;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct Withdraw {
            address collateral;
            address to;
            uint256 amount;
            uint256 salt;
            bytes32 data;
        }
    }
}

/// Signs EIP-712 structs under one environment's domain
#[derive(Debug, Clone)]
pub struct Eip712Signer {
    wallet: EvmWalletSigner,
    domain: Eip712Domain,
}

impl Eip712Signer {
    pub fn new(wallet: EvmWalletSigner, environment: Environment) -> Self {
        Self {
            wallet,
            domain: environment.signing_domain(),
        }
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    pub fn domain(&self) -> &Eip712Domain {
        &self.domain
    }

    /// Hash `value` as `keccak256(0x1901 || domainSeparator || hashStruct(value))` and sign it
    pub fn sign<T: SolStruct>(&self, value: &T) -> Result<(B256, Signature)> {
        let hash = value.eip712_signing_hash(&self.domain);
        let signature = self.wallet.sign_hash(&hash)?;
        Ok((hash, signature))
    }
}
