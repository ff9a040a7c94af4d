/*
[INPUT]:  EVM private key (hex string)
[OUTPUT]: secp256k1 signatures over 32-byte digests and the key's address
[POS]:    Auth layer - EVM key wrapper used by the typed-data signers
[UPDATE]: When signing logic or signature encoding changes
*/

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, B256, Signature};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;

use crate::http::{AevoError, Result};

/// Signer for an EVM private key (signing key or wallet key)
#[derive(Clone)]
pub struct EvmWalletSigner {
    signer: PrivateKeySigner,
}

impl EvmWalletSigner {
    /// Create a new EVM wallet signer from a hex-encoded private key
    ///
    /// Supports both "0x"-prefixed and non-prefixed hex strings.
    pub fn new(private_key_hex: &str) -> Result<Self> {
        let private_key_hex = private_key_hex.trim();
        let private_key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);
        let signer = PrivateKeySigner::from_str(private_key_hex)
            .map_err(|e| AevoError::Config(format!("Invalid EVM private key: {}", e)))?;

        Ok(Self { signer })
    }

    /// Address derived from the private key
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign a prehashed digest (no EIP-191 prefix)
    pub fn sign_hash(&self, hash: &B256) -> Result<Signature> {
        self.signer
            .sign_hash_sync(hash)
            .map_err(|e| AevoError::Signing(format!("Failed to sign EVM hash: {}", e)))
    }
}

impl fmt::Debug for EvmWalletSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvmWalletSigner")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Hex-encode a signature as `0x` + r || s || v
pub fn encode_signature(signature: &Signature) -> String {
    // alloy's Signature as_bytes() returns [r, s, v] with v in {27, 28}
    format!("0x{}", hex::encode(signature.as_bytes()))
}
