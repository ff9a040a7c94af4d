/*
[INPUT]:  Withdraw parameters and the wallet private key
[OUTPUT]: Signed withdraw payloads for POST /withdraw
[POS]:    Auth layer - withdraw signer
[UPDATE]: When the Withdraw schema or payload fields change
*/

use alloy_primitives::{Address, B256, U256, keccak256};
use tracing::debug;

use crate::auth::order_signer::to_units;
use crate::auth::typed_data::schema;
use crate::auth::{Credentials, Eip712Signer, encode_signature};
use crate::http::{AevoError, Result};
use crate::types::{Environment, WithdrawParams, WithdrawPayload};

/// Withdraw with its EIP-712 hash
#[derive(Debug, Clone, PartialEq)]
pub struct SignedWithdraw {
    pub withdraw_id: B256,
    pub payload: WithdrawPayload,
}

/// Signs `Withdraw` structs with the wallet's own key
#[derive(Debug, Clone)]
pub struct WithdrawSigner {
    signer: Eip712Signer,
    account: Address,
    environment: Environment,
}

impl WithdrawSigner {
    /// Requires `Credentials::with_wallet_private_key`
    pub fn from_credentials(credentials: &Credentials) -> Result<Self> {
        let wallet = credentials.wallet_private_key().ok_or_else(|| {
            AevoError::Config("wallet private key is required for withdrawals".to_string())
        })?;

        Ok(Self {
            signer: Eip712Signer::new(wallet.clone(), credentials.environment()),
            account: credentials.wallet_address(),
            environment: credentials.environment(),
        })
    }

    pub fn sign_withdraw(&self, params: &WithdrawParams, salt: u64) -> Result<SignedWithdraw> {
        let collateral = params.collateral.unwrap_or(self.environment.l2_usdc());
        let to = params.to.unwrap_or(self.environment.l2_withdraw_proxy());
        let data = params.data.unwrap_or_else(|| keccak256(b""));
        let amount = to_units(params.amount, params.amount_decimals, "amount")?;
        let amount_units = u64::try_from(amount)
            .map_err(|_| AevoError::Config(format!("amount out of range: {}", params.amount)))?;

        let withdraw = schema::Withdraw {
            collateral,
            to,
            amount,
            salt: U256::from(salt),
            data,
        };
        let (withdraw_id, signature) = self.signer.sign(&withdraw)?;

        debug!(%collateral, %to, amount = amount_units, salt, withdraw_id = %withdraw_id, "withdraw signed");

        Ok(SignedWithdraw {
            withdraw_id,
            payload: WithdrawPayload {
                account: self.account,
                collateral,
                to,
                amount: amount_units,
                salt,
                signature: encode_signature(&signature),
                data,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn credentials() -> Credentials {
        Credentials::new(TEST_KEY, TEST_ADDRESS, "key", "secret", "testnet").expect("credentials")
    }

    #[test]
    fn test_withdraw_requires_wallet_key() {
        let err = WithdrawSigner::from_credentials(&credentials()).unwrap_err();
        assert!(matches!(err, AevoError::Config(_)));
    }

    #[test]
    fn test_withdraw_defaults() {
        let credentials = credentials().with_wallet_private_key(TEST_KEY).unwrap();
        let signer = WithdrawSigner::from_credentials(&credentials).unwrap();

        let signed = signer
            .sign_withdraw(&WithdrawParams::new("10.5".parse().unwrap()), 99)
            .unwrap();

        assert_eq!(signed.payload.amount, 10_500_000);
        assert_eq!(signed.payload.salt, 99);
        assert_eq!(signed.payload.collateral, Environment::Testnet.l2_usdc());
        assert_eq!(signed.payload.to, Environment::Testnet.l2_withdraw_proxy());
        assert_eq!(signed.payload.data, keccak256(b""));
        assert_eq!(signed.payload.account, credentials.wallet_address());
        assert!(signed.payload.signature.starts_with("0x"));

        let again = signer
            .sign_withdraw(&WithdrawParams::new("10.5".parse().unwrap()), 99)
            .unwrap();
        assert_eq!(signed, again);
    }
}
