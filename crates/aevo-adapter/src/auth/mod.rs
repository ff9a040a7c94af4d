/*
[INPUT]:  Credentials, order/withdraw parameters
[OUTPUT]: Session credentials, EIP-712 signatures and signed payloads
[POS]:    Auth layer - credential holder and typed-data signing
[UPDATE]: When auth flow or signature methods change
*/

pub mod credentials;
pub mod evm_wallet;
pub mod order_signer;
pub mod typed_data;
pub mod withdraw_signer;

pub use credentials::Credentials;
pub use evm_wallet::{EvmWalletSigner, encode_signature};
pub use order_signer::{OrderSigner, SignedOrder, generate_salt};
pub use typed_data::Eip712Signer;
pub use withdraw_signer::{SignedWithdraw, WithdrawSigner};
