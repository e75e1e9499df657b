use crate::types::{Address, Bytes, U256, U64};
use serde::{Deserialize, Serialize};

/// Caller supplied arguments of `eth_signTransaction` and `eth_sendTransaction`.
///
/// Optional fields are filled with defaults by `builder::build`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionArgs {
    /// Sender, must be an account held by the vault
    pub from: Address,
    /// Recipient (None for contract creation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    /// Supplied gas
    pub gas: U256,
    /// Gas price
    pub gas_price: U256,
    /// Transfered value (None for zero)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    /// Call data or contract code (None for empty)
    #[serde(default, alias = "input", skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    /// Transaction nonce
    pub nonce: U64,
    /// Chain ID used for replay protection (None or zero for mainnet)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
}
