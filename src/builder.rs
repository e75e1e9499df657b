//! Canonicalization of transaction signing arguments.

use crate::types::{TransactionArgs, UnsignedTransaction};

/// Chain ID used when the caller does not specify one.
pub const MAINNET_CHAIN_ID: u64 = 1;

/// Turn caller arguments into the transaction to sign and the chain ID that
/// enters its signing preimage.
///
/// A missing `to` always produces a contract creation, regardless of `data`.
/// A missing `value` is zero, missing `data` is empty and a missing or zero
/// `chain_id` resolves to mainnet.
pub fn build(args: &TransactionArgs) -> (UnsignedTransaction, u64) {
    (to_transaction(args), chain_id(args))
}

fn to_transaction(args: &TransactionArgs) -> UnsignedTransaction {
    UnsignedTransaction {
        nonce: args.nonce.as_u64(),
        to: args.to,
        value: args.value.unwrap_or_default(),
        gas: args.gas,
        gas_price: args.gas_price,
        data: args.data.as_ref().map(|data| data.0.clone()).unwrap_or_default(),
    }
}

fn chain_id(args: &TransactionArgs) -> u64 {
    match args.chain_id {
        None | Some(0) => MAINNET_CHAIN_ID,
        Some(chain_id) => chain_id,
    }
}
