//! Offline Ethereum transaction signer.
//!
//! Keeps password protected secp256k1 accounts in a key store directory,
//! unlocks them for a limited time and signs legacy (EIP-155) transactions
//! without ever talking to a node.

#![allow(clippy::type_complexity, clippy::wrong_self_convention)]
#![warn(missing_docs)]

use jsonrpc_core as rpc;

pub mod api;
pub mod builder;
pub mod console;
pub mod dispatch;
pub mod error;
pub mod helpers;
pub mod signing;
pub mod types;
pub mod vault;

pub use crate::api::SigningService;
pub use crate::error::{Error, Result};
