//! Signer Types

mod bytes;
mod recovery;
mod transaction;
mod transaction_args;

pub use self::bytes::Bytes;
pub use self::recovery::Recovery;
pub use self::transaction::{SignedTransaction, UnsignedTransaction};
pub use self::transaction_args::TransactionArgs;
pub use ethereum_types::{H160, H256, U256, U64};

/// Address
pub type Address = H160;
