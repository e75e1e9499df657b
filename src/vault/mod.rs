//! Custody of encrypted private keys.
//!
//! A vault owns the key material. Callers only ever see addresses and
//! signatures: a key has to be unlocked with its password before the vault
//! agrees to sign with it, either until it is locked again or for a limited
//! window after which it locks itself.

use crate::{
    error::Result,
    signing::Signature,
    types::{Address, H256},
};
use derive_more::{Display, From};
use std::{
    io::Error as IoError,
    time::{Duration, Instant},
};

mod crypto;
mod keystore;
mod unlock;

pub use self::crypto::{KdfStrength, KeyFile};
pub use self::keystore::KeyStore;
pub use self::unlock::UnlockTable;

/// Unlock state of a single account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockState {
    /// The key cannot be used for signing.
    Locked,
    /// The key can sign until the given instant, or until explicitly locked.
    Unlocked {
        /// Expiry of the unlock window, `None` for no expiry
        until: Option<Instant>,
    },
}

impl UnlockState {
    /// Returns `true` if the key can currently sign.
    pub fn is_unlocked(&self) -> bool {
        matches!(self, UnlockState::Unlocked { .. })
    }
}

/// Failures of the vault's storage and cryptography.
#[derive(Debug, Display, From)]
pub enum VaultError {
    /// the password does not decrypt the key
    #[display(fmt = "could not decrypt key with given password")]
    InvalidPassword,
    /// key file could not be parsed or is inconsistent
    #[display(fmt = "invalid key file: {}", _0)]
    #[from(ignore)]
    KeyFile(String),
    /// key derivation or encryption failed
    #[display(fmt = "crypto failure: {}", _0)]
    #[from(ignore)]
    Crypto(String),
    /// io error
    #[display(fmt = "{}", _0)]
    Io(IoError),
}

impl std::error::Error for VaultError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            VaultError::Io(ref e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
impl PartialEq for VaultError {
    fn eq(&self, other: &Self) -> bool {
        use self::VaultError::*;
        match (self, other) {
            (InvalidPassword, InvalidPassword) => true,
            (KeyFile(a), KeyFile(b)) | (Crypto(a), Crypto(b)) => a == b,
            (Io(a), Io(b)) => a.kind() == b.kind(),
            _ => false,
        }
    }
}

/// Capability storing encrypted keys and signing with unlocked ones.
pub trait KeyVault: Send + Sync {
    /// Generate a new key, protect it with `password` and return its address.
    /// The new account starts locked.
    fn create(&self, password: &str) -> Result<Address>;

    /// Decrypt the key of `address`, for `duration` or until `lock` when `None`.
    ///
    /// Unlocking an unlocked account replaces its previous window.
    fn unlock(&self, address: Address, password: &str, duration: Option<Duration>) -> Result<()>;

    /// Forget the decrypted key of `address`. Locking a locked account succeeds.
    fn lock(&self, address: Address) -> Result<()>;

    /// Sign a 32-byte digest with the unlocked key of `address`, adding
    /// EIP-155 replay protection for `chain_id`.
    fn sign(&self, address: Address, digest: &H256, chain_id: Option<u64>) -> Result<Signature>;

    /// All addresses held by the vault, in ascending order.
    fn addresses(&self) -> Result<Vec<Address>>;

    /// Current unlock state of `address`.
    fn unlock_state(&self, address: Address) -> UnlockState;
}
