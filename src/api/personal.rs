//! `Personal` namespace

use crate::{api::Namespace, error::Result, types::Address, vault::KeyVault};
use std::{sync::Arc, time::Duration};

/// `Personal` namespace
pub struct Personal<V> {
    vault: Arc<V>,
}

impl<V> Clone for Personal<V> {
    fn clone(&self) -> Self {
        Personal {
            vault: self.vault.clone(),
        }
    }
}

impl<V: KeyVault> Namespace<V> for Personal<V> {
    fn new(vault: Arc<V>) -> Self {
        Personal { vault }
    }

    fn vault(&self) -> &V {
        &self.vault
    }
}

impl<V: KeyVault> Personal<V> {
    /// Creates a new account and protects it with given password.
    /// Returns the address of created account.
    pub fn new_account(&self, password: &str) -> Result<Address> {
        self.vault.create(password)
    }

    /// Unlocks the account with given password for `duration` seconds, or
    /// until it is explicitly locked again when `duration` is `None`.
    ///
    /// Returns `true` if the account was unlocked. The reason of a failure,
    /// like a wrong password, is returned as the error; callers only
    /// interested in the indication can use `unwrap_or(false)`.
    pub fn unlock_account(&self, address: Address, password: &str, duration: Option<u64>) -> Result<bool> {
        self.vault.unlock(address, password, duration.map(Duration::from_secs))?;
        log::info!("Unlocked account {:?} for {:?} seconds", address, duration);
        Ok(true)
    }

    /// Locks the account. Locking an account which is not unlocked succeeds,
    /// an address the vault does not hold is an error.
    pub fn lock_account(&self, address: Address) -> Result<bool> {
        self.vault.lock(address)?;
        Ok(true)
    }
}
