//! `SigningService` implementation

mod eth;
mod personal;

pub use self::eth::Eth;
pub use self::personal::Personal;

use crate::vault::KeyVault;
use std::sync::Arc;

/// Common API for all namespaces
pub trait Namespace<V: KeyVault>: Clone {
    /// Creates new API namespace
    fn new(vault: Arc<V>) -> Self;

    /// Borrows a vault.
    fn vault(&self) -> &V;
}

/// Account custody and transaction signing, grouped in the `personal` and
/// `eth` namespaces.
pub struct SigningService<V> {
    vault: Arc<V>,
}

impl<V> Clone for SigningService<V> {
    fn clone(&self) -> Self {
        SigningService {
            vault: self.vault.clone(),
        }
    }
}

impl<V: KeyVault> SigningService<V> {
    /// Create new `SigningService` with given vault
    pub fn new(vault: Arc<V>) -> Self {
        SigningService { vault }
    }

    /// Borrows a vault.
    pub fn vault(&self) -> &V {
        &self.vault
    }

    /// Access methods from custom namespace
    pub fn api<A: Namespace<V>>(&self) -> A {
        A::new(self.vault.clone())
    }

    /// Access methods from `eth` namespace
    pub fn eth(&self) -> eth::Eth<V> {
        self.api()
    }

    /// Access methods from `personal` namespace
    pub fn personal(&self) -> personal::Personal<V> {
        self.api()
    }
}
