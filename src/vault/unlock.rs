use crate::{
    error::{Error, Result},
    signing::SecretKey,
    types::Address,
    vault::UnlockState,
};
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    sync::{Arc, Weak},
    time::{Duration, Instant},
};
use tokio::{runtime::Handle, task::JoinHandle};

#[derive(Default)]
struct Entries {
    unlocked: HashMap<Address, Unlocked>,
    generation: u64,
}

struct Unlocked {
    key: SecretKey,
    until: Option<Instant>,
    generation: u64,
    expiry: Option<JoinHandle<()>>,
}

impl Unlocked {
    fn is_expired(&self, now: Instant) -> bool {
        self.until.map_or(false, |until| until <= now)
    }
}

impl Drop for Unlocked {
    fn drop(&mut self) {
        self.key.non_secure_erase();
        if let Some(expiry) = self.expiry.take() {
            expiry.abort();
        }
    }
}

/// Decrypted keys of unlocked accounts.
///
/// Every entry carries the generation of the unlock that created it. Timed
/// unlocks spawn an expiry task on the given runtime which only removes the
/// entry if its generation still matches, so a timer outliving a later
/// `unlock` or `lock` of the same address does nothing.
pub struct UnlockTable {
    entries: Arc<Mutex<Entries>>,
    runtime: Handle,
}

impl UnlockTable {
    /// Creates an empty table scheduling expiry timers on `runtime`.
    pub fn new(runtime: Handle) -> Self {
        UnlockTable {
            entries: Default::default(),
            runtime,
        }
    }

    /// Make `key` usable for `address`, replacing any previous unlock.
    ///
    /// A window whose end is not representable as an `Instant` never expires.
    pub fn unlock(&self, address: Address, key: SecretKey, duration: Option<Duration>) {
        let mut entries = self.entries.lock();
        entries.generation += 1;
        let generation = entries.generation;

        let until = duration.and_then(|duration| Instant::now().checked_add(duration));
        let expiry = duration
            .filter(|_| until.is_some())
            .map(|duration| self.schedule_expiry(address, generation, duration));

        // Dropping the replaced entry aborts its pending expiry.
        entries.unlocked.insert(
            address,
            Unlocked {
                key,
                until,
                generation,
                expiry,
            },
        );
        log::debug!("Unlocked {:?} (generation {}, window {:?})", address, generation, duration);
    }

    /// Forget the key of `address`. Returns `true` if it was unlocked.
    pub fn lock(&self, address: Address) -> bool {
        let was_unlocked = self.entries.lock().unlocked.remove(&address).is_some();
        if was_unlocked {
            log::debug!("Locked {:?}", address);
        }
        was_unlocked
    }

    /// Current state of `address`, an elapsed window reads as locked.
    pub fn state(&self, address: Address) -> UnlockState {
        let entries = self.entries.lock();
        match entries.unlocked.get(&address) {
            Some(unlocked) if !unlocked.is_expired(Instant::now()) => UnlockState::Unlocked { until: unlocked.until },
            _ => UnlockState::Locked,
        }
    }

    /// Run `f` with the key of `address` while holding the table lock, so the
    /// key cannot be locked or expire while in use.
    pub fn with_key<R>(&self, address: Address, f: impl FnOnce(&SecretKey) -> R) -> Result<R> {
        let mut entries = self.entries.lock();
        let now = Instant::now();
        if entries.unlocked.get(&address).map_or(false, |unlocked| unlocked.is_expired(now)) {
            // The expiry timer has not fired yet.
            entries.unlocked.remove(&address);
        }
        entries
            .unlocked
            .get(&address)
            .map(|unlocked| f(&unlocked.key))
            .ok_or(Error::Locked(address))
    }

    fn schedule_expiry(&self, address: Address, generation: u64, duration: Duration) -> JoinHandle<()> {
        let entries: Weak<Mutex<Entries>> = Arc::downgrade(&self.entries);
        self.runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(entries) = entries.upgrade() {
                let mut entries = entries.lock();
                let current = entries
                    .unlocked
                    .get(&address)
                    .map_or(false, |unlocked| unlocked.generation == generation);
                if current {
                    entries.unlocked.remove(&address);
                    log::info!("Unlock window of {:?} expired", address);
                }
            }
        })
    }
}

impl std::fmt::Debug for UnlockTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.lock();
        f.debug_struct("UnlockTable")
            .field("unlocked", &entries.unlocked.keys().collect::<Vec<_>>())
            .finish()
    }
}
