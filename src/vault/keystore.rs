use crate::{
    error::{Error, Result},
    signing::{self, Key, Signature},
    types::{Address, H256},
    vault::{KdfStrength, KeyFile, KeyVault, UnlockState, UnlockTable, VaultError},
};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::runtime::Handle;

/// A key vault keeping one encrypted JSON key file per account in a directory.
#[derive(Debug)]
pub struct KeyStore {
    dir: PathBuf,
    strength: KdfStrength,
    unlocked: UnlockTable,
}

impl KeyStore {
    /// Open the key directory at `dir`, creating it when missing.
    ///
    /// `strength` applies to keys created from now on, existing files keep the
    /// parameters they were encrypted with. Expiry of timed unlocks is scheduled
    /// on `runtime`.
    pub fn open<P: AsRef<Path>>(dir: P, strength: KdfStrength, runtime: Handle) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(VaultError::from)?;
        log::debug!("Opened key store at {}", dir.display());
        Ok(KeyStore {
            dir,
            strength,
            unlocked: UnlockTable::new(runtime),
        })
    }

    /// The key directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_files(&self) -> Result<Vec<KeyFile>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(VaultError::from)? {
            let path = entry.map_err(VaultError::from)?.path();
            let hidden = path
                .file_name()
                .and_then(|name| name.to_str())
                .map_or(true, |name| name.starts_with('.'));
            if hidden || !path.is_file() {
                continue;
            }
            match read_key_file(&path) {
                Ok(file) => files.push(file),
                Err(err) => log::warn!("Skipping {}: {}", path.display(), err),
            }
        }
        Ok(files)
    }

    fn find(&self, address: Address) -> Result<KeyFile> {
        self.key_files()?
            .into_iter()
            .find(|file| file.address == address)
            .ok_or(Error::UnknownAddress(address))
    }

    fn knows(&self, address: Address) -> Result<bool> {
        Ok(self.key_files()?.iter().any(|file| file.address == address))
    }
}

impl KeyVault for KeyStore {
    fn create(&self, password: &str) -> Result<Address> {
        let key = signing::generate_secret_key();
        let file = KeyFile::encrypt(&key, password, self.strength)?;
        let address = file.address;

        let path = self.dir.join(key_file_name(address));
        let json = serde_json::to_vec_pretty(&file).map_err(|e| VaultError::KeyFile(format!("{}", e)))?;
        write_new(&path, &json).map_err(VaultError::from)?;

        log::info!("Created account {:?}", address);
        Ok(address)
    }

    fn unlock(&self, address: Address, password: &str, duration: Option<Duration>) -> Result<()> {
        let key = self.find(address)?.decrypt(password)?;
        self.unlocked.unlock(address, key, duration);
        Ok(())
    }

    fn lock(&self, address: Address) -> Result<()> {
        if !self.unlocked.lock(address) && !self.knows(address)? {
            return Err(Error::UnknownAddress(address));
        }
        Ok(())
    }

    fn sign(&self, address: Address, digest: &H256, chain_id: Option<u64>) -> Result<Signature> {
        match self.unlocked.with_key(address, |key| key.sign(digest.as_bytes(), chain_id)) {
            Ok(signature) => Ok(signature?),
            Err(Error::Locked(_)) => match self.knows(address) {
                Ok(false) => Err(Error::UnknownAddress(address)),
                Ok(true) => Err(Error::Locked(address)),
                Err(err) => {
                    log::warn!("Could not list key files in {}: {}", self.dir.display(), err);
                    Err(Error::Locked(address))
                }
            },
            Err(err) => Err(err),
        }
    }

    fn addresses(&self) -> Result<Vec<Address>> {
        let mut addresses: Vec<_> = self.key_files()?.into_iter().map(|file| file.address).collect();
        addresses.sort();
        addresses.dedup();
        Ok(addresses)
    }

    fn unlock_state(&self, address: Address) -> UnlockState {
        self.unlocked.state(address)
    }
}

fn read_key_file(path: &Path) -> std::result::Result<KeyFile, VaultError> {
    let json = fs::read(path)?;
    serde_json::from_slice(&json).map_err(|e| VaultError::KeyFile(format!("{}", e)))
}

/// `UTC--<timestamp>--<address>`, sorting key files by creation time.
fn key_file_name(address: Address) -> String {
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S%.9fZ");
    format!("UTC--{}--{}", timestamp, hex::encode(address.as_bytes()))
}

fn write_new(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Runtime::new().unwrap()
    }

    fn digest() -> H256 {
        signing::keccak256(b"transaction").into()
    }

    #[test]
    fn create_and_list_accounts() {
        let runtime = runtime();
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::open(dir.path(), KdfStrength::Light, runtime.handle().clone()).unwrap();

        assert!(store.addresses().unwrap().is_empty());

        let a = store.create("a").unwrap();
        let b = store.create("b").unwrap();
        let mut expected = vec![a, b];
        expected.sort();

        assert_eq!(store.addresses().unwrap(), expected);
        assert_eq!(store.unlock_state(a), UnlockState::Locked);
    }

    #[test]
    fn accounts_survive_reopening() {
        let runtime = runtime();
        let dir = tempfile::tempdir().unwrap();
        let address = {
            let store = KeyStore::open(dir.path(), KdfStrength::Light, runtime.handle().clone()).unwrap();
            store.create("pw").unwrap()
        };

        let store = KeyStore::open(dir.path(), KdfStrength::Standard, runtime.handle().clone()).unwrap();
        assert_eq!(store.addresses().unwrap(), vec![address]);
        store.unlock(address, "pw", None).unwrap();
        assert!(store.unlock_state(address).is_unlocked());
    }

    #[test]
    fn unlock_requires_password() {
        let runtime = runtime();
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::open(dir.path(), KdfStrength::Light, runtime.handle().clone()).unwrap();
        let address = store.create("pw").unwrap();

        assert_eq!(
            store.unlock(address, "wrong", None),
            Err(Error::Vault(VaultError::InvalidPassword))
        );
        assert_eq!(store.unlock_state(address), UnlockState::Locked);

        let unknown = Address::from_low_u64_be(0x123);
        assert_eq!(store.unlock(unknown, "pw", None), Err(Error::UnknownAddress(unknown)));
    }

    #[test]
    fn sign_requires_unlock() {
        let runtime = runtime();
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::open(dir.path(), KdfStrength::Light, runtime.handle().clone()).unwrap();
        let address = store.create("pw").unwrap();

        assert_eq!(store.sign(address, &digest(), Some(1)), Err(Error::Locked(address)));

        store.unlock(address, "pw", None).unwrap();
        let signature = store.sign(address, &digest(), None).unwrap();
        let mut compact = [0u8; 64];
        compact[..32].copy_from_slice(signature.r.as_bytes());
        compact[32..].copy_from_slice(signature.s.as_bytes());
        let signer = signing::recover(digest().as_bytes(), &compact, (signature.v - 27) as i32).unwrap();
        assert_eq!(signer, address);

        store.lock(address).unwrap();
        assert_eq!(store.sign(address, &digest(), Some(1)), Err(Error::Locked(address)));
    }

    #[test]
    fn sign_locked_with_unreadable_directory() {
        let runtime = runtime();
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::open(dir.path().join("keys"), KdfStrength::Light, runtime.handle().clone()).unwrap();
        let address = store.create("pw").unwrap();

        fs::remove_dir_all(store.dir()).unwrap();

        assert!(store.addresses().is_err());
        assert_eq!(store.sign(address, &digest(), Some(1)), Err(Error::Locked(address)));
    }

    #[test]
    fn sign_with_unknown_address() {
        let runtime = runtime();
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::open(dir.path(), KdfStrength::Light, runtime.handle().clone()).unwrap();
        let unknown = Address::from_low_u64_be(0x123);

        assert_eq!(store.sign(unknown, &digest(), Some(1)), Err(Error::UnknownAddress(unknown)));
    }

    #[test]
    fn lock_is_idempotent() {
        let runtime = runtime();
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::open(dir.path(), KdfStrength::Light, runtime.handle().clone()).unwrap();
        let address = store.create("pw").unwrap();

        store.unlock(address, "pw", None).unwrap();
        assert_eq!(store.lock(address), Ok(()));
        assert_eq!(store.lock(address), Ok(()));

        let unknown = Address::from_low_u64_be(0x123);
        assert_eq!(store.lock(unknown), Err(Error::UnknownAddress(unknown)));
    }

    #[test]
    fn timed_unlock_expires() {
        let runtime = runtime();
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::open(dir.path(), KdfStrength::Light, runtime.handle().clone()).unwrap();
        let address = store.create("pw").unwrap();

        store.unlock(address, "pw", Some(Duration::from_secs(1))).unwrap();
        assert!(store.sign(address, &digest(), Some(1)).is_ok());

        thread::sleep(Duration::from_millis(1200));
        assert_eq!(store.sign(address, &digest(), Some(1)), Err(Error::Locked(address)));
    }

    #[test]
    fn skip_foreign_files() {
        let runtime = runtime();
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README"), b"not a key").unwrap();
        fs::write(dir.path().join(".hidden"), b"{}").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let store = KeyStore::open(dir.path(), KdfStrength::Light, runtime.handle().clone()).unwrap();
        let address = store.create("pw").unwrap();

        assert_eq!(store.addresses().unwrap(), vec![address]);
    }
}
