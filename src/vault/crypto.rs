//! Password encryption of key files.
//!
//! The secret key is encrypted with ChaCha20-Poly1305 under a 256-bit key
//! derived from the password with Argon2id. The account address is bound to
//! the ciphertext as associated data, so a key file cannot be re-labelled.

use crate::{
    signing::{Key as _, SecretKey},
    types::{Address, Bytes},
    vault::VaultError,
};
use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::{
    aead::{Aead, Payload},
    ChaCha20Poly1305, Key, KeyInit, Nonce,
};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

const KEY_FILE_VERSION: u32 = 1;
const CIPHER: &str = "chacha20-poly1305";
const KDF: &str = "argon2id";
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const SECRET_KEY_LEN: usize = 32;

/// Cost of the password key derivation for newly created keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdfStrength {
    /// 64 MiB of memory, 3 passes, 4 lanes.
    Standard,
    /// 4 MiB of memory, 1 pass, 1 lane. Much cheaper to brute force.
    Light,
}

impl KdfStrength {
    fn params(self, salt: Vec<u8>) -> KdfParams {
        let (memory, iterations, parallelism) = match self {
            KdfStrength::Standard => (65536, 3, 4),
            KdfStrength::Light => (4096, 1, 1),
        };
        KdfParams {
            memory,
            iterations,
            parallelism,
            salt: salt.into(),
        }
    }
}

impl Default for KdfStrength {
    fn default() -> Self {
        KdfStrength::Standard
    }
}

/// Argon2id parameters, memory in KiB.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub memory: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
    /// Random salt
    pub salt: Bytes,
}

impl KdfParams {
    fn derive_key(&self, password: &str) -> Result<Zeroizing<[u8; 32]>, VaultError> {
        let params = Params::new(self.memory, self.iterations, self.parallelism, Some(32))
            .map_err(|e| VaultError::Crypto(format!("invalid Argon2 params: {}", e)))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut key = Zeroizing::new([0u8; 32]);
        argon2
            .hash_password_into(password.as_bytes(), &self.salt.0, &mut key[..])
            .map_err(|e| VaultError::Crypto(format!("key derivation failed: {}", e)))?;
        Ok(key)
    }
}

/// The `crypto` section of a key file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CryptoSection {
    /// Cipher name
    pub cipher: String,
    /// Encrypted secret key followed by the authentication tag
    pub ciphertext: Bytes,
    /// Cipher nonce
    pub nonce: Bytes,
    /// Key derivation function name
    pub kdf: String,
    /// Key derivation parameters
    pub kdfparams: KdfParams,
}

/// Encrypted key as stored on disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyFile {
    /// Address of the key
    pub address: Address,
    /// Encryption details
    pub crypto: CryptoSection,
    /// Format version
    pub version: u32,
}

impl KeyFile {
    /// Encrypt `key` with `password`.
    pub fn encrypt(key: &SecretKey, password: &str, strength: KdfStrength) -> Result<Self, VaultError> {
        let address = key.address();
        let kdfparams = strength.params(random_bytes(SALT_LEN));
        let nonce = random_bytes(NONCE_LEN);

        let encryption_key = kdfparams.derive_key(password)?;
        let secret = Zeroizing::new(key.secret_bytes());
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&encryption_key[..]));
        let ciphertext = cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: &secret[..],
                    aad: address.as_bytes(),
                },
            )
            .map_err(|e| VaultError::Crypto(format!("encryption failed: {}", e)))?;

        Ok(KeyFile {
            address,
            crypto: CryptoSection {
                cipher: CIPHER.into(),
                ciphertext: ciphertext.into(),
                nonce: nonce.into(),
                kdf: KDF.into(),
                kdfparams,
            },
            version: KEY_FILE_VERSION,
        })
    }

    /// Decrypt the key with `password`.
    pub fn decrypt(&self, password: &str) -> Result<SecretKey, VaultError> {
        if self.version != KEY_FILE_VERSION {
            return Err(VaultError::KeyFile(format!("unsupported version {}", self.version)));
        }
        if self.crypto.cipher != CIPHER || self.crypto.kdf != KDF {
            return Err(VaultError::KeyFile(format!(
                "unsupported cipher {} with kdf {}",
                self.crypto.cipher, self.crypto.kdf
            )));
        }
        if self.crypto.nonce.0.len() != NONCE_LEN {
            return Err(VaultError::KeyFile("invalid nonce length".into()));
        }

        let encryption_key = self.crypto.kdfparams.derive_key(password)?;
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&encryption_key[..]));
        let secret = cipher
            .decrypt(
                Nonce::from_slice(&self.crypto.nonce.0),
                Payload {
                    msg: &self.crypto.ciphertext.0,
                    aad: self.address.as_bytes(),
                },
            )
            .map(Zeroizing::new)
            .map_err(|_| VaultError::InvalidPassword)?;

        if secret.len() != SECRET_KEY_LEN {
            return Err(VaultError::KeyFile(format!("invalid secret length {}", secret.len())));
        }
        let key = SecretKey::from_slice(&secret).map_err(|e| VaultError::KeyFile(format!("{}", e)))?;
        if key.address() != self.address {
            return Err(VaultError::KeyFile("key does not match address".into()));
        }
        Ok(key)
    }
}

fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}
