//! Signing capabilities and utilities.

use crate::types::{Address, H256};
use once_cell::sync::Lazy;
use rand::{rngs::OsRng, RngCore};
pub use secp256k1::SecretKey;
use secp256k1::{
    ecdsa::{RecoverableSignature, RecoveryId},
    All, Message, PublicKey, Secp256k1,
};

static CONTEXT: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// Error during signing.
#[derive(Debug, derive_more::Display, PartialEq, Clone)]
pub enum SigningError {
    /// A message to sign is invalid. Has to be a non-zero 32-bytes slice.
    #[display(fmt = "Message has to be a non-zero 32-bytes slice.")]
    InvalidMessage,
    /// The chain ID does not fit into the replay protected V-value.
    #[display(fmt = "Chain ID {} is too large for replay protection.", _0)]
    InvalidChainId(u64),
}
impl std::error::Error for SigningError {}

/// Error during sender recovery.
#[derive(Debug, derive_more::Display, PartialEq, Clone)]
pub enum RecoveryError {
    /// A message to recover is invalid. Has to be a non-zero 32-bytes slice.
    #[display(fmt = "Message has to be a non-zero 32-bytes slice.")]
    InvalidMessage,
    /// A signature is invalid and the sender could not be recovered.
    #[display(fmt = "Signature is invalid (check recovery id).")]
    InvalidSignature,
}
impl std::error::Error for RecoveryError {}

/// A trait representing ethereum-compatible key with signing capabilities.
///
/// Keys only ever live inside a key vault; callers outside of it ask the vault
/// for a signature by address instead of handling a `SecretKey` themselves.
pub trait Key {
    /// Sign given message and include chain-id replay protection.
    ///
    /// When a chain ID is provided, the `Signature`'s V-value will have chain relay
    /// protection added (as per EIP-155). Otherwise, the V-value will be in
    /// 'Electrum' notation.
    fn sign(&self, message: &[u8], chain_id: Option<u64>) -> Result<Signature, SigningError>;

    /// Get public address that this key represents.
    fn address(&self) -> Address;
}

impl Key for SecretKey {
    fn sign(&self, message: &[u8], chain_id: Option<u64>) -> Result<Signature, SigningError> {
        let message = Message::from_digest_slice(message).map_err(|_| SigningError::InvalidMessage)?;
        let (recovery_id, signature) = CONTEXT.sign_ecdsa_recoverable(&message, self).serialize_compact();

        let standard_v = recovery_id.to_i32() as u64;
        let v = if let Some(chain_id) = chain_id {
            // When signing with a chain ID, add chain replay protection.
            chain_id
                .checked_mul(2)
                .and_then(|v| v.checked_add(standard_v + 35))
                .ok_or(SigningError::InvalidChainId(chain_id))?
        } else {
            // Otherwise, convert to 'Electrum' notation.
            standard_v + 27
        };
        let r = H256::from_slice(&signature[..32]);
        let s = H256::from_slice(&signature[32..]);

        Ok(Signature { v, r, s })
    }

    fn address(&self) -> Address {
        secret_key_address(self)
    }
}

/// Generate a fresh secret key from the operating system's random source.
pub fn generate_secret_key() -> SecretKey {
    let mut bytes = [0u8; 32];
    loop {
        OsRng.fill_bytes(&mut bytes);
        // Out-of-range scalars are astronomically unlikely, just draw again.
        if let Ok(key) = SecretKey::from_slice(&bytes) {
            zeroize::Zeroize::zeroize(&mut bytes);
            return key;
        }
    }
}

/// Recover a sender, given message and the signature.
///
/// Signature and `recovery_id` can be obtained from `types::Recovery` type.
pub fn recover(message: &[u8], signature: &[u8], recovery_id: i32) -> Result<Address, RecoveryError> {
    let message = Message::from_digest_slice(message).map_err(|_| RecoveryError::InvalidMessage)?;
    let recovery_id = RecoveryId::from_i32(recovery_id).map_err(|_| RecoveryError::InvalidSignature)?;
    let signature =
        RecoverableSignature::from_compact(signature, recovery_id).map_err(|_| RecoveryError::InvalidSignature)?;
    let public_key = CONTEXT
        .recover_ecdsa(&message, &signature)
        .map_err(|_| RecoveryError::InvalidSignature)?;

    Ok(public_key_address(&public_key))
}

/// Gets the address of a public key.
///
/// The public address is defined as the low 20 bytes of the keccak hash of
/// the public key. Note that the public key returned from the `secp256k1`
/// crate is 65 bytes long, that is because it is prefixed by `0x04` to
/// indicate an uncompressed public key; this first byte is ignored when
/// computing the hash.
pub(crate) fn public_key_address(public_key: &PublicKey) -> Address {
    let public_key = public_key.serialize_uncompressed();

    debug_assert_eq!(public_key[0], 0x04);
    let hash = keccak256(&public_key[1..]);

    Address::from_slice(&hash[12..])
}

/// Gets the public address of a private key.
pub fn secret_key_address(key: &SecretKey) -> Address {
    let public_key = PublicKey::from_secret_key(&*CONTEXT, key);
    public_key_address(&public_key)
}

/// A struct that represents the components of a secp256k1 signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    /// V component in electrum format with chain-id replay protection.
    pub v: u64,
    /// R component of the signature.
    pub r: H256,
    /// S component of the signature.
    pub s: H256,
}

/// Compute the Keccak-256 hash of input bytes.
pub fn keccak256(bytes: &[u8]) -> [u8; 32] {
    use tiny_keccak::{Hasher, Keccak};
    let mut output = [0u8; 32];
    let mut hasher = Keccak::v256();
    hasher.update(bytes);
    hasher.finalize(&mut output);
    output
}
