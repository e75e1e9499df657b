//! `Eth` namespace

use crate::{
    api::Namespace,
    builder,
    error::Result,
    types::{Address, Bytes, SignedTransaction, TransactionArgs},
    vault::KeyVault,
};
use std::sync::Arc;

/// `Eth` namespace
pub struct Eth<V> {
    vault: Arc<V>,
}

impl<V> Clone for Eth<V> {
    fn clone(&self) -> Self {
        Eth {
            vault: self.vault.clone(),
        }
    }
}

impl<V: KeyVault> Namespace<V> for Eth<V> {
    fn new(vault: Arc<V>) -> Self {
        Eth { vault }
    }

    fn vault(&self) -> &V {
        &self.vault
    }
}

impl<V: KeyVault> Eth<V> {
    /// Get list of available accounts.
    pub fn accounts(&self) -> Result<Vec<Address>> {
        self.vault.addresses()
    }

    /// Build and sign a transaction from `args`.
    ///
    /// Fails with `Error::Locked` unless `args.from` is unlocked. Nothing is
    /// returned on failure, and signing leaves the unlock window untouched.
    pub fn sign(&self, args: &TransactionArgs) -> Result<SignedTransaction> {
        let (transaction, chain_id) = builder::build(args);
        let digest = transaction.signing_hash(chain_id);
        let signature = self.vault.sign(args.from, &digest, Some(chain_id))?;
        let signed = transaction.with_signature(signature);
        log::debug!(
            "Signed transaction {:?} from {:?} (nonce {}, chain {})",
            signed.hash(),
            args.from,
            signed.transaction.nonce,
            chain_id
        );
        Ok(signed)
    }

    /// Signs a transaction and returns its RLP encoding.
    pub fn sign_transaction(&self, args: TransactionArgs) -> Result<Bytes> {
        Ok(self.sign(&args)?.encode().into())
    }

    /// Same as `sign_transaction`: returns the RLP encoded signed transaction
    /// and does NOT broadcast it. Callers get the raw transaction back instead
    /// of a transaction hash and submit it themselves.
    pub fn send_transaction(&self, args: TransactionArgs) -> Result<Bytes> {
        self.sign_transaction(args)
    }
}

#[cfg(test)]
mod tests {
    use super::Eth;
    use crate::{
        api::{Namespace, SigningService},
        error::Error,
        signing::SecretKey,
        types::{Address, Bytes, SignedTransaction, TransactionArgs, U256},
        vault::{test::TestVault, KeyVault, UnlockState},
    };
    use hex_literal::hex;
    use std::{sync::Arc, thread, time::Duration};

    fn test_key() -> SecretKey {
        SecretKey::from_slice(&hex!(
            "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318"
        ))
        .unwrap()
    }

    fn eth() -> (Eth<TestVault>, Address) {
        let vault = TestVault::new();
        let from = vault.insert(&test_key(), "hunter2");
        (Eth::new(Arc::new(vault)), from)
    }

    fn args(from: Address) -> TransactionArgs {
        TransactionArgs {
            from,
            to: Some(hex!("F0109fC8DF283027b6285cc889F5aA624EaC1F55").into()),
            gas: 2_000_000.into(),
            gas_price: 234_567_897_654_321u64.into(),
            value: Some(1_000_000_000.into()),
            nonce: 0.into(),
            ..Default::default()
        }
    }

    #[test]
    fn accounts() {
        let (eth, from) = eth();
        assert_eq!(eth.accounts().unwrap(), vec![from]);
    }

    #[test]
    fn sign_transaction() {
        // retrieved test vector from:
        // https://web3js.readthedocs.io/en/v1.2.2/web3-eth-accounts.html#eth-accounts-signtransaction
        let (eth, from) = eth();
        eth.vault().unlock(from, "hunter2", None).unwrap();

        let raw = eth.sign_transaction(args(from)).unwrap();

        assert_eq!(
            raw,
            Bytes::from(&hex!("f86a8086d55698372431831e848094f0109fc8df283027b6285cc889f5aa624eac1f55843b9aca008025a009ebb6ca057a0535d6186462bc0b465b561c94a295bdb0621fc19208ab149a9ca0440ffd775ce91a833ab410777204d5341a6f9fa91216a6f3ee2c051fea6a0428")[..])
        );
    }

    #[test]
    fn send_transaction_only_signs() {
        let (eth, from) = eth();
        eth.vault().unlock(from, "hunter2", None).unwrap();

        assert_eq!(
            eth.send_transaction(args(from)).unwrap(),
            eth.sign_transaction(args(from)).unwrap()
        );
    }

    #[test]
    fn signing_is_deterministic() {
        let (eth, from) = eth();
        eth.vault().unlock(from, "hunter2", None).unwrap();

        let first = eth.sign_transaction(args(from)).unwrap();
        let second = eth.sign_transaction(args(from)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn signed_transaction_round_trip() {
        let (eth, from) = eth();
        eth.vault().unlock(from, "hunter2", None).unwrap();
        let args = TransactionArgs {
            to: None,
            data: Some(Bytes(vec![0x60, 0x80, 0x60, 0x40])),
            chain_id: Some(42),
            nonce: 9.into(),
            ..args(from)
        };

        let raw = eth.sign_transaction(args.clone()).unwrap();
        let decoded = SignedTransaction::decode(&raw.0).unwrap();

        assert!(decoded.transaction.is_contract_creation());
        assert_eq!(decoded.transaction.nonce, 9);
        assert_eq!(decoded.transaction.value, args.value.unwrap());
        assert_eq!(decoded.transaction.gas, args.gas);
        assert_eq!(decoded.transaction.gas_price, args.gas_price);
        assert_eq!(decoded.transaction.data, vec![0x60, 0x80, 0x60, 0x40]);
        assert_eq!(decoded.chain_id(), Some(42));
        assert_eq!(decoded.recover_sender().unwrap(), from);
    }

    #[test]
    fn missing_chain_id_signs_for_mainnet() {
        let (eth, from) = eth();
        eth.vault().unlock(from, "hunter2", None).unwrap();

        let signed = eth.sign(&TransactionArgs { chain_id: None, ..args(from) }).unwrap();
        assert_eq!(signed.chain_id(), Some(1));

        let signed = eth.sign(&TransactionArgs { chain_id: Some(0), ..args(from) }).unwrap();
        assert_eq!(signed.chain_id(), Some(1));
        assert_eq!(signed.transaction.value, U256::from(1_000_000_000));
    }

    #[test]
    fn large_chain_id() {
        let (eth, from) = eth();
        eth.vault().unlock(from, "hunter2", None).unwrap();

        let chain_id = (u64::MAX - 36) / 2;
        let raw = eth
            .sign_transaction(TransactionArgs {
                chain_id: Some(chain_id),
                ..args(from)
            })
            .unwrap();
        let decoded = SignedTransaction::decode(&raw.0).unwrap();
        assert_eq!(decoded.chain_id(), Some(chain_id));
        assert_eq!(decoded.recover_sender().unwrap(), from);

        match eth.sign_transaction(TransactionArgs {
            chain_id: Some(u64::MAX / 2),
            ..args(from)
        }) {
            Err(Error::Input(_)) => {}
            other => panic!("unexpected result {:?}", other),
        }
        assert!(eth.vault().unlock_state(from).is_unlocked());
    }

    #[test]
    fn sign_with_locked_account() {
        let (eth, from) = eth();

        assert_eq!(eth.sign_transaction(args(from)), Err(Error::Locked(from)));
        assert_eq!(eth.send_transaction(args(from)), Err(Error::Locked(from)));
    }

    #[test]
    fn sign_with_unknown_account() {
        let (eth, _) = eth();
        let unknown = Address::from_low_u64_be(0x123);

        assert_eq!(eth.sign_transaction(args(unknown)), Err(Error::UnknownAddress(unknown)));
    }

    #[test]
    fn concurrent_sign_lock_and_unlock() {
        let vault = Arc::new(TestVault::new());
        let from = vault.insert(&test_key(), "hunter2");
        let service = SigningService::new(vault);
        service.personal().unlock_account(from, "hunter2", None).unwrap();

        let signers: Vec<_> = (0..4)
            .map(|_| {
                let eth = service.eth();
                thread::spawn(move || {
                    let (mut signed, mut locked) = (0, 0);
                    for _ in 0..200 {
                        match eth.sign_transaction(args(from)) {
                            Ok(raw) => {
                                let decoded = SignedTransaction::decode(&raw.0).unwrap();
                                assert_eq!(decoded.recover_sender().unwrap(), from);
                                assert_eq!(decoded.chain_id(), Some(1));
                                signed += 1;
                            }
                            Err(Error::Locked(address)) => {
                                assert_eq!(address, from);
                                locked += 1;
                            }
                            Err(err) => panic!("unexpected error {:?}", err),
                        }
                    }
                    (signed, locked)
                })
            })
            .collect();

        let personal = service.personal();
        let toggler = thread::spawn(move || {
            for i in 0..100u64 {
                personal.lock_account(from).unwrap();
                let window = if i % 2 == 0 { None } else { Some(0) };
                personal.unlock_account(from, "hunter2", window).unwrap();
            }
        });

        toggler.join().unwrap();
        for signer in signers {
            let (signed, locked) = signer.join().unwrap();
            assert_eq!(signed + locked, 200);
        }
    }

    #[test]
    fn sign_after_unlock_expired() {
        let (eth, from) = eth();
        eth.vault().unlock(from, "hunter2", Some(Duration::from_secs(1))).unwrap();

        assert!(eth.sign_transaction(args(from)).is_ok());
        assert!(eth.vault().unlock_state(from).is_unlocked());

        thread::sleep(Duration::from_millis(1200));
        assert_eq!(eth.sign_transaction(args(from)), Err(Error::Locked(from)));
        assert_eq!(eth.vault().unlock_state(from), UnlockState::Locked);
    }
}
