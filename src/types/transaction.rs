use crate::{
    signing::{self, RecoveryError, Signature},
    types::{Address, Recovery, H256, U256},
};
use rlp::{DecoderError, Rlp, RlpStream};

/// A legacy transaction before a signature is attached.
///
/// The chain ID is not part of the structure, it only enters the signing
/// preimage (EIP-155).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnsignedTransaction {
    /// Transaction nonce
    pub nonce: u64,
    /// Recipient (None when contract creation)
    pub to: Option<Address>,
    /// Transfered value
    pub value: U256,
    /// Gas limit
    pub gas: U256,
    /// Gas price
    pub gas_price: U256,
    /// Call data or contract code
    pub data: Vec<u8>,
}

impl UnsignedTransaction {
    /// Returns `true` if the transaction deploys a contract.
    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }

    fn rlp_append_fields(&self, rlp: &mut RlpStream) {
        rlp.append(&self.nonce);
        rlp.append(&self.gas_price);
        rlp.append(&self.gas);
        if let Some(to) = self.to {
            rlp.append(&to);
        } else {
            rlp.append(&"");
        }
        rlp.append(&self.value);
        rlp.append(&self.data);
    }

    /// RLP encode the signing preimage for the specified chain ID.
    fn rlp_append_unsigned(&self, rlp: &mut RlpStream, chain_id: u64) {
        rlp.begin_list(9);
        self.rlp_append_fields(rlp);
        rlp.append(&chain_id);
        rlp.append(&0u8);
        rlp.append(&0u8);
    }

    /// The digest a key signs for this transaction on the given chain.
    pub fn signing_hash(&self, chain_id: u64) -> H256 {
        let mut rlp = RlpStream::new();
        self.rlp_append_unsigned(&mut rlp, chain_id);
        signing::keccak256(rlp.as_raw()).into()
    }

    /// Attach a signature produced over `signing_hash`.
    pub fn with_signature(self, signature: Signature) -> SignedTransaction {
        SignedTransaction {
            transaction: self,
            signature,
        }
    }
}

/// A transaction together with its EIP-155 signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    /// The signed transaction
    pub transaction: UnsignedTransaction,
    /// Signature with chain replay protection
    pub signature: Signature,
}

impl SignedTransaction {
    /// RLP encode the signed transaction, the raw form accepted by
    /// `eth_sendRawTransaction`.
    pub fn encode(&self) -> Vec<u8> {
        let mut rlp = RlpStream::new();
        rlp.begin_list(9);
        self.transaction.rlp_append_fields(&mut rlp);
        rlp.append(&self.signature.v);
        rlp.append(&U256::from_big_endian(self.signature.r.as_bytes()));
        rlp.append(&U256::from_big_endian(self.signature.s.as_bytes()));
        rlp.out().to_vec()
    }

    /// Decode a raw signed transaction.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecoderError> {
        let rlp = Rlp::new(bytes);
        if rlp.payload_info()?.total() != bytes.len() {
            return Err(DecoderError::RlpInconsistentLengthAndData);
        }
        if rlp.item_count()? != 9 {
            return Err(DecoderError::RlpIncorrectListLen);
        }

        let to = {
            let to = rlp.at(3)?;
            if to.is_empty() {
                None
            } else {
                Some(to.as_val::<Address>()?)
            }
        };
        let transaction = UnsignedTransaction {
            nonce: rlp.val_at(0)?,
            gas_price: rlp.val_at(1)?,
            gas: rlp.val_at(2)?,
            to,
            value: rlp.val_at(4)?,
            data: rlp.val_at(5)?,
        };

        let mut r = H256::zero();
        rlp.val_at::<U256>(7)?.to_big_endian(r.as_bytes_mut());
        let mut s = H256::zero();
        rlp.val_at::<U256>(8)?.to_big_endian(s.as_bytes_mut());
        let signature = Signature {
            v: rlp.val_at(6)?,
            r,
            s,
        };

        Ok(SignedTransaction { transaction, signature })
    }

    /// The chain ID encoded in `v`, or `None` for signatures without replay
    /// protection.
    pub fn chain_id(&self) -> Option<u64> {
        match self.signature.v {
            v if v >= 35 => Some((v - 35) / 2),
            _ => None,
        }
    }

    /// The digest the sender signed.
    pub fn message_hash(&self) -> H256 {
        match self.chain_id() {
            Some(chain_id) => self.transaction.signing_hash(chain_id),
            None => {
                let mut rlp = RlpStream::new();
                rlp.begin_list(6);
                self.transaction.rlp_append_fields(&mut rlp);
                signing::keccak256(rlp.as_raw()).into()
            }
        }
    }

    /// Hash of the raw encoded transaction.
    pub fn hash(&self) -> H256 {
        signing::keccak256(&self.encode()).into()
    }

    /// Recover the address which signed the transaction.
    pub fn recover_sender(&self) -> Result<Address, RecoveryError> {
        Recovery::from(self).recover()
    }
}
