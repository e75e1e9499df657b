//! Signer Error
use crate::rpc::error::{Error as RPCError, ErrorCode};
use crate::signing::SigningError;
use crate::types::Address;
use crate::vault::VaultError;
use derive_more::{Display, From};
use serde_json::Error as SerdeError;
use std::io::Error as IoError;

/// Signer `Result` type.
pub type Result<T = ()> = std::result::Result<T, Error>;

/// JSON-RPC code reported for every failure which is not an argument error.
pub const SERVER_ERROR_CODE: i64 = -32000;

/// Errors surfaced by the account and signing operations.
#[derive(Debug, Display, From)]
pub enum Error {
    /// malformed caller input
    #[display(fmt = "Invalid input: {}", _0)]
    #[from(ignore)]
    Input(String),
    /// the account is not unlocked
    #[display(fmt = "Account {:?} is locked", _0)]
    #[from(ignore)]
    Locked(Address),
    /// the vault has no key for the address
    #[display(fmt = "Unknown account {:?}", _0)]
    #[from(ignore)]
    UnknownAddress(Address),
    /// key vault failure
    #[display(fmt = "Vault error: {}", _0)]
    Vault(VaultError),
    /// wire encoding failure
    #[display(fmt = "Encoding error: {}", _0)]
    #[from(ignore)]
    Encoding(String),
    /// rpc error
    #[display(fmt = "RPC error: {}", _0)]
    Rpc(RPCError),
    /// io error
    #[display(fmt = "IO error: {}", _0)]
    Io(IoError),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use self::Error::*;
        match *self {
            Input(_) | Locked(_) | UnknownAddress(_) | Encoding(_) => None,
            Vault(ref e) => Some(e),
            Rpc(ref e) => Some(e),
            Io(ref e) => Some(e),
        }
    }
}

impl From<SerdeError> for Error {
    fn from(err: SerdeError) -> Self {
        Error::Input(format!("{}", err))
    }
}

impl From<rlp::DecoderError> for Error {
    fn from(err: rlp::DecoderError) -> Self {
        Error::Encoding(format!("{}", err))
    }
}

impl From<SigningError> for Error {
    fn from(err: SigningError) -> Self {
        match err {
            SigningError::InvalidChainId(_) => Error::Input(format!("{}", err)),
            SigningError::InvalidMessage => Error::Encoding(format!("{}", err)),
        }
    }
}

impl From<Error> for RPCError {
    fn from(err: Error) -> Self {
        match err {
            Error::Input(message) => RPCError::invalid_params(message),
            Error::Rpc(err) => err,
            other => RPCError {
                code: ErrorCode::ServerError(SERVER_ERROR_CODE),
                message: other.to_string(),
                data: None,
            },
        }
    }
}

#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        use self::Error::*;
        match (self, other) {
            (Input(a), Input(b)) | (Encoding(a), Encoding(b)) => a == b,
            (Locked(a), Locked(b)) | (UnknownAddress(a), UnknownAddress(b)) => a == b,
            (Vault(a), Vault(b)) => a == b,
            (Rpc(a), Rpc(b)) => a == b,
            (Io(a), Io(b)) => a.kind() == b.kind(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_account_maps_to_server_error() {
        let address = Address::from_low_u64_be(0x123);
        let err: RPCError = Error::Locked(address).into();

        assert_eq!(err.code, ErrorCode::ServerError(SERVER_ERROR_CODE));
        assert_eq!(
            err.message,
            "Account 0x0000000000000000000000000000000000000123 is locked"
        );
    }

    #[test]
    fn input_error_maps_to_invalid_params() {
        let err: RPCError = Error::Input("missing from".into()).into();

        assert_eq!(err.code, ErrorCode::InvalidParams);
        assert_eq!(err.message, "missing from");
    }
}
