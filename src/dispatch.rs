//! In-process JSON-RPC dispatch of the `personal` and `eth` namespaces.

use crate::{
    api::SigningService,
    helpers::{self, parse_params},
    rpc,
    types::{Address, TransactionArgs},
    vault::KeyVault,
};

/// Methods registered by `io_handler`.
pub const METHODS: &[&str] = &[
    "personal_newAccount",
    "personal_unlockAccount",
    "personal_lockAccount",
    "eth_accounts",
    "eth_sendTransaction",
    "eth_signTransaction",
];

/// Register the service's methods on a new handler.
///
/// `eth_sendTransaction` is kept for web3 compatibility only: like
/// `eth_signTransaction` it returns the signed raw transaction and never
/// broadcasts anything.
pub fn io_handler<V: KeyVault + 'static>(service: SigningService<V>) -> rpc::IoHandler {
    let mut io = rpc::IoHandler::new();

    let personal = service.personal();
    io.add_sync_method("personal_newAccount", move |params: rpc::Params| -> rpc::Result<rpc::Value> {
        let (password,): (String,) = parse_params(params, 1)?;
        Ok(helpers::serialize(&personal.new_account(&password)?))
    });

    let personal = service.personal();
    io.add_sync_method("personal_unlockAccount", move |params: rpc::Params| -> rpc::Result<rpc::Value> {
        let (address, password, duration): (Address, String, Option<u64>) = parse_params(params, 3)?;
        Ok(helpers::serialize(&personal.unlock_account(address, &password, duration)?))
    });

    let personal = service.personal();
    io.add_sync_method("personal_lockAccount", move |params: rpc::Params| -> rpc::Result<rpc::Value> {
        let (address,): (Address,) = parse_params(params, 1)?;
        Ok(helpers::serialize(&personal.lock_account(address)?))
    });

    let eth = service.eth();
    io.add_sync_method("eth_accounts", move |params: rpc::Params| -> rpc::Result<rpc::Value> {
        params.expect_no_params()?;
        Ok(helpers::serialize(&eth.accounts()?))
    });

    let eth = service.eth();
    io.add_sync_method("eth_sendTransaction", move |params: rpc::Params| -> rpc::Result<rpc::Value> {
        let (args,): (TransactionArgs,) = parse_params(params, 1)?;
        Ok(helpers::serialize(&eth.send_transaction(args)?))
    });

    let eth = service.eth();
    io.add_sync_method("eth_signTransaction", move |params: rpc::Params| -> rpc::Result<rpc::Value> {
        let (args,): (TransactionArgs,) = parse_params(params, 1)?;
        Ok(helpers::serialize(&eth.sign_transaction(args)?))
    });

    log::debug!("Registered {} methods", METHODS.len());
    io
}
