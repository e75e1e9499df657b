//! `ethsign` - offline Ethereum transaction signer console.

use clap::Parser;
use ethsign::{
    console::Console,
    dispatch,
    vault::{KdfStrength, KeyStore},
    SigningService,
};
use std::{io, path::PathBuf, sync::Arc};

#[derive(Parser, Debug)]
#[command(name = "ethsign", version, about = "Offline Ethereum transaction signer")]
struct Config {
    /// Directory holding the encrypted key files
    #[arg(long, env = "ETHSIGN_KEYSTORE")]
    keystore: PathBuf,

    /// Use cheap key derivation for new accounts (testing only)
    #[arg(long, env = "ETHSIGN_LIGHTKDF")]
    lightkdf: bool,
}

fn main() -> ethsign::Result<()> {
    let config = Config::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_time()
        .build()?;

    let strength = if config.lightkdf {
        log::warn!("Using light key derivation for new accounts");
        KdfStrength::Light
    } else {
        KdfStrength::Standard
    };
    let store = KeyStore::open(&config.keystore, strength, runtime.handle().clone())?;
    log::info!("Using key store at {}", store.dir().display());

    let service = SigningService::new(Arc::new(store));
    let mut console = Console::new(dispatch::io_handler(service));

    let stdin = io::stdin();
    console.run(stdin.lock(), io::stdout())?;
    Ok(())
}
