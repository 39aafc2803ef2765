use anyhow::Result;
use kin_wallet_storage::core::storage::paths::encode_network_id;
use kin_wallet_storage::{FileSettingsStore, PathResolver, SettingsStore, StorageConfig};

fn main() -> Result<()> {
    kin_wallet_storage::init();

    let config = StorageConfig::from_env();
    let paths = PathResolver::new(&config.root_dir, &config.network);
    let minimum_fee = FileSettingsStore::new(&config.settings_path).minimum_fee()?;

    println!("Kin Wallet Storage Configuration:\n");
    println!("  Network: {}", config.network.name());
    println!("  Network ID: {}", config.network.id());
    println!("  Network Directory: {}", encode_network_id(config.network.id()));
    println!("  Storage Root: {}", config.root_dir.display());
    println!("  Storage Directory: {}", paths.storage_dir().display());
    println!("  Accounts Directory: {}", paths.accounts_dir().display());
    println!("  Settings File: {}", config.settings_path.display());
    println!("  Key Store Directory: {}", config.key_store_dir.display());
    match minimum_fee {
        Some(fee) => println!("  Minimum Fee: {} quarks", fee),
        None => println!("  Minimum Fee: (not set)"),
    }
    Ok(())
}
