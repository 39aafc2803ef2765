//! Deterministic on-disk layout
//!
//! ```text
//! <root>/kin_storage/env/<network-id>/kin_accounts/<bucket>/account_info
//! <root>/kin_storage/env/<network-id>/kin_accounts/<bucket>/transactions
//! <root>/kin_storage/env/<network-id>/kin_accounts/<bucket>/invoices
//! ```
//!
//! `<network-id>` is the URL-safe base64 of the network id, `<bucket>` the hex
//! of the first 16 bytes of SHA-256(account id). Both are stable across
//! process restarts.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use std::path::{Path, PathBuf};

use crate::domain::entities::AccountId;
use crate::shared::constants::*;
use crate::shared::types::Network;
use crate::shared::utils::sha256_hex_prefix;

#[derive(Debug, Clone)]
pub struct PathResolver {
    storage_dir: PathBuf,
    accounts_dir: PathBuf,
}

impl PathResolver {
    pub fn new(root: &Path, network: &Network) -> Self {
        let storage_dir = root.join(STORAGE_DIR);
        let accounts_dir = storage_dir
            .join(ENVIRONMENT_DIR)
            .join(encode_network_id(network.id()))
            .join(ACCOUNTS_DIR);
        Self {
            storage_dir,
            accounts_dir,
        }
    }

    /// `<root>/kin_storage`, shared by every network
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn accounts_dir(&self) -> &Path {
        &self.accounts_dir
    }

    pub fn account_dir(&self, id: &AccountId) -> PathBuf {
        self.accounts_dir.join(account_bucket(id))
    }

    pub fn account_info_file(&self, id: &AccountId) -> PathBuf {
        self.account_dir(id).join(ACCOUNT_INFO_FILE)
    }

    pub fn transactions_file(&self, id: &AccountId) -> PathBuf {
        self.account_dir(id).join(TRANSACTIONS_FILE)
    }

    pub fn invoices_file(&self, id: &AccountId) -> PathBuf {
        self.account_dir(id).join(INVOICES_FILE)
    }
}

pub fn encode_network_id(network_id: &str) -> String {
    URL_SAFE_NO_PAD.encode(network_id.as_bytes())
}

pub fn account_bucket(id: &AccountId) -> String {
    sha256_hex_prefix(id.as_str().as_bytes(), BUCKET_HASH_BYTES)
}
