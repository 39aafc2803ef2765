//! Constants for the storage layer
//!
//! This module contains the on-disk layout names and configuration keys.

// Directory layout: <root>/kin_storage/env/<network>/kin_accounts/<bucket>/
pub const STORAGE_DIR: &str = "kin_storage";
pub const ENVIRONMENT_DIR: &str = "env";
pub const ACCOUNTS_DIR: &str = "kin_accounts";

// Per-account files
pub const ACCOUNT_INFO_FILE: &str = "account_info";
pub const TRANSACTIONS_FILE: &str = "transactions";
pub const INVOICES_FILE: &str = "invoices";
pub const TEMP_FILE_SUFFIX: &str = ".tmp";

// Account bucket is hex of the first BUCKET_HASH_BYTES of SHA-256(account id)
pub const BUCKET_HASH_BYTES: usize = 16;

// Record framing
pub const RECORD_MAGIC: &[u8; 4] = b"KINS";
pub const RECORD_FORMAT_VERSION: u8 = 1;
pub const RECORD_HEADER_SIZE: usize = 5;

// Key material sizes
pub const PUBLIC_KEY_SIZE: usize = 32;
pub const PRIVATE_KEY_SIZE: usize = 32;
pub const TRANSACTION_HASH_SIZE: usize = 32;

// Key store file encryption
pub const NONCE_SIZE: usize = 12;
pub const SALT_SIZE: usize = 32;
pub const KEY_SIZE: usize = 32;

// Settings
pub const MINIMUM_FEE_KEY: &str = "minimum_fee";
pub const SETTINGS_FILE: &str = "settings.json";
pub const APP_DIR: &str = "kin";
pub const KEYSTORE_DIR: &str = "keystore";

// Environment variables
pub const ENV_STORAGE_ROOT: &str = "KIN_STORAGE_ROOT";
pub const ENV_STORAGE_NETWORK: &str = "KIN_STORAGE_NETWORK";
pub const ENV_SETTINGS_PATH: &str = "KIN_STORAGE_SETTINGS";
pub const ENV_KEYSTORE_DIR: &str = "KIN_KEYSTORE_DIR";
pub const ENV_KEYSTORE_PASSWORD: &str = "KIN_KEYSTORE_PASSWORD";

// Access lane
pub const ACCESS_LANE_THREAD_NAME: &str = "kin-storage-lane";
