//! Secure key store implementations
//!
//! The storage layer only depends on the `SecureKeyStore` interface. Platform
//! vaults (keychain, keystore) plug in behind it; this module ships a hardened
//! file store for desktop targets and an in-memory store for tests and
//! ephemeral sessions.
//!
//! SECURITY: the file store seals every secret with AES-256-GCM under a key
//! derived from a password with Argon2id. Files are named by a hash of the
//! account id to prevent enumeration, and created with 0600 permissions.

use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit};
use argon2::Argon2;
use rand_core::{OsRng, RngCore};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use zeroize::Zeroizing;

use crate::core::storage::files;
use crate::shared::constants::{ENV_KEYSTORE_PASSWORD, KEY_SIZE, NONCE_SIZE, SALT_SIZE};
use crate::shared::error::KeyStoreError;
use crate::shared::types::SecretBytes;
use crate::shared::utils::sha256_hex_prefix;

/// Mapping from account id to raw secret bytes
///
/// Implementations must be safe to call from several threads at once; the
/// storage layer does not add a lock around them.
pub trait SecureKeyStore: Send + Sync {
    /// Store secret bytes under `key`, replacing any previous value
    fn put(&self, key: &str, secret: &[u8]) -> Result<(), KeyStoreError>;

    /// Retrieve the secret stored under `key`
    fn get(&self, key: &str) -> Result<Option<SecretBytes>, KeyStoreError>;

    /// Delete the secret stored under `key`; deleting a missing key succeeds
    fn delete(&self, key: &str) -> Result<(), KeyStoreError>;
}

/// Argon2id cost parameters used to derive file encryption keys
#[derive(Debug, Clone, Copy)]
pub struct KdfParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 65536,
            iterations: 3,
            parallelism: 1,
        }
    }
}

/// Password-sealed file key store
pub struct EncryptedFileKeyStore {
    dir: PathBuf,
    password: Zeroizing<String>,
    params: KdfParams,
}

impl EncryptedFileKeyStore {
    pub fn new(dir: impl Into<PathBuf>, password: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            password: Zeroizing::new(password.into()),
            params: KdfParams::default(),
        }
    }

    /// Password from `KIN_KEYSTORE_PASSWORD`, or prompted on the terminal
    pub fn from_env(dir: impl Into<PathBuf>) -> Result<Self, KeyStoreError> {
        let password = match env::var(ENV_KEYSTORE_PASSWORD) {
            Ok(password) => password,
            Err(_) => rpassword::prompt_password("Enter password for the key store: ")
                .map_err(|e| KeyStoreError::password(format!("Password prompt failed: {}", e)))?,
        };
        Ok(Self::new(dir, password))
    }

    pub fn with_kdf_params(mut self, params: KdfParams) -> Self {
        self.params = params;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // Hash of the key for the filename to prevent key enumeration
    fn file_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.dat", sha256_hex_prefix(key.as_bytes(), 16)))
    }

    fn derive_key(&self, salt: &[u8]) -> Result<Zeroizing<[u8; KEY_SIZE]>, KeyStoreError> {
        let argon2 = Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            argon2::Params::new(
                self.params.memory_kib,
                self.params.iterations,
                self.params.parallelism,
                Some(KEY_SIZE),
            )?,
        );
        let mut key = Zeroizing::new([0u8; KEY_SIZE]);
        argon2.hash_password_into(self.password.as_bytes(), salt, &mut *key)?;
        Ok(key)
    }
}

impl SecureKeyStore for EncryptedFileKeyStore {
    fn put(&self, key: &str, secret: &[u8]) -> Result<(), KeyStoreError> {
        let mut salt = [0u8; SALT_SIZE];
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut salt);
        OsRng.fill_bytes(&mut nonce);

        let key_bytes = self.derive_key(&salt)?;
        let cipher = Aes256Gcm::new(GenericArray::from_slice(&*key_bytes));
        let ciphertext = cipher
            .encrypt(GenericArray::from_slice(&nonce), secret)
            .map_err(|e| KeyStoreError::crypto(format!("Encryption failed: {}", e)))?;

        // Layout: salt | nonce | ciphertext
        let mut sealed = Vec::with_capacity(SALT_SIZE + NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&salt);
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);

        files::write_atomic(&self.file_path(key), &sealed)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<SecretBytes>, KeyStoreError> {
        let sealed = match files::read_optional(&self.file_path(key))? {
            Some(sealed) => sealed,
            None => return Ok(None),
        };
        if sealed.len() < SALT_SIZE + NONCE_SIZE {
            return Err(KeyStoreError::crypto("Sealed secret too short"));
        }

        let (salt, rest) = sealed.split_at(SALT_SIZE);
        let (nonce, ciphertext) = rest.split_at(NONCE_SIZE);
        let key_bytes = self.derive_key(salt)?;
        let cipher = Aes256Gcm::new(GenericArray::from_slice(&*key_bytes));
        let plaintext = cipher
            .decrypt(GenericArray::from_slice(nonce), ciphertext)
            .map_err(|e| KeyStoreError::crypto(format!("Decryption failed: {}", e)))?;

        Ok(Some(Zeroizing::new(plaintext)))
    }

    fn delete(&self, key: &str) -> Result<(), KeyStoreError> {
        files::remove_file_if_exists(&self.file_path(key))?;
        Ok(())
    }
}

/// Process-local key store
#[derive(Default)]
pub struct InMemoryKeyStore {
    secrets: Mutex<HashMap<String, SecretBytes>>,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, SecretBytes>> {
        // A panic while holding the guard cannot leave a half-written entry
        self.secrets.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SecureKeyStore for InMemoryKeyStore {
    fn put(&self, key: &str, secret: &[u8]) -> Result<(), KeyStoreError> {
        self.lock().insert(key.to_string(), Zeroizing::new(secret.to_vec()));
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<SecretBytes>, KeyStoreError> {
        Ok(self.lock().get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<(), KeyStoreError> {
        self.lock().remove(key);
        Ok(())
    }
}
