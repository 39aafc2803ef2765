//! Account entity and related value objects
//!
//! An account is identified by the base58 encoding of its ed25519 public key.
//! The private half of the key pair is optional: accounts fetched from the
//! network only carry the public key.

use ed25519_dalek::SigningKey;
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

use crate::shared::constants::{PRIVATE_KEY_SIZE, PUBLIC_KEY_SIZE};
use crate::shared::error::{KeyStoreError, StorageError};
use crate::shared::types::{Quarks, SequenceNumber};

/// Public account identifier, derived from the public key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Self(bs58::encode(public_key.as_bytes()).into_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recover the public key this id was derived from
    pub fn public_key(&self) -> Result<PublicKey, StorageError> {
        let bytes = bs58::decode(&self.0)
            .into_vec()
            .map_err(|e| StorageError::malformatted(format!("Invalid account id {}: {}", self.0, e)))?;
        PublicKey::from_slice(&bytes)
            .ok_or_else(|| StorageError::malformatted(format!("Invalid account id length: {}", self.0)))
    }
}

impl FromStr for AccountId {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = Self(s.to_string());
        id.public_key()?;
        Ok(id)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ed25519 public key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey([u8; PUBLIC_KEY_SIZE]);

impl PublicKey {
    pub fn from_bytes(bytes: [u8; PUBLIC_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; PUBLIC_KEY_SIZE] = bytes.try_into().ok()?;
        Some(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.0
    }
}

/// ed25519 private key seed, zeroized on drop
/// Debug output never includes the key bytes
#[derive(Clone)]
pub struct PrivateKey(Zeroizing<[u8; PRIVATE_KEY_SIZE]>);

impl PrivateKey {
    pub fn from_bytes(bytes: [u8; PRIVATE_KEY_SIZE]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Build a private key from raw secret bytes held by a key store
    pub fn from_secret(key: &str, secret: &[u8]) -> Result<Self, KeyStoreError> {
        let bytes: [u8; PRIVATE_KEY_SIZE] = secret.try_into().map_err(|_| {
            KeyStoreError::invalid_secret(
                key,
                format!("expected {} bytes, found {}", PRIVATE_KEY_SIZE, secret.len()),
            )
        })?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; PRIVATE_KEY_SIZE] {
        &self.0
    }

    fn public_key(&self) -> PublicKey {
        let signing_key = SigningKey::from_bytes(&self.0);
        PublicKey(signing_key.verifying_key().to_bytes())
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.0[..] == other.0[..]
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// Key pair; the private half is absent for accounts only known by address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    public_key: PublicKey,
    private_key: Option<PrivateKey>,
}

impl KeyPair {
    /// Generate a fresh random key pair
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self::from_private_key(PrivateKey::from_bytes(signing_key.to_bytes()))
    }

    pub fn from_private_key(private_key: PrivateKey) -> Self {
        Self {
            public_key: private_key.public_key(),
            private_key: Some(private_key),
        }
    }

    pub fn from_public_key(public_key: PublicKey) -> Self {
        Self {
            public_key,
            private_key: None,
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn private_key(&self) -> Option<&PrivateKey> {
        self.private_key.as_ref()
    }

    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    pub fn account_id(&self) -> AccountId {
        AccountId::from_public_key(&self.public_key)
    }

    /// Same key pair without the private half
    pub fn public_only(&self) -> Self {
        Self::from_public_key(self.public_key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountStatus {
    Unregistered,
    Registered,
}

/// Core account entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: AccountId,
    key: KeyPair,
    pub balance: Quarks,
    pub status: AccountStatus,
    pub sequence: Option<SequenceNumber>,
}

impl Account {
    /// New unregistered account with a zero balance
    pub fn new(key: KeyPair) -> Self {
        Self {
            id: key.account_id(),
            key,
            balance: 0,
            status: AccountStatus::Unregistered,
            sequence: None,
        }
    }

    /// Account as known by the ledger
    pub fn registered(key: KeyPair, balance: Quarks, sequence: SequenceNumber) -> Self {
        Self {
            id: key.account_id(),
            key,
            balance,
            status: AccountStatus::Registered,
            sequence: Some(sequence),
        }
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn key(&self) -> &KeyPair {
        &self.key
    }

    pub fn is_registered(&self) -> bool {
        self.status == AccountStatus::Registered
    }

    /// Sequence number of a registered account, if it can be advanced or debited
    pub fn registered_sequence(&self) -> Option<SequenceNumber> {
        match self.status {
            AccountStatus::Registered => self.sequence,
            AccountStatus::Unregistered => None,
        }
    }

    /// Copy of this account carrying only the public key
    pub fn public_only(&self) -> Self {
        self.clone().with_key(self.key.public_only())
    }

    /// Replace the key pair; the id is unchanged when the public key is the same
    pub fn with_key(mut self, key: KeyPair) -> Self {
        self.id = key.account_id();
        self.key = key;
        self
    }

    pub fn with_balance(mut self, balance: Quarks) -> Self {
        self.balance = balance;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_key_pair_derives_public_key() {
        let key = KeyPair::generate();
        let private_key = key.private_key().expect("generated key has private half").clone();
        let rebuilt = KeyPair::from_private_key(private_key);

        assert!(key.has_private_key());
        assert_eq!(rebuilt.public_key(), key.public_key());
        assert_eq!(rebuilt.account_id(), key.account_id());
    }

    #[test]
    fn test_account_id_round_trips_public_key() {
        let key = KeyPair::generate();
        let id = key.account_id();
        let parsed: AccountId = id.as_str().parse().expect("Failed to parse account id");

        assert_eq!(parsed, id);
        assert_eq!(parsed.public_key().expect("valid id"), *key.public_key());
    }

    #[test]
    fn test_invalid_account_id_is_rejected() {
        assert!("not-base58-0OIl".parse::<AccountId>().is_err());
        assert!("3mJr7AoUXx2Wqd".parse::<AccountId>().is_err());
    }

    #[test]
    fn test_private_key_debug_is_redacted() {
        let key = PrivateKey::from_bytes([7u8; PRIVATE_KEY_SIZE]);
        assert_eq!(format!("{:?}", key), "PrivateKey(<redacted>)");
    }

    #[test]
    fn test_private_key_from_secret_checks_length() {
        assert!(PrivateKey::from_secret("acc", &[1u8; PRIVATE_KEY_SIZE]).is_ok());
        let error = PrivateKey::from_secret("acc", &[1u8; 5]).unwrap_err();
        assert!(matches!(error, KeyStoreError::InvalidSecret { .. }));
    }

    #[test]
    fn test_registered_sequence_requires_registration() {
        let key = KeyPair::generate();
        let mut account = Account::registered(key.clone(), 100, 7);
        assert_eq!(account.registered_sequence(), Some(7));

        account.status = AccountStatus::Unregistered;
        assert_eq!(account.registered_sequence(), None);

        let mut missing_sequence = Account::registered(key, 100, 7);
        missing_sequence.sequence = None;
        assert_eq!(missing_sequence.registered_sequence(), None);
    }

    #[test]
    fn test_public_only_keeps_id() {
        let account = Account::new(KeyPair::generate());
        let public = account.public_only();

        assert_eq!(public.id(), account.id());
        assert!(!public.key().has_private_key());
    }
}
