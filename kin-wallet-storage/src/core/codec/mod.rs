//! Binary codec for persisted records
//!
//! Every file starts with a 4-byte magic and a format version, followed by a
//! `bincode` payload. Private keys never reach this layer: account metadata
//! only carries the public key.

use bincode::config::{self, Configuration};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::entities::{
    Account, AccountStatus, InvoiceList, InvoiceListId, KeyPair, PublicKey, TransactionSet,
};
use crate::shared::constants::{RECORD_FORMAT_VERSION, RECORD_HEADER_SIZE, RECORD_MAGIC};
use crate::shared::error::{StorageError, StorageResult};
use crate::shared::types::{Quarks, SequenceNumber};

fn bincode_config() -> Configuration {
    config::standard()
}

/// On-disk form of account metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub public_key: PublicKey,
    pub balance: Quarks,
    pub status: AccountStatus,
    pub sequence: Option<SequenceNumber>,
}

impl AccountRecord {
    /// Rebuild the account; a key from the key store wins over the stored public key
    pub fn into_account(self, stored_key: Option<KeyPair>) -> Account {
        let key = stored_key.unwrap_or_else(|| KeyPair::from_public_key(self.public_key));
        let mut account = Account::new(key).with_balance(self.balance);
        account.status = self.status;
        account.sequence = self.sequence;
        account
    }
}

impl From<&Account> for AccountRecord {
    fn from(account: &Account) -> Self {
        Self {
            public_key: *account.key().public_key(),
            balance: account.balance,
            status: account.status,
            // Only registered accounts carry a sequence
            sequence: account.registered_sequence(),
        }
    }
}

pub fn encode_account(account: &Account) -> StorageResult<Vec<u8>> {
    encode(&AccountRecord::from(account))
}

pub fn decode_account(path: &Path, bytes: &[u8]) -> StorageResult<AccountRecord> {
    decode(path, bytes)
}

pub fn encode_transactions(set: &TransactionSet) -> StorageResult<Vec<u8>> {
    encode(set)
}

pub fn decode_transactions(path: &Path, bytes: &[u8]) -> StorageResult<TransactionSet> {
    let set: TransactionSet = decode(path, bytes)?;
    if !set.tokens_consistent() {
        return Err(StorageError::corrupt(path, "paging tokens disagree with stored records"));
    }
    Ok(set)
}

pub fn encode_invoices(lists: &BTreeMap<InvoiceListId, InvoiceList>) -> StorageResult<Vec<u8>> {
    encode(lists)
}

pub fn decode_invoices(path: &Path, bytes: &[u8]) -> StorageResult<BTreeMap<InvoiceListId, InvoiceList>> {
    decode(path, bytes)
}

fn encode<T: Serialize>(value: &T) -> StorageResult<Vec<u8>> {
    let payload = bincode::serde::encode_to_vec(value, bincode_config())
        .map_err(|e| StorageError::malformatted(format!("Encoding failed: {}", e)))?;

    let mut out = Vec::with_capacity(RECORD_HEADER_SIZE + payload.len());
    out.extend_from_slice(RECORD_MAGIC);
    out.push(RECORD_FORMAT_VERSION);
    out.extend_from_slice(&payload);
    Ok(out)
}

fn decode<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> StorageResult<T> {
    if bytes.len() < RECORD_HEADER_SIZE || &bytes[..RECORD_MAGIC.len()] != RECORD_MAGIC {
        return Err(StorageError::corrupt(path, "missing record header"));
    }
    let version = bytes[RECORD_MAGIC.len()];
    if version != RECORD_FORMAT_VERSION {
        return Err(StorageError::corrupt(
            path,
            format!("unsupported format version {}", version),
        ));
    }

    let payload = &bytes[RECORD_HEADER_SIZE..];
    let (value, read) = bincode::serde::decode_from_slice::<T, _>(payload, bincode_config())
        .map_err(|e| StorageError::corrupt(path, format!("decoding failed: {}", e)))?;
    if read != payload.len() {
        return Err(StorageError::corrupt(path, "trailing bytes after record"));
    }
    Ok(value)
}
