//! Transaction store logic
//!
//! History is always rewritten whole: every operation reads the stored list,
//! builds the new list in memory and writes a fresh `TransactionSet`, whose
//! paging tokens are recomputed from its items.

use std::collections::HashSet;

use crate::core::codec;
use crate::core::storage::files;
use crate::core::storage::paths::PathResolver;
use crate::domain::entities::{AccountId, TransactionHash, TransactionRecord, TransactionSet};
use crate::shared::error::StorageResult;

/// `incoming` first, then every stored record whose hash is not in `incoming`
pub fn merge_new(stored: Vec<TransactionRecord>, incoming: Vec<TransactionRecord>) -> Vec<TransactionRecord> {
    let hashes = hashes_of(&incoming);
    let mut merged = incoming;
    merged.extend(stored.into_iter().filter(|record| !hashes.contains(&record.transaction_hash)));
    merged
}

/// Stored records not in `incoming`, then `incoming`
pub fn merge_old(stored: Vec<TransactionRecord>, incoming: Vec<TransactionRecord>) -> Vec<TransactionRecord> {
    let hashes = hashes_of(&incoming);
    let mut merged: Vec<_> = stored
        .into_iter()
        .filter(|record| !hashes.contains(&record.transaction_hash))
        .collect();
    merged.extend(incoming);
    merged
}

fn hashes_of(records: &[TransactionRecord]) -> HashSet<TransactionHash> {
    records.iter().map(|record| record.transaction_hash).collect()
}

pub fn store(paths: &PathResolver, id: &AccountId, items: Vec<TransactionRecord>) -> StorageResult<TransactionSet> {
    let set = TransactionSet::new(items);
    let bytes = codec::encode_transactions(&set)?;
    files::write_atomic(&paths.transactions_file(id), &bytes)?;
    log::debug!("Stored {} transactions for {}", set.len(), id);
    Ok(set)
}

pub fn load(paths: &PathResolver, id: &AccountId) -> StorageResult<Option<TransactionSet>> {
    let path = paths.transactions_file(id);
    match files::read_optional(&path)? {
        Some(bytes) => codec::decode_transactions(&path, &bytes).map(Some),
        None => Ok(None),
    }
}

fn load_items(paths: &PathResolver, id: &AccountId) -> StorageResult<Vec<TransactionRecord>> {
    Ok(load(paths, id)?.map(TransactionSet::into_items).unwrap_or_default())
}

pub fn insert(paths: &PathResolver, id: &AccountId, transaction: TransactionRecord) -> StorageResult<TransactionSet> {
    let mut items = load_items(paths, id)?;
    items.push(transaction);
    store(paths, id, items)
}

pub fn upsert_new(paths: &PathResolver, id: &AccountId, incoming: Vec<TransactionRecord>) -> StorageResult<TransactionSet> {
    let stored = load_items(paths, id)?;
    store(paths, id, merge_new(stored, incoming))
}

pub fn upsert_old(paths: &PathResolver, id: &AccountId, incoming: Vec<TransactionRecord>) -> StorageResult<TransactionSet> {
    let stored = load_items(paths, id)?;
    store(paths, id, merge_old(stored, incoming))
}
