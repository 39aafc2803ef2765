//! Transaction history entities
//!
//! Records keep the caller's order. Only historical records, which were
//! observed on the ledger, carry a paging token.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::constants::TRANSACTION_HASH_SIZE;

/// Content identifier of a transaction, used for deduplication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionHash([u8; TRANSACTION_HASH_SIZE]);

impl TransactionHash {
    pub fn from_bytes(bytes: [u8; TRANSACTION_HASH_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; TRANSACTION_HASH_SIZE] {
        &self.0
    }
}

impl fmt::Display for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Opaque, comparable ordering token assigned by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PagingToken(String);

impl PagingToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PagingToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordType {
    /// Submitted locally, no answer from the ledger yet
    InFlight,
    /// Accepted by the ledger, not yet seen in history
    Acknowledged,
    /// Observed in ledger history
    Historical { paging_token: PagingToken },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_hash: TransactionHash,
    pub record_type: RecordType,
    pub envelope: Vec<u8>,
    pub result: Option<Vec<u8>>,
    pub timestamp: i64,
}

impl TransactionRecord {
    pub fn historical(
        transaction_hash: TransactionHash,
        paging_token: PagingToken,
        envelope: Vec<u8>,
        timestamp: i64,
    ) -> Self {
        Self {
            transaction_hash,
            record_type: RecordType::Historical { paging_token },
            envelope,
            result: None,
            timestamp,
        }
    }

    pub fn acknowledged(transaction_hash: TransactionHash, envelope: Vec<u8>, timestamp: i64) -> Self {
        Self {
            transaction_hash,
            record_type: RecordType::Acknowledged,
            envelope,
            result: None,
            timestamp,
        }
    }

    pub fn in_flight(transaction_hash: TransactionHash, envelope: Vec<u8>, timestamp: i64) -> Self {
        Self {
            transaction_hash,
            record_type: RecordType::InFlight,
            envelope,
            result: None,
            timestamp,
        }
    }

    pub fn with_result(mut self, result: Vec<u8>) -> Self {
        self.result = Some(result);
        self
    }

    pub fn paging_token(&self) -> Option<&PagingToken> {
        match &self.record_type {
            RecordType::Historical { paging_token } => Some(paging_token),
            RecordType::InFlight | RecordType::Acknowledged => None,
        }
    }
}

/// Per-account transaction history
///
/// The head and tail tokens are always derived from `items`; there is no way
/// to build a set with tokens that disagree with its records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSet {
    items: Vec<TransactionRecord>,
    head_paging_token: Option<PagingToken>,
    tail_paging_token: Option<PagingToken>,
}

impl TransactionSet {
    pub fn new(items: Vec<TransactionRecord>) -> Self {
        let head_paging_token = items.iter().find_map(|item| item.paging_token()).cloned();
        let tail_paging_token = items.iter().rev().find_map(|item| item.paging_token()).cloned();
        Self {
            items,
            head_paging_token,
            tail_paging_token,
        }
    }

    pub fn items(&self) -> &[TransactionRecord] {
        &self.items
    }

    pub fn into_items(self) -> Vec<TransactionRecord> {
        self.items
    }

    pub fn head_paging_token(&self) -> Option<&PagingToken> {
        self.head_paging_token.as_ref()
    }

    pub fn tail_paging_token(&self) -> Option<&PagingToken> {
        self.tail_paging_token.as_ref()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True when the stored tokens match a fresh scan of the items
    pub(crate) fn tokens_consistent(&self) -> bool {
        let rescanned = Self::new(self.items.clone());
        rescanned.head_paging_token == self.head_paging_token
            && rescanned.tail_paging_token == self.tail_paging_token
    }
}
