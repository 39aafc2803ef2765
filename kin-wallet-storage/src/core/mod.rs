//! Core storage functionality
//!
//! This module contains the record codec, the file storage facade with its
//! access lane, and the account, transaction and invoice store logic.

pub mod accounts;
pub mod codec;
pub mod invoices;
pub mod storage;
pub mod transactions;
