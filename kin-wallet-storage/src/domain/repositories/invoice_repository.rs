//! Invoice repository

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::core::storage::KinFileStorage;
use crate::domain::entities::{AccountId, InvoiceList, InvoiceListId};
use crate::shared::error::StorageResult;

#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Insert or replace invoice lists by id and return every list of the account
    async fn add_invoice_lists(
        &self,
        id: &AccountId,
        lists: Vec<InvoiceList>,
    ) -> StorageResult<BTreeMap<InvoiceListId, InvoiceList>>;

    async fn get_invoice_lists(&self, id: &AccountId) -> StorageResult<BTreeMap<InvoiceListId, InvoiceList>>;
}

#[async_trait]
impl InvoiceRepository for KinFileStorage {
    async fn add_invoice_lists(
        &self,
        id: &AccountId,
        lists: Vec<InvoiceList>,
    ) -> StorageResult<BTreeMap<InvoiceListId, InvoiceList>> {
        KinFileStorage::add_invoice_lists(self, id, lists).await
    }
    async fn get_invoice_lists(&self, id: &AccountId) -> StorageResult<BTreeMap<InvoiceListId, InvoiceList>> {
        KinFileStorage::get_invoice_lists(self, id).await
    }
}
