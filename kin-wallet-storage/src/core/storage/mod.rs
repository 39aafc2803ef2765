//! File-backed wallet storage
//!
//! `KinFileStorage` is the entry point of the crate. It owns a per-instance
//! access lane; every file read and write of the instance runs on that lane,
//! in submission order. Mutations perform their complete read-merge-write
//! sequence inside a single lane job, with the key store mutated before the
//! files. Handles are cheap to clone and keep the instance alive for as long
//! as any operation they issued is outstanding.

pub mod files;
pub mod lane;
pub mod paths;

use std::path::Path;
use std::sync::Arc;

use crate::core::invoices::InvoiceLists;
use crate::core::{accounts, invoices, transactions};
use crate::domain::entities::{Account, AccountId, InvoiceList, TransactionRecord, TransactionSet};
use crate::infrastructure::platform::SecureKeyStore;
use crate::infrastructure::settings::SettingsStore;
use crate::shared::config::StorageConfig;
use crate::shared::error::StorageResult;
use crate::shared::types::{Network, Quarks};

use lane::AccessLane;
use paths::PathResolver;

#[derive(Clone)]
pub struct KinFileStorage {
    inner: Arc<Inner>,
}

struct Inner {
    network: Network,
    paths: Arc<PathResolver>,
    key_store: Arc<dyn SecureKeyStore>,
    settings: Arc<dyn SettingsStore>,
    lane: AccessLane,
}

impl KinFileStorage {
    pub fn new(
        root: impl AsRef<Path>,
        network: Network,
        key_store: Arc<dyn SecureKeyStore>,
        settings: Arc<dyn SettingsStore>,
    ) -> StorageResult<Self> {
        let paths = PathResolver::new(root.as_ref(), &network);
        let lane = AccessLane::spawn()?;
        log::info!(
            "Opened storage for {} at {}",
            network.name(),
            paths.accounts_dir().display()
        );

        Ok(Self {
            inner: Arc::new(Inner {
                network,
                paths: Arc::new(paths),
                key_store,
                settings,
                lane,
            }),
        })
    }

    pub fn open(
        config: &StorageConfig,
        key_store: Arc<dyn SecureKeyStore>,
        settings: Arc<dyn SettingsStore>,
    ) -> StorageResult<Self> {
        Self::new(&config.root_dir, config.network.clone(), key_store, settings)
    }

    pub fn network(&self) -> &Network {
        &self.inner.network
    }

    pub fn paths(&self) -> &PathResolver {
        &self.inner.paths
    }

    async fn on_lane<F, T>(&self, op: F) -> StorageResult<T>
    where
        F: FnOnce(&PathResolver, &dyn SecureKeyStore) -> StorageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let paths = self.inner.paths.clone();
        let key_store = self.inner.key_store.clone();
        self.inner.lane.run(move || op(&paths, key_store.as_ref())).await
    }

    // Accounts

    pub async fn add_account(&self, account: Account) -> StorageResult<Account> {
        log::debug!("add_account {}", account.id());
        self.on_lane(move |paths, key_store| accounts::add(paths, key_store, account))
            .await
    }

    /// Key store read runs alongside the file read; the two are merged afterwards
    pub async fn get_account(&self, id: &AccountId) -> StorageResult<Option<Account>> {
        let key_store = self.inner.key_store.clone();
        let key_id = id.clone();
        let key_read =
            tokio::task::spawn_blocking(move || accounts::read_stored_key(key_store.as_ref(), &key_id));

        let file_id = id.clone();
        let record_read = self.on_lane(move |paths, _| accounts::read_record(paths, &file_id));

        let (stored_key, record) = tokio::join!(key_read, record_read);
        let stored_key = stored_key??;
        Ok(accounts::merge(record?, stored_key))
    }

    pub async fn update_account(&self, account: Account) -> StorageResult<Account> {
        log::debug!("update_account {}", account.id());
        self.on_lane(move |paths, key_store| accounts::update(paths, key_store, account))
            .await
    }

    pub async fn remove_account(&self, id: &AccountId) -> StorageResult<()> {
        log::debug!("remove_account {}", id);
        let id = id.clone();
        self.on_lane(move |paths, key_store| accounts::remove(paths, key_store, &id))
            .await
    }

    pub async fn advance_sequence(&self, id: &AccountId) -> StorageResult<Account> {
        let id = id.clone();
        self.on_lane(move |paths, key_store| accounts::advance_sequence(paths, key_store, &id))
            .await
    }

    pub async fn deduct_from_account_balance(&self, id: &AccountId, amount: Quarks) -> StorageResult<Account> {
        let id = id.clone();
        self.on_lane(move |paths, key_store| accounts::deduct_balance(paths, key_store, &id, amount))
            .await
    }

    pub async fn get_all_account_ids(&self) -> StorageResult<Vec<AccountId>> {
        self.on_lane(|paths, _| accounts::all_ids(paths)).await
    }

    // Transactions

    pub async fn store_transactions(&self, id: &AccountId, items: Vec<TransactionRecord>) -> StorageResult<TransactionSet> {
        let id = id.clone();
        self.on_lane(move |paths, _| transactions::store(paths, &id, items)).await
    }

    pub async fn get_stored_transactions(&self, id: &AccountId) -> StorageResult<Option<TransactionSet>> {
        let id = id.clone();
        self.on_lane(move |paths, _| transactions::load(paths, &id)).await
    }

    pub async fn insert_new_transaction(
        &self,
        id: &AccountId,
        transaction: TransactionRecord,
    ) -> StorageResult<TransactionSet> {
        let id = id.clone();
        self.on_lane(move |paths, _| transactions::insert(paths, &id, transaction))
            .await
    }

    pub async fn upsert_new_transactions(
        &self,
        id: &AccountId,
        items: Vec<TransactionRecord>,
    ) -> StorageResult<TransactionSet> {
        let id = id.clone();
        self.on_lane(move |paths, _| transactions::upsert_new(paths, &id, items))
            .await
    }

    pub async fn upsert_old_transactions(
        &self,
        id: &AccountId,
        items: Vec<TransactionRecord>,
    ) -> StorageResult<TransactionSet> {
        let id = id.clone();
        self.on_lane(move |paths, _| transactions::upsert_old(paths, &id, items))
            .await
    }

    // Invoices

    pub async fn add_invoice_lists(&self, id: &AccountId, lists: Vec<InvoiceList>) -> StorageResult<InvoiceLists> {
        let id = id.clone();
        self.on_lane(move |paths, _| invoices::add(paths, &id, lists)).await
    }

    pub async fn get_invoice_lists(&self, id: &AccountId) -> StorageResult<InvoiceLists> {
        let id = id.clone();
        self.on_lane(move |paths, _| invoices::load(paths, &id)).await
    }

    // Settings

    pub async fn get_minimum_fee(&self) -> StorageResult<Option<Quarks>> {
        let settings = self.inner.settings.clone();
        self.on_lane(move |_, _| settings.minimum_fee()).await
    }

    pub async fn set_minimum_fee(&self, fee: Quarks) -> StorageResult<()> {
        let settings = self.inner.settings.clone();
        self.on_lane(move |_, _| settings.set_minimum_fee(fee)).await
    }

    /// Clear the minimum fee and every file under `<root>/kin_storage`
    ///
    /// Secrets in the key store are not touched.
    pub async fn clear_storage(&self) -> StorageResult<()> {
        let settings = self.inner.settings.clone();
        self.on_lane(move |paths, _| {
            // The file tree is wiped even when the settings cannot be cleared
            let removed = files::remove_dir_if_exists(paths.storage_dir());
            let cleared = settings.clear();
            removed?;
            cleared?;
            log::info!("Cleared storage at {}", paths.storage_dir().display());
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::accounts::fixtures::FailingKeyStore;
    use crate::domain::entities::invoice::fixtures::invoice_list;
    use crate::domain::entities::transaction::fixtures::{acknowledged, hash, historical};
    use crate::domain::entities::{AccountStatus, KeyPair, PagingToken};
    use crate::infrastructure::platform::InMemoryKeyStore;
    use crate::infrastructure::settings::{FileSettingsStore, InMemorySettingsStore};
    use crate::shared::constants::ACCOUNT_INFO_FILE;
    use crate::shared::error::{KeyStoreError, StorageError};
    use tempfile::TempDir;

    fn setup() -> (TempDir, Arc<InMemoryKeyStore>, KinFileStorage) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let key_store = Arc::new(InMemoryKeyStore::new());
        let storage = KinFileStorage::new(
            dir.path(),
            Network::Testnet,
            key_store.clone(),
            Arc::new(InMemorySettingsStore::new()),
        )
        .expect("Failed to open storage");
        (dir, key_store, storage)
    }

    #[tokio::test]
    async fn test_account_round_trip() {
        let (_dir, _, storage) = setup();
        let account = Account::registered(KeyPair::generate(), 1_000, 5);

        let added = storage.add_account(account.clone()).await.expect("Failed to add account");
        assert_eq!(added, account);
        assert_eq!(storage.get_account(account.id()).await.unwrap(), Some(account));
    }

    #[tokio::test]
    async fn test_private_key_survives_public_only_update() {
        let (_dir, _, storage) = setup();
        let full = Account::new(KeyPair::generate());
        storage.add_account(full.clone()).await.unwrap();

        let from_network = Account::registered(full.key().public_only(), 70, 12);
        storage.update_account(from_network).await.unwrap();

        let stored = storage.get_account(full.id()).await.unwrap().expect("account stored");
        assert_eq!(stored.key(), full.key());
        assert_eq!(stored.status, AccountStatus::Registered);
        assert_eq!(stored.balance, 70);
    }

    #[tokio::test]
    async fn test_account_survives_reopen() {
        let (dir, key_store, storage) = setup();
        let account = Account::registered(KeyPair::generate(), 3, 3);
        storage.add_account(account.clone()).await.unwrap();
        drop(storage);

        let reopened = KinFileStorage::new(
            dir.path(),
            Network::Testnet,
            key_store,
            Arc::new(InMemorySettingsStore::new()),
        )
        .unwrap();
        assert_eq!(reopened.get_account(account.id()).await.unwrap(), Some(account));
    }

    #[tokio::test]
    async fn test_networks_are_isolated() {
        let (dir, key_store, storage) = setup();
        let mainnet = KinFileStorage::new(
            dir.path(),
            Network::Mainnet,
            Arc::new(InMemoryKeyStore::new()),
            Arc::new(InMemorySettingsStore::new()),
        )
        .unwrap();

        let account = Account::registered(KeyPair::generate(), 3, 3).public_only();
        storage.add_account(account.clone()).await.unwrap();

        assert!(key_store.is_empty());
        assert_eq!(mainnet.get_account(account.id()).await.unwrap(), None);
        assert!(mainnet.get_all_account_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sequence_and_balance_updates() {
        let (_dir, _, storage) = setup();
        let account = Account::registered(KeyPair::generate(), 100, 7);
        storage.add_account(account.clone()).await.unwrap();

        let advanced = storage.advance_sequence(account.id()).await.unwrap();
        assert_eq!(advanced.sequence, Some(8));

        let debited = storage.deduct_from_account_balance(account.id(), 150).await.unwrap();
        assert_eq!(debited.balance, -50);
        assert!(debited.key().has_private_key());

        let missing = KeyPair::generate().account_id();
        assert!(matches!(
            storage.advance_sequence(&missing).await,
            Err(StorageError::MissingAccount(id)) if id == missing
        ));
    }

    #[tokio::test]
    async fn test_remove_account() {
        let (_dir, key_store, storage) = setup();
        let account = Account::registered(KeyPair::generate(), 1, 1);
        storage.add_account(account.clone()).await.unwrap();
        storage
            .store_transactions(account.id(), vec![acknowledged(1)])
            .await
            .unwrap();

        storage.remove_account(account.id()).await.expect("Failed to remove account");

        assert!(key_store.is_empty());
        assert_eq!(storage.get_account(account.id()).await.unwrap(), None);
        assert_eq!(storage.get_stored_transactions(account.id()).await.unwrap(), None);

        let never_stored = KeyPair::generate().account_id();
        storage
            .remove_account(&never_stored)
            .await
            .expect("Removing an unknown account should succeed");
    }

    #[tokio::test]
    async fn test_concurrent_adds_of_distinct_accounts() {
        let (_dir, _, storage) = setup();
        let accounts: Vec<_> = (0..32)
            .map(|i| Account::registered(KeyPair::generate(), i, i as u64))
            .collect();

        let handles: Vec<_> = accounts
            .iter()
            .cloned()
            .map(|account| {
                let storage = storage.clone();
                tokio::spawn(async move { storage.add_account(account).await })
            })
            .collect();
        for handle in handles {
            handle.await.expect("Task panicked").expect("Failed to add account");
        }

        let mut ids = storage.get_all_account_ids().await.unwrap();
        ids.sort();
        let mut expected: Vec<_> = accounts.iter().map(|a| a.id().clone()).collect();
        expected.sort();
        assert_eq!(ids, expected);

        for account in &accounts {
            assert_eq!(storage.get_account(account.id()).await.unwrap().as_ref(), Some(account));
        }
    }

    #[tokio::test]
    async fn test_concurrent_updates_of_one_account_are_not_lost() {
        let (_dir, _, storage) = setup();
        let account = Account::registered(KeyPair::generate(), 1_000, 0);
        storage.add_account(account.clone()).await.unwrap();

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let storage = storage.clone();
                let id = account.id().clone();
                tokio::spawn(async move {
                    storage.deduct_from_account_balance(&id, 10).await?;
                    storage.advance_sequence(&id).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.expect("Task panicked").expect("Failed to update account");
        }

        let stored = storage.get_account(account.id()).await.unwrap().unwrap();
        assert_eq!(stored.balance, 800);
        assert_eq!(stored.sequence, Some(20));
    }

    #[tokio::test]
    async fn test_concurrent_writes_never_mix_bytes() {
        let (_dir, _, storage) = setup();
        let key = KeyPair::generate();
        let candidates: Vec<_> = (0..16)
            .map(|i| Account::registered(key.clone(), i * 1_000_000, i as u64))
            .collect();

        let handles: Vec<_> = candidates
            .iter()
            .cloned()
            .map(|account| {
                let storage = storage.clone();
                tokio::spawn(async move { storage.add_account(account).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = storage.get_account(&key.account_id()).await.unwrap().unwrap();
        assert!(candidates.contains(&stored));
    }

    #[tokio::test]
    async fn test_listing_skips_corrupt_entries() {
        let (_dir, _, storage) = setup();
        let account = Account::new(KeyPair::generate());
        storage.add_account(account.clone()).await.unwrap();

        let bogus = storage.paths().accounts_dir().join("0000").join(ACCOUNT_INFO_FILE);
        files::write_atomic(&bogus, b"not a record").unwrap();

        assert_eq!(storage.get_all_account_ids().await.unwrap(), vec![account.id().clone()]);
    }

    #[tokio::test]
    async fn test_corrupt_account_file_is_reported_on_get() {
        let (_dir, _, storage) = setup();
        let account = Account::new(KeyPair::generate()).public_only();
        storage.add_account(account.clone()).await.unwrap();
        files::write_atomic(&storage.paths().account_info_file(account.id()), b"KINS\x09").unwrap();

        assert!(matches!(
            storage.get_account(account.id()).await,
            Err(StorageError::CorruptRecord { .. })
        ));
    }

    #[tokio::test]
    async fn test_key_store_errors_reach_the_caller() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let storage = KinFileStorage::new(
            dir.path(),
            Network::Testnet,
            Arc::new(FailingKeyStore),
            Arc::new(InMemorySettingsStore::new()),
        )
        .unwrap();
        let account = Account::new(KeyPair::generate());

        let add = storage.add_account(account.clone()).await;
        assert!(matches!(add, Err(StorageError::KeyStore(KeyStoreError::Crypto(_)))));

        let get = storage.get_account(account.id()).await;
        assert!(matches!(get, Err(StorageError::KeyStore(_))));
    }

    #[tokio::test]
    async fn test_transaction_operations() {
        let (_dir, _, storage) = setup();
        let id = KeyPair::generate().account_id();

        assert_eq!(storage.get_stored_transactions(&id).await.unwrap(), None);

        let stored = storage
            .store_transactions(&id, vec![historical(1, "h1"), acknowledged(2), historical(3, "h2")])
            .await
            .expect("Failed to store transactions");
        assert_eq!(stored.head_paging_token(), Some(&PagingToken::new("h1")));
        assert_eq!(stored.tail_paging_token(), Some(&PagingToken::new("h2")));

        storage.insert_new_transaction(&id, acknowledged(4)).await.unwrap();
        storage
            .upsert_new_transactions(&id, vec![historical(0, "h0"), historical(2, "h1b")])
            .await
            .unwrap();
        let once = storage
            .upsert_old_transactions(&id, vec![historical(5, "h3")])
            .await
            .unwrap();
        let twice = storage
            .upsert_old_transactions(&id, vec![historical(5, "h3")])
            .await
            .unwrap();
        assert_eq!(once, twice);

        let final_hashes: Vec<_> = twice.items().iter().map(|r| r.transaction_hash).collect();
        assert_eq!(final_hashes, vec![hash(0), hash(2), hash(1), hash(3), hash(4), hash(5)]);
        assert_eq!(twice.head_paging_token(), Some(&PagingToken::new("h0")));
        assert_eq!(twice.tail_paging_token(), Some(&PagingToken::new("h3")));
        assert_eq!(storage.get_stored_transactions(&id).await.unwrap(), Some(twice));
    }

    #[tokio::test]
    async fn test_invoice_lists() {
        let (_dir, _, storage) = setup();
        let id = KeyPair::generate().account_id();

        assert!(storage.get_invoice_lists(&id).await.unwrap().is_empty());
        let list = invoice_list("coffee", 3);
        let stored = storage.add_invoice_lists(&id, vec![list.clone()]).await.unwrap();

        assert_eq!(stored.get(list.id()), Some(&list));
        assert_eq!(storage.get_invoice_lists(&id).await.unwrap(), stored);
    }

    #[tokio::test]
    async fn test_minimum_fee_and_clear() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let key_store = Arc::new(InMemoryKeyStore::new());
        let settings = Arc::new(FileSettingsStore::new(dir.path().join("settings.json")));
        let storage = KinFileStorage::new(dir.path(), Network::Testnet, key_store.clone(), settings).unwrap();

        assert_eq!(storage.get_minimum_fee().await.unwrap(), None);
        storage.set_minimum_fee(100).await.expect("Failed to set fee");
        assert_eq!(storage.get_minimum_fee().await.unwrap(), Some(100));

        let account = Account::registered(KeyPair::generate(), 5, 5);
        storage.add_account(account.clone()).await.unwrap();

        storage.clear_storage().await.expect("Failed to clear storage");

        assert_eq!(storage.get_minimum_fee().await.unwrap(), None);
        assert!(!storage.paths().storage_dir().exists());
        assert!(storage.get_all_account_ids().await.unwrap().is_empty());

        // Only the key store entry is left, so the account comes back unregistered
        assert_eq!(key_store.len(), 1);
        let leftover = storage.get_account(account.id()).await.unwrap().unwrap();
        assert_eq!(leftover.status, AccountStatus::Unregistered);

        storage.clear_storage().await.expect("Clearing twice should succeed");
    }

    #[tokio::test]
    async fn test_clear_with_unreadable_settings_still_wipes_accounts() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let settings_path = dir.path().join("settings.json");
        std::fs::write(&settings_path, b"{not json").unwrap();
        let settings = Arc::new(FileSettingsStore::new(&settings_path));
        let storage = KinFileStorage::new(
            dir.path(),
            Network::Testnet,
            Arc::new(InMemoryKeyStore::new()),
            settings,
        )
        .unwrap();
        storage
            .add_account(Account::registered(KeyPair::generate(), 5, 5))
            .await
            .unwrap();

        storage.clear_storage().await.expect("Failed to clear storage");

        assert!(!storage.paths().storage_dir().exists());
        assert!(storage.get_all_account_ids().await.unwrap().is_empty());
        assert_eq!(storage.get_minimum_fee().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_wipes_accounts_when_settings_fail() {
        let (_dir, _, storage) = setup();
        let failing = KinFileStorage {
            inner: Arc::new(Inner {
                network: Network::Testnet,
                paths: storage.inner.paths.clone(),
                key_store: Arc::new(InMemoryKeyStore::new()),
                settings: Arc::new(FailingSettingsStore),
                lane: AccessLane::spawn().unwrap(),
            }),
        };
        failing
            .add_account(Account::new(KeyPair::generate()))
            .await
            .unwrap();

        assert!(matches!(failing.clear_storage().await, Err(StorageError::Io(_))));
        assert!(!failing.paths().storage_dir().exists());
    }

    struct FailingSettingsStore;

    impl SettingsStore for FailingSettingsStore {
        fn minimum_fee(&self) -> StorageResult<Option<Quarks>> {
            Ok(None)
        }

        fn set_minimum_fee(&self, _fee: Quarks) -> StorageResult<()> {
            Ok(())
        }

        fn clear(&self) -> StorageResult<()> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only settings").into())
        }
    }
}
