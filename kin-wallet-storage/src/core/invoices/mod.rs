//! Invoice lists kept next to an account's transactions

use std::collections::BTreeMap;

use crate::core::codec;
use crate::core::storage::files;
use crate::core::storage::paths::PathResolver;
use crate::domain::entities::{AccountId, InvoiceList, InvoiceListId};
use crate::shared::error::StorageResult;

pub type InvoiceLists = BTreeMap<InvoiceListId, InvoiceList>;

/// Stored lists of the account; empty when none were added
pub fn load(paths: &PathResolver, id: &AccountId) -> StorageResult<InvoiceLists> {
    let path = paths.invoices_file(id);
    match files::read_optional(&path)? {
        Some(bytes) => codec::decode_invoices(&path, &bytes),
        None => Ok(InvoiceLists::new()),
    }
}

pub fn add(paths: &PathResolver, id: &AccountId, lists: Vec<InvoiceList>) -> StorageResult<InvoiceLists> {
    let mut stored = load(paths, id)?;
    for list in lists {
        stored.insert(*list.id(), list);
    }

    let bytes = codec::encode_invoices(&stored)?;
    files::write_atomic(&paths.invoices_file(id), &bytes)?;
    log::debug!("Stored {} invoice lists for {}", stored.len(), id);
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::invoice::fixtures::invoice_list;
    use crate::domain::entities::KeyPair;
    use crate::shared::types::Network;
    use tempfile::TempDir;

    #[test]
    fn test_add_merges_by_id() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let paths = PathResolver::new(dir.path(), &Network::Testnet);
        let id = KeyPair::generate().account_id();

        assert!(load(&paths, &id).unwrap().is_empty());

        let coffee = invoice_list("coffee", 10);
        let tea = invoice_list("tea", 7);
        add(&paths, &id, vec![coffee.clone()]).expect("Failed to add invoices");
        let stored = add(&paths, &id, vec![coffee.clone(), tea.clone()]).unwrap();

        assert_eq!(stored.len(), 2);
        assert_eq!(stored.get(coffee.id()), Some(&coffee));
        assert_eq!(load(&paths, &id).unwrap(), stored);
    }
}
