//! Invoice entities attached to an account's payments

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::types::Quarks;
use crate::shared::utils::sha224;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub title: String,
    pub description: Option<String>,
    pub amount: Quarks,
    pub sku: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub line_items: Vec<LineItem>,
}

impl Invoice {
    pub fn new(line_items: Vec<LineItem>) -> Self {
        Self { line_items }
    }

    pub fn total(&self) -> Quarks {
        self.line_items.iter().map(|item| item.amount).sum()
    }
}

/// SHA-224 of the encoded invoices of a list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InvoiceListId([u8; 28]);

impl InvoiceListId {
    pub fn as_bytes(&self) -> &[u8; 28] {
        &self.0
    }
}

impl fmt::Display for InvoiceListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceList {
    id: InvoiceListId,
    invoices: Vec<Invoice>,
}

impl InvoiceList {
    pub fn new(invoices: Vec<Invoice>) -> Self {
        Self {
            id: InvoiceListId(sha224(&Self::id_preimage(&invoices))),
            invoices,
        }
    }

    pub fn id(&self) -> &InvoiceListId {
        &self.id
    }

    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    // Length-prefixed fields so that distinct lists never share a preimage
    fn id_preimage(invoices: &[Invoice]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(invoices.len() as u64).to_be_bytes());
        for invoice in invoices {
            out.extend_from_slice(&(invoice.line_items.len() as u64).to_be_bytes());
            for item in &invoice.line_items {
                push_field(&mut out, Some(item.title.as_bytes()));
                push_field(&mut out, item.description.as_deref().map(str::as_bytes));
                out.extend_from_slice(&item.amount.to_be_bytes());
                push_field(&mut out, item.sku.as_deref());
            }
        }
        out
    }
}

fn push_field(out: &mut Vec<u8>, field: Option<&[u8]>) {
    match field {
        Some(bytes) => {
            out.push(1);
            out.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
            out.extend_from_slice(bytes);
        }
        None => out.push(0),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn invoice_list(title: &str, amount: Quarks) -> InvoiceList {
        InvoiceList::new(vec![Invoice::new(vec![LineItem {
            title: title.to_string(),
            description: None,
            amount,
            sku: Some(vec![1, 2, 3]),
        }])])
    }
}
