use serde::Serialize;

use super::{NamedId, first_rowset, parse_rows};
use crate::error::ParserError;
use crate::xml::Element;

/// One wallet division and its balance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletAccount {
    pub id: i64,
    /// Division key, 1000 for the master wallet
    pub key: i64,
    pub balance: f64,
}

pub fn wallet_accounts(result: &Element) -> Result<Vec<WalletAccount>, ParserError> {
    parse_rows(first_rowset(result)?, |f| {
        Ok(WalletAccount {
            id: f.required_int("accountID")?,
            key: f.required_int("accountKey")?,
            balance: f.required_float("balance")?,
        })
    })
}

/// Tax withheld on a journal entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tax {
    pub taxer_id: Option<i64>,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JournalEntry {
    pub id: i64,
    pub timestamp: i64,
    pub ref_type_id: i64,
    pub amount: f64,
    pub balance: f64,
    pub reason: Option<String>,
    pub sender: Option<NamedId>,
    pub recipient: Option<NamedId>,
    pub argument: Option<NamedId>,
    pub tax: Tax,
}

pub fn wallet_journal(result: &Element) -> Result<Vec<JournalEntry>, ParserError> {
    parse_rows(first_rowset(result)?, |f| {
        Ok(JournalEntry {
            id: f.required_int("refID")?,
            timestamp: f.required_ts("date")?,
            ref_type_id: f.required_int("refTypeID")?,
            amount: f.required_float("amount")?,
            balance: f.required_float("balance")?,
            reason: f.str("reason"),
            sender: NamedId::from_fields(&f, "ownerID1", "ownerName1")?,
            recipient: NamedId::from_fields(&f, "ownerID2", "ownerName2")?,
            argument: NamedId::from_fields(&f, "argID1", "argName1")?,
            tax: Tax {
                taxer_id: f.int("taxReceiverID")?,
                amount: f.float("taxAmount")?,
            },
        })
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: i64,
    pub journal_id: Option<i64>,
    pub timestamp: i64,
    pub quantity: i64,
    pub item_type: NamedId,
    pub price: f64,
    pub client: Option<NamedId>,
    pub station: Option<NamedId>,
    /// `buy` or `sell`
    pub action: String,
    /// `personal` or `corporation`
    pub on_behalf_of: Option<String>,
}

pub fn wallet_transactions(result: &Element) -> Result<Vec<Transaction>, ParserError> {
    parse_rows(first_rowset(result)?, |f| {
        Ok(Transaction {
            id: f.required_int("transactionID")?,
            journal_id: f.int("journalTransactionID")?,
            timestamp: f.required_ts("transactionDateTime")?,
            quantity: f.required_int("quantity")?,
            item_type: NamedId::new(f.required_int("typeID")?, f.str("typeName")),
            price: f.required_float("price")?,
            client: NamedId::from_fields(&f, "clientID", "clientName")?,
            station: NamedId::from_fields(&f, "stationID", "stationName")?,
            action: f.required_str("transactionType")?,
            on_behalf_of: f.str("transactionFor"),
        })
    })
}
