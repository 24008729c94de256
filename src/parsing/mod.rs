//! Parsers shared by the character and corporation endpoints.
//!
//! Each parser is a pure function over the `<result>` element of an envelope.
//! A missing rowset or required attribute is a [`ParserError`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::ParserError;
use crate::timestamp::Fields;
use crate::xml::Element;

mod assets;
mod contacts;
mod contracts;
mod industry;
mod kills;
mod orders;
mod wallet;

pub use assets::{Asset, assets};
pub use contacts::{Contact, ContactLists, Standing, Standings, contact_lists, standings};
pub use contracts::{Contract, contracts};
pub use industry::{IndustryJob, industry_jobs};
pub use kills::{Attacker, Kill, KillItem, Victim, kills};
pub use orders::{MarketOrder, OrderState, OrderType, orders};
pub use wallet::{
    JournalEntry, Tax, Transaction, WalletAccount, wallet_accounts, wallet_journal,
    wallet_transactions,
};

/// An id with an optional display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedId {
    pub id: i64,
    pub name: Option<String>,
}

impl NamedId {
    pub fn new(id: i64, name: Option<String>) -> Self {
        Self { id, name }
    }

    /// Read `id_field` and `name_field` off a row; `None` when the id is
    /// absent
    pub fn from_fields(
        fields: &Fields<'_>,
        id_field: &str,
        name_field: &str,
    ) -> Result<Option<Self>, ParserError> {
        Ok(fields
            .int(id_field)?
            .map(|id| Self::new(id, fields.str(name_field))))
    }
}

/// The child element `name`, or [`ParserError::MissingElement`]
pub fn required_child<'a>(element: &'a Element, name: &str) -> Result<&'a Element, ParserError> {
    element.child(name).ok_or_else(|| ParserError::MissingElement {
        element: name.to_string(),
    })
}

/// The rowset called `name`, or [`ParserError::MissingElement`]
pub fn required_rowset<'a>(element: &'a Element, name: &str) -> Result<&'a Element, ParserError> {
    element
        .rowset(name)
        .ok_or_else(|| ParserError::MissingElement {
            element: format!("rowset[{}]", name),
        })
}

/// The first rowset under `element` regardless of its name
pub fn first_rowset(element: &Element) -> Result<&Element, ParserError> {
    element
        .children_named("rowset")
        .next()
        .ok_or_else(|| ParserError::MissingElement {
            element: "rowset".to_string(),
        })
}

/// Parse every row of a rowset into a list
pub fn parse_rows<T>(
    rowset: &Element,
    mut parse: impl FnMut(Fields<'_>) -> Result<T, ParserError>,
) -> Result<Vec<T>, ParserError> {
    rowset.rows().map(|row| parse(Fields::attributes(row))).collect()
}

/// Parse every row of a rowset into a map keyed by the integer `key` field
pub fn parse_rows_by<T>(
    rowset: &Element,
    key: &str,
    mut parse: impl FnMut(Fields<'_>) -> Result<T, ParserError>,
) -> Result<BTreeMap<i64, T>, ParserError> {
    rowset
        .rows()
        .map(|row| {
            let fields = Fields::attributes(row);
            Ok((fields.required_int(key)?, parse(fields)?))
        })
        .collect()
}

/// Every row's `key` field mapped to its `value` field
pub fn id_name_map(
    rowset: &Element,
    key: &str,
    value: &str,
) -> Result<BTreeMap<i64, String>, ParserError> {
    parse_rows_by(rowset, key, |f| f.required_str(value))
}
