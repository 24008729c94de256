use std::collections::BTreeMap;

use serde::Serialize;

use super::required_rowset;
use crate::error::ParserError;
use crate::timestamp::Fields;
use crate::xml::Element;

/// One item, possibly a container with nested contents
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Asset {
    pub id: i64,
    pub item_type_id: i64,
    pub quantity: i64,
    /// Inventory flag within the parent location or container
    pub location_flag: i64,
    /// True for stackable, repackaged items
    pub packaged: bool,
    /// `-1` for a singleton, `-2` for a blueprint copy, absent otherwise
    pub raw_quantity: Option<i64>,
    pub contents: Vec<Asset>,
}

fn parse_asset(row: &Element) -> Result<Asset, ParserError> {
    let f = Fields::attributes(row);
    let contents = match row.rowset("contents") {
        Some(rowset) => rowset.rows().map(parse_asset).collect::<Result<_, _>>()?,
        None => Vec::new(),
    };

    Ok(Asset {
        id: f.required_int("itemID")?,
        item_type_id: f.required_int("typeID")?,
        quantity: f.required_int("quantity")?,
        location_flag: f.required_int("flag")?,
        packaged: !f.bool("singleton"),
        raw_quantity: f.int("rawQuantity")?,
        contents,
    })
}

/// Top-level items grouped by location id
pub fn assets(result: &Element) -> Result<BTreeMap<i64, Vec<Asset>>, ParserError> {
    let mut by_location: BTreeMap<i64, Vec<Asset>> = BTreeMap::new();
    for row in required_rowset(result, "assets")?.rows() {
        let location = Fields::attributes(row).required_int("locationID")?;
        by_location.entry(location).or_default().push(parse_asset(row)?);
    }
    Ok(by_location)
}
