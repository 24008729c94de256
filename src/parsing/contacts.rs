use std::collections::BTreeMap;

use serde::Serialize;

use super::{parse_rows_by, required_child};
use crate::error::ParserError;
use crate::timestamp::Fields;
use crate::xml::Element;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub standing: f64,
    pub in_watchlist: bool,
}

/// Personal, corporation and alliance contact lists
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ContactLists {
    pub personal: BTreeMap<i64, Contact>,
    pub corp: BTreeMap<i64, Contact>,
    pub alliance: BTreeMap<i64, Contact>,
}

fn contact_list(result: &Element, rowset: &str) -> Result<BTreeMap<i64, Contact>, ParserError> {
    let Some(rowset) = result.rowset(rowset) else {
        return Ok(BTreeMap::new());
    };
    parse_rows_by(rowset, "contactID", |f| {
        Ok(Contact {
            id: f.required_int("contactID")?,
            name: f.required_str("contactName")?,
            standing: f.required_float("standing")?,
            in_watchlist: f.str("inWatchlist").is_some_and(|v| v.eq_ignore_ascii_case("true")),
        })
    })
}

/// Contact lists; a list the key cannot see is returned empty
pub fn contact_lists(result: &Element) -> Result<ContactLists, ParserError> {
    Ok(ContactLists {
        personal: contact_list(result, "contactList")?,
        corp: contact_list(result, "corporateContactList")?,
        alliance: contact_list(result, "allianceContactList")?,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standing {
    pub id: i64,
    pub name: String,
    pub standing: f64,
}

/// NPC standings toward a character or corporation
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Standings {
    pub agents: BTreeMap<i64, Standing>,
    pub corps: BTreeMap<i64, Standing>,
    pub factions: BTreeMap<i64, Standing>,
}

/// Standings under `container`, e.g. `characterNPCStandings`
pub fn standings(result: &Element, container: &str) -> Result<Standings, ParserError> {
    let container = required_child(result, container)?;
    let group = |name: &str| -> Result<BTreeMap<i64, Standing>, ParserError> {
        match container.rowset(name) {
            Some(rowset) => parse_rows_by(rowset, "fromID", |f: Fields<'_>| {
                Ok(Standing {
                    id: f.required_int("fromID")?,
                    name: f.required_str("fromName")?,
                    standing: f.required_float("standing")?,
                })
            }),
            None => Ok(BTreeMap::new()),
        }
    };

    Ok(Standings {
        agents: group("agents")?,
        corps: group("NPCCorporations")?,
        factions: group("factions")?,
    })
}
