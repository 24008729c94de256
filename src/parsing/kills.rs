use serde::Serialize;

use super::{NamedId, first_rowset, parse_rows, required_child};
use crate::error::ParserError;
use crate::timestamp::Fields;
use crate::xml::Element;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Victim {
    pub character: Option<NamedId>,
    pub corporation: Option<NamedId>,
    pub alliance: Option<NamedId>,
    pub faction: Option<NamedId>,
    pub damage_taken: i64,
    pub ship_type_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attacker {
    pub character: Option<NamedId>,
    pub corporation: Option<NamedId>,
    pub alliance: Option<NamedId>,
    pub faction: Option<NamedId>,
    pub security_status: Option<f64>,
    pub damage_done: i64,
    pub final_blow: bool,
    pub weapon_type_id: Option<i64>,
    pub ship_type_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KillItem {
    pub type_id: i64,
    pub location_flag: i64,
    pub dropped: i64,
    pub destroyed: i64,
    pub singleton: bool,
    pub contents: Vec<KillItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kill {
    pub id: i64,
    pub solar_system_id: i64,
    pub timestamp: i64,
    pub moon_id: Option<i64>,
    pub victim: Victim,
    pub attackers: Vec<Attacker>,
    pub items: Vec<KillItem>,
}

fn affiliations(f: &Fields<'_>) -> Result<[Option<NamedId>; 4], ParserError> {
    // Zero ids stand for "none" on kill reports
    let named = |id: &str, name: &str| -> Result<Option<NamedId>, ParserError> {
        Ok(NamedId::from_fields(f, id, name)?.filter(|n| n.id != 0))
    };
    Ok([
        named("characterID", "characterName")?,
        named("corporationID", "corporationName")?,
        named("allianceID", "allianceName")?,
        named("factionID", "factionName")?,
    ])
}

fn parse_item(row: &Element) -> Result<KillItem, ParserError> {
    let f = Fields::attributes(row);
    let contents = match row.rowset("items") {
        Some(rowset) => rowset.rows().map(parse_item).collect::<Result<_, _>>()?,
        None => Vec::new(),
    };
    Ok(KillItem {
        type_id: f.required_int("typeID")?,
        location_flag: f.int("flag")?.unwrap_or(0),
        dropped: f.int("qtyDropped")?.unwrap_or(0),
        destroyed: f.int("qtyDestroyed")?.unwrap_or(0),
        singleton: f.bool("singleton"),
        contents,
    })
}

fn parse_kill(row: &Element) -> Result<Kill, ParserError> {
    let f = Fields::attributes(row);

    let victim_fields = Fields::attributes(required_child(row, "victim")?);
    let [character, corporation, alliance, faction] = affiliations(&victim_fields)?;
    let victim = Victim {
        character,
        corporation,
        alliance,
        faction,
        damage_taken: victim_fields.int("damageTaken")?.unwrap_or(0),
        ship_type_id: victim_fields.required_int("shipTypeID")?,
    };

    let attackers = match row.rowset("attackers") {
        Some(rowset) => parse_rows(rowset, |a| {
            let [character, corporation, alliance, faction] = affiliations(&a)?;
            Ok(Attacker {
                character,
                corporation,
                alliance,
                faction,
                security_status: a.float("securityStatus")?,
                damage_done: a.int("damageDone")?.unwrap_or(0),
                final_blow: a.bool("finalBlow"),
                weapon_type_id: a.int("weaponTypeID")?,
                ship_type_id: a.int("shipTypeID")?,
            })
        })?,
        None => Vec::new(),
    };

    let items = match row.rowset("items") {
        Some(rowset) => rowset.rows().map(parse_item).collect::<Result<_, _>>()?,
        None => Vec::new(),
    };

    Ok(Kill {
        id: f.required_int("killID")?,
        solar_system_id: f.required_int("solarSystemID")?,
        timestamp: f.required_ts("killTime")?,
        moon_id: f.int("moonID")?.filter(|id| *id != 0),
        victim,
        attackers,
        items,
    })
}

/// Kill reports, newest first as the API lists them
pub fn kills(result: &Element) -> Result<Vec<Kill>, ParserError> {
    first_rowset(result)?.rows().map(parse_kill).collect()
}
