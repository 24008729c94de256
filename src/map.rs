use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::api::{Api, ApiResult};
use crate::binder::{self, CallArgs, EndpointSpec};
use crate::error::{ParserError, Result};
use crate::parsing::{NamedId, first_rowset, parse_rows_by};
use crate::timestamp::Fields;
use crate::xml::Element;

static JUMPS: EndpointSpec = EndpointSpec::bare("map/Jumps");
static KILLS: EndpointSpec = EndpointSpec::bare("map/Kills");
static SOVEREIGNTY: EndpointSpec = EndpointSpec::bare("map/Sovereignty");
static FAC_WAR_SYSTEMS: EndpointSpec = EndpointSpec::bare("map/FacWarSystems");

/// Per-system statistics with the time the server sampled them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemStats<T> {
    pub systems: BTreeMap<i64, T>,
    pub data_ts: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SystemKills {
    pub ship: i64,
    pub pod: i64,
    pub faction: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sovereignty {
    pub system_id: i64,
    pub name: String,
    pub alliance_id: Option<i64>,
    pub corp_id: Option<i64>,
    pub faction_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactionWarfareSystem {
    pub system_id: i64,
    pub name: String,
    pub owner: Option<NamedId>,
    pub occupier: Option<NamedId>,
    pub contested: bool,
}

fn non_zero(id: Option<i64>) -> Option<i64> {
    id.filter(|id| *id != 0)
}

fn system_stats<T>(
    result: &Element,
    parse: impl FnMut(Fields<'_>) -> std::result::Result<T, ParserError>,
) -> std::result::Result<SystemStats<T>, ParserError> {
    Ok(SystemStats {
        systems: parse_rows_by(first_rowset(result)?, "solarSystemID", parse)?,
        data_ts: Fields::children(result).ts("dataTime")?,
    })
}

fn parse_jumps(result: &Element) -> std::result::Result<SystemStats<i64>, ParserError> {
    system_stats(result, |f| f.required_int("shipJumps"))
}

fn parse_kills(result: &Element) -> std::result::Result<SystemStats<SystemKills>, ParserError> {
    system_stats(result, |f| {
        Ok(SystemKills {
            ship: f.int("shipKills")?.unwrap_or(0),
            pod: f.int("podKills")?.unwrap_or(0),
            faction: f.int("factionKills")?.unwrap_or(0),
        })
    })
}

fn parse_sovereignty(
    result: &Element,
) -> std::result::Result<SystemStats<Sovereignty>, ParserError> {
    system_stats(result, |f| {
        Ok(Sovereignty {
            system_id: f.required_int("solarSystemID")?,
            name: f.required_str("solarSystemName")?,
            alliance_id: non_zero(f.int("allianceID")?),
            corp_id: non_zero(f.int("corporationID")?),
            faction_id: non_zero(f.int("factionID")?),
        })
    })
}

fn parse_fac_war_systems(
    result: &Element,
) -> std::result::Result<BTreeMap<i64, FactionWarfareSystem>, ParserError> {
    parse_rows_by(first_rowset(result)?, "solarSystemID", |f| {
        let named = |id: &str, name: &str| -> std::result::Result<Option<NamedId>, ParserError> {
            Ok(NamedId::from_fields(&f, id, name)?.filter(|n| n.id != 0))
        };
        Ok(FactionWarfareSystem {
            system_id: f.required_int("solarSystemID")?,
            name: f.required_str("solarSystemName")?,
            owner: named("owningFactionID", "owningFactionName")?,
            occupier: named("occupyingFactionID", "occupyingFactionName")?,
            contested: f
                .str("contested")
                .is_some_and(|v| v.eq_ignore_ascii_case("true")),
        })
    })
}

/// Universe map statistics
#[derive(Debug, Clone)]
pub struct Map {
    api: Arc<Api>,
}

impl Map {
    pub fn new(api: Arc<Api>) -> Self {
        Self { api }
    }

    /// Ship jumps in the last hour, per system
    pub fn jumps_by_system(&self) -> Result<ApiResult<SystemStats<i64>>> {
        binder::call(&self.api, &JUMPS, &(), CallArgs::new(), None, |env| {
            env.try_map(|r| parse_jumps(&r))
        })
    }

    /// Kills in the last hour, per system
    pub fn kills_by_system(&self) -> Result<ApiResult<SystemStats<SystemKills>>> {
        binder::call(&self.api, &KILLS, &(), CallArgs::new(), None, |env| {
            env.try_map(|r| parse_kills(&r))
        })
    }

    pub fn sov_by_system(&self) -> Result<ApiResult<SystemStats<Sovereignty>>> {
        binder::call(&self.api, &SOVEREIGNTY, &(), CallArgs::new(), None, |env| {
            env.try_map(|r| parse_sovereignty(&r))
        })
    }

    pub fn faction_warfare_systems(
        &self,
    ) -> Result<ApiResult<BTreeMap<i64, FactionWarfareSystem>>> {
        binder::call(&self.api, &FAC_WAR_SYSTEMS, &(), CallArgs::new(), None, |env| {
            env.try_map(|r| parse_fac_war_systems(&r))
        })
    }
}
