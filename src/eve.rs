use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::api::{Api, ApiResult, ParamValue};
use crate::binder::{self, CallArgs, EndpointSpec, ParamSpec};
use crate::error::{ParserError, Result};
use crate::parsing::{NamedId, first_rowset, id_name_map, parse_rows_by};
use crate::timestamp::Fields;
use crate::xml::Element;

static CHARACTER_NAMES: EndpointSpec = EndpointSpec {
    path: "eve/CharacterName",
    params: &[ParamSpec::required("ids")],
    map_params: &[("ids", "ids")],
    prop_to_param: &[],
};

static CHARACTER_IDS: EndpointSpec = EndpointSpec {
    path: "eve/CharacterID",
    params: &[ParamSpec::required("names")],
    map_params: &[("names", "names")],
    prop_to_param: &[],
};

static CHARACTER_INFO: EndpointSpec = EndpointSpec {
    path: "eve/CharacterInfo",
    params: &[ParamSpec::required("char_id")],
    map_params: &[("char_id", "characterID")],
    prop_to_param: &[],
};

static ALLIANCES: EndpointSpec = EndpointSpec::bare("eve/AllianceList");
static ERRORS: EndpointSpec = EndpointSpec::bare("eve/ErrorList");
static REFERENCE_TYPES: EndpointSpec = EndpointSpec::bare("eve/RefTypes");
static CONQUERABLE_STATIONS: EndpointSpec = EndpointSpec::bare("eve/ConquerableStationList");

/// Public information about one character
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterInfo {
    pub id: i64,
    pub name: String,
    pub race: Option<String>,
    pub bloodline: Option<String>,
    pub sec_status: Option<f64>,
    pub corp: NamedId,
    pub alliance: Option<NamedId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alliance {
    pub id: i64,
    pub name: String,
    pub ticker: String,
    pub executor_id: Option<i64>,
    pub member_count: i64,
    pub founded_ts: i64,
    /// Member corporation id to join time
    pub member_corps: BTreeMap<i64, i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConquerableStation {
    pub id: i64,
    pub name: String,
    pub type_id: i64,
    pub system_id: i64,
    pub corp: NamedId,
}

fn parse_character_info(result: &Element) -> std::result::Result<CharacterInfo, ParserError> {
    let f = Fields::children(result);
    Ok(CharacterInfo {
        id: f.required_int("characterID")?,
        name: f.required_str("characterName")?,
        race: f.str("race"),
        bloodline: f.str("bloodline"),
        sec_status: f.float("securityStatus")?,
        corp: NamedId::new(f.required_int("corporationID")?, f.str("corporation")),
        alliance: NamedId::from_fields(&f, "allianceID", "alliance")?.filter(|a| a.id != 0),
    })
}

fn parse_alliances(result: &Element) -> std::result::Result<BTreeMap<i64, Alliance>, ParserError> {
    let rowset = first_rowset(result)?;
    let mut alliances = BTreeMap::new();
    for row in rowset.rows() {
        let f = Fields::attributes(row);
        let member_corps = match row.rowset("memberCorporations") {
            Some(members) => parse_rows_by(members, "corporationID", |m| m.required_ts("startDate"))?,
            None => BTreeMap::new(),
        };
        let alliance = Alliance {
            id: f.required_int("allianceID")?,
            name: f.required_str("name")?,
            ticker: f.required_str("shortName")?,
            executor_id: f.int("executorCorpID")?,
            member_count: f.required_int("memberCount")?,
            founded_ts: f.required_ts("startDate")?,
            member_corps,
        };
        alliances.insert(alliance.id, alliance);
    }
    Ok(alliances)
}

fn parse_conquerable_stations(
    result: &Element,
) -> std::result::Result<BTreeMap<i64, ConquerableStation>, ParserError> {
    parse_rows_by(first_rowset(result)?, "stationID", |f| {
        Ok(ConquerableStation {
            id: f.required_int("stationID")?,
            name: f.required_str("stationName")?,
            type_id: f.required_int("stationTypeID")?,
            system_id: f.required_int("solarSystemID")?,
            corp: NamedId::new(f.required_int("corporationID")?, f.str("corporationName")),
        })
    })
}

fn parse_character_ids(
    result: &Element,
) -> std::result::Result<BTreeMap<String, i64>, ParserError> {
    first_rowset(result)?
        .rows()
        .map(|row| {
            let f = Fields::attributes(row);
            Ok((f.required_str("name")?, f.required_int("characterID")?))
        })
        .collect()
}

/// Universe-wide lookup endpoints
#[derive(Debug, Clone)]
pub struct Eve {
    api: Arc<Api>,
}

impl Eve {
    pub fn new(api: Arc<Api>) -> Self {
        Self { api }
    }

    fn call<T>(
        &self,
        spec: &EndpointSpec,
        args: CallArgs,
        parse: impl FnOnce(&Element) -> std::result::Result<T, ParserError>,
    ) -> Result<ApiResult<T>> {
        binder::call(&self.api, spec, &(), args, None, |env| {
            env.try_map(|r| parse(&r))
        })
    }

    /// Names for character ids, keyed by id
    pub fn character_names_from_ids(
        &self,
        ids: &[i64],
    ) -> Result<ApiResult<BTreeMap<i64, String>>> {
        self.call(&CHARACTER_NAMES, CallArgs::new().arg(ids.to_vec()), |r| {
            id_name_map(first_rowset(r)?, "characterID", "name")
        })
    }

    /// Character ids for names, keyed by name
    pub fn character_ids_from_names(
        &self,
        names: &[&str],
    ) -> Result<ApiResult<BTreeMap<String, i64>>> {
        let names: Vec<ParamValue> = names.iter().map(|n| ParamValue::from(*n)).collect();
        self.call(
            &CHARACTER_IDS,
            CallArgs::new().arg(ParamValue::List(names)),
            parse_character_ids,
        )
    }

    pub fn character_info_from_id(&self, char_id: i64) -> Result<ApiResult<CharacterInfo>> {
        self.call(
            &CHARACTER_INFO,
            CallArgs::new().arg(char_id),
            parse_character_info,
        )
    }

    pub fn alliances(&self) -> Result<ApiResult<BTreeMap<i64, Alliance>>> {
        self.call(&ALLIANCES, CallArgs::new(), parse_alliances)
    }

    /// API error codes and their descriptions
    pub fn errors(&self) -> Result<ApiResult<BTreeMap<i64, String>>> {
        self.call(&ERRORS, CallArgs::new(), |r| {
            id_name_map(first_rowset(r)?, "errorCode", "errorText")
        })
    }

    /// Wallet journal reference type names
    pub fn reference_types(&self) -> Result<ApiResult<BTreeMap<i64, String>>> {
        self.call(&REFERENCE_TYPES, CallArgs::new(), |r| {
            id_name_map(first_rowset(r)?, "refTypeID", "refTypeName")
        })
    }

    pub fn conquerable_stations(&self) -> Result<ApiResult<BTreeMap<i64, ConquerableStation>>> {
        self.call(
            &CONQUERABLE_STATIONS,
            CallArgs::new(),
            parse_conquerable_stations,
        )
    }
}
