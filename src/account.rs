use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::api::{Api, ApiResult};
use crate::binder::{self, CallArgs, EndpointSpec};
use crate::error::{ParserError, Result};
use crate::parsing::{NamedId, first_rowset, parse_rows_by, required_child};
use crate::timestamp::Fields;
use crate::xml::Element;

static ACCOUNT_STATUS: EndpointSpec = EndpointSpec::bare("account/AccountStatus");
static KEY_INFO: EndpointSpec = EndpointSpec::bare("account/APIKeyInfo");
static CHARACTERS: EndpointSpec = EndpointSpec::bare("account/Characters");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountStatus {
    pub paid_ts: i64,
    pub create_ts: i64,
    pub logins: i64,
    pub minutes_played: i64,
}

/// A character visible through an API key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyCharacter {
    pub id: i64,
    pub name: String,
    pub corp: NamedId,
    pub alliance: Option<NamedId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyInfo {
    pub access_mask: i64,
    /// `Account`, `Character` or `Corporation`
    pub key_type: String,
    /// `None` for keys that never expire
    pub expire_ts: Option<i64>,
    pub characters: BTreeMap<i64, KeyCharacter>,
}

fn parse_account_status(result: &Element) -> std::result::Result<AccountStatus, ParserError> {
    let f = Fields::children(result);
    Ok(AccountStatus {
        paid_ts: f.required_ts("paidUntil")?,
        create_ts: f.required_ts("createDate")?,
        logins: f.required_int("logonCount")?,
        minutes_played: f.required_int("logonMinutes")?,
    })
}

fn parse_key_characters(
    rowset: &Element,
) -> std::result::Result<BTreeMap<i64, KeyCharacter>, ParserError> {
    parse_rows_by(rowset, "characterID", |f| {
        Ok(KeyCharacter {
            id: f.required_int("characterID")?,
            name: f.required_str("characterName")?,
            corp: NamedId::new(f.required_int("corporationID")?, f.str("corporationName")),
            alliance: NamedId::from_fields(&f, "allianceID", "allianceName")?
                .filter(|a| a.id != 0),
        })
    })
}

fn parse_key_info(result: &Element) -> std::result::Result<KeyInfo, ParserError> {
    let key = required_child(result, "key")?;
    let f = Fields::attributes(key);
    Ok(KeyInfo {
        access_mask: f.required_int("accessMask")?,
        key_type: f.required_str("type")?,
        expire_ts: f.ts("expires")?,
        characters: parse_key_characters(first_rowset(key)?)?,
    })
}

fn parse_characters(
    result: &Element,
) -> std::result::Result<BTreeMap<i64, KeyCharacter>, ParserError> {
    parse_rows_by(first_rowset(result)?, "characterID", |f| {
        Ok(KeyCharacter {
            id: f.required_int("characterID")?,
            name: f.required_str("name")?,
            corp: NamedId::new(f.required_int("corporationID")?, f.str("corporationName")),
            alliance: NamedId::from_fields(&f, "allianceID", "allianceName")?
                .filter(|a| a.id != 0),
        })
    })
}

/// Endpoints describing the configured API key and its account
#[derive(Debug, Clone)]
pub struct Account {
    api: Arc<Api>,
}

impl Account {
    pub fn new(api: Arc<Api>) -> Self {
        Self { api }
    }

    pub fn status(&self) -> Result<ApiResult<AccountStatus>> {
        binder::call(&self.api, &ACCOUNT_STATUS, &(), CallArgs::new(), None, |env| {
            env.try_map(|r| parse_account_status(&r))
        })
    }

    pub fn key_info(&self) -> Result<ApiResult<KeyInfo>> {
        binder::call(&self.api, &KEY_INFO, &(), CallArgs::new(), None, |env| {
            env.try_map(|r| parse_key_info(&r))
        })
    }

    /// Characters on the account, keyed by character id
    pub fn characters(&self) -> Result<ApiResult<BTreeMap<i64, KeyCharacter>>> {
        binder::call(&self.api, &CHARACTERS, &(), CallArgs::new(), None, |env| {
            env.try_map(|r| parse_characters(&r))
        })
    }
}
