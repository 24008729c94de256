//! Corporation endpoints for the corporation of the configured key.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::api::{Api, ApiResult, Envelope};
use crate::binder::{self, CallArgs, EndpointSpec, ParamSpec};
use crate::error::{ParserError, Result};
use crate::parsing::{
    self, Asset, Contract, IndustryJob, JournalEntry, Kill, MarketOrder, NamedId, Standings,
    Transaction, WalletAccount, first_rowset, id_name_map, parse_rows_by,
};
use crate::timestamp::Fields;
use crate::xml::Element;

static CORPORATION_SHEET: EndpointSpec = EndpointSpec {
    path: "corp/CorporationSheet",
    params: &[ParamSpec::optional("corp_id")],
    map_params: &[("corp_id", "corporationID")],
    prop_to_param: &[],
};

static WALLET_INFO: EndpointSpec = EndpointSpec::bare("corp/AccountBalance");
static ASSETS: EndpointSpec = EndpointSpec::bare("corp/AssetList");
static INDUSTRY_JOBS: EndpointSpec = EndpointSpec::bare("corp/IndustryJobs");
static ORDERS: EndpointSpec = EndpointSpec::bare("corp/MarketOrders");
static CONTRACTS: EndpointSpec = EndpointSpec::bare("corp/Contracts");
static STANDINGS: EndpointSpec = EndpointSpec::bare("corp/Standings");
static STARBASES: EndpointSpec = EndpointSpec::bare("corp/StarbaseList");

static WALLET_JOURNAL: EndpointSpec = EndpointSpec {
    path: "corp/WalletJournal",
    params: &[
        ParamSpec::optional("account"),
        ParamSpec::optional("before_id"),
        ParamSpec::optional("limit"),
    ],
    map_params: &[
        ("account", "accountKey"),
        ("before_id", "fromID"),
        ("limit", "rowCount"),
    ],
    prop_to_param: &[],
};

static WALLET_TRANSACTIONS: EndpointSpec = EndpointSpec {
    path: "corp/WalletTransactions",
    params: &[
        ParamSpec::optional("account"),
        ParamSpec::optional("before_id"),
        ParamSpec::optional("limit"),
    ],
    map_params: &[
        ("account", "accountKey"),
        ("before_id", "fromID"),
        ("limit", "rowCount"),
    ],
    prop_to_param: &[],
};

static KILLS: EndpointSpec = EndpointSpec {
    path: "corp/KillMails",
    params: &[ParamSpec::optional("before_kill")],
    map_params: &[("before_kill", "beforeKillID")],
    prop_to_param: &[],
};

static MEMBERS: EndpointSpec = EndpointSpec {
    path: "corp/MemberTracking",
    params: &[ParamSpec::optional("extended")],
    map_params: &[("extended", "extended")],
    prop_to_param: &[],
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorporationSheet {
    pub id: i64,
    pub name: String,
    pub ticker: String,
    pub ceo: NamedId,
    pub hq: NamedId,
    pub description: Option<String>,
    pub url: Option<String>,
    pub alliance: Option<NamedId>,
    pub tax_rate: f64,
    pub member_count: i64,
    /// Only visible to members
    pub member_limit: Option<i64>,
    pub shares: i64,
    pub divisions: BTreeMap<i64, String>,
    pub wallet_divisions: BTreeMap<i64, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub join_ts: i64,
    pub title: Option<String>,
    pub base: Option<NamedId>,
    /// The fields below are only filled in by the extended listing
    pub logon_ts: Option<i64>,
    pub logoff_ts: Option<i64>,
    pub location: Option<NamedId>,
    pub ship_type: Option<NamedId>,
    pub roles: Option<i64>,
    pub grantable_roles: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Starbase {
    pub id: i64,
    pub type_id: i64,
    pub location_id: i64,
    pub moon_id: i64,
    pub state: i64,
    pub state_ts: Option<i64>,
    pub online_ts: Option<i64>,
    pub standings_owner_id: Option<i64>,
}

fn divisions(result: &Element, name: &str) -> std::result::Result<BTreeMap<i64, String>, ParserError> {
    match result.rowset(name) {
        Some(rowset) => id_name_map(rowset, "accountKey", "description"),
        None => Ok(BTreeMap::new()),
    }
}

fn parse_corporation_sheet(result: &Element) -> std::result::Result<CorporationSheet, ParserError> {
    let f = Fields::children(result);
    Ok(CorporationSheet {
        id: f.required_int("corporationID")?,
        name: f.required_str("corporationName")?,
        ticker: f.required_str("ticker")?,
        ceo: NamedId::new(f.required_int("ceoID")?, f.str("ceoName")),
        hq: NamedId::new(f.required_int("stationID")?, f.str("stationName")),
        description: f.str("description"),
        url: f.str("url"),
        alliance: NamedId::from_fields(&f, "allianceID", "allianceName")?.filter(|a| a.id != 0),
        tax_rate: f.required_float("taxRate")?,
        member_count: f.required_int("memberCount")?,
        member_limit: f.int("memberLimit")?,
        shares: f.required_int("shares")?,
        divisions: divisions(result, "divisions")?,
        wallet_divisions: divisions(result, "walletDivisions")?,
    })
}

fn parse_members(result: &Element) -> std::result::Result<BTreeMap<i64, Member>, ParserError> {
    parse_rows_by(first_rowset(result)?, "characterID", |f| {
        Ok(Member {
            id: f.required_int("characterID")?,
            name: f.required_str("name")?,
            join_ts: f.required_ts("startDateTime")?,
            title: f.str("title"),
            base: NamedId::from_fields(&f, "baseID", "base")?.filter(|b| b.id != 0),
            logon_ts: f.ts("logonDateTime")?,
            logoff_ts: f.ts("logoffDateTime")?,
            location: NamedId::from_fields(&f, "locationID", "location")?,
            ship_type: NamedId::from_fields(&f, "shipTypeID", "shipType")?.filter(|s| s.id > 0),
            roles: f.int("roles")?,
            grantable_roles: f.int("grantableRoles")?,
        })
    })
}

fn parse_starbases(result: &Element) -> std::result::Result<BTreeMap<i64, Starbase>, ParserError> {
    parse_rows_by(first_rowset(result)?, "itemID", |f| {
        Ok(Starbase {
            id: f.required_int("itemID")?,
            type_id: f.required_int("typeID")?,
            location_id: f.required_int("locationID")?,
            moon_id: f.required_int("moonID")?,
            state: f.required_int("state")?,
            state_ts: f.ts("stateTimestamp")?,
            online_ts: f.ts("onlineTimestamp")?,
            standings_owner_id: f.int("standingOwnerID")?,
        })
    })
}

/// Endpoints for the configured key's corporation
#[derive(Debug, Clone)]
pub struct Corp {
    api: Arc<Api>,
}

impl Corp {
    pub fn new(api: Arc<Api>) -> Self {
        Self { api }
    }

    fn call<T>(
        &self,
        spec: &EndpointSpec,
        args: CallArgs,
        prefetched: Option<Envelope>,
        parse: impl FnOnce(&Element) -> std::result::Result<T, ParserError>,
    ) -> Result<ApiResult<T>> {
        binder::call(&self.api, spec, &(), args, prefetched, |env| {
            env.try_map(|r| parse(&r))
        })
    }

    /// Public sheet of `corp_id`, or the full sheet of the key's own
    /// corporation when `None`
    pub fn corporation_sheet(&self, corp_id: Option<i64>) -> Result<ApiResult<CorporationSheet>> {
        self.call(
            &CORPORATION_SHEET,
            CallArgs::new().arg(corp_id),
            None,
            parse_corporation_sheet,
        )
    }

    /// Balances of every wallet division, keyed by account key
    pub fn wallet_info(
        &self,
        prefetched: Option<Envelope>,
    ) -> Result<ApiResult<BTreeMap<i64, WalletAccount>>> {
        self.call(&WALLET_INFO, CallArgs::new(), prefetched, |r| {
            Ok(parsing::wallet_accounts(r)?
                .into_iter()
                .map(|account| (account.key, account))
                .collect())
        })
    }

    /// Journal of one wallet division; `account` defaults to the master
    /// wallet on the server
    pub fn wallet_journal(
        &self,
        account: Option<i64>,
        before_id: Option<i64>,
        limit: Option<i64>,
    ) -> Result<ApiResult<Vec<JournalEntry>>> {
        let args = CallArgs::new().arg(account).arg(before_id).arg(limit);
        self.call(&WALLET_JOURNAL, args, None, parsing::wallet_journal)
    }

    pub fn wallet_transactions(
        &self,
        account: Option<i64>,
        before_id: Option<i64>,
        limit: Option<i64>,
    ) -> Result<ApiResult<Vec<Transaction>>> {
        let args = CallArgs::new().arg(account).arg(before_id).arg(limit);
        self.call(&WALLET_TRANSACTIONS, args, None, parsing::wallet_transactions)
    }

    pub fn assets(&self) -> Result<ApiResult<BTreeMap<i64, Vec<Asset>>>> {
        self.call(&ASSETS, CallArgs::new(), None, parsing::assets)
    }

    pub fn industry_jobs(&self) -> Result<ApiResult<BTreeMap<i64, IndustryJob>>> {
        self.call(&INDUSTRY_JOBS, CallArgs::new(), None, parsing::industry_jobs)
    }

    pub fn kills(&self, before_kill: Option<i64>) -> Result<ApiResult<Vec<Kill>>> {
        self.call(&KILLS, CallArgs::new().arg(before_kill), None, parsing::kills)
    }

    pub fn orders(&self) -> Result<ApiResult<BTreeMap<i64, MarketOrder>>> {
        self.call(&ORDERS, CallArgs::new(), None, parsing::orders)
    }

    pub fn contracts(&self) -> Result<ApiResult<BTreeMap<i64, Contract>>> {
        self.call(&CONTRACTS, CallArgs::new(), None, parsing::contracts)
    }

    pub fn standings(&self) -> Result<ApiResult<Standings>> {
        self.call(&STANDINGS, CallArgs::new(), None, |r| {
            parsing::standings(r, "corporationNPCStandings")
        })
    }

    /// Member list; `extended` adds location, ship and login details
    pub fn members(&self, extended: bool) -> Result<ApiResult<BTreeMap<i64, Member>>> {
        self.call(
            &MEMBERS,
            CallArgs::new().arg(extended.then_some(true)),
            None,
            parse_members,
        )
    }

    pub fn starbases(&self) -> Result<ApiResult<BTreeMap<i64, Starbase>>> {
        self.call(&STARBASES, CallArgs::new(), None, parse_starbases)
    }
}
