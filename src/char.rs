//! Character endpoints.
//!
//! A [`Char`] carries the character id, which every endpoint here sends as
//! `characterID` without the caller passing it again.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::api::{Api, ApiResult, Envelope, ParamValue};
use crate::binder::{self, CallArgs, EndpointSpec, ParamSource, ParamSpec};
use crate::error::{ParserError, Result};
use crate::parsing::{
    self, Asset, ContactLists, Contract, IndustryJob, JournalEntry, Kill, MarketOrder, NamedId,
    Standings, Transaction, WalletAccount, first_rowset, parse_rows, parse_rows_by,
    required_child, required_rowset,
};
use crate::timestamp::Fields;
use crate::xml::Element;

const CHAR_ID: (&str, &str) = ("char_id", "characterID");
const CHAR_ID_ONLY: &[(&str, &str)] = &[CHAR_ID];
const CHAR_PROPS: &[&str] = &["char_id"];

const fn char_endpoint(path: &'static str) -> EndpointSpec {
    EndpointSpec {
        path,
        params: &[],
        map_params: CHAR_ID_ONLY,
        prop_to_param: CHAR_PROPS,
    }
}

static WALLET_INFO: EndpointSpec = char_endpoint("char/AccountBalance");
static ASSETS: EndpointSpec = char_endpoint("char/AssetList");
static INDUSTRY_JOBS: EndpointSpec = char_endpoint("char/IndustryJobs");
static ORDERS: EndpointSpec = char_endpoint("char/MarketOrders");
static CONTRACTS: EndpointSpec = char_endpoint("char/Contracts");
static CHARACTER_SHEET: EndpointSpec = char_endpoint("char/CharacterSheet");
static SKILL_QUEUE: EndpointSpec = char_endpoint("char/SkillQueue");
static STANDINGS: EndpointSpec = char_endpoint("char/Standings");
static CONTACTS: EndpointSpec = char_endpoint("char/ContactList");
static NOTIFICATIONS: EndpointSpec = char_endpoint("char/Notifications");
static MESSAGE_HEADERS: EndpointSpec = char_endpoint("char/MailMessages");

static WALLET_JOURNAL: EndpointSpec = EndpointSpec {
    path: "char/WalletJournal",
    params: &[ParamSpec::optional("before_id"), ParamSpec::optional("limit")],
    map_params: &[CHAR_ID, ("before_id", "fromID"), ("limit", "rowCount")],
    prop_to_param: CHAR_PROPS,
};

static WALLET_TRANSACTIONS: EndpointSpec = EndpointSpec {
    path: "char/WalletTransactions",
    params: &[ParamSpec::optional("before_id"), ParamSpec::optional("limit")],
    map_params: &[CHAR_ID, ("before_id", "fromID"), ("limit", "rowCount")],
    prop_to_param: CHAR_PROPS,
};

static KILLS: EndpointSpec = EndpointSpec {
    path: "char/KillMails",
    params: &[ParamSpec::optional("before_kill")],
    map_params: &[CHAR_ID, ("before_kill", "beforeKillID")],
    prop_to_param: CHAR_PROPS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Attributes {
    pub intelligence: i64,
    pub memory: i64,
    pub charisma: i64,
    pub perception: i64,
    pub willpower: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Skill {
    pub type_id: i64,
    pub skillpoints: i64,
    pub level: i64,
    pub published: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterSheet {
    pub id: i64,
    pub name: String,
    pub create_ts: i64,
    pub race: Option<String>,
    pub bloodline: Option<String>,
    pub ancestry: Option<String>,
    pub gender: Option<String>,
    pub corp: NamedId,
    pub alliance: Option<NamedId>,
    pub balance: f64,
    pub attributes: Attributes,
    pub skills: BTreeMap<i64, Skill>,
    pub skillpoints: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueuedSkill {
    pub position: i64,
    pub type_id: i64,
    pub level: i64,
    pub start_sp: i64,
    pub end_sp: i64,
    /// Unset while the queue is paused
    pub start_ts: Option<i64>,
    pub end_ts: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: i64,
    pub type_id: i64,
    pub sender_id: i64,
    pub timestamp: i64,
    pub read: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageHeader {
    pub id: i64,
    pub sender_id: i64,
    pub timestamp: i64,
    pub title: Option<String>,
    pub to_org_id: Option<i64>,
    pub to_char_ids: Vec<i64>,
    pub to_list_ids: Vec<i64>,
}

fn parse_attributes(sheet: &Element) -> std::result::Result<Attributes, ParserError> {
    let f = Fields::children(required_child(sheet, "attributes")?);
    Ok(Attributes {
        intelligence: f.required_int("intelligence")?,
        memory: f.required_int("memory")?,
        charisma: f.required_int("charisma")?,
        perception: f.required_int("perception")?,
        willpower: f.required_int("willpower")?,
    })
}

fn parse_character_sheet(result: &Element) -> std::result::Result<CharacterSheet, ParserError> {
    let f = Fields::children(result);
    let skills = parse_rows_by(required_rowset(result, "skills")?, "typeID", |s| {
        Ok(Skill {
            type_id: s.required_int("typeID")?,
            skillpoints: s.required_int("skillpoints")?,
            level: s.required_int("level")?,
            // Older responses omit the flag; those skills are all published
            published: s.str("published").is_none_or(|v| v == "1"),
        })
    })?;

    Ok(CharacterSheet {
        id: f.required_int("characterID")?,
        name: f.required_str("name")?,
        create_ts: f.required_ts("DoB")?,
        race: f.str("race"),
        bloodline: f.str("bloodLine"),
        ancestry: f.str("ancestry"),
        gender: f.str("gender"),
        corp: NamedId::new(f.required_int("corporationID")?, f.str("corporationName")),
        alliance: NamedId::from_fields(&f, "allianceID", "allianceName")?.filter(|a| a.id != 0),
        balance: f.required_float("balance")?,
        attributes: parse_attributes(result)?,
        skillpoints: skills.values().map(|s| s.skillpoints).sum(),
        skills,
    })
}

fn parse_skill_queue(result: &Element) -> std::result::Result<Vec<QueuedSkill>, ParserError> {
    parse_rows(first_rowset(result)?, |f| {
        Ok(QueuedSkill {
            position: f.required_int("queuePosition")?,
            type_id: f.required_int("typeID")?,
            level: f.required_int("level")?,
            start_sp: f.required_int("startSP")?,
            end_sp: f.required_int("endSP")?,
            start_ts: f.ts("startTime")?,
            end_ts: f.ts("endTime")?,
        })
    })
}

fn parse_notifications(
    result: &Element,
) -> std::result::Result<BTreeMap<i64, Notification>, ParserError> {
    parse_rows_by(first_rowset(result)?, "notificationID", |f| {
        Ok(Notification {
            id: f.required_int("notificationID")?,
            type_id: f.required_int("typeID")?,
            sender_id: f.required_int("senderID")?,
            timestamp: f.required_ts("sentDate")?,
            read: f.bool("read"),
        })
    })
}

fn id_list(f: &Fields<'_>, name: &str) -> std::result::Result<Vec<i64>, ParserError> {
    let Some(raw) = f.str(name) else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse().map_err(|_| ParserError::InvalidField {
                element: f.element().name.clone(),
                field: name.to_string(),
                value: raw.clone(),
            })
        })
        .collect()
}

fn parse_message_headers(
    result: &Element,
) -> std::result::Result<BTreeMap<i64, MessageHeader>, ParserError> {
    parse_rows_by(first_rowset(result)?, "messageID", |f| {
        Ok(MessageHeader {
            id: f.required_int("messageID")?,
            sender_id: f.required_int("senderID")?,
            timestamp: f.required_ts("sentDate")?,
            title: f.str("title"),
            to_org_id: f.int("toCorpOrAllianceID")?,
            to_char_ids: id_list(&f, "toCharacterIDs")?,
            to_list_ids: id_list(&f, "toListID")?,
        })
    })
}

/// Endpoints scoped to one character of the configured key
#[derive(Debug, Clone)]
pub struct Char {
    api: Arc<Api>,
    char_id: i64,
}

impl ParamSource for Char {
    fn param(&self, name: &str) -> Option<ParamValue> {
        match name {
            "char_id" => Some(ParamValue::Int(self.char_id)),
            _ => None,
        }
    }
}

impl Char {
    pub fn new(char_id: i64, api: Arc<Api>) -> Self {
        Self { api, char_id }
    }

    pub fn char_id(&self) -> i64 {
        self.char_id
    }

    fn call<T>(
        &self,
        spec: &EndpointSpec,
        args: CallArgs,
        prefetched: Option<Envelope>,
        parse: impl FnOnce(&Element) -> std::result::Result<T, ParserError>,
    ) -> Result<ApiResult<T>> {
        binder::call(&self.api, spec, self, args, prefetched, |env| {
            env.try_map(|r| parse(&r))
        })
    }

    /// The raw `char/AccountBalance` envelope, for sharing between
    /// [`Char::wallet_info`] and [`Char::wallet_balance`]
    pub fn wallet_envelope(&self) -> Result<Envelope> {
        binder::call(&self.api, &WALLET_INFO, self, CallArgs::new(), None, Ok)
    }

    /// The character's wallet; pass `prefetched` to reuse an envelope from
    /// [`Char::wallet_envelope`]
    pub fn wallet_info(&self, prefetched: Option<Envelope>) -> Result<ApiResult<WalletAccount>> {
        self.call(&WALLET_INFO, CallArgs::new(), prefetched, |r| {
            parsing::wallet_accounts(r)?
                .into_iter()
                .next()
                .ok_or_else(|| ParserError::MissingElement {
                    element: "row".to_string(),
                })
        })
    }

    pub fn wallet_balance(&self, prefetched: Option<Envelope>) -> Result<ApiResult<f64>> {
        Ok(self.wallet_info(prefetched)?.map(|account| account.balance))
    }

    /// Journal entries, newest first; `before_id` pages backwards from a
    /// `refID` and `limit` caps the row count
    pub fn wallet_journal(
        &self,
        before_id: Option<i64>,
        limit: Option<i64>,
    ) -> Result<ApiResult<Vec<JournalEntry>>> {
        let args = CallArgs::new().arg(before_id).arg(limit);
        self.call(&WALLET_JOURNAL, args, None, parsing::wallet_journal)
    }

    pub fn wallet_transactions(
        &self,
        before_id: Option<i64>,
        limit: Option<i64>,
    ) -> Result<ApiResult<Vec<Transaction>>> {
        let args = CallArgs::new().arg(before_id).arg(limit);
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

    pub fn character_sheet(&self) -> Result<ApiResult<CharacterSheet>> {
        self.call(&CHARACTER_SHEET, CallArgs::new(), None, parse_character_sheet)
    }

    pub fn skill_queue(&self) -> Result<ApiResult<Vec<QueuedSkill>>> {
        self.call(&SKILL_QUEUE, CallArgs::new(), None, parse_skill_queue)
    }

    pub fn standings(&self) -> Result<ApiResult<Standings>> {
        self.call(&STANDINGS, CallArgs::new(), None, |r| {
            parsing::standings(r, "characterNPCStandings")
        })
    }

    pub fn contacts(&self) -> Result<ApiResult<ContactLists>> {
        self.call(&CONTACTS, CallArgs::new(), None, parsing::contact_lists)
    }

    pub fn notifications(&self) -> Result<ApiResult<BTreeMap<i64, Notification>>> {
        self.call(&NOTIFICATIONS, CallArgs::new(), None, parse_notifications)
    }

    pub fn message_headers(&self) -> Result<ApiResult<BTreeMap<i64, MessageHeader>>> {
        self.call(&MESSAGE_HEADERS, CallArgs::new(), None, parse_message_headers)
    }
}
