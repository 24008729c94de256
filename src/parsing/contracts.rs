use std::collections::BTreeMap;

use serde::Serialize;

use super::{first_rowset, parse_rows_by};
use crate::error::ParserError;
use crate::xml::Element;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contract {
    pub id: i64,
    pub issuer_id: i64,
    pub issuer_corp_id: i64,
    pub assignee_id: Option<i64>,
    pub acceptor_id: Option<i64>,
    pub start_station_id: Option<i64>,
    pub end_station_id: Option<i64>,
    /// `ItemExchange`, `Courier`, `Auction` or `Loan`
    pub contract_type: String,
    pub status: String,
    pub title: Option<String>,
    pub for_corp: bool,
    pub availability: String,
    pub issued_ts: i64,
    pub expired_ts: Option<i64>,
    pub accepted_ts: Option<i64>,
    pub completed_ts: Option<i64>,
    pub duration_days: Option<i64>,
    pub price: Option<f64>,
    pub reward: Option<f64>,
    pub collateral: Option<f64>,
    pub buyout: Option<f64>,
    pub volume: Option<f64>,
}

/// Contracts keyed by contract id
pub fn contracts(result: &Element) -> Result<BTreeMap<i64, Contract>, ParserError> {
    parse_rows_by(first_rowset(result)?, "contractID", |f| {
        Ok(Contract {
            id: f.required_int("contractID")?,
            issuer_id: f.required_int("issuerID")?,
            issuer_corp_id: f.required_int("issuerCorpID")?,
            assignee_id: f.int("assigneeID")?.filter(|id| *id != 0),
            acceptor_id: f.int("acceptorID")?.filter(|id| *id != 0),
            start_station_id: f.int("startStationID")?,
            end_station_id: f.int("endStationID")?,
            contract_type: f.required_str("type")?,
            status: f.required_str("status")?,
            title: f.str("title"),
            for_corp: f.bool("forCorp"),
            availability: f.required_str("availability")?,
            issued_ts: f.required_ts("dateIssued")?,
            expired_ts: f.ts("dateExpired")?,
            accepted_ts: f.ts("dateAccepted")?,
            completed_ts: f.ts("dateCompleted")?,
            duration_days: f.int("numDays")?,
            price: f.float("price")?,
            reward: f.float("reward")?,
            collateral: f.float("collateral")?,
            buyout: f.float("buyout")?,
            volume: f.float("volume")?,
        })
    })
}
