use std::collections::BTreeMap;

use serde::Serialize;

use super::{first_rowset, parse_rows_by};
use crate::error::ParserError;
use crate::xml::Element;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderState {
    Active,
    Closed,
    Expired,
    Cancelled,
    Pending,
    Deleted,
    Unknown(i64),
}

impl From<i64> for OrderState {
    fn from(code: i64) -> Self {
        match code {
            0 => OrderState::Active,
            1 => OrderState::Closed,
            2 => OrderState::Expired,
            3 => OrderState::Cancelled,
            4 => OrderState::Pending,
            5 => OrderState::Deleted,
            other => OrderState::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketOrder {
    pub id: i64,
    pub char_id: i64,
    pub station_id: i64,
    pub amount: i64,
    pub amount_left: i64,
    pub state: OrderState,
    pub type_id: i64,
    pub range: i64,
    pub account_key: i64,
    pub duration_days: i64,
    pub escrow: f64,
    pub price: f64,
    pub order_type: OrderType,
    pub issued_ts: i64,
}

/// Orders keyed by order id
pub fn orders(result: &Element) -> Result<BTreeMap<i64, MarketOrder>, ParserError> {
    parse_rows_by(first_rowset(result)?, "orderID", |f| {
        Ok(MarketOrder {
            id: f.required_int("orderID")?,
            char_id: f.required_int("charID")?,
            station_id: f.required_int("stationID")?,
            amount: f.required_int("volEntered")?,
            amount_left: f.required_int("volRemaining")?,
            state: f.required_int("orderState")?.into(),
            type_id: f.required_int("typeID")?,
            range: f.required_int("range")?,
            account_key: f.required_int("accountKey")?,
            duration_days: f.required_int("duration")?,
            escrow: f.float("escrow")?.unwrap_or(0.0),
            price: f.required_float("price")?,
            order_type: if f.bool("bid") {
                OrderType::Buy
            } else {
                OrderType::Sell
            },
            issued_ts: f.required_ts("issued")?,
        })
    })
}
