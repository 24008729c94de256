use std::collections::BTreeMap;

use serde::Serialize;

use super::{NamedId, first_rowset, parse_rows_by};
use crate::error::ParserError;
use crate::xml::Element;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryJob {
    pub id: i64,
    pub installer: NamedId,
    pub facility_id: i64,
    pub solar_system: Option<NamedId>,
    pub station_id: Option<i64>,
    pub activity_id: i64,
    pub blueprint_id: i64,
    pub blueprint_type: NamedId,
    pub blueprint_location_id: Option<i64>,
    pub output_location_id: Option<i64>,
    pub runs: i64,
    pub cost: Option<f64>,
    pub team_id: Option<i64>,
    pub licensed_runs: Option<i64>,
    pub probability: Option<f64>,
    pub product_type: Option<NamedId>,
    pub status: i64,
    pub duration_seconds: Option<i64>,
    pub start_ts: i64,
    pub end_ts: i64,
    pub pause_ts: Option<i64>,
    pub completed_ts: Option<i64>,
    pub completed_by: Option<i64>,
    pub successful_runs: Option<i64>,
}

/// Jobs keyed by job id
pub fn industry_jobs(result: &Element) -> Result<BTreeMap<i64, IndustryJob>, ParserError> {
    parse_rows_by(first_rowset(result)?, "jobID", |f| {
        Ok(IndustryJob {
            id: f.required_int("jobID")?,
            installer: NamedId::new(f.required_int("installerID")?, f.str("installerName")),
            facility_id: f.required_int("facilityID")?,
            solar_system: NamedId::from_fields(&f, "solarSystemID", "solarSystemName")?,
            station_id: f.int("stationID")?,
            activity_id: f.required_int("activityID")?,
            blueprint_id: f.required_int("blueprintID")?,
            blueprint_type: NamedId::new(
                f.required_int("blueprintTypeID")?,
                f.str("blueprintTypeName"),
            ),
            blueprint_location_id: f.int("blueprintLocationID")?,
            output_location_id: f.int("outputLocationID")?,
            runs: f.required_int("runs")?,
            cost: f.float("cost")?,
            team_id: f.int("teamID")?,
            licensed_runs: f.int("licensedRuns")?,
            probability: f.float("probability")?,
            product_type: NamedId::from_fields(&f, "productTypeID", "productTypeName")?,
            status: f.required_int("status")?,
            duration_seconds: f.int("timeInSeconds")?,
            start_ts: f.required_ts("startDate")?,
            end_ts: f.required_ts("endDate")?,
            // The API writes an all-zero date for jobs never paused or completed
            pause_ts: f.ts("pauseDate")?.filter(|ts| *ts > 0),
            completed_ts: f.ts("completedDate")?.filter(|ts| *ts > 0),
            completed_by: f.int("completedCharacterID")?.filter(|id| *id != 0),
            successful_runs: f.int("successfulRuns")?,
        })
    })
}
