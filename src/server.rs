use std::sync::Arc;

use serde::Serialize;

use crate::api::{Api, ApiResult};
use crate::binder::{self, CallArgs, EndpointSpec};
use crate::error::{ParserError, Result};
use crate::timestamp::Fields;
use crate::xml::Element;

static SERVER_STATUS: EndpointSpec = EndpointSpec::bare("server/ServerStatus");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerStatus {
    pub online: bool,
    pub players: i64,
}

fn parse_server_status(result: &Element) -> std::result::Result<ServerStatus, ParserError> {
    let f = Fields::children(result);
    Ok(ServerStatus {
        online: f.required_str("serverOpen")?.eq_ignore_ascii_case("true"),
        players: f.required_int("onlinePlayers")?,
    })
}

/// Cluster status endpoints
#[derive(Debug, Clone)]
pub struct Server {
    api: Arc<Api>,
}

impl Server {
    pub fn new(api: Arc<Api>) -> Self {
        Self { api }
    }

    pub fn server_status(&self) -> Result<ApiResult<ServerStatus>> {
        binder::call(&self.api, &SERVER_STATUS, &(), CallArgs::new(), None, |env| {
            env.try_map(|r| parse_server_status(&r))
        })
    }
}
