//! # eveapi Library
//!
//! A caching client for the EVE Online XML API. Requests are resolved
//! through a pluggable cache that honours the server's own `cachedUntil`
//! lifetimes, so repeated calls within that window never reach the network.
//!
//! ```no_run
//! use std::sync::Arc;
//! use eveapi::{Api, ApiKey, Char};
//!
//! # fn main() -> eveapi::Result<()> {
//! let api = Arc::new(Api::new()?.with_api_key(ApiKey::new(1, "vcode")));
//! let character = Char::new(90000001, api);
//! let balance = character.wallet_balance(None)?;
//! println!("{} ISK, fresh until {}", balance.result, balance.expires);
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod api;
pub mod async_api;
pub mod binder;
pub mod cache;
pub mod char;
pub mod config;
pub mod corp;
pub mod error;
pub mod eve;
pub mod http_client;
pub mod map;
pub mod parsing;
pub mod server;
pub mod timestamp;
pub mod xml;

pub use account::{Account, AccountStatus, KeyCharacter, KeyInfo};
pub use api::{
    Api, ApiKey, ApiResult, Envelope, ErrorCachePolicy, ParamValue, Params, cache_key,
};
pub use async_api::AsyncApi;
pub use binder::{CallArgs, EndpointSpec, ParamDefault, ParamSource, ParamSpec};
pub use cache::{
    Cache, CacheMetadata, CacheStats, CleanupStats, ComprehensiveCacheStats, DiskCache,
    MemoryCache, MemoryCacheStats, NullCache, TieredCache,
};
pub use char::Char;
pub use config::{CacheBackend, Config, ConfigManager};
pub use corp::Corp;
pub use error::{
    ApiError, ArgumentError, BinderError, CacheError, Error, ParserError, Result, TimestampError,
};
pub use eve::Eve;
pub use http_client::{ApiRequest, HttpClientConfig, HttpTransport, Transport};
pub use map::Map;
pub use server::Server;
pub use timestamp::{Fields, format_timestamp, parse_timestamp};
pub use xml::Element;
