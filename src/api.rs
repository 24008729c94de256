//! Request engine.
//!
//! Resolves a logical endpoint request to an envelope: derive the cache key,
//! replay a cached body or fetch exactly once, parse the `eveapi` envelope,
//! store the body for the server-stated lifetime, then surface either the
//! `<result>` subtree or the remote `<error>`.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::cache::{Cache, DiskCache, MemoryCache, NullCache, TieredCache};
use crate::config::{CacheBackend, Config};
use crate::error::{ApiError, Error, ParserError, Result, XmlError};
use crate::http_client::{
    ApiRequest, DEFAULT_BASE_HOST, HttpClientConfig, HttpTransport, Transport,
};
use crate::timestamp::{Fields, format_timestamp};
use crate::xml::Element;

/// A parsed value together with the server's timestamps for it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResult<T> {
    pub result: T,
    /// Server clock when the response was generated, epoch seconds
    pub timestamp: i64,
    /// Point after which the response must not be reused, epoch seconds
    pub expires: i64,
}

impl<T> ApiResult<T> {
    pub fn new(result: T, timestamp: i64, expires: i64) -> Self {
        Self {
            result,
            timestamp,
            expires,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResult<U> {
        ApiResult::new(f(self.result), self.timestamp, self.expires)
    }

    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> std::result::Result<U, E>) -> Result<ApiResult<U>>
    where
        Error: From<E>,
    {
        Ok(ApiResult::new(f(self.result)?, self.timestamp, self.expires))
    }

    /// Lifetime the server granted this response, in seconds
    pub fn ttl(&self) -> i64 {
        self.expires - self.timestamp
    }
}

/// The raw envelope handed to endpoint parsers
pub type Envelope = ApiResult<Element>;

/// A request parameter value before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Epoch seconds, sent in the API's date-time format
    Timestamp(i64),
    List(Vec<ParamValue>),
    None,
}

impl ParamValue {
    pub fn is_none(&self) -> bool {
        matches!(self, ParamValue::None)
    }

    /// Wire form of the value; `None` has no wire form and is omitted
    pub fn normalize(&self) -> Result<Option<String>> {
        let text = match self {
            ParamValue::None => return Ok(None),
            ParamValue::Str(s) => s.clone(),
            ParamValue::Int(i) => i.to_string(),
            ParamValue::Float(f) => f.to_string(),
            ParamValue::Bool(b) => (if *b { "1" } else { "0" }).to_string(),
            ParamValue::Timestamp(ts) => format_timestamp(*ts)?,
            ParamValue::List(items) => {
                let mut parts = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(part) = item.normalize()? {
                        parts.push(part);
                    }
                }
                parts.join(",")
            }
        };
        Ok(Some(text))
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ParamValue::None, Into::into)
    }
}

/// Ordered request parameters keyed by remote name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Vec<(String, ParamValue)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a parameter, replacing any earlier value under the same name
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Wire pairs sorted by name, with `None` values dropped
    pub fn normalize(&self) -> Result<Vec<(String, String)>> {
        let mut pairs = Vec::with_capacity(self.0.len());
        for (name, value) in &self.0 {
            if let Some(text) = value.normalize()? {
                pairs.push((name.clone(), text));
            }
        }
        pairs.sort();
        Ok(pairs)
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// Stable cache key for a path and its wire parameters.
///
/// Parameters are sorted first, so any ordering of the same pairs yields the
/// same key. Every component is length-prefixed before hashing.
pub fn cache_key(path: &str, params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort();

    let mut hasher = Sha256::new();
    let mut feed = |part: &str| {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    };
    feed(path);
    for (name, value) in sorted {
        feed(name);
        feed(value);
    }
    format!("{:x}", hasher.finalize())
}

/// Whether error envelopes are stored like successful ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorCachePolicy {
    /// Store error bodies for their stated lifetime and replay them
    #[default]
    Cache,
    /// Never store error bodies
    Skip,
}

/// The `keyID`/`vCode` credential pair
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey {
    pub key_id: i64,
    pub vcode: String,
}

impl ApiKey {
    pub fn new(key_id: i64, vcode: impl Into<String>) -> Self {
        Self {
            key_id,
            vcode: vcode.into(),
        }
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKey")
            .field("key_id", &self.key_id)
            .field("vcode", &"<redacted>")
            .finish()
    }
}

/// Envelope contents before the error/result split
struct ParsedEnvelope {
    timestamp: i64,
    expires: i64,
    outcome: std::result::Result<Element, ApiError>,
}

fn parse_envelope(body: &str) -> Result<ParsedEnvelope> {
    let root = Element::parse(body)?;
    let fields = Fields::children(&root);
    let shape = |e: ParserError| Error::from(XmlError::Shape(e.to_string()));

    let timestamp = fields.required_ts("currentTime").map_err(shape)?;
    let expires = fields.required_ts("cachedUntil").map_err(shape)?;

    let outcome = if let Some(error) = root.child("error") {
        let code = Fields::attributes(error).required_int("code").map_err(shape)?;
        Err(ApiError {
            code,
            message: error.text().map(str::trim).unwrap_or_default().to_string(),
            timestamp,
            expires,
        })
    } else if let Some(result) = root.child("result") {
        Ok(result.clone())
    } else {
        return Err(XmlError::Shape("envelope has neither <result> nor <error>".to_string()).into());
    };

    Ok(ParsedEnvelope {
        timestamp,
        expires,
        outcome,
    })
}

/// Client for the XML API.
///
/// Owns the cache and the transport. Domain wrappers share one `Api` through
/// an `Arc`, and with it one cache.
pub struct Api {
    base_host: String,
    api_key: Option<ApiKey>,
    cache: Arc<dyn Cache>,
    transport: Arc<dyn Transport>,
    error_policy: ErrorCachePolicy,
    last_timestamps: Mutex<Option<(i64, i64)>>,
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api")
            .field("base_host", &self.base_host)
            .field("api_key", &self.api_key)
            .field("error_policy", &self.error_policy)
            .finish_non_exhaustive()
    }
}

impl Api {
    /// Client on the default host with an in-memory cache and HTTP transport
    pub fn new() -> Result<Self> {
        let transport = HttpTransport::new(HttpClientConfig::default())?;
        Ok(Self::with_parts(
            Arc::new(MemoryCache::default()),
            Arc::new(transport),
        ))
    }

    /// Client over an explicit cache and transport
    pub fn with_parts(cache: Arc<dyn Cache>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_host: DEFAULT_BASE_HOST.to_string(),
            api_key: None,
            cache,
            transport,
            error_policy: ErrorCachePolicy::default(),
            last_timestamps: Mutex::new(None),
        }
    }

    /// Build a client from loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache: Arc<dyn Cache> = match config.cache.backend {
            CacheBackend::Memory => Arc::new(MemoryCache::new(config.cache.max_memory_entries)),
            CacheBackend::Disk => Arc::new(DiskCache::new(config.cache.directory.clone())),
            CacheBackend::Tiered => Arc::new(TieredCache::new(
                MemoryCache::new(config.cache.max_memory_entries),
                DiskCache::new(config.cache.directory.clone()),
            )),
            CacheBackend::None => Arc::new(NullCache),
        };

        let transport = HttpTransport::new(HttpClientConfig {
            timeout_seconds: config.network.timeout_seconds,
            user_agent: config.api.user_agent.clone(),
        })?;

        let mut api = Self::with_parts(cache, Arc::new(transport))
            .with_base_host(config.api.base_host.clone());
        if let (Some(key_id), Some(vcode)) = (config.api.key_id, config.api.vcode.as_ref()) {
            api = api.with_api_key(ApiKey::new(key_id, vcode.clone()));
        }
        if !config.api.cache_errors {
            api = api.with_error_policy(ErrorCachePolicy::Skip);
        }
        Ok(api)
    }

    pub fn with_base_host(mut self, base_host: impl Into<String>) -> Self {
        self.base_host = base_host.into();
        self
    }

    pub fn with_api_key(mut self, api_key: ApiKey) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn with_error_policy(mut self, policy: ErrorCachePolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn base_host(&self) -> &str {
        &self.base_host
    }

    pub fn api_key(&self) -> Option<&ApiKey> {
        self.api_key.as_ref()
    }

    pub fn error_policy(&self) -> ErrorCachePolicy {
        self.error_policy
    }

    pub fn cache(&self) -> &Arc<dyn Cache> {
        &self.cache
    }

    /// `(timestamp, expires)` of the most recently parsed envelope,
    /// including envelopes that carried an error
    pub fn last_timestamps(&self) -> Option<(i64, i64)> {
        *self.last_timestamps.lock()
    }

    /// Wire parameters for a request, credentials included
    fn wire_params(&self, params: &Params) -> Result<Vec<(String, String)>> {
        let mut params = params.clone();
        if let Some(key) = &self.api_key {
            params.insert("keyID", key.key_id);
            params.insert("vCode", key.vcode.clone());
        }
        params.normalize()
    }

    /// Cache key this client would use for a request
    pub fn request_key(&self, path: &str, params: &Params) -> Result<String> {
        Ok(cache_key(path, &self.wire_params(params)?))
    }

    /// Fetch an endpoint, replaying the cached body while it is fresh.
    ///
    /// Fails with a transport error on network failure, [`Error::Parse`] on a
    /// malformed body, and [`Error::Api`] when the envelope holds an
    /// `<error>`. A cached error envelope is replayed as the same error.
    pub fn fetch(&self, path: &str, params: &Params) -> Result<Envelope> {
        let wire = self.wire_params(params)?;
        let key = cache_key(path, &wire);

        let (body, cached) = match self.cache.get(&key)? {
            Some(body) => {
                debug!(path = %path, key = %key, "Cache hit");
                (body, true)
            }
            None => {
                debug!(path = %path, key = %key, "Cache miss");
                let request = ApiRequest::new(&self.base_host, path, wire);
                (self.transport.send(&request)?, false)
            }
        };

        let envelope = parse_envelope(&body)?;
        *self.last_timestamps.lock() = Some((envelope.timestamp, envelope.expires));

        if !cached {
            let ttl = envelope.expires - envelope.timestamp;
            match (&envelope.outcome, self.error_policy) {
                (Err(err), ErrorCachePolicy::Skip) => {
                    debug!(path = %path, code = err.code, "Not caching error envelope");
                }
                (Err(err), ErrorCachePolicy::Cache) => {
                    warn!(path = %path, code = err.code, ttl, "Caching error envelope");
                    self.cache.put(&key, &body, ttl)?;
                }
                (Ok(_), _) => {
                    debug!(path = %path, key = %key, ttl, "Caching response");
                    self.cache.put(&key, &body, ttl)?;
                }
            }
        }

        let result = envelope.outcome?;
        Ok(ApiResult::new(result, envelope.timestamp, envelope.expires))
    }
}
