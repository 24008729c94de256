use std::sync::Arc;

use eveapi::{Api, Cache, MemoryCache};

use super::mocks::MockTransport;

pub const CURRENT_TIME: &str = "2009-10-18 17:05:31";
pub const CURRENT_TS: i64 = 1255885531;
pub const CACHED_UNTIL: &str = "2009-11-18 17:05:31";
pub const CACHED_UNTIL_TS: i64 = 1258563931;

/// A success envelope around `result_body`
pub fn success_body(result_body: &str) -> String {
    success_body_at(result_body, CURRENT_TIME, CACHED_UNTIL)
}

pub fn success_body_at(result_body: &str, current: &str, cached_until: &str) -> String {
    format!(
        "<?xml version='1.0' encoding='UTF-8'?>\n<eveapi version=\"2\">\n\
         <currentTime>{}</currentTime>\n<result>{}</result>\n\
         <cachedUntil>{}</cachedUntil>\n</eveapi>",
        current, result_body, cached_until
    )
}

/// An error envelope with the given code and message
pub fn error_body(code: i64, message: &str, current: &str, cached_until: &str) -> String {
    format!(
        "<?xml version='1.0' encoding='UTF-8'?>\n<eveapi version=\"2\">\n\
         <currentTime>{}</currentTime>\n<error code=\"{}\">{}</error>\n\
         <cachedUntil>{}</cachedUntil>\n</eveapi>",
        current, code, message, cached_until
    )
}

/// Test harness holding the client and handles to its collaborators
pub struct TestApi {
    pub api: Arc<Api>,
    pub transport: Arc<MockTransport>,
    pub cache: Arc<dyn Cache>,
}

impl TestApi {
    pub fn new() -> Self {
        Self::with_cache(Arc::new(MemoryCache::new(100)))
    }

    pub fn with_cache(cache: Arc<dyn Cache>) -> Self {
        Self::build(cache, |api| api)
    }

    pub fn build(cache: Arc<dyn Cache>, configure: impl FnOnce(Api) -> Api) -> Self {
        let transport = Arc::new(MockTransport::new());
        let api = configure(Api::with_parts(cache.clone(), transport.clone()));
        Self {
            api: Arc::new(api),
            transport,
            cache,
        }
    }
}

/// Value of a wire parameter on a request, if sent
pub fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}
