use std::sync::OnceLock;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_HOST: &str = "api.eveonline.com";

/// Configuration for the HTTP transport
#[derive(Debug, Clone, PartialEq)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Extra text appended to the library's own user agent
    pub user_agent: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 60,
            user_agent: None,
        }
    }
}

impl HttpClientConfig {
    /// The full `User-Agent` header value
    pub fn user_agent_header(&self) -> String {
        let base = format!("eveapi/{}", env!("CARGO_PKG_VERSION"));
        match self.user_agent.as_deref().map(str::trim) {
            Some(extra) if !extra.is_empty() => format!("{} {}", base, extra),
            _ => base,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One outgoing API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub url: String,
    pub params: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(base_host: &str, path: &str, params: Vec<(String, String)>) -> Self {
        Self {
            url: format!("https://{}/{}.xml.aspx", base_host, path),
            params,
        }
    }

    /// GET without parameters, url-encoded POST otherwise
    pub fn method(&self) -> Method {
        if self.params.is_empty() {
            Method::Get
        } else {
            Method::Post
        }
    }
}

/// Performs a single request and returns the response body.
///
/// Implementations do not retry; any failure is final for that call.
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    fn send(&self, request: &ApiRequest) -> Result<String>;
}

/// Blocking HTTP transport for the API host.
///
/// The `reqwest` blocking client owns a private runtime, so it must not be
/// built or dropped on an async runtime thread. It is built on the first
/// [`Transport::send`], and a transport dropped inside a runtime hands the
/// client to the blocking pool.
pub struct HttpTransport {
    client: OnceLock<Client>,
    config: HttpClientConfig,
}

impl HttpTransport {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        if config.timeout_seconds == 0 {
            return Err(Error::Config(
                "HTTP timeout must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            client: OnceLock::new(),
            config,
        })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    fn client(&self) -> Result<&Client> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .user_agent(self.config.user_agent_header())
            .build()
            .map_err(Error::from)?;
        debug!(timeout_seconds = self.config.timeout_seconds, "Built HTTP client");

        Ok(self.client.get_or_init(|| client))
    }

    fn map_send_error(&self, url: &str, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                url: url.to_string(),
                timeout_seconds: self.config.timeout_seconds,
            }
        } else {
            Error::from(err)
        }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> Result<String> {
        let method = request.method();
        debug!(url = %request.url, ?method, params = request.params.len(), "Sending API request");

        let client = self.client()?;
        let builder = match method {
            Method::Get => client.get(&request.url),
            Method::Post => client.post(&request.url).form(&request.params),
        };

        let response = builder
            .send()
            .map_err(|e| self.map_send_error(&request.url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: request.url.clone(),
                status: status.as_u16(),
                message: format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                ),
            });
        }

        response
            .text()
            .map_err(|e| self.map_send_error(&request.url, e))
    }
}

impl Drop for HttpTransport {
    fn drop(&mut self) {
        if let Some(client) = self.client.take()
            && let Ok(handle) = tokio::runtime::Handle::try_current()
        {
            handle.spawn_blocking(move || drop(client));
        }
    }
}
