//! HTTP dispatch.

use chrono::Utc;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
pub use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::{Url, form_urlencoded};

use crate::config::{Config, Endpoints};
use crate::error::{Error, Result};
use crate::request::{BodyKind, Request};
use crate::signer::{SigningRequest, Signer};

/// Header values that are never written to debug output.
const REDACTED_HEADERS: &[&str] = &["authorization", "proxy-authorization"];

/// Form fields whose values are never written to debug output.
const REDACTED_FIELDS: &[&str] = &["password"];

/// Joins a service base URL and an API path.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// A fully read response.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw body.
    pub body: Vec<u8>,
}

impl Response {
    /// Body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Turns a 4xx or 5xx response into [`Error::Api`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] for error statuses.
    pub fn error_for_status(self) -> Result<Self> {
        if self.status.is_client_error() || self.status.is_server_error() {
            return Err(self.into_api_error());
        }
        Ok(self)
    }

    /// Requires exactly `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] for any other status.
    pub fn expect_status(self, expected: StatusCode) -> Result<Self> {
        if self.status == expected {
            Ok(self)
        } else {
            Err(self.into_api_error())
        }
    }

    fn into_api_error(self) -> Error {
        Error::Api {
            status: self.status,
            body: self.text().trim().to_string(),
        }
    }
}

/// Client for the Kumoru services.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    config: Config,
    http: reqwest::Client,
}

impl Client {
    /// Creates a client from a loaded configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Loads the configuration from its default location.
    ///
    /// # Errors
    ///
    /// Returns an error if no configuration path can be determined.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(Config::load()?))
    }

    /// The configuration this client signs with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Service base URLs.
    #[must_use]
    pub const fn endpoints(&self) -> &Endpoints {
        &self.config.endpoints
    }

    /// Sends a request and reads the full response.
    ///
    /// # Errors
    ///
    /// Returns the errors collected while building the request, a signing
    /// error, or a transport error. Error statuses are not errors here; see
    /// [`Response::error_for_status`].
    pub async fn execute(&self, request: Request) -> Result<Response> {
        let prepared = request.prepare()?;

        let mut url = Url::parse(&prepared.url)?;
        if !prepared.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&prepared.query);
        }

        let content_type = prepared.kind.map(|k| k.content_type());
        let mut builder = self.http.request(prepared.method.clone(), url.clone());
        for (name, value) in &prepared.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }

        if prepared.sign {
            let signer = Signer::new(self.config.tokens.clone(), self.config.role_uuid.as_str());
            let signing = SigningRequest::new(&prepared.method, url.path())
                .with_body(content_type, &prepared.body)
                .with_forwarded(prepared.forwarded.as_ref());
            let signed = signer.sign(&signing, Utc::now())?;
            for (name, value) in signed.pairs() {
                builder = builder.header(name, value);
            }
        } else if let Some((username, password)) = &prepared.basic_auth {
            builder = builder.basic_auth(username, Some(password));
        }

        if !prepared.body.is_empty() {
            builder = builder.body(prepared.body.clone());
        }

        let request = builder.build()?;
        if self.config.debug {
            dump_request(&request, &prepared.body);
        }

        let response = self.http.execute(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        let response = Response { status, headers, body };
        if self.config.debug {
            dump_response(&prepared.method, &url, &response);
        }

        Ok(response)
    }
}

fn header_lines(headers: &HeaderMap) -> String {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if REDACTED_HEADERS.contains(&name.as_str()) {
                "[redacted]"
            } else {
                value.to_str().unwrap_or("[binary]")
            };
            format!("{name}: {value}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Request body for debug output. Form bodies are shown decoded, with
/// sensitive field values replaced.
fn body_text(headers: &HeaderMap, body: &[u8]) -> String {
    let is_form = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with(BodyKind::Form.content_type()));
    if !is_form {
        return String::from_utf8_lossy(body).into_owned();
    }

    form_urlencoded::parse(body)
        .map(|(name, value)| {
            if REDACTED_FIELDS.contains(&name.as_ref()) {
                format!("{name}=[redacted]")
            } else {
                format!("{name}={value}")
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn dump_request(request: &reqwest::Request, body: &[u8]) {
    debug!(
        method = %request.method(),
        url = %request.url(),
        headers = %header_lines(request.headers()),
        body = %body_text(request.headers(), body),
        "request"
    );
}

fn dump_response(method: &Method, url: &Url, response: &Response) {
    debug!(
        method = %method,
        url = %url,
        status = %response.status,
        headers = %header_lines(&response.headers),
        body = %response.text(),
        "response"
    );
}
