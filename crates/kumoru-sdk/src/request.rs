//! Fluent request state.
//!
//! A [`Request`] accumulates method, URL, headers, query parameters and body.
//! Problems found while building (an unparseable query string, a value that
//! fails to serialize) are collected rather than returned immediately and
//! surface as a single [`Error::Build`] when the request is executed.

use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::error::{Error, Result};
use crate::signer::ForwardedRequest;

/// Body encodings understood by the Kumoru services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// `application/json`
    Json,
    /// `application/x-www-form-urlencoded`
    Form,
    /// `application/json-patch+json`
    JsonPatch,
    /// `text/plain`
    Text,
    /// `application/xml`
    Xml,
}

impl BodyKind {
    /// MIME type sent as `Content-Type`.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Form => "application/x-www-form-urlencoded",
            Self::JsonPatch => "application/json-patch+json",
            Self::Text => "text/plain",
            Self::Xml => "application/xml",
        }
    }
}

#[derive(Debug, Clone, Default)]
enum Body {
    #[default]
    Empty,
    Json(Map<String, Value>),
    Form(Vec<(String, String)>),
    Raw { kind: BodyKind, data: Vec<u8> },
}

impl Body {
    const fn kind(&self) -> Option<BodyKind> {
        match self {
            Self::Empty => None,
            Self::Json(_) => Some(BodyKind::Json),
            Self::Form(_) => Some(BodyKind::Form),
            Self::Raw { kind, .. } => Some(*kind),
        }
    }

    fn encode(self) -> Result<Vec<u8>> {
        Ok(match self {
            Self::Empty => Vec::new(),
            Self::Json(map) => serde_json::to_vec(&map)?,
            Self::Form(pairs) => form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs)
                .finish()
                .into_bytes(),
            Self::Raw { data, .. } => data,
        })
    }
}

/// A request under construction.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: String,
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    body: Body,
    sign: bool,
    basic_auth: Option<(String, String)>,
    forwarded: Option<ForwardedRequest>,
    errors: Vec<String>,
}

/// A request that passed validation, ready to be sent.
#[derive(Debug)]
pub(crate) struct Prepared {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub kind: Option<BodyKind>,
    pub body: Vec<u8>,
    pub sign: bool,
    pub basic_auth: Option<(String, String)>,
    pub forwarded: Option<ForwardedRequest>,
}

fn is_form(s: &str) -> bool {
    !s.is_empty() && s.split('&').all(|pair| pair.contains('='))
}

fn parse_form(s: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(s.as_bytes()).into_owned().collect()
}

fn value_to_param(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl Request {
    /// Starts a request with an explicit method.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: Body::Empty,
            sign: false,
            basic_auth: None,
            forwarded: None,
            errors: Vec::new(),
        }
    }

    /// `GET` request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// `POST` request.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// `PUT` request.
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    /// `PATCH` request.
    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::PATCH, url)
    }

    /// `DELETE` request.
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// `HEAD` request.
    pub fn head(url: impl Into<String>) -> Self {
        Self::new(Method::HEAD, url)
    }

    /// Method of this request.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// URL without the query parameters added through this builder.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether the request will be signed.
    #[must_use]
    pub const fn is_signed(&self) -> bool {
        self.sign
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds a single query parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Adds query parameters from a JSON object or `a=b&c=d` string.
    #[must_use]
    pub fn query_str(mut self, query: &str) -> Self {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(query) {
            self.query
                .extend(map.iter().filter_map(|(k, v)| Some((k.clone(), value_to_param(v)?))));
        } else if is_form(query) {
            self.query.extend(parse_form(query));
        } else {
            self.errors.push(format!("query string is neither JSON nor form encoded: {query}"));
        }
        self
    }

    /// Adds query parameters from the fields of a serializable struct.
    ///
    /// Keys are lower-cased and `null` fields are skipped.
    #[must_use]
    pub fn query_struct<T: Serialize>(mut self, value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(Value::Object(map)) => self.query.extend(
                map.iter()
                    .filter_map(|(k, v)| Some((k.to_lowercase(), value_to_param(v)?))),
            ),
            Ok(_) => self.errors.push("query struct must serialize to an object".to_string()),
            Err(e) => self.errors.push(format!("query struct: {e}")),
        }
        self
    }

    /// Adds body content from a string.
    ///
    /// A JSON object is merged into a JSON body, a form-encoded string is
    /// appended to a form body, anything else is appended as plain text.
    #[must_use]
    pub fn send_str(mut self, content: &str) -> Self {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(content) {
            match &mut self.body {
                Body::Empty => self.body = Body::Json(map),
                Body::Json(existing) => existing.extend(map),
                _ => self.errors.push("cannot add JSON to a non-JSON body".to_string()),
            }
        } else if is_form(content) {
            let pairs = parse_form(content);
            self = self.form(pairs);
        } else {
            match &mut self.body {
                Body::Empty => {
                    self.body = Body::Raw {
                        kind: BodyKind::Text,
                        data: content.as_bytes().to_vec(),
                    };
                }
                Body::Raw { data, .. } => data.extend_from_slice(content.as_bytes()),
                _ => self.errors.push("cannot add text to a structured body".to_string()),
            }
        }
        self
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Self {
        self.raw_json(BodyKind::Json, value)
    }

    /// Sets an RFC 6902 JSON Patch body.
    #[must_use]
    pub fn json_patch(self, patch: &json_patch::Patch) -> Self {
        self.raw_json(BodyKind::JsonPatch, patch)
    }

    fn raw_json<T: Serialize + ?Sized>(mut self, kind: BodyKind, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(data) => self.body = Body::Raw { kind, data },
            Err(e) => self.errors.push(format!("body: {e}")),
        }
        self
    }

    /// Appends form fields. Repeated keys are kept.
    #[must_use]
    pub fn form<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let pairs = pairs.into_iter().map(|(k, v)| (k.into(), v.into()));
        match &mut self.body {
            Body::Empty => self.body = Body::Form(pairs.collect()),
            Body::Form(existing) => existing.extend(pairs),
            _ => self.errors.push("cannot add form fields to a non-form body".to_string()),
        }
        self
    }

    /// Sets a raw body with an explicit encoding.
    #[must_use]
    pub fn raw(mut self, kind: BodyKind, data: impl Into<Vec<u8>>) -> Self {
        self.body = Body::Raw {
            kind,
            data: data.into(),
        };
        self
    }

    /// Signs the request with the client's tokens when sent.
    #[must_use]
    pub const fn sign(mut self, sign: bool) -> Self {
        self.sign = sign;
        self
    }

    /// Uses HTTP basic authentication. Ignored for signed requests.
    #[must_use]
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = Some((username.into(), password.into()));
        self
    }

    /// Forwards a received request; its signature is embedded in this one.
    #[must_use]
    pub fn forward(mut self, forwarded: ForwardedRequest) -> Self {
        self.forwarded = Some(forwarded);
        self
    }

    pub(crate) fn prepare(self) -> Result<Prepared> {
        if !self.errors.is_empty() {
            return Err(Error::Build(self.errors));
        }

        let bodyless = matches!(self.method, Method::GET | Method::HEAD | Method::DELETE);
        let (kind, body) = if bodyless {
            (None, Vec::new())
        } else {
            (self.body.kind(), self.body.encode()?)
        };

        Ok(Prepared {
            method: self.method,
            url: self.url,
            headers: self.headers,
            query: self.query,
            kind,
            body,
            sign: self.sign,
            basic_auth: self.basic_auth,
            forwarded: self.forwarded,
        })
    }
}
