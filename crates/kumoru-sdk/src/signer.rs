//! Request signing.
//!
//! Every signed request carries an `Authorization` header of the form
//! `base64("<public token>:<hex hmac>")`. The HMAC-SHA256 digest, keyed by
//! the private token, covers a canonical string built line by line:
//!
//! ```text
//! POST
//! content-md5:<hex md5 of body>        (POST, PUT, PATCH)
//! content-type:<content type>          (POST, PUT, PATCH)
//! proxy-authorization:<value>          (forwarded requests)
//! x-kumoru-context:<role uuid>         (omitted for the account bootstrap)
//! x-kumoru-date:11 Jul 16 19:42 +0000
//! /v1/applications/
//! ```
//!
//! The authorization service rejects signatures older than
//! [`SIGNATURE_VALIDITY`].

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, TimeDelta, Utc};
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::trace;

use crate::config::Tokens;
use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// `Authorization` header.
pub const AUTHORIZATION: &str = "Authorization";
/// Hex MD5 of the request body.
pub const CONTENT_MD5: &str = "Content-MD5";
/// `Content-Type` header.
pub const CONTENT_TYPE: &str = "Content-Type";
/// Signature of a forwarded request.
pub const PROXY_AUTHORIZATION: &str = "Proxy-Authorization";
/// Role the request acts as.
pub const KUMORU_CONTEXT: &str = "X-Kumoru-Context";
/// Signing timestamp.
pub const KUMORU_DATE: &str = "X-Kumoru-Date";
/// Fallback timestamp header on forwarded requests.
pub const DATE: &str = "Date";

/// RFC 822 with a numeric zone, e.g. `11 Jul 16 19:42 +0000`.
pub const DATE_FORMAT: &str = "%d %b %y %H:%M %z";

/// How long a signature stays acceptable.
pub const SIGNATURE_VALIDITY: TimeDelta = TimeDelta::minutes(15);

/// Formats a signing timestamp in UTC.
#[must_use]
pub fn format_date(t: DateTime<Utc>) -> String {
    t.format(DATE_FORMAT).to_string()
}

/// Lowercase hex MD5 of `body`.
#[must_use]
pub fn content_md5(body: &[u8]) -> String {
    hex::encode(Md5::digest(body))
}

/// Whether `method` carries a body that is covered by the signature.
#[must_use]
pub fn has_signed_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}

/// Account lookup is how a client learns its role, so it cannot be signed
/// with a role context.
#[must_use]
pub fn is_bootstrap(method: &Method, path: &str) -> bool {
    *method == Method::GET && path.contains("/accounts/")
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn hmac_hex(key: &str, message: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes()).map_err(|e| Error::Signing {
        reason: e.to_string(),
    })?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Lines of the canonical signing string, in signing order.
struct Canonical<'a> {
    method: &'a str,
    content: Option<(&'a str, &'a str)>,
    proxy_authorization: Option<&'a str>,
    context: Option<&'a str>,
    date: &'a str,
    path: &'a str,
}

impl Canonical<'_> {
    fn render(&self) -> String {
        let mut s = format!("{}\n", self.method);
        if let Some((md5, content_type)) = self.content {
            s.push_str(&format!("content-md5:{md5}\ncontent-type:{content_type}\n"));
        }
        if let Some(proxy) = self.proxy_authorization {
            s.push_str(&format!("proxy-authorization:{proxy}\n"));
        }
        if let Some(context) = self.context {
            s.push_str(&format!("x-kumoru-context:{context}\n"));
        }
        s.push_str(&format!("x-kumoru-date:{}\n{}", self.date, self.path));
        s
    }
}

/// A request received by a service that is passed on to another service.
///
/// The downstream call embeds the original caller's signature in its
/// `Proxy-Authorization` header so the authorization service can check both.
#[derive(Debug, Clone)]
pub struct ForwardedRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
}

impl ForwardedRequest {
    /// Wraps a received request.
    pub fn new(method: Method, path: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            method,
            path: path.into(),
            headers,
        }
    }

    /// Role context the original caller acted as, if any.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        header_str(&self.headers, KUMORU_CONTEXT).filter(|c| !c.is_empty())
    }

    /// Builds the `Proxy-Authorization` value for this request.
    ///
    /// The value is `base64(<decoded Authorization> ":" base64(components))`
    /// where the components summarize the original request.
    ///
    /// # Errors
    ///
    /// Returns an error if the original `Authorization` is not valid base64.
    pub fn proxy_authorization(&self) -> Result<String> {
        let mut components = format!("{}\n", self.method);

        for name in [CONTENT_MD5, CONTENT_TYPE, PROXY_AUTHORIZATION] {
            if let Some(value) = header_str(&self.headers, name).filter(|v| !v.is_empty()) {
                components.push_str(&format!("{}:{value}\n", name.to_ascii_lowercase()));
            }
        }

        match header_str(&self.headers, KUMORU_DATE).filter(|v| !v.is_empty()) {
            Some(date) => components.push_str(&format!("x-kumoru-date:{date}\n")),
            None => {
                let date = header_str(&self.headers, DATE).unwrap_or_default();
                components.push_str(&format!("date:{date}\n"));
            }
        }
        components.push_str(&self.path);

        let original = header_str(&self.headers, AUTHORIZATION).unwrap_or_default();
        let mut value = STANDARD.decode(original).map_err(|e| Error::Signing {
            reason: format!("forwarded authorization is not base64: {e}"),
        })?;
        value.push(b':');
        value.extend_from_slice(STANDARD.encode(components).as_bytes());

        Ok(STANDARD.encode(value))
    }
}

/// What the signer needs to know about an outgoing request.
#[derive(Debug, Clone, Copy)]
pub struct SigningRequest<'a> {
    /// HTTP method.
    pub method: &'a Method,
    /// URL path without the query string.
    pub path: &'a str,
    /// Content type of the body, if any.
    pub content_type: Option<&'a str>,
    /// Exact body bytes that will be sent.
    pub body: &'a [u8],
    /// Request being forwarded on behalf of another caller.
    pub forwarded: Option<&'a ForwardedRequest>,
}

impl<'a> SigningRequest<'a> {
    /// A request without body or forwarding.
    #[must_use]
    pub const fn new(method: &'a Method, path: &'a str) -> Self {
        Self {
            method,
            path,
            content_type: None,
            body: &[],
            forwarded: None,
        }
    }

    /// Sets the body and its content type.
    #[must_use]
    pub const fn with_body(mut self, content_type: Option<&'a str>, body: &'a [u8]) -> Self {
        self.content_type = content_type;
        self.body = body;
        self
    }

    /// Sets the forwarded request.
    #[must_use]
    pub const fn with_forwarded(mut self, forwarded: Option<&'a ForwardedRequest>) -> Self {
        self.forwarded = forwarded;
        self
    }
}

/// Headers produced by [`Signer::sign`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    /// `Content-MD5`, set for POST/PUT/PATCH.
    pub content_md5: Option<String>,
    /// `Proxy-Authorization`, set for forwarded requests.
    pub proxy_authorization: Option<String>,
    /// `X-Kumoru-Context`, absent for the account bootstrap.
    pub context: Option<String>,
    /// `X-Kumoru-Date`.
    pub date: String,
    /// `Authorization`.
    pub authorization: String,
}

impl SignedHeaders {
    /// Header name/value pairs to put on the request.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::with_capacity(5);
        if let Some(md5) = &self.content_md5 {
            pairs.push((CONTENT_MD5, md5.as_str()));
        }
        if let Some(proxy) = &self.proxy_authorization {
            pairs.push((PROXY_AUTHORIZATION, proxy.as_str()));
        }
        if let Some(context) = &self.context {
            pairs.push((KUMORU_CONTEXT, context.as_str()));
        }
        pairs.push((KUMORU_DATE, self.date.as_str()));
        pairs.push((AUTHORIZATION, self.authorization.as_str()));
        pairs
    }

    /// Converts into a [`HeaderMap`].
    ///
    /// # Errors
    ///
    /// Returns an error if a value contains characters not allowed in headers.
    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::new();
        for (name, value) in self.pairs() {
            let invalid = |e: &dyn std::fmt::Display| Error::Signing {
                reason: format!("invalid {name} header: {e}"),
            };
            let header = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(&e))?;
            let value = HeaderValue::from_str(value).map_err(|e| invalid(&e))?;
            map.insert(header, value);
        }
        Ok(map)
    }
}

/// Signs requests with a token pair on behalf of a role.
#[derive(Debug, Clone)]
pub struct Signer {
    tokens: Tokens,
    role_uuid: String,
}

impl Signer {
    /// Creates a signer.
    pub fn new(tokens: Tokens, role_uuid: impl Into<String>) -> Self {
        Self {
            tokens,
            role_uuid: role_uuid.into(),
        }
    }

    /// Public token used in the `Authorization` header.
    #[must_use]
    pub fn public_token(&self) -> &str {
        &self.tokens.public
    }

    /// Signs `request` as of `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if a forwarded request carries an undecodable
    /// `Authorization` header.
    pub fn sign(&self, request: &SigningRequest<'_>, now: DateTime<Utc>) -> Result<SignedHeaders> {
        let date = format_date(now);

        let content_md5 = has_signed_body(request.method).then(|| content_md5(request.body));

        let proxy_authorization = request
            .forwarded
            .map(ForwardedRequest::proxy_authorization)
            .transpose()?;

        let context = if is_bootstrap(request.method, request.path) {
            None
        } else {
            let forwarded_context = request.forwarded.and_then(ForwardedRequest::context);
            Some(forwarded_context.unwrap_or(&self.role_uuid).to_string())
        };

        let canonical = Canonical {
            method: request.method.as_str(),
            content: content_md5
                .as_deref()
                .map(|md5| (md5, request.content_type.unwrap_or_default())),
            proxy_authorization: proxy_authorization.as_deref(),
            context: context.as_deref(),
            date: &date,
            path: request.path,
        }
        .render();

        trace!(signing_string = %canonical, "signing request");

        let digest = hmac_hex(&self.tokens.private, &canonical)?;
        let authorization = STANDARD.encode(format!("{}:{digest}", self.tokens.public));

        Ok(SignedHeaders {
            content_md5,
            proxy_authorization,
            context,
            date,
            authorization,
        })
    }
}

/// Checks a received request's signature against `tokens`.
///
/// The canonical string is rebuilt from the received headers, the body hash
/// is recomputed, and the timestamp must lie within [`SIGNATURE_VALIDITY`]
/// of `now` in either direction, allowing for the seconds the minute
/// precision date drops.
///
/// # Errors
///
/// Returns [`Error::SignatureRejected`] when any check fails.
pub fn verify(
    headers: &HeaderMap,
    method: &Method,
    path: &str,
    body: &[u8],
    tokens: &Tokens,
    now: DateTime<Utc>,
) -> Result<()> {
    let reject = |reason: &str| Error::SignatureRejected {
        reason: reason.to_string(),
    };

    let authorization = header_str(headers, AUTHORIZATION).ok_or_else(|| reject("missing authorization"))?;
    let decoded = STANDARD
        .decode(authorization)
        .ok()
        .and_then(|d| String::from_utf8(d).ok())
        .ok_or_else(|| reject("malformed authorization"))?;
    let (public, digest) = decoded
        .split_once(':')
        .ok_or_else(|| reject("malformed authorization"))?;

    if public != tokens.public {
        return Err(reject("unknown public token"));
    }

    let date = header_str(headers, KUMORU_DATE).ok_or_else(|| reject("missing date"))?;
    let signed_at = DateTime::parse_from_str(date, DATE_FORMAT)
        .map_err(|_| reject("malformed date"))?
        .with_timezone(&Utc);
    // The date carries whole minutes, so a signature made late in a minute
    // reads up to 59 seconds older than it is.
    let age = now - signed_at;
    if age > SIGNATURE_VALIDITY + TimeDelta::seconds(59) || -age > SIGNATURE_VALIDITY {
        return Err(reject("signature outside validity window"));
    }

    let content = if has_signed_body(method) {
        let md5 = header_str(headers, CONTENT_MD5).ok_or_else(|| reject("missing content-md5"))?;
        if md5 != content_md5(body) {
            return Err(reject("content-md5 does not match body"));
        }
        Some((md5, header_str(headers, CONTENT_TYPE).unwrap_or_default()))
    } else {
        None
    };

    let canonical = Canonical {
        method: method.as_str(),
        content,
        proxy_authorization: header_str(headers, PROXY_AUTHORIZATION),
        context: header_str(headers, KUMORU_CONTEXT),
        date,
        path,
    }
    .render();

    let expected = hmac_hex(&tokens.private, &canonical)?;
    if bool::from(expected.as_bytes().ct_eq(digest.as_bytes())) {
        Ok(())
    } else {
        Err(reject("digest mismatch"))
    }
}
