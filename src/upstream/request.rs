//! Outbound request construction.
//!
//! # Responsibilities
//! - Carry everything one upstream call needs: method, URL, headers,
//!   query parameters, body
//! - Make the authorization header impossible to forget: it is set at
//!   construction from a validated token and cannot be removed
//!
//! # Design Decisions
//! - Requests are immutable once built; builder methods consume `self`
//! - The bearer token is stored as a sensitive header value so it never
//!   leaks through debug output

use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue, AUTHORIZATION};
use reqwest::Method;
use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;

/// A validated bearer token, stored as a ready-to-send header value.
#[derive(Clone, Debug)]
pub struct AccessToken(HeaderValue);

/// The configured token cannot be carried in an HTTP header.
#[derive(Debug, Error)]
#[error("access token contains characters that cannot appear in a header")]
pub struct InvalidAccessToken(#[from] InvalidHeaderValue);

impl AccessToken {
    pub fn new(token: &str) -> Result<Self, InvalidAccessToken> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
        value.set_sensitive(true);
        Ok(Self(value))
    }

    fn header_value(&self) -> HeaderValue {
        self.0.clone()
    }
}

/// Body of an outbound request.
#[derive(Clone, Debug)]
pub enum RequestBody {
    /// `application/x-www-form-urlencoded` key/value pairs.
    Form(Vec<(String, String)>),
    /// JSON document.
    Json(serde_json::Value),
}

/// One outbound call to the upstream API.
#[derive(Clone, Debug)]
pub struct OutboundRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    query: Vec<(String, String)>,
    body: Option<RequestBody>,
}

impl OutboundRequest {
    /// Build a request with the mandatory authorization header.
    pub fn new(method: Method, url: Url, token: &AccessToken) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, token.header_value());
        Self {
            method,
            url,
            headers,
            query: Vec::new(),
            body: None,
        }
    }

    /// Append a query parameter.
    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    /// Attach a form-encoded body.
    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = Some(RequestBody::Form(fields));
        self
    }

    /// Attach a JSON body.
    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(value));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub(crate) fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub(crate) fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub(crate) fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }
}

/// Connection details for the upstream API, derived from validated config.
#[derive(Clone, Debug)]
pub struct UpstreamContext {
    base_url: Url,
    token: AccessToken,
}

/// Errors turning an [`UpstreamConfig`] into a usable context.
#[derive(Debug, Error)]
pub enum UpstreamConfigError {
    #[error("invalid upstream base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error(transparent)]
    AccessToken(#[from] InvalidAccessToken),
}

impl UpstreamContext {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, UpstreamConfigError> {
        Ok(Self {
            base_url: Url::parse(&config.base_url)?,
            token: AccessToken::new(&config.access_token)?,
        })
    }

    /// Build an authorized request for `path` relative to the base URL.
    pub fn request(&self, method: Method, path: &str) -> Result<OutboundRequest, url::ParseError> {
        let url = self.base_url.join(path)?;
        Ok(OutboundRequest::new(method, url, &self.token))
    }
}
