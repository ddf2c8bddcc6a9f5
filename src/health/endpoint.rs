//! Endpoint descriptors.
//!
//! # Responsibilities
//! - Deserialize endpoint entries from the endpoint file
//! - Turn each entry into a request-ready [`Endpoint`]
//! - Derive the domain used as the availability key

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// An endpoint as declared in the endpoint file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EndpointSpec {
    /// Free-form name used in logs.
    pub name: String,

    /// Full URL to probe.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default)]
    pub method: Option<String>,

    /// Extra request headers.
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,

    /// Request body, sent as-is.
    #[serde(default)]
    pub body: Option<String>,
}

/// Reasons an endpoint entry cannot be turned into a check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported scheme '{0}', expected http or https")]
    UnsupportedScheme(String),

    #[error("url '{0}' has no host")]
    MissingHost(String),

    #[error("invalid method '{0}'")]
    InvalidMethod(String),

    #[error("invalid header '{0}'")]
    InvalidHeader(String),
}

/// A validated endpoint, ready to be probed.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub name: String,
    pub url: Url,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<String>,
    domain: String,
}

impl Endpoint {
    /// Domain (URL host) this endpoint's outcomes are aggregated under.
    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl TryFrom<EndpointSpec> for Endpoint {
    type Error = EndpointError;

    fn try_from(spec: EndpointSpec) -> Result<Self, Self::Error> {
        if spec.name.trim().is_empty() {
            return Err(EndpointError::EmptyName);
        }

        let url = Url::parse(&spec.url).map_err(|e| EndpointError::InvalidUrl {
            url: spec.url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(EndpointError::UnsupportedScheme(url.scheme().to_string()));
        }
        let domain = domain_of(&url).ok_or_else(|| EndpointError::MissingHost(spec.url.clone()))?;

        let method = match spec.method.as_deref() {
            None => Method::GET,
            Some(m) => Method::from_bytes(m.to_ascii_uppercase().as_bytes())
                .map_err(|_| EndpointError::InvalidMethod(m.to_string()))?,
        };

        let mut headers = HeaderMap::new();
        for (name, value) in spec.headers.unwrap_or_default() {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| EndpointError::InvalidHeader(name.clone()))?;
            let header_value = HeaderValue::from_str(&value)
                .map_err(|_| EndpointError::InvalidHeader(name.clone()))?;
            headers.insert(header_name, header_value);
        }

        Ok(Self {
            name: spec.name,
            url,
            method,
            headers,
            body: spec.body,
            domain,
        })
    }
}

/// Extract the aggregation domain from a URL: the host, without port or trailing dot.
pub fn domain_of(url: &Url) -> Option<String> {
    let host = url.host_str()?.trim_end_matches('.');
    if host.is_empty() {
        return None;
    }
    Some(host.to_ascii_lowercase())
}
