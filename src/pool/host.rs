//! A single candidate host.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::{DispatchError, DispatchResult};

/// Base URL of an interchangeable upstream host.
///
/// The base may carry a path prefix (`http://10.0.0.5:8080/api`); endpoint
/// paths are appended below it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Host {
    base: Url,
}

impl Host {
    /// Parse a base URL. Only absolute `http` / `https` URLs with a host are accepted.
    pub fn parse(raw: &str) -> DispatchResult<Self> {
        let base = Url::parse(raw.trim()).map_err(|e| {
            DispatchError::Configuration(format!("invalid host URL '{}': {}", raw, e))
        })?;
        Self::try_from(base)
    }

    pub fn url(&self) -> &Url {
        &self.base
    }

    /// Full URL for `endpoint` on this host, with an already encoded query string.
    pub fn endpoint_url(&self, endpoint: &str, query: &str) -> Url {
        let mut url = self.base.clone();
        let path = format!(
            "{}/{}",
            self.base.path().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        url.set_path(&path);
        url.set_query(if query.is_empty() { None } else { Some(query) });
        url
    }
}

impl TryFrom<Url> for Host {
    type Error = DispatchError;

    fn try_from(base: Url) -> Result<Self, Self::Error> {
        match base.scheme() {
            "http" | "https" => {}
            other => {
                return Err(DispatchError::Configuration(format!(
                    "unsupported scheme '{}' for host {}",
                    other, base
                )))
            }
        }
        if base.host_str().is_none() {
            return Err(DispatchError::Configuration(format!("host URL {} has no host", base)));
        }
        if base.query().is_some() || base.fragment().is_some() {
            return Err(DispatchError::Configuration(format!(
                "host URL {} must not carry a query or fragment",
                base
            )));
        }
        Ok(Self { base })
    }
}

impl FromStr for Host {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Host::parse(s)
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_joins_paths() {
        let host = Host::parse("http://127.0.0.1:8080").unwrap();
        let url = host.endpoint_url("/api/people/1", "");
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/api/people/1");

        let prefixed = Host::parse("https://svc.internal/base/").unwrap();
        let url = prefixed.endpoint_url("example", "a=1&b=2");
        assert_eq!(url.as_str(), "https://svc.internal/base/example?a=1&b=2");
    }

    #[test]
    fn test_rejects_non_http_schemes() {
        let err = Host::parse("ftp://files.internal").unwrap_err();
        assert!(matches!(err, DispatchError::Configuration(_)));
        assert!(Host::parse("not a url").is_err());
        assert!(Host::parse("http://h.internal/?x=1").is_err());
    }

    #[test]
    fn test_from_str() {
        let host: Host = " http://localhost:3000 ".parse().unwrap();
        assert_eq!(host.url().port(), Some(3000));
    }
}
