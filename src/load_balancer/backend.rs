//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single upstream server by its origin
//! - Validate configured addresses once, at startup
//! - Provide the scheme/authority used to rewrite forwarded requests

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use axum::http::uri::{Authority, Scheme};
use url::Url;

use crate::error::ConfigError;

/// A single upstream server, identified by its origin (`http://host:port`).
///
/// Immutable after parsing and cheap to clone.
#[derive(Clone)]
pub struct Backend {
    origin: Arc<str>,
    authority: Authority,
}

impl Backend {
    /// Parse a configured backend address.
    pub fn parse(address: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidBackend {
            address: address.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(address.trim()).map_err(|e| invalid(&e.to_string()))?;

        if url.scheme() != "http" {
            return Err(invalid("only the http scheme is supported"));
        }
        let host = url.host_str().ok_or_else(|| invalid("missing host"))?;
        if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("must not carry a path, query or fragment"));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(invalid("must not carry credentials"));
        }

        let port = url
            .port_or_known_default()
            .ok_or_else(|| invalid("missing port"))?;
        let authority = Authority::from_str(&format!("{}:{}", host, port))
            .map_err(|e| invalid(&e.to_string()))?;

        Ok(Self {
            origin: url.origin().ascii_serialization().into(),
            authority,
        })
    }

    /// The origin string, e.g. `http://127.0.0.1:8080`.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn scheme(&self) -> Scheme {
        Scheme::HTTP
    }

    /// `host:port` used for the request URI and `Host` header.
    pub fn authority(&self) -> &Authority {
        &self.authority
    }
}

impl PartialEq for Backend {
    fn eq(&self, other: &Self) -> bool {
        self.origin == other.origin
    }
}

impl Eq for Backend {}

impl Hash for Backend {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.origin.hash(state);
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.origin)
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Backend").field(&&*self.origin).finish()
    }
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origin() {
        let b = Backend::parse("http://127.0.0.1:8080").unwrap();
        assert_eq!(b.origin(), "http://127.0.0.1:8080");
        assert_eq!(b.authority().as_str(), "127.0.0.1:8080");
        assert_eq!(b.to_string(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_default_port_and_trailing_slash() {
        let b = Backend::parse("http://backend.internal/").unwrap();
        assert_eq!(b.origin(), "http://backend.internal");
        assert_eq!(b.authority().as_str(), "backend.internal:80");
        assert_eq!(b, Backend::parse("http://backend.internal:80").unwrap());
    }

    #[test]
    fn test_ipv6_authority() {
        let b = Backend::parse("http://[::1]:9000").unwrap();
        assert_eq!(b.authority().as_str(), "[::1]:9000");
    }

    #[test]
    fn test_rejects_unusable_addresses() {
        for addr in [
            "127.0.0.1:8080",
            "not a url",
            "https://127.0.0.1:8443",
            "http://127.0.0.1:8080/api",
            "http://127.0.0.1:8080/?x=1",
            "http://user:pw@127.0.0.1:8080",
        ] {
            assert!(
                matches!(Backend::parse(addr), Err(ConfigError::InvalidBackend { .. })),
                "{addr} should be rejected"
            );
        }
    }
}
