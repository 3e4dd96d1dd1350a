use crate::{DaoError, Error, Result};
use std::{
    fmt::{self, Display, Formatter},
    time::Duration,
};
use url::form_urlencoded;

pub const DEFAULT_POOL_MAX_IDLE: usize = 4;
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Parsed connection url: `scheme://location?options`.
///
/// `pool_max_idle` and `busy_timeout_ms` are consumed here, every other
/// option is kept for the backend. The normalized url is the identity of
/// the connection: two descriptors with the same identity reach the same data.
///
/// ```rust
/// use trove_core::ConnectionDescriptor;
/// let descriptor =
///     ConnectionDescriptor::parse("sqlite://data.sqlite?mode=rwc&pool_max_idle=2").unwrap();
/// assert_eq!(descriptor.scheme(), "sqlite");
/// assert_eq!(descriptor.location(), "data.sqlite");
/// assert_eq!(descriptor.pool_max_idle, 2);
/// assert_eq!(descriptor.identity(), "sqlite://data.sqlite?mode=rwc");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    scheme: String,
    location: String,
    options: Vec<(String, String)>,
    identity: String,
    pub pool_max_idle: usize,
    pub busy_timeout: Duration,
}

impl ConnectionDescriptor {
    pub fn parse(url: &str) -> Result<Self> {
        let invalid = |reason: &str| {
            Error::new(DaoError::InvalidUrl {
                url: url.to_string(),
                reason: reason.to_string(),
            })
        };
        let Some((scheme, rest)) = url.split_once("://") else {
            return Err(invalid("expected `scheme://location`"));
        };
        if scheme.is_empty()
            || !scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        {
            return Err(invalid("the scheme is not valid"));
        }
        let (location, query) = rest.split_once('?').unwrap_or((rest, ""));
        if location.is_empty() {
            return Err(invalid("the location is empty"));
        }
        let mut result = Self {
            scheme: scheme.to_ascii_lowercase(),
            location: location.to_string(),
            options: Vec::new(),
            identity: String::new(),
            pool_max_idle: DEFAULT_POOL_MAX_IDLE,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        };
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "pool_max_idle" => {
                    result.pool_max_idle = value
                        .parse()
                        .map_err(|_| invalid("pool_max_idle must be a non negative integer"))?
                }
                "busy_timeout_ms" => {
                    result.busy_timeout = Duration::from_millis(
                        value
                            .parse()
                            .map_err(|_| invalid("busy_timeout_ms must be a non negative integer"))?,
                    )
                }
                _ => result.options.push((key.into_owned(), value.into_owned())),
            }
        }
        result.identity = format!("{}://{}", result.scheme, result.location);
        if !result.options.is_empty() {
            result.identity.push('?');
            result.identity.push_str(
                &form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(&result.options)
                    .finish(),
            );
        }
        Ok(result)
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Everything between `://` and the options.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn options(&self) -> &[(String, String)] {
        &self.options
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Fails unless the url scheme is `scheme`.
    pub fn expect_scheme(&self, scheme: &str) -> Result<()> {
        if self.scheme != scheme {
            return Err(Error::new(DaoError::InvalidUrl {
                url: self.identity.clone(),
                reason: format!("expected a `{}://` url", scheme),
            }));
        }
        Ok(())
    }
}

impl Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identity)
    }
}
