//! Client identity extraction from transport and proxy metadata.

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Canonical identity shared by every loopback address.
pub const LOCALHOST: &str = "localhost";

/// Identity assigned when no address can be derived.
///
/// The sentinel is rate limited like any other identity.
pub const UNKNOWN: &str = "unknown";

const IPV4_MAPPED_PREFIX: &str = "::ffff:";
const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Normalized key used to bucket requests for rate limiting and blocking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientIdentity(String);

impl ClientIdentity {
    /// Builds an identity from a raw address string, normalizing it.
    pub fn new(raw: &str) -> Self {
        Self(normalize(raw))
    }

    /// The sentinel identity for requests with no derivable address.
    pub fn unknown() -> Self {
        Self(UNKNOWN.to_string())
    }

    /// Resolves the identity of a request.
    ///
    /// Resolution order is the first non-empty value among:
    ///
    /// 1. the first entry of the first `X-Forwarded-For` header
    /// 2. the `X-Real-IP` header
    /// 3. the transport peer address
    ///
    /// Proxy headers are only consulted when `trust_proxy` is set. Falls back
    /// to [`UNKNOWN`] when nothing is available.
    pub fn resolve(headers: &HeaderMap, peer: Option<IpAddr>, trust_proxy: bool) -> Self {
        let from_headers = if trust_proxy {
            forwarded_for(headers).or_else(|| real_ip(headers))
        } else {
            None
        };

        match from_headers {
            Some(raw) => Self::new(raw),
            None => match peer {
                Some(ip) => Self::new(&ip.to_string()),
                None => Self::unknown(),
            },
        }
    }

    /// Resolves the identity of an incoming request, reading the peer address
    /// from the [`ConnectInfo`] extension when the server was started with it.
    pub fn from_request<B>(req: &Request<B>, trust_proxy: bool) -> Self {
        let peer = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        Self::resolve(req.headers(), peer, trust_proxy)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ClientIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalizes a raw address into its identity key.
///
/// - surrounding whitespace is trimmed; an empty value becomes [`UNKNOWN`]
/// - IPv4-mapped IPv6 addresses are unwrapped to IPv4
/// - any loopback address becomes [`LOCALHOST`]
/// - parseable addresses are rendered in canonical form
/// - values that do not parse lose any leading `::ffff:` prefixes
///
/// The function is idempotent.
pub fn normalize(raw: &str) -> String {
    let mut value = raw.trim();

    if let Ok(ip) = value.parse::<IpAddr>() {
        return render(ip);
    }

    while let Some(rest) = strip_mapped_prefix(value) {
        value = rest;
    }

    if value.is_empty() {
        return UNKNOWN.to_string();
    }

    match value.parse::<IpAddr>() {
        Ok(ip) => render(ip),
        Err(_) => value.to_string(),
    }
}

fn render(ip: IpAddr) -> String {
    let ip = ip.to_canonical();
    if ip.is_loopback() {
        LOCALHOST.to_string()
    } else {
        ip.to_string()
    }
}

fn strip_mapped_prefix(value: &str) -> Option<&str> {
    let head = value.get(..IPV4_MAPPED_PREFIX.len())?;
    if head.eq_ignore_ascii_case(IPV4_MAPPED_PREFIX) {
        Some(&value[IPV4_MAPPED_PREFIX.len()..])
    } else {
        None
    }
}

fn forwarded_for(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .next()?
        .to_str()
        .ok()?
        .split(',')
        .next()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn real_ip(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(X_REAL_IP)?
        .to_str()
        .ok()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
