use crate::errors::{ClientError, ClientResult};
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};

/// Turn a host token into an IPv4 address
///
/// Tokens starting with a decimal digit are taken as dotted IPv4 literals.
/// Anything else is looked up by name and the first IPv4 address wins.
pub fn resolve_host(token: &str) -> ClientResult<Ipv4Addr> {
    if token.starts_with(|c: char| c.is_ascii_digit()) {
        return token
            .parse()
            .map_err(|_| ClientError::InvalidAddress(token.to_string()));
    }

    let addrs = (token, 0)
        .to_socket_addrs()
        .map_err(|e| ClientError::Resolve {
            host: token.to_string(),
            source: Some(e),
        })?;

    let ip = addrs
        .filter_map(|addr| match addr {
            SocketAddr::V4(v4) => Some(*v4.ip()),
            SocketAddr::V6(_) => None,
        })
        .next()
        .ok_or_else(|| ClientError::Resolve {
            host: token.to_string(),
            source: None,
        })?;

    tracing::debug!(host = token, %ip, "host name resolved");
    Ok(ip)
}
