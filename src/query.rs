//! Shared URI handling for `credential@host:port[?query][#fragment]` links
//!
//! VLESS and Trojan share this grammar; only the credential and the set of recognized
//! query keys differ. Splitting is done by hand rather than with a full URL parser so
//! that non-standard hosts and credentials seen in the wild still parse.
//!
//! ## Splitting rules
//!
//! 1. The fragment starts at the first `#`, the query at the first `?` before it.
//! 2. The credential ends at the first `@`; a missing `@` is an error.
//! 3. Host and port are split at the first `:`, or after `]` for a bracketed IPv6 host.
//! 4. Query pairs are separated by `&`; keys are lowercased, values percent-decoded on their
//!    own (`+` stays `+`), a key without `=` has an empty value.
//! 5. A `%` that does not start a `%XX` hex escape is an error, as is an escape sequence that
//!    does not decode to UTF-8.

use crate::descriptor::{Network, ProxyDescriptor, SourceKind};
use crate::constants::defaults;
use crate::error::{LinkError, Malformed, Result};
use tracing::trace;

/// A URI link split into its components
#[derive(Debug)]
pub(crate) struct UriParts<'a> {
    /// Raw credential, still percent-encoded
    pub credential: &'a str,
    pub address: String,
    pub port: u16,
    /// Decoded query pairs with lowercased keys, in link order
    pub params: Vec<(String, String)>,
    /// Decoded non-empty fragment
    pub fragment: Option<String>,
}

impl<'a> UriParts<'a> {
    /// Splits a link body (scheme already stripped).
    pub fn split(kind: SourceKind, body: &'a str) -> Result<Self> {
        let (before_hash, fragment) = match body.split_once('#') {
            Some((before, fragment)) => (before, Some(fragment)),
            None => (body, None),
        };
        let (main, query) = match before_hash.split_once('?') {
            Some((main, query)) => (main, Some(query)),
            None => (before_hash, None),
        };

        let (credential, host_port) = main
            .split_once('@')
            .ok_or_else(|| LinkError::malformed(kind, Malformed::MissingAt))?;
        let (address, port) = split_host_port(kind, host_port)?;
        trace!("Split {} link: host={}, port={}", kind, address, port);

        let params = match query {
            Some(query) => parse_query(kind, query)?,
            None => Vec::new(),
        };

        let fragment = match fragment.filter(|f| !f.is_empty()) {
            Some(raw) => Some(percent_decode(kind, "fragment", raw)?),
            None => None,
        };

        Ok(UriParts {
            credential,
            address,
            port,
            params,
            fragment,
        })
    }
}

/// Splits `host:port` or `[v6]:port` and validates the port.
fn split_host_port(kind: SourceKind, host_port: &str) -> Result<(String, u16)> {
    let missing_port = || LinkError::malformed(kind, Malformed::MissingPort);

    let (address, port) = if let Some(bracketed) = host_port.strip_prefix('[') {
        let (address, rest) = bracketed.split_once(']').ok_or_else(missing_port)?;
        let port = rest.strip_prefix(':').ok_or_else(missing_port)?;
        (address, port)
    } else {
        host_port.split_once(':').ok_or_else(missing_port)?
    };

    Ok((address.to_string(), parse_port(kind, port)?))
}

/// Parses a port in 1–65535.
pub(crate) fn parse_port(kind: SourceKind, raw: &str) -> Result<u16> {
    let port: u16 = raw.trim().parse().map_err(|source| {
        LinkError::malformed(
            kind,
            Malformed::InvalidPort {
                value: raw.to_string(),
                source,
            },
        )
    })?;
    if port == 0 {
        return Err(LinkError::malformed(kind, Malformed::PortOutOfRange));
    }
    Ok(port)
}

/// Parses an `&`-separated query string into lowercased keys and percent-decoded values.
pub(crate) fn parse_query(kind: SourceKind, query: &str) -> Result<Vec<(String, String)>> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = key.to_ascii_lowercase();
            let value = percent_decode(kind, &key, value)?;
            Ok((key, value))
        })
        .collect()
}

/// Percent-decodes one link component.
///
/// Every `%` must start a two-digit hex escape and the decoded bytes must be UTF-8.
pub(crate) fn percent_decode(kind: SourceKind, component: &str, raw: &str) -> Result<String> {
    if let Some(escape) = find_invalid_escape(raw) {
        return Err(LinkError::malformed(
            kind,
            Malformed::InvalidEscape {
                component: component.to_string(),
                escape: escape.to_string(),
            },
        ));
    }
    urlencoding::decode(raw)
        .map(|cow| cow.into_owned())
        .map_err(|source| {
            LinkError::malformed(
                kind,
                Malformed::PercentEncoding {
                    component: component.to_string(),
                    source,
                },
            )
        })
}

/// Percent-decodes a credential, keeping the raw text when it is not valid percent-encoding.
pub(crate) fn decode_credential(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) if find_invalid_escape(raw).is_none() => decoded.into_owned(),
        _ => raw.to_string(),
    }
}

/// Returns the first `%` escape not followed by two hex digits.
fn find_invalid_escape(raw: &str) -> Option<&str> {
    let bytes = raw.as_bytes();
    raw.match_indices('%').map(|(i, _)| i).find_map(|i| {
        let valid = bytes.len() > i + 2
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit();
        if valid {
            return None;
        }
        let end = raw[i + 1..]
            .char_indices()
            .nth(2)
            .map_or(raw.len(), |(offset, _)| i + 1 + offset);
        Some(&raw[i..end])
    })
}

/// Applies a transport or TLS query parameter shared by VLESS and Trojan.
///
/// Returns `false` when the key is not one of them so the caller can try its own keys.
pub(crate) fn apply_transport_param(
    descriptor: &mut ProxyDescriptor,
    key: &str,
    value: &str,
) -> bool {
    match key {
        "security" => {
            if value == defaults::SECURITY_TLS {
                descriptor.tls = true;
            }
        }
        "type" => descriptor.network = Network::from(value),
        "path" => descriptor.path = value.to_string(),
        "host" => descriptor.host = value.to_string(),
        "sni" => descriptor.sni = value.to_string(),
        "servicename" => descriptor.service_name = value.to_string(),
        _ => return false,
    }
    true
}
