//! VMess link parser
//!
//! ## Link format
//!
//! `vmess://base64(JSON)`. Standard or URL-safe alphabet; missing `=` padding is restored
//! before decoding and whitespace (line-wrapped pastes) is ignored.
//!
//! ## JSON fields
//!
//! **Required**: `add` (server address), `port` (1–65535), `id` (user UUID).
//!
//! **Optional**: `aid`, `net` (tcp/ws/grpc/...), `type`, `tls`, `sni`, `ps` (alias), `path`, `host`.
//! Unknown fields are ignored.
//!
//! `port` and `aid` are accepted as either number or string; optional string fields accept
//! numbers; `null` counts as absent. An `aid` of any other shape is ignored, and a `tls` of
//! any shape other than the string `"tls"` (booleans included) leaves TLS off.
//!
//! ## Mapping
//!
//! | JSON | Descriptor | Default |
//! |------|------------|---------|
//! | `tls` | `tls` | true only for the exact string `"tls"` |
//! | `sni` | `sni` | `add` |
//! | `path` | `path` | `/` |
//! | `path` | `service_name` | empty (then `/` for gRPC) |
//! | `net` | `network` | `tcp` |

use crate::LinkParser;
use crate::constants::defaults;
use crate::descriptor::{Network, ProxyDescriptor, SourceKind};
use crate::error::{LinkError, Malformed, Result};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::trace;

/// Deserializes port from JSON as either number or string (e.g. "8080").
fn deserialize_port<'de, D>(d: D) -> std::result::Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Num(u16),
        Str(String),
    }
    match Port::deserialize(d)? {
        Port::Num(n) => Ok(n),
        Port::Str(s) => s.trim().parse().map_err(D::Error::custom),
    }
}

/// Deserializes optional aid from JSON as either number or string; junk counts as absent.
fn deserialize_aid_opt<'de, D>(d: D) -> std::result::Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    let aid = match Option::<Value>::deserialize(d)? {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(aid)
}

/// Deserializes an optional string that some generators emit as a number.
fn deserialize_opt_string<'de, D>(d: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StrOrNum {
        Str(String),
        Num(i64),
    }
    match Option::<StrOrNum>::deserialize(d)? {
        None => Ok(None),
        Some(StrOrNum::Str(s)) => Ok(Some(s)),
        Some(StrOrNum::Num(n)) => Ok(Some(n.to_string())),
    }
}

/// The JSON object carried by a VMess link
#[derive(Debug, Deserialize)]
struct VMessPayload {
    add: String,
    #[serde(deserialize_with = "deserialize_port")]
    port: u16,
    id: String,
    #[serde(default, deserialize_with = "deserialize_aid_opt")]
    aid: Option<u16>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    net: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    r#type: Option<String>,
    /// Any JSON value; only the string `"tls"` turns TLS on
    #[serde(default)]
    tls: Option<Value>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    sni: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    ps: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    path: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    host: Option<String>,
}

/// VMess link parser
#[derive(Debug, Clone, Copy, Default)]
pub struct VMess;

impl LinkParser for VMess {
    const KIND: SourceKind = SourceKind::VMess;

    fn parse(link: &str) -> Result<ProxyDescriptor> {
        let body = link
            .strip_prefix(Self::KIND.scheme())
            .ok_or_else(|| LinkError::UnsupportedScheme {
                scheme: crate::scheme_of(link),
            })?;

        let json = decode_payload(body).map_err(|cause| LinkError::malformed(Self::KIND, cause))?;
        let payload: VMessPayload = serde_json::from_str(&json)
            .map_err(|e| LinkError::malformed(Self::KIND, e.into()))?;
        if payload.port == 0 {
            return Err(LinkError::malformed(Self::KIND, Malformed::PortOutOfRange));
        }
        trace!("Decoded VMess payload for {}:{}", payload.add, payload.port);

        Ok(payload.into_descriptor())
    }
}

/// Restores padding and decodes the base64 body into a JSON string.
fn decode_payload(body: &str) -> std::result::Result<String, Malformed> {
    let mut cleaned: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    while cleaned.len() % 4 != 0 {
        cleaned.push('=');
    }

    let decoded = match STANDARD.decode(&cleaned) {
        Ok(bytes) => bytes,
        Err(standard_err) => {
            trace!("Standard base64 failed ({}), trying URL-safe alphabet", standard_err);
            URL_SAFE.decode(&cleaned).map_err(|_| standard_err)?
        }
    };
    String::from_utf8(decoded).map_err(Malformed::Utf8)
}

impl VMessPayload {
    fn into_descriptor(self) -> ProxyDescriptor {
        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());

        let mut descriptor = ProxyDescriptor::new(SourceKind::VMess, self.add, self.port, self.id);
        descriptor.alter_id = self.aid.unwrap_or(0);
        descriptor.network = non_empty(self.net).map(Network::from).unwrap_or_default();
        descriptor.vmess_type = self.r#type;
        descriptor.tls = self.tls.as_ref().and_then(Value::as_str) == Some(defaults::VMESS_TLS);
        if let Some(sni) = non_empty(self.sni) {
            descriptor.sni = sni;
        }
        descriptor.alias = non_empty(self.ps);
        // VMess has no separate service name: the path doubles as one.
        descriptor.service_name = self.path.clone().unwrap_or_default();
        if let Some(path) = non_empty(self.path) {
            descriptor.path = path;
        }
        descriptor.host = self.host.unwrap_or_default();
        descriptor.backfill_grpc_service_name();
        descriptor
    }
}
