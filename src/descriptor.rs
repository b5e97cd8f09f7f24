//! Canonical in-memory form of a proxy link
//!
//! Every parser produces a [`ProxyDescriptor`]; every renderer consumes one. Defaults are
//! seeded once, when the descriptor is built, and renderers never write back to it.

use crate::constants::{defaults, scheme};
use crate::error::LinkError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Link family a descriptor was parsed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// `vmess://` base64 JSON link
    VMess,
    /// `vless://` URI
    VLess,
    /// `trojan://` URI
    Trojan,
}

impl SourceKind {
    /// Every supported family, in dispatch order
    pub const ALL: [SourceKind; 3] = [SourceKind::VMess, SourceKind::VLess, SourceKind::Trojan];

    /// Lowercase tag (`vmess`, `vless`, `trojan`)
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::VMess => "vmess",
            SourceKind::VLess => "vless",
            SourceKind::Trojan => "trojan",
        }
    }

    /// Scheme prefix including `://`
    pub fn scheme(self) -> &'static str {
        match self {
            SourceKind::VMess => scheme::VMESS,
            SourceKind::VLess => scheme::VLESS,
            SourceKind::Trojan => scheme::TROJAN,
        }
    }

    /// Detects the family from a link's literal, case-sensitive prefix.
    pub fn detect(link: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| link.starts_with(kind.scheme()))
    }

    /// Whether the family identifies users by UUID (VMess, VLESS) rather than password.
    pub fn uses_uuid(self) -> bool {
        !matches!(self, SourceKind::Trojan)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceKind::VMess => "VMess",
            SourceKind::VLess => "VLESS",
            SourceKind::Trojan => "Trojan",
        })
    }
}

impl FromStr for SourceKind {
    type Err = LinkError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| LinkError::UnsupportedScheme {
                scheme: s.to_string(),
            })
    }
}

/// Transport sub-protocol
///
/// Only `ws` and `grpc` change how links and YAML are rendered; anything else is carried
/// through verbatim as [`Network::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Network {
    /// Plain TCP
    #[default]
    Tcp,
    /// WebSocket
    Ws,
    /// gRPC
    Grpc,
    /// Any other transport name (kcp, h2, quic, httpupgrade, ...)
    Other(String),
}

impl Network {
    /// Transport name as it appears in links and YAML
    pub fn as_str(&self) -> &str {
        match self {
            Network::Tcp => defaults::NETWORK,
            Network::Ws => "ws",
            Network::Grpc => "grpc",
            Network::Other(name) => name,
        }
    }
}

impl From<&str> for Network {
    fn from(value: &str) -> Self {
        match value {
            "" | "tcp" => Network::Tcp,
            "ws" => Network::Ws,
            "grpc" => Network::Grpc,
            other => Network::Other(other.to_string()),
        }
    }
}

impl From<String> for Network {
    fn from(value: String) -> Self {
        Network::from(value.as_str())
    }
}

impl From<Network> for String {
    fn from(value: Network) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical proxy description shared by all link families
///
/// `identity` is the single credential slot: the UUID of a VMess/VLESS link or the password
/// of a Trojan link. Renderers reuse it across families.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyDescriptor {
    /// Originating link family
    pub source_kind: SourceKind,
    /// Host name or IP address (IPv6 without brackets)
    pub address: String,
    /// TCP port, 1–65535
    pub port: u16,
    /// UUID (VMess/VLESS) or password (Trojan); may be empty
    pub identity: String,
    /// Legacy VMess alter ID
    #[serde(default)]
    pub alter_id: u16,
    /// Transport sub-protocol
    #[serde(default)]
    pub network: Network,
    /// VMess `type` field, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vmess_type: Option<String>,
    /// Whether TLS is negotiated
    #[serde(default)]
    pub tls: bool,
    /// TLS server name
    pub sni: String,
    /// Human-readable label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// HTTP path (ws) or fallback gRPC service name
    pub path: String,
    /// HTTP Host header (ws)
    #[serde(default)]
    pub host: String,
    /// gRPC service name
    #[serde(default)]
    pub service_name: String,
    /// VLESS flow-control tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
}

impl ProxyDescriptor {
    /// Builds a descriptor with every optional field at its default:
    /// `tcp` transport, no TLS, `sni` equal to `address`, path `/`.
    pub fn new(
        source_kind: SourceKind,
        address: impl Into<String>,
        port: u16,
        identity: impl Into<String>,
    ) -> Self {
        let address = address.into();
        ProxyDescriptor {
            source_kind,
            sni: address.clone(),
            address,
            port,
            identity: identity.into(),
            alter_id: 0,
            network: Network::Tcp,
            vmess_type: None,
            tls: false,
            alias: None,
            path: defaults::PATH.to_string(),
            host: String::new(),
            service_name: String::new(),
            flow: None,
        }
    }

    /// Parses any supported link. Same as [`crate::parse_link`].
    pub fn parse(link: &str) -> crate::Result<Self> {
        crate::parse_link(link)
    }

    /// Renders this descriptor. Same as [`crate::render`].
    pub fn render(&self, kind: crate::OutputKind) -> String {
        crate::render(self, kind)
    }

    /// The alias, if set and non-empty
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref().filter(|alias| !alias.is_empty())
    }

    /// The flow tag, if set and non-empty
    pub fn flow(&self) -> Option<&str> {
        self.flow.as_deref().filter(|flow| !flow.is_empty())
    }

    /// gRPC links without an explicit service name use the path instead.
    pub(crate) fn backfill_grpc_service_name(&mut self) {
        if self.network == Network::Grpc && self.service_name.is_empty() {
            self.service_name = self.path.clone();
        }
    }
}
