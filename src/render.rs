//! Rendering descriptors into VLESS links and Clash YAML proxy entries
//!
//! Rendering is a pure function of `(descriptor, kind)`: defaults and cross-family credential
//! reuse are computed into a borrowed view and never written back, so one descriptor
//! can be rendered to every kind in any order with identical results.
//!
//! ## Cross-family credentials
//!
//! The descriptor has one credential slot. A Trojan password becomes the UUID of VMess/VLESS
//! output and a UUID becomes the password of Trojan output. An empty slot is replaced by
//! `auto-uuid` or `auto-password` instead of producing an unusable entry.
//!
//! ## YAML entries
//!
//! Output is a single list item meant to be pasted under `proxies:`:
//!
//! ```yaml
//!   - name: T
//!     server: h.com
//!     type: vmess
//!     port: 443
//!     uuid: u1
//!     alterId: 0
//!     cipher: auto
//!     tls: true
//!     skip-cert-verify: true
//!     servername: h.com
//!     network: ws
//!     ws-opts:
//!       path: /w
//!     udp: true
//! ```

use crate::constants::defaults;
use crate::descriptor::{Network, ProxyDescriptor, SourceKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Requested output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputKind {
    /// `vless://` link
    VlessLink,
    /// Clash YAML entry of type `vmess`
    ClashVmessYaml,
    /// Clash YAML entry of type `vless`
    ClashVlessYaml,
    /// Clash YAML entry of type `trojan`
    ClashTrojanYaml,
}

/// Returned when an output kind tag is not recognized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown output kind '{0}' (expected one of: vless-link, clash-vmess-yaml, clash-vless-yaml, clash-trojan-yaml)")]
pub struct UnknownOutputKind(pub String);

impl OutputKind {
    /// Every output kind
    pub const ALL: [OutputKind; 4] = [
        OutputKind::VlessLink,
        OutputKind::ClashVmessYaml,
        OutputKind::ClashVlessYaml,
        OutputKind::ClashTrojanYaml,
    ];

    /// Tag used on the command line and in JSON
    pub fn as_str(self) -> &'static str {
        match self {
            OutputKind::VlessLink => "vless-link",
            OutputKind::ClashVmessYaml => "clash-vmess-yaml",
            OutputKind::ClashVlessYaml => "clash-vless-yaml",
            OutputKind::ClashTrojanYaml => "clash-trojan-yaml",
        }
    }

    /// Human-readable heading
    pub fn title(self) -> &'static str {
        match self {
            OutputKind::VlessLink => "VLESS link",
            OutputKind::ClashVmessYaml => "Clash YAML (VMess proxy)",
            OutputKind::ClashVlessYaml => "Clash YAML (VLESS proxy)",
            OutputKind::ClashTrojanYaml => "Clash YAML (Trojan proxy)",
        }
    }

    /// Protocol family of the rendered artifact
    pub fn family(self) -> SourceKind {
        match self {
            OutputKind::VlessLink | OutputKind::ClashVlessYaml => SourceKind::VLess,
            OutputKind::ClashVmessYaml => SourceKind::VMess,
            OutputKind::ClashTrojanYaml => SourceKind::Trojan,
        }
    }

    /// Output kinds worth producing for a link of the given family, most relevant first.
    ///
    /// A VLESS link is only offered for VMess input; VLESS input already is one and Trojan
    /// input has no UUID of its own.
    pub fn relevant_for(source: SourceKind) -> &'static [OutputKind] {
        match source {
            SourceKind::VMess => &[
                OutputKind::VlessLink,
                OutputKind::ClashVmessYaml,
                OutputKind::ClashVlessYaml,
                OutputKind::ClashTrojanYaml,
            ],
            SourceKind::VLess => &[
                OutputKind::ClashVlessYaml,
                OutputKind::ClashTrojanYaml,
                OutputKind::ClashVmessYaml,
            ],
            SourceKind::Trojan => &[
                OutputKind::ClashTrojanYaml,
                OutputKind::ClashVlessYaml,
                OutputKind::ClashVmessYaml,
            ],
        }
    }

    fn default_name(self) -> &'static str {
        match self.family() {
            SourceKind::VMess => defaults::VMESS_NAME,
            SourceKind::VLess => defaults::VLESS_NAME,
            SourceKind::Trojan => defaults::TROJAN_NAME,
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputKind {
    type Err = UnknownOutputKind;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownOutputKind(s.to_string()))
    }
}

/// Render-time view of a descriptor with defaults applied
#[derive(Debug)]
struct Effective<'a> {
    descriptor: &'a ProxyDescriptor,
    identity: &'a str,
    name: &'a str,
    servername: &'a str,
}

impl<'a> Effective<'a> {
    fn new(descriptor: &'a ProxyDescriptor, kind: OutputKind) -> Self {
        let family = kind.family();
        let identity = if !descriptor.identity.is_empty() {
            if family.uses_uuid() != descriptor.source_kind.uses_uuid() {
                debug!(
                    "Reusing {} credential as {} {}",
                    descriptor.source_kind,
                    family,
                    if family.uses_uuid() { "UUID" } else { "password" }
                );
            }
            descriptor.identity.as_str()
        } else if family.uses_uuid() {
            debug!("No credential on descriptor, using placeholder UUID");
            defaults::PLACEHOLDER_UUID
        } else {
            debug!("No credential on descriptor, using placeholder password");
            defaults::PLACEHOLDER_PASSWORD
        };

        let servername = if descriptor.sni.is_empty() {
            descriptor.address.as_str()
        } else {
            descriptor.sni.as_str()
        };

        Effective {
            descriptor,
            identity,
            name: descriptor.alias().unwrap_or(kind.default_name()),
            servername,
        }
    }

    fn path(&self) -> &'a str {
        if self.descriptor.path.is_empty() {
            defaults::PATH
        } else {
            self.descriptor.path.as_str()
        }
    }
}

/// Renders a descriptor into the requested output kind.
///
/// Never fails: missing credentials are replaced by placeholders.
pub fn render(descriptor: &ProxyDescriptor, kind: OutputKind) -> String {
    let view = Effective::new(descriptor, kind);
    match kind {
        OutputKind::VlessLink => vless_link(&view),
        OutputKind::ClashVmessYaml => clash_vmess(&view),
        OutputKind::ClashVlessYaml => clash_vless(&view),
        OutputKind::ClashTrojanYaml => clash_trojan(&view),
    }
}

fn vless_link(view: &Effective<'_>) -> String {
    let d = view.descriptor;
    let host = if d.address.contains(':') {
        format!("[{}]", d.address)
    } else {
        d.address.clone()
    };
    let mut link = format!(
        "vless://{}@{}:{}?type={}",
        urlencoding::encode(view.identity),
        host,
        d.port,
        d.network
    );

    let mut params = Vec::new();
    match d.network {
        Network::Ws => {
            params.push(format!("path={}", urlencoding::encode(view.path())));
            if !d.host.is_empty() {
                params.push(format!("host={}", urlencoding::encode(&d.host)));
            }
        }
        Network::Grpc => {
            params.push(format!(
                "serviceName={}",
                urlencoding::encode(&d.service_name)
            ));
            if !d.path.is_empty() && d.path != d.service_name {
                params.push(format!("path={}", urlencoding::encode(&d.path)));
            }
        }
        Network::Tcp | Network::Other(_) => {}
    }
    if d.tls {
        params.push(format!("security={}", defaults::SECURITY_TLS));
        if !d.sni.is_empty() {
            params.push(format!("sni={}", urlencoding::encode(&d.sni)));
        }
    }

    if !params.is_empty() {
        link.push('&');
        link.push_str(&params.join("&"));
    }
    if let Some(alias) = d.alias() {
        link.push('#');
        link.push_str(&urlencoding::encode(alias));
    }
    link
}

fn clash_vmess(view: &Effective<'_>) -> String {
    let d = view.descriptor;
    let mut entry = YamlEntry::new(view.name);
    entry.field("server", scalar(&d.address));
    entry.field("type", "vmess");
    entry.field("port", d.port);
    entry.field("uuid", scalar(view.identity));
    entry.field("alterId", d.alter_id);
    entry.field("cipher", "auto");
    push_tls(&mut entry, view, TlsOrder::SkipVerifyFirst);
    push_network(&mut entry, view);
    entry.field("udp", true);
    entry.finish()
}

fn clash_vless(view: &Effective<'_>) -> String {
    let d = view.descriptor;
    let mut entry = YamlEntry::new(view.name);
    entry.field("server", scalar(&d.address));
    entry.field("port", d.port);
    entry.field("type", "vless");
    entry.field("uuid", scalar(view.identity));
    push_tls(&mut entry, view, TlsOrder::ServerNameFirst);
    push_network(&mut entry, view);
    if let Some(flow) = d.flow() {
        entry.field("flow", scalar(flow));
    }
    entry.field("udp", true);
    entry.finish()
}

fn clash_trojan(view: &Effective<'_>) -> String {
    let d = view.descriptor;
    let mut entry = YamlEntry::new(view.name);
    entry.field("server", scalar(&d.address));
    entry.field("port", d.port);
    entry.field("type", "trojan");
    entry.field("password", scalar(view.identity));
    push_tls(&mut entry, view, TlsOrder::ServerNameFirst);
    push_network(&mut entry, view);
    entry.field("udp", true);
    entry.finish()
}

/// Order of the sub-fields following `tls: true`
#[derive(Debug, Clone, Copy)]
enum TlsOrder {
    SkipVerifyFirst,
    ServerNameFirst,
}

fn push_tls(entry: &mut YamlEntry, view: &Effective<'_>, order: TlsOrder) {
    let tls = view.descriptor.tls;
    entry.field("tls", tls);
    if !tls {
        return;
    }
    let servername = scalar(view.servername);
    match order {
        TlsOrder::SkipVerifyFirst => {
            entry.field("skip-cert-verify", tls);
            entry.field("servername", servername);
        }
        TlsOrder::ServerNameFirst => {
            entry.field("servername", servername);
            entry.field("skip-cert-verify", tls);
        }
    }
}

fn push_network(entry: &mut YamlEntry, view: &Effective<'_>) {
    let d = view.descriptor;
    entry.field("network", scalar(d.network.as_str()));
    match d.network {
        Network::Ws => {
            entry.section("ws-opts");
            entry.nested(2, "path", scalar(view.path()));
            if !d.host.is_empty() {
                entry.nested_section(2, "headers");
                entry.nested(3, "Host", scalar(&d.host));
            }
        }
        Network::Grpc => {
            entry.section("grpc-opts");
            entry.nested(2, "service-name", scalar(&d.service_name));
        }
        Network::Tcp | Network::Other(_) => {}
    }
}

/// Line-oriented builder for one `proxies:` list item
struct YamlEntry {
    lines: Vec<String>,
}

impl YamlEntry {
    const INDENT: &'static str = "  ";

    fn new(name: &str) -> Self {
        YamlEntry {
            lines: vec![format!("{}- name: {}", Self::INDENT, scalar(name))],
        }
    }

    fn field(&mut self, key: &str, value: impl fmt::Display) {
        self.nested(1, key, value);
    }

    fn section(&mut self, key: &str) {
        self.nested_section(1, key);
    }

    fn nested(&mut self, depth: usize, key: &str, value: impl fmt::Display) {
        self.lines
            .push(format!("{}{}: {}", Self::INDENT.repeat(depth + 1), key, value));
    }

    fn nested_section(&mut self, depth: usize, key: &str) {
        self.lines
            .push(format!("{}{}:", Self::INDENT.repeat(depth + 1), key));
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

/// Formats a string as a YAML scalar, plain when that keeps its meaning and quoted otherwise.
fn scalar(value: &str) -> String {
    if let Ok(emitted) = serde_yaml::to_string(value) {
        let emitted = emitted.trim_end_matches('\n');
        if !emitted.contains('\n') {
            return emitted.to_string();
        }
    }
    // Multi-line values: a JSON string is a valid double-quoted YAML scalar.
    serde_json::to_string(value).unwrap_or_else(|_| format!("'{}'", value.replace('\'', "''")))
}
