//! Trojan link parser
//!
//! Link format: `trojan://<password>@<address>:<port>[?<query>][#<alias>]`
//!
//! **Required**: `password`, `address`, `port` (1–65535). A password containing `@`, `:` or
//! other reserved characters must be percent-encoded; it is decoded on parse.
//!
//! **Query parameters** (optional, keys case-insensitive): `security`, `type`, `path`, `host`,
//! `sni`, `serviceName`. `flow` is not a Trojan parameter and is ignored like any unknown key.
//!
//! **Fragment**: percent-decoded into the alias. Without one the alias is
//! `trojan-proxy-<address>`.

use crate::LinkParser;
use crate::constants::defaults;
use crate::descriptor::{ProxyDescriptor, SourceKind};
use crate::error::{LinkError, Result};
use crate::query::{UriParts, apply_transport_param, decode_credential};
use tracing::trace;

/// Trojan link parser
#[derive(Debug, Clone, Copy, Default)]
pub struct Trojan;

impl LinkParser for Trojan {
    const KIND: SourceKind = SourceKind::Trojan;

    fn parse(link: &str) -> Result<ProxyDescriptor> {
        let body = link
            .strip_prefix(Self::KIND.scheme())
            .ok_or_else(|| LinkError::UnsupportedScheme {
                scheme: crate::scheme_of(link),
            })?;

        let parts = UriParts::split(Self::KIND, body)?;
        let password = decode_credential(parts.credential);

        let mut descriptor = ProxyDescriptor::new(Self::KIND, parts.address, parts.port, password);
        descriptor.alias = Some(
            parts
                .fragment
                .unwrap_or_else(|| format!("{}-{}", defaults::TROJAN_NAME, descriptor.address)),
        );

        for (key, value) in &parts.params {
            if !apply_transport_param(&mut descriptor, key, value) {
                trace!("Ignoring Trojan query parameter '{}'", key);
            }
        }
        descriptor.backfill_grpc_service_name();

        Ok(descriptor)
    }
}
