//! VLESS link parser
//!
//! URI format: `vless://<uuid>@<address>:<port>[?<query>][#<alias>]`
//!
//! **Required**: `uuid`, `address`, `port` (1–65535).
//!
//! **Query parameters** (optional, keys case-insensitive): `security` (`tls` turns TLS on),
//! `type` (tcp/ws/grpc/...), `path`, `host`, `sni`, `serviceName`, `flow`. Other keys are ignored.
//!
//! **Identity**: percent-decoded; text that is not valid percent-encoding is kept as-is.
//!
//! **Fragment**: percent-decoded into the alias. Without one the alias is
//! `vless-proxy-<address>`.
//!
//! ## Parsing rules
//!
//! 1. Prefix `vless://` is case-sensitive.
//! 2. Main part must contain `@` and a `:` for the port; otherwise `MalformedLink`.
//! 3. A `grpc` link without `serviceName` takes its service name from `path`.

use crate::LinkParser;
use crate::constants::defaults;
use crate::descriptor::{ProxyDescriptor, SourceKind};
use crate::error::{LinkError, Result};
use crate::query::{UriParts, apply_transport_param, decode_credential};
use tracing::trace;

/// VLESS link parser
#[derive(Debug, Clone, Copy, Default)]
pub struct VLess;

impl LinkParser for VLess {
    const KIND: SourceKind = SourceKind::VLess;

    fn parse(link: &str) -> Result<ProxyDescriptor> {
        let body = link
            .strip_prefix(Self::KIND.scheme())
            .ok_or_else(|| LinkError::UnsupportedScheme {
                scheme: crate::scheme_of(link),
            })?;

        let parts = UriParts::split(Self::KIND, body)?;
        let identity = decode_credential(parts.credential);
        let mut descriptor = ProxyDescriptor::new(Self::KIND, parts.address, parts.port, identity);
        descriptor.alias = Some(
            parts
                .fragment
                .unwrap_or_else(|| format!("{}-{}", defaults::VLESS_NAME, descriptor.address)),
        );

        for (key, value) in &parts.params {
            if apply_transport_param(&mut descriptor, key, value) {
                continue;
            }
            match key.as_str() {
                "flow" => descriptor.flow = Some(value.clone()),
                other => trace!("Ignoring VLESS query parameter '{}'", other),
            }
        }
        descriptor.backfill_grpc_service_name();

        Ok(descriptor)
    }
}
