//! # v2clash
//!
//! Converts VMess, VLESS and Trojan proxy links into a VLESS link or a Clash YAML proxy entry
//! of any of the three families.
//!
//! ## Features
//!
//! - Parse any supported link into one canonical [`ProxyDescriptor`]
//! - Render a descriptor into any [`OutputKind`], reusing the credential across families
//! - Rendering is pure: the same descriptor can be rendered any number of times, in any order
//! - Structured errors with the underlying decoder failure chained as `source()`
//!
//! ## Supported links
//!
//! - **[VMess]** (`vmess://`) — base64-encoded JSON
//! - **[VLess]** (`vless://`) — `uuid@host:port?query#alias`
//! - **[Trojan]** (`trojan://`) — `password@host:port?query#alias`
//!
//! ## Link parsing rules (unified)
//!
//! - **Scheme prefix**: case-sensitive, matched literally; anything else is
//!   [`LinkError::UnsupportedScheme`].
//! - **Port**: 1–65535; VMess allows port as number or string in JSON.
//! - **Query string**: `&`-separated pairs, keys case-insensitive, values percent-decoded.
//! - **Fragment (`#`)**: decoded as the alias.
//! - **Errors**: a recognized scheme with a broken body is [`LinkError::MalformedLink`]; no
//!   partially parsed descriptor is ever returned.
//!
//! ## Output kinds
//!
//! | Kind | Output |
//! |------|--------|
//! | `vless-link` | `vless://uuid@host:port?type=...` |
//! | `clash-vmess-yaml` | Clash entry with `type: vmess` |
//! | `clash-vless-yaml` | Clash entry with `type: vless` |
//! | `clash-trojan-yaml` | Clash entry with `type: trojan` |
//!
//! ## Example
//!
//! ```rust
//! use v2clash::{OutputKind, parse_link, render};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let descriptor = parse_link("vless://uuid-1@example.com:443?security=tls&type=ws&path=%2Fws#Edge")?;
//!
//! let yaml = render(&descriptor, OutputKind::ClashTrojanYaml);
//! assert!(yaml.contains("password: uuid-1"));
//! assert!(yaml.contains("path: /ws"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod constants;
mod convert;
mod descriptor;
mod error;
mod query;
mod render;
mod trojan;
mod vless;
mod vmess;


pub use constants::error_msg::RECHECK_HINT;
pub use convert::{Conversion, Rendered, convert, convert_to};
pub use descriptor::{Network, ProxyDescriptor, SourceKind};
pub use error::{LinkError, Malformed, Result};
pub use render::{OutputKind, UnknownOutputKind, render};
pub use trojan::Trojan;
pub use vless::VLess;
pub use vmess::VMess;

use tracing::debug;

/// Parser for one link family
pub trait LinkParser {
    /// Family this parser accepts
    const KIND: SourceKind;

    /// Parse a link of this family into a descriptor
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::UnsupportedScheme`] if the link does not start with this family's
    /// scheme and [`LinkError::MalformedLink`] if its body is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use v2clash::{LinkParser, Trojan};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let descriptor = Trojan::parse("trojan://p%40ss@example.com:443")?;
    /// assert_eq!(descriptor.identity, "p@ss");
    /// # Ok(())
    /// # }
    /// ```
    fn parse(link: &str) -> Result<ProxyDescriptor>;
}

/// Parse any supported link, dispatching on its scheme prefix
///
/// # Errors
///
/// Returns [`LinkError::UnsupportedScheme`] for an unknown prefix and
/// [`LinkError::MalformedLink`] when the link body is invalid.
///
/// # Example
///
/// ```rust
/// use v2clash::{Network, parse_link};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let descriptor = parse_link("vless://id@h:443")?;
/// assert_eq!(descriptor.network, Network::Tcp);
/// assert_eq!(descriptor.sni, "h");
/// assert!(!descriptor.tls);
/// # Ok(())
/// # }
/// ```
pub fn parse_link(link: &str) -> Result<ProxyDescriptor> {
    let kind = SourceKind::detect(link).ok_or_else(|| LinkError::UnsupportedScheme {
        scheme: scheme_of(link),
    })?;
    debug!("Parsing {} link", kind);

    let parsed = match kind {
        SourceKind::VMess => VMess::parse(link),
        SourceKind::VLess => VLess::parse(link),
        SourceKind::Trojan => Trojan::parse(link),
    };
    match &parsed {
        Ok(descriptor) => debug!(
            "Parsed {} link -> {}:{} ({})",
            kind, descriptor.address, descriptor.port, descriptor.network
        ),
        Err(e) => debug!("Failed to parse {} link: {}", kind, e),
    }
    parsed
}

/// Scheme name for error messages: text before `://`, or a short prefix of the input.
pub(crate) fn scheme_of(link: &str) -> String {
    match link.split_once("://") {
        Some((scheme, _)) => scheme.to_string(),
        None => link.chars().take(16).collect(),
    }
}
