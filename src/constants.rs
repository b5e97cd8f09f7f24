//! Shared constants for link schemes, defaults and error messages.
//!
//! Centralizes magic strings so that parsers and renderers agree on them.

/// Link scheme prefixes (lowercase, with `://`). Matching is case-sensitive.
pub mod scheme {
    /// VMess: `vmess://`
    pub const VMESS: &str = "vmess://";
    /// VLESS: `vless://`
    pub const VLESS: &str = "vless://";
    /// Trojan: `trojan://`
    pub const TROJAN: &str = "trojan://";
}

/// Values seeded at parse time or substituted at render time.
pub mod defaults {
    /// Transport used when a link does not name one.
    pub const NETWORK: &str = "tcp";
    /// HTTP path used when a link does not carry one.
    pub const PATH: &str = "/";
    /// Credential emitted for VMess/VLESS output when the descriptor has none.
    pub const PLACEHOLDER_UUID: &str = "auto-uuid";
    /// Credential emitted for Trojan output when the descriptor has none.
    pub const PLACEHOLDER_PASSWORD: &str = "auto-password";
    /// Proxy name for Clash VMess entries without an alias.
    pub const VMESS_NAME: &str = "vmess-proxy";
    /// Proxy name for Clash VLESS entries without an alias.
    pub const VLESS_NAME: &str = "vless-proxy";
    /// Proxy name for Clash Trojan entries without an alias.
    pub const TROJAN_NAME: &str = "trojan-proxy";
    /// Value of the VMess `tls` JSON field that turns TLS on.
    pub const VMESS_TLS: &str = "tls";
    /// Value of the `security` query parameter that turns TLS on.
    pub const SECURITY_TLS: &str = "tls";
}

/// User-facing message fragments.
pub mod error_msg {
    /// Hint shown to end users next to a parse failure.
    pub const RECHECK_HINT: &str = "check that the link is complete and valid";
}
