//! Error types for link parsing
//!
//! Two kinds of failure exist (see crate-level docs):
//! - **UnsupportedScheme**: the input does not start with `vmess://`, `vless://` or `trojan://`.
//! - **MalformedLink**: the scheme is known but the body breaks its grammar. The concrete
//!   reason is a [`Malformed`] value which chains the underlying decoder error, if any,
//!   through [`std::error::Error::source`].
//!
//! Rendering never fails, so there is no render error.

use crate::descriptor::SourceKind;
use std::num::ParseIntError;
use std::string::FromUtf8Error;
use thiserror::Error;

/// Result type for link parsing operations
pub type Result<T> = std::result::Result<T, LinkError>;

/// Errors that can occur while parsing a link
#[derive(Debug, Error)]
pub enum LinkError {
    /// The link does not start with a recognized scheme prefix
    #[error("Unsupported link type '{scheme}': only VMess, VLESS or Trojan links are accepted")]
    UnsupportedScheme {
        /// Whatever precedes `://`, or the first characters of the input
        scheme: String,
    },
    /// The scheme is recognized but the link body is structurally invalid
    #[error("Failed to parse {kind} link: {cause}")]
    MalformedLink {
        /// Link family the parser was working on
        kind: SourceKind,
        /// What exactly was wrong
        #[source]
        cause: Malformed,
    },
}

impl LinkError {
    pub(crate) fn malformed(kind: SourceKind, cause: Malformed) -> Self {
        LinkError::MalformedLink { kind, cause }
    }

    /// Returns the structural reason for a [`LinkError::MalformedLink`].
    pub fn malformed_cause(&self) -> Option<&Malformed> {
        match self {
            LinkError::MalformedLink { cause, .. } => Some(cause),
            LinkError::UnsupportedScheme { .. } => None,
        }
    }
}

/// Reasons a link body fails its grammar
#[derive(Debug, Error)]
pub enum Malformed {
    /// No `@` separating credential and host
    #[error("missing '@' between credential and host")]
    MissingAt,
    /// No `:` separating host and port
    #[error("missing ':' in host:port")]
    MissingPort,
    /// Port is not a number
    #[error("invalid port '{value}': {source}")]
    InvalidPort {
        /// Raw port text
        value: String,
        /// Integer parse failure
        #[source]
        source: ParseIntError,
    },
    /// Port parsed but is 0
    #[error("port must be in 1-65535")]
    PortOutOfRange,
    /// A percent-encoded component did not decode to UTF-8
    #[error("invalid percent-encoding in {component}: {source}")]
    PercentEncoding {
        /// Which part of the link held the bad escape
        component: String,
        /// UTF-8 failure reported by the decoder
        #[source]
        source: FromUtf8Error,
    },
    /// A `%` not followed by two hex digits
    #[error("invalid percent escape '{escape}' in {component}")]
    InvalidEscape {
        /// Which part of the link held the bad escape
        component: String,
        /// The offending `%` and up to two following characters
        escape: String,
    },
    /// VMess payload is not base64
    #[error("invalid base64 payload: {0}")]
    Base64(#[source] base64::DecodeError),
    /// VMess payload decoded to bytes that are not UTF-8
    #[error("decoded payload is not UTF-8: {0}")]
    Utf8(#[source] FromUtf8Error),
    /// VMess payload is not the expected JSON object (includes missing required fields)
    #[error("invalid JSON payload: {0}")]
    Json(#[source] serde_json::Error),
}

impl From<base64::DecodeError> for Malformed {
    fn from(err: base64::DecodeError) -> Self {
        Malformed::Base64(err)
    }
}

impl From<serde_json::Error> for Malformed {
    fn from(err: serde_json::Error) -> Self {
        Malformed::Json(err)
    }
}
