//! Domain Errors

use compact_str::CompactString;

/// Reasons a received byte block could not be turned into a [Request].
///
/// [Request]: crate::infrastructure::server_impl::request::Request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("request line needs at least a method and a path")]
    MalformedRequestLine,
    #[error("unknown method `{0}`")]
    UnknownMethod(CompactString),
    #[error("header block is not terminated by an empty line")]
    MissingSeparator,
    #[error("request line is not valid utf-8")]
    NonUtf8RequestLine,
    #[error("header line without a colon: `{0}`")]
    MalformedHeader(CompactString),
    #[error("invalid Content-Length `{0}`")]
    InvalidContentLength(CompactString),
    #[error("body declares {declared} bytes but only {available} arrived")]
    IncompleteBody { declared: usize, available: usize },
}

impl ParseError {
    /// Whether more bytes from the peer could still turn this into a valid request.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::MissingSeparator | Self::IncompleteBody { .. })
    }
}
