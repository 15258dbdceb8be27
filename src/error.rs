use thiserror::Error;

use crate::codec::Encoding;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop an authentication step from producing an answer.
///
/// A tag that fails to verify is not an error: verification returns `false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A caller refused to run with an empty secret, message or tag.
    #[error("{field} must not be empty")]
    EmptyInput { field: &'static str },

    /// Tag text that is not valid in the requested encoding.
    #[error("malformed {encoding} tag: {reason}")]
    MalformedEncoding { encoding: Encoding, reason: String },

    #[error("unknown tag encoding {0:?}, expected \"hex\" or \"base64\"")]
    UnknownEncoding(String),

    /// The HMAC primitive refused to key itself.
    #[error("HMAC primitive unavailable: {0}")]
    PlatformUnavailable(String),
}
