//! Shared-secret message authentication.
//!
//! A sender computes an HMAC-SHA-256 tag over a message with a shared secret
//! and hands the tag, as hex or base64 text, to a receiver. The receiver
//! recomputes the tag with the same secret and compares the two in constant
//! time. This gives integrity and authenticity, not confidentiality.
//!
//! ```
//! use macpair::{compute_tag, decode, derive_key, encode, verify_tag, Encoding};
//!
//! let key = derive_key("secret");
//! let text = encode(&compute_tag(&key, "hello")?, Encoding::Base64);
//!
//! let received = decode(&text, Encoding::Base64)?;
//! assert!(verify_tag(&key, "hello", &received)?);
//! assert!(!verify_tag(&key, "hell0", &received)?);
//! # Ok::<(), macpair::Error>(())
//! ```
mod codec;
mod error;
mod key;
mod mac;

pub use crate::codec::{decode_base64, decode_hex, encode_base64, encode_hex, Encoding};
pub use crate::error::{Error, Result};
pub use crate::key::{Algorithm, KeyMaterial};
pub use crate::mac::{MacEngine, Tag, TAG_LEN};

pub fn derive_key(secret: impl AsRef<[u8]>) -> KeyMaterial {
    KeyMaterial::derive(secret)
}

/// Compute the tag of `message` under `key`.
///
/// The only possible error is [`Error::PlatformUnavailable`].
pub fn compute_tag(key: &KeyMaterial, message: impl AsRef<[u8]>) -> Result<Tag> {
    Ok(MacEngine::new(key)?.compute(message.as_ref()))
}

/// Check `tag` against `message` under `key`.
///
/// A wrong tag gives `Ok(false)`. The only possible error is
/// [`Error::PlatformUnavailable`].
pub fn verify_tag(key: &KeyMaterial, message: impl AsRef<[u8]>, tag: &Tag) -> Result<bool> {
    Ok(MacEngine::new(key)?.verify(message.as_ref(), tag))
}

pub fn encode(tag: &Tag, encoding: Encoding) -> String {
    codec::encode(tag, encoding)
}

pub fn decode(s: &str, encoding: Encoding) -> Result<Tag> {
    codec::decode(s, encoding)
}

/// Refuse an empty input before it reaches the core.
///
/// The algorithm itself is happy with empty secrets and messages; this is
/// for callers that want to treat them as a user mistake.
pub fn ensure_present(field: &'static str, value: impl AsRef<[u8]>) -> Result<()> {
    if value.as_ref().is_empty() {
        tracing::debug!(field, "rejected empty input");
        return Err(Error::EmptyInput { field });
    }
    Ok(())
}
