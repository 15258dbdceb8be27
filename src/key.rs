use core::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// The hash algorithms a key can be bound to.
///
/// There is exactly one; it is never negotiated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    HmacSha256,
}

impl Algorithm {
    /// Length, in bytes, of the tags this algorithm produces.
    pub const fn tag_len(self) -> usize {
        match self {
            Algorithm::HmacSha256 => 32,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Algorithm::HmacSha256 => "HMAC-SHA-256",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A shared secret, ready to sign and verify with.
///
/// The same handle serves both roles. The secret bytes are wiped when the
/// handle is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    secret: Vec<u8>,
    #[zeroize(skip)]
    algorithm: Algorithm,
}

impl KeyMaterial {
    /// Bind a raw secret to HMAC-SHA-256.
    ///
    /// Any byte string is accepted, including the empty one.
    pub fn derive(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref().to_vec();
        tracing::debug!(secret_len = secret.len(), "derived key material");
        Self {
            secret,
            algorithm: Algorithm::HmacSha256,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub(crate) fn secret(&self) -> &[u8] {
        &self.secret
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("secret", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}
