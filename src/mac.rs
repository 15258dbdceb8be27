use core::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::{Choice, ConstantTimeEq};

use crate::error::{Error, Result};
use crate::key::{Algorithm, KeyMaterial};

type HmacSha256 = Hmac<Sha256>;

/// The length of every tag we compute.
pub const TAG_LEN: usize = Algorithm::HmacSha256.tag_len();

/// An authentication tag.
///
/// Tags we compute are always [`TAG_LEN`] bytes long. Tags decoded from text
/// can have any length; those of the wrong length simply never verify.
///
/// Equality is constant-time.
#[derive(Clone, Eq)]
pub struct Tag(Vec<u8>);

impl Tag {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl ConstantTimeEq for Tag {
    fn ct_eq(&self, other: &Self) -> Choice {
        // Only the length may leak; contents are compared without early exit.
        self.0.as_slice().ct_eq(other.0.as_slice())
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl From<Vec<u8>> for Tag {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<[u8; TAG_LEN]> for Tag {
    fn from(bytes: [u8; TAG_LEN]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for Tag {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", hex::encode(&self.0))
    }
}

/// A keyed HMAC-SHA-256 instance.
///
/// Keying happens once, in [`MacEngine::new`]; after that, computing and
/// verifying cannot fail, and one engine can be reused for any number of
/// messages.
#[derive(Clone)]
pub struct MacEngine {
    keyed: HmacSha256,
    algorithm: Algorithm,
}

impl MacEngine {
    pub fn new(key: &KeyMaterial) -> Result<Self> {
        let keyed = match key.algorithm() {
            Algorithm::HmacSha256 => <HmacSha256 as Mac>::new_from_slice(key.secret())
                .map_err(|e| Error::PlatformUnavailable(e.to_string()))?,
        };
        Ok(Self {
            keyed,
            algorithm: key.algorithm(),
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Compute the tag of a message.
    pub fn compute(&self, message: &[u8]) -> Tag {
        let mut mac = self.keyed.clone();
        mac.update(message);
        let tag = Tag(mac.finalize().into_bytes().to_vec());
        tracing::debug!(
            algorithm = %self.algorithm,
            message_len = message.len(),
            "computed tag"
        );
        tag
    }

    /// Check a candidate tag against the one this key gives for `message`.
    ///
    /// Returns `false` on any mismatch, including a length mismatch.
    pub fn verify(&self, message: &[u8], candidate: &Tag) -> bool {
        let expected = self.compute(message);
        let valid = bool::from(expected.ct_eq(candidate));
        tracing::debug!(candidate_len = candidate.len(), valid, "verified tag");
        valid
    }
}

impl fmt::Debug for MacEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MacEngine")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
