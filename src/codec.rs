//! Text forms of a tag, for showing, copying and pasting.

use core::fmt;
use core::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{Error, Result};
use crate::mac::Tag;

/// The two ways a tag travels as text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Lowercase hexadecimal, two digits per byte, no separators.
    Hex,
    /// RFC 4648 base64, standard alphabet, `=` padded.
    Base64,
}

impl Encoding {
    pub const fn name(self) -> &'static str {
        match self {
            Encoding::Hex => "hex",
            Encoding::Base64 => "base64",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("hex") {
            Ok(Encoding::Hex)
        } else if s.eq_ignore_ascii_case("base64") {
            Ok(Encoding::Base64)
        } else {
            Err(Error::UnknownEncoding(s.to_owned()))
        }
    }
}

pub fn encode_hex(tag: &Tag) -> String {
    hex::encode(tag.as_bytes())
}

/// Parse hex text, in either case, back into a tag.
pub fn decode_hex(s: &str) -> Result<Tag> {
    if s.is_empty() {
        return Err(malformed(Encoding::Hex, "empty input"));
    }
    let bytes = hex::decode(s).map_err(|e| malformed(Encoding::Hex, e))?;
    tracing::trace!(len = bytes.len(), "decoded hex tag");
    Ok(Tag::from(bytes))
}

pub fn encode_base64(tag: &Tag) -> String {
    STANDARD.encode(tag.as_bytes())
}

/// Parse padded standard base64 back into a tag.
///
/// Non-canonical padding and stray trailing bits are rejected.
pub fn decode_base64(s: &str) -> Result<Tag> {
    if s.is_empty() {
        return Err(malformed(Encoding::Base64, "empty input"));
    }
    let bytes = STANDARD
        .decode(s)
        .map_err(|e| malformed(Encoding::Base64, e))?;
    tracing::trace!(len = bytes.len(), "decoded base64 tag");
    Ok(Tag::from(bytes))
}

pub fn encode(tag: &Tag, encoding: Encoding) -> String {
    match encoding {
        Encoding::Hex => encode_hex(tag),
        Encoding::Base64 => encode_base64(tag),
    }
}

pub fn decode(s: &str, encoding: Encoding) -> Result<Tag> {
    match encoding {
        Encoding::Hex => decode_hex(s),
        Encoding::Base64 => decode_base64(s),
    }
}

fn malformed(encoding: Encoding, reason: impl fmt::Display) -> Error {
    Error::MalformedEncoding {
        encoding,
        reason: reason.to_string(),
    }
}
