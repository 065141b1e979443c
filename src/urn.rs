//! Encoding of storage object identifiers into the URL-safe URN used by the
//! Model Derivative API.

use crate::error::ForgeError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;

/// Prefix of every object identifier handed out by the storage service.
pub const OBJECT_ID_PREFIX: &str = "urn:adsk.objects:os.object:";

/// URL-safe, unpadded base64 of a storage object identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Urn(String);

impl Urn {
    /// Builds the URN for `object` stored in `bucket`.
    pub fn build(bucket: &str, object: &str) -> Self {
        Self::from_object_id(&format!("{OBJECT_ID_PREFIX}{bucket}/{object}"))
    }

    /// Encodes an object identifier as returned by the storage service.
    pub fn from_object_id(object_id: &str) -> Self {
        Urn(encode(object_id))
    }

    /// Wraps an already encoded URN after checking that it decodes.
    pub fn parse(encoded: &str) -> Result<Self, ForgeError> {
        let encoded = encoded.trim();
        decode(encoded)?;
        Ok(Urn(encoded.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The composite `urn:adsk.objects:os.object:{bucket}/{object}` string.
    pub fn decode(&self) -> Result<String, ForgeError> {
        decode(&self.0)
    }

    /// Splits the decoded identifier into its bucket and object keys.
    pub fn keys(&self) -> Result<(String, String), ForgeError> {
        let decoded = self.decode()?;
        let invalid = |reason: &str| ForgeError::InvalidUrn {
            urn: self.0.clone(),
            reason: reason.to_string(),
        };
        let rest = decoded
            .strip_prefix(OBJECT_ID_PREFIX)
            .ok_or_else(|| invalid("not a storage object identifier"))?;
        let (bucket, object) = rest
            .split_once('/')
            .ok_or_else(|| invalid("missing object key"))?;
        if bucket.is_empty() || object.is_empty() {
            return Err(invalid("empty bucket or object key"));
        }
        Ok((bucket.to_string(), object.to_string()))
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Urn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Standard base64 with the padding stripped and `+`/`/` swapped for `-`/`_`.
pub fn encode(plain: &str) -> String {
    STANDARD
        .encode(plain.as_bytes())
        .trim_end_matches('=')
        .replace('+', "-")
        .replace('/', "_")
}

/// Reverses [`encode`].
pub fn decode(encoded: &str) -> Result<String, ForgeError> {
    let invalid = |reason: String| ForgeError::InvalidUrn {
        urn: encoded.to_string(),
        reason,
    };
    let bytes = STANDARD
        .decode(to_standard(encoded))
        .map_err(|e| invalid(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| invalid(e.to_string()))
}

/// Converts a URL-safe unpadded string back into padded standard base64.
///
/// Padding is chosen from the input length alone: a remainder of 2 gets
/// `==`, a remainder of 3 gets `=`, anything else gets nothing.
pub fn to_standard(encoded: &str) -> String {
    let mut standard = encoded.replace('_', "/").replace('-', "+");
    match encoded.len() % 4 {
        2 => standard.push_str("=="),
        3 => standard.push('='),
        _ => {}
    }
    standard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_expected_urn() {
        let urn = Urn::build("forge_sample_client123-us", "model.rvt");
        assert!(!urn.as_str().contains('='));
        assert_eq!(
            urn.decode().unwrap(),
            "urn:adsk.objects:os.object:forge_sample_client123-us/model.rvt"
        );
    }

    #[test]
    fn round_trips_printable_ascii_names() {
        let printable: String = (0x20u8..0x7f).map(char::from).collect();
        for len in 0..printable.len() {
            let object = &printable[..len];
            let urn = Urn::build("bucket", object);
            assert_eq!(
                urn.decode().unwrap(),
                format!("{OBJECT_ID_PREFIX}bucket/{object}")
            );
        }
    }

    #[test]
    fn output_is_url_safe() {
        // "??>???" is "Pz8+Pz8/" in standard base64.
        let plain = "??>???";
        let encoded = encode(plain);
        assert_eq!(encoded, "Pz8-Pz8_");
        assert!(!encoded.contains(&['+', '/', '='][..]));
        assert_eq!(decode(&encoded).unwrap(), plain);
    }

    #[test]
    fn restores_padding_by_length() {
        assert_eq!(to_standard("QQ"), "QQ==");
        assert_eq!(to_standard("QUI"), "QUI=");
        assert_eq!(to_standard("QUJD"), "QUJD");
        assert_eq!(to_standard("a-b_"), "a+b/");
        for plain in ["A", "AB", "ABC", "ABCD", "ABCDE"] {
            let padded = to_standard(&encode(plain));
            assert_eq!(padded.len() % 4, 0);
            assert!(STANDARD.decode(&padded).is_ok());
        }
    }

    #[test]
    fn splits_keys() {
        let urn = Urn::build("forge_sample_abc-emea", "part.ipt");
        let (bucket, object) = urn.keys().unwrap();
        assert_eq!(bucket, "forge_sample_abc-emea");
        assert_eq!(object, "part.ipt");
    }

    #[test]
    fn rejects_foreign_identifiers() {
        let urn = Urn::from_object_id("urn:something:else");
        assert!(matches!(urn.keys(), Err(ForgeError::InvalidUrn { .. })));
        assert!(Urn::parse("!!!").is_err());
    }
}
