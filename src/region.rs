use crate::error::ForgeError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// One of the two data-center regions the service is deployed in.
///
/// The same value selects the derivative endpoint instance, the storage
/// region a bucket is created in, and the destination of translated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Us,
    Emea,
}

impl Region {
    /// Resolves a region token case-insensitively.
    pub fn resolve(token: &str) -> Result<Self, ForgeError> {
        match token.trim().to_ascii_lowercase().as_str() {
            "us" => Ok(Region::Us),
            "emea" => Ok(Region::Emea),
            _ => Err(ForgeError::InvalidRegion(token.to_string())),
        }
    }

    /// Value of the `x-ads-region` header used when creating buckets.
    pub fn header_value(self) -> &'static str {
        match self {
            Region::Us => "US",
            Region::Emea => "EMEA",
        }
    }

    /// Lower-case form used in bucket keys and job destinations.
    pub fn as_str(self) -> &'static str {
        match self {
            Region::Us => "us",
            Region::Emea => "emea",
        }
    }

    /// Path segments addressing the Model Derivative API for this region.
    pub(crate) fn derivative_prefix(self) -> &'static [&'static str] {
        match self {
            Region::Us => &["modelderivative", "v2", "designdata"],
            Region::Emea => &["modelderivative", "v2", "regions", "eu", "designdata"],
        }
    }
}

impl FromStr for Region {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::resolve(s)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header_value())
    }
}
