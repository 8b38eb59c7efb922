//! Declared text encodings for instrument exports
//!
//! Ground-station software for some sondes writes Latin-1 (the degree sign in
//! column headers is a single 0xB0 byte), others write UTF-8.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Text encoding of an instrument export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    #[default]
    #[serde(alias = "utf-8", alias = "UTF-8")]
    Utf8,
    #[serde(alias = "latin-1", alias = "latin", alias = "iso-8859-1", alias = "ISO-8859-1")]
    Latin1,
}

impl TextEncoding {
    pub fn as_str(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf8",
            TextEncoding::Latin1 => "latin1",
        }
    }

    /// Decode raw bytes into text
    ///
    /// A leading UTF-8 byte order mark is dropped. Latin-1 maps every byte to the
    /// code point of the same value and therefore never fails.
    pub fn decode(self, bytes: &[u8]) -> Result<Cow<'_, str>> {
        match self {
            TextEncoding::Utf8 => {
                let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                std::str::from_utf8(bytes)
                    .map(Cow::Borrowed)
                    .map_err(|e| Error::encoding(self.as_str(), e.to_string()))
            }
            TextEncoding::Latin1 => Ok(Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(TextEncoding::Utf8),
            "latin1" | "latin-1" | "latin" | "iso-8859-1" => Ok(TextEncoding::Latin1),
            other => Err(Error::configuration(format!(
                "Unsupported text encoding '{}' (expected utf8 or latin1)",
                other
            ))),
        }
    }
}
