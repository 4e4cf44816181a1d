//! Text encodings used for reading sources and templates and writing output.

use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncodingError {
    #[error("unknown encoding '{0}' (expected utf-8 or latin-1)")]
    Unknown(String),

    #[error("character {0:?} cannot be encoded as latin-1")]
    Unencodable(char),
}

/// A text encoding for files read and written by the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Encoding {
    #[default]
    Utf8,
    Latin1,
}

impl Encoding {
    /// Decodes raw file content.
    ///
    /// Invalid input surfaces as an `InvalidData` I/O error so callers can
    /// treat it like any other read failure.
    pub fn decode(self, bytes: Vec<u8>) -> io::Result<String> {
        match self {
            Encoding::Utf8 => {
                String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
            }
            Encoding::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
        }
    }

    pub fn encode(self, text: &str) -> Result<Vec<u8>, EncodingError> {
        match self {
            Encoding::Utf8 => Ok(text.as_bytes().to_vec()),
            Encoding::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).map_err(|_| EncodingError::Unencodable(c)))
                .collect(),
        }
    }

    /// Reads a whole file and decodes it.
    pub fn read_to_string(self, path: &Path) -> io::Result<String> {
        self.decode(std::fs::read(path)?)
    }
}

impl FromStr for Encoding {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Encoding::Latin1),
            _ => Err(EncodingError::Unknown(s.to_string())),
        }
    }
}

impl TryFrom<String> for Encoding {
    type Error = EncodingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Utf8 => f.write_str("utf-8"),
            Encoding::Latin1 => f.write_str("latin-1"),
        }
    }
}
