//! Configuration options for volume loading.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Options controlling how a raw dataset is decoded and uploaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderOptions {
    /// Byte order of the 16-bit elements in the dataset file.
    pub byte_order: ByteOrder,

    /// How a non-positive normalization scale is treated.
    pub scale_policy: ScalePolicy,

    /// Texture unit the volume texture is bound to during upload.
    pub texture_unit: u32,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            byte_order: ByteOrder::LittleEndian,
            scale_policy: ScalePolicy::SeedAtZero,
            texture_unit: 0,
        }
    }
}

impl LoaderOptions {
    /// Parses options from a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads options from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

/// Byte order of the 16-bit integers in a dataset.
///
/// The format carries no endianness marker, so the reader must agree with
/// whatever produced the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ByteOrder {
    /// Least significant byte first.
    #[default]
    LittleEndian,
    /// Most significant byte first.
    BigEndian,
}

impl ByteOrder {
    /// Decodes one 16-bit signed element.
    #[must_use]
    pub fn read_i16(self, bytes: [u8; 2]) -> i16 {
        match self {
            Self::LittleEndian => i16::from_le_bytes(bytes),
            Self::BigEndian => i16::from_be_bytes(bytes),
        }
    }

    /// Encodes one 16-bit signed element.
    #[must_use]
    pub fn write_i16(self, value: i16) -> [u8; 2] {
        match self {
            Self::LittleEndian => value.to_le_bytes(),
            Self::BigEndian => value.to_be_bytes(),
        }
    }
}

/// Treatment of the normalization scale when no sample is positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ScalePolicy {
    /// Running maximum starts at zero; a non-positive dataset divides by zero
    /// and yields non-finite samples.
    #[default]
    SeedAtZero,
    /// Reject datasets whose scale is not strictly positive.
    Strict,
}
