//! EEPROM image files.
//!
//! Keeps save data between runs by dumping the whole device to disk and
//! writing it back later. Restoring goes through conditional updates, so an
//! unchanged image costs no write cycles.
//!
//! ## File format
//!
//! ```text
//! +------------------+
//! | Magic "EEIM"     |  4 bytes
//! +------------------+
//! | Format version   |  u32 little-endian (currently 1)
//! +------------------+
//! | Compressed data  |  deflate-compressed bincode payload
//! +------------------+
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::device::Device;
use crate::eeprom::Eeprom;

/// Magic bytes identifying an EEPROM image file.
const MAGIC: &[u8; 4] = b"EEIM";
/// Current image format version.
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode error: {0}")]
    Encode(#[from] bincode::Error),
    #[error("decompress error: {0}")]
    Decompress(String),
    #[error("file too small ({0} bytes)")]
    TooSmall(usize),
    #[error("invalid EEPROM image (bad magic)")]
    BadMagic,
    #[error("unsupported image version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Full copy of an EEPROM's contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EepromImage {
    pub data: Vec<u8>,
}

impl EepromImage {
    /// Read every cell of `eeprom`.
    pub fn capture<D: Device>(eeprom: &Eeprom<D>) -> Self {
        EepromImage { data: eeprom.snapshot() }
    }

    /// Write this image back, updating only cells that differ.
    ///
    /// A shorter image leaves the tail of the device untouched; a longer one
    /// is truncated. Returns the number of cells changed.
    pub fn apply<D: Device>(&self, eeprom: &Eeprom<D>) -> usize {
        if self.data.len() != eeprom.len() {
            log::debug!("image is {} bytes, device is {}", self.data.len(), eeprom.len());
        }
        eeprom.restore(&self.data)
    }

    /// Encode with header and deflate compression.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ImageError> {
        let payload = bincode::serialize(self)?;
        let compressed = miniz_oxide::deflate::compress_to_vec(&payload, 6);

        let mut out = Vec::with_capacity(HEADER_LEN + compressed.len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        out.extend_from_slice(&compressed);
        Ok(out)
    }

    /// Decode, verifying magic and version.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ImageError> {
        if data.len() < HEADER_LEN {
            return Err(ImageError::TooSmall(data.len()));
        }
        if &data[0..4] != MAGIC {
            return Err(ImageError::BadMagic);
        }
        let version = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
        if version != FORMAT_VERSION {
            return Err(ImageError::UnsupportedVersion { found: version, expected: FORMAT_VERSION });
        }

        let decompressed = miniz_oxide::inflate::decompress_to_vec(&data[HEADER_LEN..])
            .map_err(|e| ImageError::Decompress(format!("{:?}", e)))?;

        Ok(bincode::deserialize(&decompressed)?)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ImageError> {
        let out = self.to_bytes()?;
        std::fs::write(path, &out)?;
        log::debug!("saved {} byte EEPROM image to {}", self.data.len(), path.display());
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ImageError> {
        let data = std::fs::read(path)?;
        let image = Self::from_bytes(&data)?;
        log::debug!("loaded {} byte EEPROM image from {}", image.data.len(), path.display());
        Ok(image)
    }
}

/// Derive the image path from a game file path.
/// `game.hex` → `game.eep`, `game.arduboy` → `game.eep`
pub fn image_path(game_path: &str) -> PathBuf {
    let p = Path::new(game_path);
    let stem = p.file_stem().and_then(|s| s.to_str()).unwrap_or("game");
    let dir = p.parent().unwrap_or(Path::new("."));
    dir.join(format!("{}.eep", stem))
}
