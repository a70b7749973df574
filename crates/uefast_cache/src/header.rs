//! The fixed-size cache header.

use crate::error::CacheError;

/// Magic bytes identifying a startup cache.
pub const CACHE_MAGIC: [u8; 8] = *b"UEFAST01";

/// Current format version. Increment on any change to the header or body.
pub const FORMAT_VERSION: u32 = 1;

/// Size of the encoded header.
pub const HEADER_LEN: usize = 24;

/// Header written before the cache body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheHeader {
    /// Must be [`CACHE_MAGIC`].
    pub magic: [u8; 8],
    /// Format version of the body.
    pub version: u32,
    /// XXH32 (seed 0) of the body.
    pub checksum: u32,
    /// Length of the body in bytes.
    pub body_len: u64,
}

impl CacheHeader {
    /// Builds the header for a body in the current format.
    pub fn for_body(body: &[u8]) -> Self {
        Self {
            magic: CACHE_MAGIC,
            version: FORMAT_VERSION,
            checksum: checksum(body),
            body_len: body.len() as u64,
        }
    }

    /// Encodes the header.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..8].copy_from_slice(&self.magic);
        out[8..12].copy_from_slice(&self.version.to_le_bytes());
        out[12..16].copy_from_slice(&self.checksum.to_le_bytes());
        out[16..24].copy_from_slice(&self.body_len.to_le_bytes());
        out
    }

    /// Decodes the header fields from the start of `data` without checking
    /// them.
    pub fn read(data: &[u8]) -> Result<Self, CacheError> {
        let Some(raw) = data.get(..HEADER_LEN) else {
            return Err(CacheError::Truncated {
                expected: HEADER_LEN as u64,
                found: data.len() as u64,
            });
        };
        let mut magic = [0u8; 8];
        magic.copy_from_slice(&raw[0..8]);
        let mut version = [0u8; 4];
        version.copy_from_slice(&raw[8..12]);
        let mut checksum = [0u8; 4];
        checksum.copy_from_slice(&raw[12..16]);
        let mut body_len = [0u8; 8];
        body_len.copy_from_slice(&raw[16..24]);
        Ok(Self {
            magic,
            version: u32::from_le_bytes(version),
            checksum: u32::from_le_bytes(checksum),
            body_len: u64::from_le_bytes(body_len),
        })
    }

    /// Decodes the header and checks magic, version, length and checksum,
    /// in that order. Returns the body on success.
    pub fn verify(data: &[u8]) -> Result<(Self, &[u8]), CacheError> {
        // A short file that does not even start like a cache is a foreign file.
        if data.len() < HEADER_LEN {
            let prefix = &data[..data.len().min(CACHE_MAGIC.len())];
            if !CACHE_MAGIC.starts_with(prefix) {
                let mut found = [0u8; 8];
                found[..prefix.len()].copy_from_slice(prefix);
                return Err(CacheError::BadMagic { found });
            }
        }
        let header = Self::read(data)?;
        if header.magic != CACHE_MAGIC {
            return Err(CacheError::BadMagic {
                found: header.magic,
            });
        }
        if header.version != FORMAT_VERSION {
            return Err(CacheError::UnsupportedVersion {
                expected: FORMAT_VERSION,
                actual: header.version,
            });
        }
        let body = &data[HEADER_LEN..];
        if header.body_len != body.len() as u64 {
            return Err(CacheError::Truncated {
                expected: HEADER_LEN as u64 + header.body_len,
                found: data.len() as u64,
            });
        }
        let actual = checksum(body);
        if actual != header.checksum {
            return Err(CacheError::ChecksumMismatch {
                expected: header.checksum,
                actual,
            });
        }
        Ok((header, body))
    }
}

/// XXH32 with seed 0.
pub fn checksum(body: &[u8]) -> u32 {
    xxhash_rust::xxh32::xxh32(body, 0)
}
