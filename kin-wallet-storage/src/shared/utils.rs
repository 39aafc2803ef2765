//! Utility functions for the storage layer

use sha2::{Digest, Sha224, Sha256};

/// Lowercase hex of the first `bytes` bytes of SHA-256(data)
pub fn sha256_hex_prefix(data: &[u8], bytes: usize) -> String {
    let hash = Sha256::digest(data);
    let end = bytes.min(hash.len());
    hex::encode(&hash[..end])
}

/// SHA-224 digest of data
pub fn sha224(data: &[u8]) -> [u8; 28] {
    let mut out = [0u8; 28];
    out.copy_from_slice(&Sha224::digest(data));
    out
}
