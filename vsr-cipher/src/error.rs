//! Error types for the cipher primitives.

use thiserror::Error;

/// Errors that can occur while encrypting or decrypting provider payloads.
#[derive(Debug, Error)]
pub enum CipherError {
    /// Key length is not one of the AES key sizes.
    #[error("invalid key size: expected 16, 24 or 32 bytes, got {0} bytes")]
    InvalidKeySize(usize),

    /// IV length is not one AES block.
    #[error("invalid IV size: expected 16 bytes, got {0} bytes")]
    InvalidIvSize(usize),

    /// Ciphertext is empty or not a multiple of the block size.
    #[error("ciphertext length {0} is not a non-zero multiple of the block size")]
    Misaligned(usize),

    /// Trailing PKCS#7 bytes are inconsistent.
    #[error("invalid PKCS#7 padding")]
    BadPadding,

    /// Envelope is shorter than its header.
    #[error("ciphertext too short: {0} bytes")]
    Truncated(usize),

    /// Input is not base64 in any accepted alphabet.
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decrypted payload does not start with a four digit length or is shorter than it.
    #[error("malformed length prefix in decrypted payload")]
    LengthPrefix,

    /// Key generation was given nothing to work with.
    #[error("empty key material")]
    EmptyKey,
}

/// Result type for cipher operations.
pub type Result<T> = std::result::Result<T, CipherError>;
