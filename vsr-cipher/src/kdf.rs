//! OpenSSL compatible `Salted__` envelopes.
//!
//! The key and IV are derived with `EVP_BytesToKey` using MD5 and a single
//! iteration, which is what `openssl enc -md md5` and CryptoJS produce.

use crate::{
    aes::{self, BLOCK_SIZE},
    error::{CipherError, Result},
};
use md5::{Digest, Md5};

pub const SALTED_MAGIC: &[u8; 8] = b"Salted__";

/// Derives a 256 bit key and a 128 bit IV from a password and an 8 byte salt.
pub fn evp_bytes_to_key(password: &[u8], salt: &[u8]) -> ([u8; 32], [u8; 16]) {
    let mut material = Vec::with_capacity(48);
    let mut digest = Vec::new();

    while material.len() < 48 {
        let mut hasher = Md5::new();
        hasher.update(&digest);
        hasher.update(password);
        hasher.update(salt);
        digest = hasher.finalize().to_vec();
        material.extend_from_slice(&digest);
    }

    let mut key = [0; 32];
    let mut iv = [0; 16];
    key.copy_from_slice(&material[..32]);
    iv.copy_from_slice(&material[32..48]);
    (key, iv)
}

/// Decrypts either a `Salted__ || salt || ciphertext` envelope or,
/// without the magic, an `iv || ciphertext` envelope keyed by the raw passphrase.
pub fn decrypt_salted(data: &[u8], passphrase: &[u8]) -> Result<Vec<u8>> {
    if data.len() < 16 {
        return Err(CipherError::Truncated(data.len()));
    }

    if data.starts_with(SALTED_MAGIC) {
        let (key, iv) = evp_bytes_to_key(passphrase, &data[8..16]);
        aes::decrypt_cbc(&key, &iv, &data[16..])
    } else {
        let (iv, ciphertext) = data.split_at(BLOCK_SIZE);
        aes::decrypt_cbc(passphrase, iv, ciphertext)
    }
}

/// Produces a `Salted__` envelope that [`decrypt_salted`] accepts.
pub fn encrypt_salted(plaintext: &[u8], passphrase: &[u8], salt: [u8; 8]) -> Result<Vec<u8>> {
    let (key, iv) = evp_bytes_to_key(passphrase, &salt);
    let ciphertext = aes::encrypt_cbc(&key, &iv, plaintext)?;

    let mut envelope = Vec::with_capacity(16 + ciphertext.len());
    envelope.extend_from_slice(SALTED_MAGIC);
    envelope.extend_from_slice(&salt);
    envelope.extend_from_slice(&ciphertext);
    Ok(envelope)
}
