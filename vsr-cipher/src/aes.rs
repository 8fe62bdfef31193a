//! AES-CBC with PKCS#7 padding for 128, 192 and 256 bit keys.

use crate::{
    error::{CipherError, Result},
    padding,
};
use aes::{
    Aes128, Aes192, Aes256,
    cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::NoPadding},
};

pub const BLOCK_SIZE: usize = 16;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes192CbcEnc = cbc::Encryptor<Aes192>;
type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;
type Aes192CbcDec = cbc::Decryptor<Aes192>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// The deterministic IV `00 01 02 .. 0f`.
pub fn index_iv() -> [u8; BLOCK_SIZE] {
    let mut iv = [0; BLOCK_SIZE];

    for (i, x) in iv.iter_mut().enumerate() {
        *x = i as u8;
    }

    iv
}

/// Pads `plaintext` and encrypts it. The key size selects the AES variant.
pub fn encrypt_cbc(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    check_iv(iv)?;
    let mut buf = padding::pkcs7_pad(plaintext, BLOCK_SIZE);
    let invalid = |_| CipherError::InvalidKeySize(key.len());

    match key.len() {
        16 => encrypt_blocks(Aes128CbcEnc::new_from_slices(key, iv).map_err(invalid)?, &mut buf)?,
        24 => encrypt_blocks(Aes192CbcEnc::new_from_slices(key, iv).map_err(invalid)?, &mut buf)?,
        32 => encrypt_blocks(Aes256CbcEnc::new_from_slices(key, iv).map_err(invalid)?, &mut buf)?,
        x => return Err(CipherError::InvalidKeySize(x)),
    }

    Ok(buf)
}

/// Decrypts `ciphertext` and strips its padding.
pub fn decrypt_cbc(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    check_iv(iv)?;

    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(CipherError::Misaligned(ciphertext.len()));
    }

    let mut buf = ciphertext.to_vec();
    let invalid = |_| CipherError::InvalidKeySize(key.len());

    match key.len() {
        16 => decrypt_blocks(Aes128CbcDec::new_from_slices(key, iv).map_err(invalid)?, &mut buf)?,
        24 => decrypt_blocks(Aes192CbcDec::new_from_slices(key, iv).map_err(invalid)?, &mut buf)?,
        32 => decrypt_blocks(Aes256CbcDec::new_from_slices(key, iv).map_err(invalid)?, &mut buf)?,
        x => return Err(CipherError::InvalidKeySize(x)),
    }

    let len = padding::pkcs7_unpad(&buf)?.len();
    buf.truncate(len);
    Ok(buf)
}

fn check_iv(iv: &[u8]) -> Result<()> {
    if iv.len() != BLOCK_SIZE {
        return Err(CipherError::InvalidIvSize(iv.len()));
    }

    Ok(())
}

fn encrypt_blocks<E: BlockEncryptMut>(cipher: E, buf: &mut [u8]) -> Result<()> {
    let len = buf.len();
    cipher
        .encrypt_padded_mut::<NoPadding>(buf, len)
        .map(|_| ())
        .map_err(|_| CipherError::Misaligned(len))
}

fn decrypt_blocks<D: BlockDecryptMut>(cipher: D, buf: &mut [u8]) -> Result<()> {
    let len = buf.len();
    cipher
        .decrypt_padded_mut::<NoPadding>(buf)
        .map(|_| ())
        .map_err(|_| CipherError::Misaligned(len))
}
