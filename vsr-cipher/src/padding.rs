use crate::error::{CipherError, Result};

/// Appends PKCS#7 padding so the output length is a multiple of `block_size`.
/// A full block of padding is added when the input is already aligned.
pub fn pkcs7_pad(data: &[u8], block_size: usize) -> Vec<u8> {
    let pad = block_size - data.len() % block_size;
    let mut padded = Vec::with_capacity(data.len() + pad);
    padded.extend_from_slice(data);
    padded.resize(data.len() + pad, pad as u8);
    padded
}

/// Strips PKCS#7 padding, checking every pad byte.
pub fn pkcs7_unpad(data: &[u8]) -> Result<&[u8]> {
    let pad = *data.last().ok_or(CipherError::BadPadding)? as usize;

    if pad == 0 || pad > data.len() {
        return Err(CipherError::BadPadding);
    }

    let (body, tail) = data.split_at(data.len() - pad);

    if tail.iter().any(|x| *x as usize != pad) {
        return Err(CipherError::BadPadding);
    }

    Ok(body)
}
