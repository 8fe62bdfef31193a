//! Three pass cipher protecting megacloud source lists.
//!
//! Every layer is keyed by the generated key followed by the layer digit and
//! is made of three reversible steps over the 95 printable ASCII characters:
//!
//! 1. substitution through an alphabet shuffled by [`Lcg`],
//! 2. columnar transposition ordered by the key bytes,
//! 3. a per character shift driven by [`Lcg`].
//!
//! Encryption applies layers `1..=3` and steps `1, 2, 3`. Decryption walks
//! both in reverse. Bytes outside the alphabet pass through the shift and
//! substitution steps untouched.

use crate::{
    b64,
    error::{CipherError, Result},
    lcg::Lcg,
};

const FIRST: u8 = 32;
const SIZE: u64 = 95;
const LAYERS: u8 = 3;

fn alphabet_index(byte: u8) -> Option<u64> {
    (FIRST..=126)
        .contains(&byte)
        .then(|| (byte - FIRST) as u64)
}

/// Combines the remote megacloud key with the page client key.
///
/// The result is between 96 and 128 printable characters long, shorter only
/// when both inputs together are shorter than that.
pub fn keygen(megacloud_key: &str, client_key: &str) -> Result<String> {
    let joined = [megacloud_key.as_bytes(), client_key.as_bytes()].concat();

    if joined.is_empty() {
        return Err(CipherError::EmptyKey);
    }

    let hash = joined.iter().fold(0u64, |h, b| {
        (*b as u64)
            .wrapping_add(h.wrapping_mul(31))
            .wrapping_add(h << 7)
            .wrapping_sub(h)
    });

    let len = joined.len() as u64;
    let mut pivot = hash % len + 5;

    if pivot > len {
        pivot %= len;
    }

    let mut shifted = joined.iter().map(|x| x ^ 247).collect::<Vec<_>>();
    shifted.rotate_left(pivot as usize);

    let leaf = client_key.bytes().rev().collect::<Vec<_>>();
    let mut interleaved = Vec::with_capacity(shifted.len() + leaf.len());

    for i in 0..shifted.len().max(leaf.len()) {
        if let Some(x) = shifted.get(i) {
            interleaved.push(*x);
        }

        if let Some(x) = leaf.get(i) {
            interleaved.push(*x);
        }
    }

    interleaved.truncate((96 + hash % 33) as usize);

    Ok(interleaved
        .into_iter()
        .map(|x| char::from(x % SIZE as u8 + FIRST))
        .collect())
}

pub fn seed_shift_encode(src: &[u8], key: &[u8]) -> Vec<u8> {
    seed_shift(src, key, |idx, r| (idx + r) % SIZE)
}

pub fn seed_shift_decode(src: &[u8], key: &[u8]) -> Vec<u8> {
    seed_shift(src, key, |idx, r| (idx + SIZE - r) % SIZE)
}

fn seed_shift(src: &[u8], key: &[u8], shift: impl Fn(u64, u64) -> u64) -> Vec<u8> {
    let mut lcg = Lcg::from_key(key);

    src.iter()
        .map(|x| match alphabet_index(*x) {
            Some(idx) => shift(idx, lcg.step() % SIZE) as u8 + FIRST,
            None => *x,
        })
        .collect()
}

/// Column indices ordered by their key byte, ties kept in key order.
fn column_order(key: &[u8]) -> Vec<usize> {
    let mut order = (0..key.len()).collect::<Vec<_>>();
    order.sort_by_key(|x| key[*x]);
    order
}

/// Reads the grid one sorted column at a time, reassembling it row by row.
/// Columns are filled top to bottom until the input runs out, so trailing
/// columns in key order may be short.
pub fn columnar_decode(src: &[u8], key: &[u8]) -> Vec<u8> {
    if key.is_empty() || src.is_empty() {
        return src.to_vec();
    }

    let cols = key.len();
    let rows = src.len().div_ceil(cols);
    let mut grid = vec![None; rows * cols];
    let mut bytes = src.iter();

    'fill: for col in column_order(key) {
        for row in 0..rows {
            match bytes.next() {
                Some(x) => grid[row * cols + col] = Some(*x),
                None => break 'fill,
            }
        }
    }

    grid.into_iter().flatten().collect()
}

/// Exact inverse of [`columnar_decode`].
pub fn columnar_encode(src: &[u8], key: &[u8]) -> Vec<u8> {
    if key.is_empty() || src.is_empty() {
        return src.to_vec();
    }

    let cols = key.len();
    let rows = src.len().div_ceil(cols);
    let order = column_order(key);

    let mut used = vec![false; rows * cols];
    let mut remaining = src.len();

    'mark: for col in &order {
        for row in 0..rows {
            if remaining == 0 {
                break 'mark;
            }

            used[row * cols + col] = true;
            remaining -= 1;
        }
    }

    let mut grid = vec![None; rows * cols];
    let mut bytes = src.iter();

    for (cell, used) in grid.iter_mut().zip(&used) {
        if *used {
            *cell = bytes.next().copied();
        }
    }

    let mut encoded = Vec::with_capacity(src.len());

    for col in &order {
        for row in 0..rows {
            if let Some(x) = grid[row * cols + col] {
                encoded.push(x);
            }
        }
    }

    encoded
}

/// The printable alphabet after a Fisher-Yates shuffle from the end.
fn shuffled_alphabet(key: &[u8]) -> [u8; SIZE as usize] {
    let mut alphabet: [u8; SIZE as usize] = std::array::from_fn(|x| x as u8 + FIRST);
    let mut lcg = Lcg::from_key(key);

    for i in (1..SIZE as usize).rev() {
        let j = (lcg.step() % (i as u64 + 1)) as usize;
        alphabet.swap(i, j);
    }

    alphabet
}

pub fn substitution_encode(src: &[u8], key: &[u8]) -> Vec<u8> {
    let shuffled = shuffled_alphabet(key);

    src.iter()
        .map(|x| match alphabet_index(*x) {
            Some(idx) => shuffled[idx as usize],
            None => *x,
        })
        .collect()
}

pub fn substitution_decode(src: &[u8], key: &[u8]) -> Vec<u8> {
    let mut reverse = [0; SIZE as usize];

    for (i, x) in shuffled_alphabet(key).iter().enumerate() {
        reverse[(x - FIRST) as usize] = i as u8 + FIRST;
    }

    src.iter()
        .map(|x| match alphabet_index(*x) {
            Some(idx) => reverse[idx as usize],
            None => *x,
        })
        .collect()
}

fn layer_key(generated_key: &str, layer: u8) -> Vec<u8> {
    format!("{}{}", generated_key, layer).into_bytes()
}

pub fn decrypt_layers(data: &[u8], generated_key: &str) -> Vec<u8> {
    let mut data = data.to_vec();

    for layer in (1..=LAYERS).rev() {
        let key = layer_key(generated_key, layer);
        data = seed_shift_decode(&data, &key);
        data = columnar_decode(&data, &key);
        data = substitution_decode(&data, &key);
    }

    data
}

pub fn encrypt_layers(data: &[u8], generated_key: &str) -> Vec<u8> {
    let mut data = data.to_vec();

    for layer in 1..=LAYERS {
        let key = layer_key(generated_key, layer);
        data = substitution_encode(&data, &key);
        data = columnar_encode(&data, &key);
        data = seed_shift_encode(&data, &key);
    }

    data
}

/// Takes the payload announced by the leading four decimal digits.
fn split_length_prefix(data: &[u8]) -> Result<&[u8]> {
    let (prefix, rest) = data
        .split_at_checked(4)
        .ok_or(CipherError::LengthPrefix)?;

    if !prefix.iter().all(u8::is_ascii_digit) {
        return Err(CipherError::LengthPrefix);
    }

    let len = prefix
        .iter()
        .fold(0, |n, x| n * 10 + (x - b'0') as usize);

    rest.get(..len).ok_or(CipherError::LengthPrefix)
}

/// Decrypts a base64 `sources` field into the JSON text it hides.
///
/// A wrong key does not fail here; it yields text that is not JSON.
pub fn decrypt_sources(encoded: &str, client_key: &str, megacloud_key: &str) -> Result<String> {
    let data = b64::decode(encoded.trim())?;
    let generated_key = keygen(megacloud_key, client_key)?;
    let decrypted = decrypt_layers(&data, &generated_key);
    let payload = split_length_prefix(&decrypted)?;
    Ok(String::from_utf8_lossy(payload).into_owned())
}

/// Builds a `sources` field the way the provider does.
pub fn encrypt_sources(json: &str, client_key: &str, megacloud_key: &str) -> Result<String> {
    if json.len() > 9999 {
        return Err(CipherError::LengthPrefix);
    }

    let generated_key = keygen(megacloud_key, client_key)?;
    let plain = format!("{:04}{}", json.len(), json);
    Ok(b64::encode(encrypt_layers(plain.as_bytes(), &generated_key)))
}
