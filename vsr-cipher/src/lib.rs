//! Cipher primitives used by the stream providers supported by `vsr`.
//!
//! Nothing here talks to the network. Every function works on bytes or
//! strings handed to it and is pure, so the same inputs always give the same
//! outputs.
//!
//! - [`aes`]: AES-CBC with PKCS#7 padding.
//! - [`b64`]: base64 decoding that also accepts the URL safe alphabet.
//! - [`kdf`]: OpenSSL `Salted__` envelopes keyed through `EVP_BytesToKey`.
//! - [`lcg`]: the string hash and linear congruential generator behind [`layered`].
//! - [`layered`]: the three pass cipher protecting megacloud source lists.

pub mod aes;
pub mod b64;
pub mod kdf;
pub mod layered;
pub mod lcg;

mod error;
mod padding;

pub use error::{CipherError, Result};
pub use padding::{pkcs7_pad, pkcs7_unpad};
