//! Base64 as the providers send it: padded standard alphabet, sometimes
//! unpadded url-safe.

use crate::error::Result;
use base64::{
    Engine,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};

/// Decodes standard base64, retrying with the unpadded url-safe alphabet.
pub fn decode<T: AsRef<[u8]>>(input: T) -> Result<Vec<u8>> {
    let input = input.as_ref();

    match STANDARD.decode(input) {
        Ok(x) => Ok(x),
        Err(_) => Ok(URL_SAFE_NO_PAD.decode(input)?),
    }
}

/// Padded standard alphabet encoding.
pub fn encode<T: AsRef<[u8]>>(input: T) -> String {
    STANDARD.encode(input)
}
