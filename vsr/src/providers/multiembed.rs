//! Pages whose player setup is hidden behind an
//! `eval(function(h,u,n,t,e,r){...}(...))` decoder.

use super::{Extract, Generic, scan};
use crate::{
    Error, Result,
    stream::{self, Resolution, ResolvedStream},
    transport::Transport,
};
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

/// Captures payload, separator code point, alphabet, offset, base and the unused last argument.
pub const HUNTER_PATTERN: &str = r#"eval\(function\(h,u,n,t,e,r\).*?\}\(['"](.+?)['"],\s*(\d+),\s*['"](.+?)['"],\s*(\d+),\s*(\d+),\s*(\d+)\)"#;

static HUNTER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(HUNTER_PATTERN).unwrap());

pub struct Multiembed;

impl Extract for Multiembed {
    fn extract(&self, embed_url: &str, transport: &dyn Transport) -> Result<Resolution> {
        let (page, referer) = Generic::fetch_page(embed_url, transport)?;
        let decoded = unpack(&page);

        let found = decoded
            .as_deref()
            .and_then(scan::find_manifest)
            .or_else(|| scan::find_manifest(&page))
            .ok_or_else(|| Error::extraction("multiembed", "m3u8 url"))?;
        let stream_url = scan::absolute(&stream::parse_url(embed_url)?, found);

        Ok(Resolution::new(ResolvedStream::new(stream_url, referer)?))
    }
}

/// Decodes the first packed script in `page`, if any.
pub fn unpack(page: &str) -> Option<String> {
    let captures = HUNTER_RE.captures(page)?;
    let separator = captures[2].parse::<u32>().ok().and_then(char::from_u32)?;
    let offset = captures[4].parse::<i64>().ok()?;
    let base = captures[5].parse::<i64>().ok()?;

    let decoded = hunter_decode(&captures[1], separator, &captures[3], offset, base);
    debug!("unpacked {} bytes of script", decoded.len());
    Some(decoded)
}

/// Splits `payload` on `separator` and reads every token as a number written
/// in `alphabet` with `base`. Characters missing from the alphabet are skipped.
/// Each number minus `offset` is a code point; out of range values are dropped.
pub fn hunter_decode(payload: &str, separator: char, alphabet: &str, offset: i64, base: i64) -> String {
    let digits = alphabet.chars().collect::<Vec<_>>();

    payload
        .split(separator)
        .filter(|x| !x.is_empty())
        .filter_map(|token| {
            let value = token
                .chars()
                .filter_map(|x| digits.iter().position(|y| *y == x))
                .fold(0i64, |n, x| n.wrapping_mul(base).wrapping_add(x as i64))
                .wrapping_sub(offset);

            (value > 0 && value < 0x110000)
                .then(|| char::from_u32(value as u32))
                .flatten()
        })
        .collect()
}
