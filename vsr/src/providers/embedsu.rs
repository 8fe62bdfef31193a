use super::{BROWSER_USER_AGENT, Extract};
use crate::{
    Error, Result,
    stream::{Resolution, ResolvedStream, SubtitleTrack},
    transport::{self, REFERER, Request, Transport, USER_AGENT},
};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use vsr_cipher::b64;

pub const CONFIG_PATTERN: &str =
    r#"window\.vConfig\s*=\s*JSON\.parse\(atob\(['"]([A-Za-z0-9+/=]+)['"]\)\)"#;

const ORIGIN: &str = "https://embed.su/";

static CONFIG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(CONFIG_PATTERN).unwrap());

#[derive(Deserialize)]
struct Config {
    #[serde(default)]
    hash: String,
}

#[derive(Deserialize)]
struct Api {
    source: String,
    #[serde(default)]
    subtitles: Vec<SubtitleTrack>,
}

pub struct EmbedSu;

impl Extract for EmbedSu {
    fn extract(&self, embed_url: &str, transport: &dyn Transport) -> Result<Resolution> {
        let page = transport
            .get(
                &Request::get(embed_url)
                    .header(USER_AGENT, BROWSER_USER_AGENT)
                    .header(REFERER, ORIGIN),
            )?
            .error_for_status()?;

        let config = CONFIG_RE
            .captures(&page.body)
            .map(|x| x[1].to_owned())
            .ok_or_else(|| Error::extraction("embed.su", "vConfig"))?;
        let config = serde_json::from_slice::<Config>(&b64::decode(config)?)?;

        let api = transport::fetch_json::<Api>(
            transport,
            &Request::get(format!("{}api/e/{}", ORIGIN, api_hash(&config.hash)?))
                .header(USER_AGENT, BROWSER_USER_AGENT)
                .header(REFERER, embed_url),
        )?;

        let stream = ResolvedStream::manifest(api.source, ORIGIN)?.with_subtitles(api.subtitles);
        Ok(Resolution::new(stream))
    }
}

/// Unwraps `base64(a).base64(b)` where `reverse(a) + reverse(b)` is
/// base64 of `apihash.rest`.
pub fn api_hash(hash: &str) -> Result<String> {
    if hash.is_empty() {
        return Err(Error::extraction("embed.su", "hash in vConfig"));
    }

    let (first, second) = match hash.split('.').collect::<Vec<_>>()[..] {
        [first, second] => (first, second),
        _ => return Err(Error::Decode(format!("hash is not two dotted parts: {}", hash))),
    };

    let mut combined = b64::decode(first)?;
    combined.reverse();

    let mut second = b64::decode(second)?;
    second.reverse();
    combined.extend(second);

    let server_hash = String::from_utf8_lossy(&b64::decode(&combined)?).into_owned();

    server_hash
        .split('.')
        .next()
        .filter(|x| !x.is_empty())
        .map(|x| x.to_owned())
        .ok_or_else(|| Error::extraction("embed.su", "api hash"))
}
