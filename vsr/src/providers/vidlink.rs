//! AES-CBC protected source API.
//!
//! The media id is encrypted with a pre-shared key and the index IV, then sent
//! as `base64("hexiv:hexciphertext")`. The answer uses the same `hexiv:hex`
//! shape, encrypted under the same key with the IV it carries.

use super::{Extract, Generic, Provider};
use crate::{
    Error, Result,
    stream::{Degradation, MANIFEST_EXTENSION, Resolution, ResolvedStream, SubtitleTrack},
    transport::{self, REFERER, Request, Transport, USER_AGENT},
};
use log::warn;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use vsr_cipher::{aes, b64};

pub const ID_PATTERN: &str = r"/(movie|tv)/([^/?#]+)";

const KEY: &str = "2de6e6ea13a9df9503b11a6117fd7e51941e04a0c223dfeacfe8a1dbb6c52783";
const API: &str = "https://vidlink.pro/api";
const PLAYBACK_REFERER: &str = "https://vidlink.pro/";
const API_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

static ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(ID_PATTERN).unwrap());

#[derive(Deserialize)]
struct Payload {
    #[serde(default)]
    playlist: Option<String>,
    #[serde(default)]
    sources: Vec<Source>,
}

#[derive(Deserialize)]
struct Source {
    file: String,
}

#[derive(Deserialize)]
struct Track {
    url: String,
    #[serde(default)]
    label: String,
}

pub struct Vidlink;

impl Extract for Vidlink {
    fn extract(&self, embed_url: &str, transport: &dyn Transport) -> Result<Resolution> {
        let id = ID_RE
            .captures(embed_url)
            .map(|x| x[2].to_owned())
            .ok_or_else(|| Error::extraction("vidlink", "media id in url"))?;

        let response = transport.get(
            &Request::get(format!("{}/b/movie/{}", API, encode_id(&id)?))
                .header(USER_AGENT, API_USER_AGENT)
                .header(REFERER, embed_url),
        )?;

        let mut resolution = match split_payload(&response.body) {
            Some((iv, ciphertext)) if response.is_success() => {
                let stream_url = decrypt_payload(&iv, &ciphertext)?;
                Resolution::new(ResolvedStream::manifest(stream_url, PLAYBACK_REFERER)?)
            }
            _ => {
                let reason = format!(
                    "api answered {} without a hex iv:ciphertext body",
                    response.status
                );
                warn!("vidlink {}, scanning the embed page instead", reason);

                let mut resolution = Generic.extract(embed_url, transport)?;
                resolution.degradations.push(Degradation::FellBack {
                    from: Provider::EncryptedApi,
                    to: Provider::Generic,
                    reason,
                });
                resolution
            }
        };

        resolution = resolution.subtitles(subtitles(&id, transport));
        Ok(resolution)
    }
}

/// `base64(hex(iv) ":" hex(AES-256-CBC(id)))`
pub fn encode_id(id: &str) -> Result<String> {
    let key = hex::decode(KEY)?;
    let iv = aes::index_iv();
    let ciphertext = aes::encrypt_cbc(&key, &iv, id.as_bytes())?;
    Ok(b64::encode(format!(
        "{}:{}",
        hex::encode(iv),
        hex::encode(ciphertext)
    )))
}

/// Decoded IV and ciphertext of a `hexiv:hexciphertext` body. Anything else,
/// such as a JSON error document, is `None`.
fn split_payload(body: &str) -> Option<(Vec<u8>, Vec<u8>)> {
    let mut parts = body.trim().split(':');

    let (iv, ciphertext) = match (parts.next(), parts.next(), parts.next()) {
        (Some(iv), Some(ciphertext), None) => {
            (hex::decode(iv).ok()?, hex::decode(ciphertext).ok()?)
        }
        _ => return None,
    };

    (iv.len() == aes::BLOCK_SIZE && !ciphertext.is_empty()).then_some((iv, ciphertext))
}

/// Decrypts an API answer and picks the playlist, or else the first manifest source.
fn decrypt_payload(iv: &[u8], ciphertext: &[u8]) -> Result<String> {
    let key = hex::decode(KEY)?;
    let plaintext = aes::decrypt_cbc(&key, iv, ciphertext)?;
    let payload = serde_json::from_slice::<Payload>(&plaintext)
        .map_err(|e| Error::Decryption(format!("vidlink payload is not json: {}", e)))?;

    if let Some(playlist) = payload.playlist.filter(|x| !x.is_empty()) {
        return Ok(playlist);
    }

    payload
        .sources
        .into_iter()
        .find(|x| x.file.contains(MANIFEST_EXTENSION))
        .map(|x| x.file)
        .ok_or_else(|| Error::extraction("vidlink", "m3u8 source"))
}

fn subtitles(id: &str, transport: &dyn Transport) -> Result<Vec<SubtitleTrack>> {
    let tracks = transport::fetch_json::<Vec<Track>>(
        transport,
        &Request::get(format!("{}/subtitles/{}", API, id)),
    )?;

    Ok(tracks
        .into_iter()
        .map(|x| SubtitleTrack {
            file: x.url,
            label: x.label,
        })
        .collect())
}
