//! Megacloud and its mirrors.
//!
//! The embed page hides a client key in one of several markup forms. Together
//! with a shared key published outside the site it unlocks the `sources`
//! field of the `getSources` api, see [`vsr_cipher::layered`].

use super::{BROWSER_USER_AGENT, Extract};
use crate::{
    Error, Result,
    stream::{self, MANIFEST_EXTENSION, Resolution, ResolvedStream, SubtitleTrack},
    transport::{self, ACCEPT, REFERER, Request, Transport, USER_AGENT, X_REQUESTED_WITH},
};
use log::{debug, warn};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;
use vsr_cipher::{b64, kdf, layered};

/// Single capture client key patterns, tried in order.
pub const CLIENT_KEY_PATTERNS: [&str; 5] = [
    r#"<meta\s+name="_gg_fb"\s+content="([^"]+)""#,
    r#"window\._xy_ws\s*=\s*"([^"]+)""#,
    r#"window\._xy_ws\s*=\s*'([^']+)'"#,
    r#"<!--\s*_is_th:([0-9a-zA-Z]+)\s+-->"#,
    r#"<div[^>]+data-dpi="([^"]+)""#,
];

/// Client key split over three fields of one object, joined `x + y + z`.
pub const SPLIT_CLIENT_KEY_PATTERN: &str =
    r#"window\._lk_db\s*=\s*\{[^}]*x:\s*"([^"]+)"[^}]*y:\s*"([^"]+)"[^}]*z:\s*"([^"]+)"[^}]*\}"#;

static CLIENT_KEY_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    CLIENT_KEY_PATTERNS
        .iter()
        .map(|x| Regex::new(x).unwrap())
        .collect()
});

static SPLIT_CLIENT_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SPLIT_CLIENT_KEY_PATTERN).unwrap());

/// Where the shared megacloud key is published.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeySource {
    /// JSON document, key under the `mega` field.
    Json(&'static str),
    /// Plain text document holding only the key.
    Text(&'static str),
}

pub const KEY_SOURCES: [KeySource; 2] = [
    KeySource::Json(
        "https://raw.githubusercontent.com/yogesh-hacker/MegacloudKeys/refs/heads/main/keys.json",
    ),
    KeySource::Text("https://raw.githubusercontent.com/itzzzme/megacloud-keys/refs/heads/main/key.txt"),
];

impl KeySource {
    fn url(self) -> &'static str {
        match self {
            Self::Json(x) | Self::Text(x) => x,
        }
    }

    fn fetch(self, transport: &dyn Transport) -> Result<String> {
        let response = transport
            .get(&Request::get(self.url()))?
            .error_for_status()?;

        let key = match self {
            Self::Json(_) => response.json::<Keys>()?.mega,
            Self::Text(_) => response.body.trim().to_owned(),
        };

        if key.is_empty() {
            return Err(Error::extraction("megacloud key source", "key"));
        }

        Ok(key)
    }
}

#[derive(Deserialize)]
struct Keys {
    #[serde(default)]
    mega: String,
}

#[derive(Deserialize)]
struct SourcesResponse {
    #[serde(default)]
    sources: Value,
    #[serde(default)]
    encrypted: bool,
    #[serde(default)]
    tracks: Vec<Track>,
}

#[derive(Deserialize)]
struct Source {
    #[serde(default)]
    file: String,
}

#[derive(Deserialize)]
struct Track {
    #[serde(default)]
    file: String,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    label: String,
}

pub struct Megacloud;

impl Extract for Megacloud {
    fn extract(&self, embed_url: &str, transport: &dyn Transport) -> Result<Resolution> {
        let url = stream::parse_url(embed_url)?;
        let referer = stream::origin(embed_url)?;
        let id = url
            .path_segments()
            .and_then(|mut x| x.next_back())
            .filter(|x| !x.is_empty())
            .ok_or_else(|| Error::extraction("megacloud", "video id in url"))?
            .to_owned();

        let page = transport
            .get(
                &Request::get(embed_url)
                    .header(USER_AGENT, BROWSER_USER_AGENT)
                    .header(REFERER, &referer),
            )?
            .error_for_status()?;

        let client_key = client_key(&page.body)
            .ok_or_else(|| Error::extraction("megacloud", "client key"))?;
        debug!("megacloud client key is {}", client_key);

        let megacloud_key = megacloud_key(transport)?;

        let data = transport::fetch_json::<SourcesResponse>(
            transport,
            &Request::get(format!(
                "{}embed-1/v3/e-1/getSources?id={}&_k={}",
                referer, id, client_key
            ))
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(REFERER, embed_url)
            .header(X_REQUESTED_WITH, "XMLHttpRequest")
            .header(ACCEPT, "application/json"),
        )?;

        let sources = if data.encrypted {
            let encrypted = data
                .sources
                .as_str()
                .ok_or_else(|| Error::Decode("encrypted sources is not a string".to_owned()))?;
            let decrypted = decrypt_sources(encrypted, &client_key, &megacloud_key)?;
            serde_json::from_str::<Vec<Source>>(&decrypted)
                .map_err(|e| Error::Decryption(format!("megacloud sources are not json: {}", e)))?
        } else {
            serde_json::from_value::<Vec<Source>>(data.sources)?
        };

        let stream_url = sources
            .iter()
            .find(|x| x.file.contains(MANIFEST_EXTENSION))
            .or_else(|| sources.first())
            .map(|x| x.file.as_str())
            .filter(|x| !x.is_empty())
            .ok_or_else(|| Error::extraction("megacloud", "m3u8 source"))?;

        let tracks = data
            .tracks
            .into_iter()
            .filter(|x| x.kind == "captions" || x.kind == "subtitles")
            .map(|x| SubtitleTrack {
                file: x.file,
                label: x.label,
            });

        let stream = ResolvedStream::new(stream_url, referer)?.with_subtitles(tracks);
        Ok(Resolution::new(stream))
    }
}

/// Client key hidden in the embed page.
pub fn client_key(page: &str) -> Option<String> {
    CLIENT_KEY_RES
        .iter()
        .find_map(|re| re.captures(page).map(|x| x[1].to_owned()))
        .or_else(|| {
            SPLIT_CLIENT_KEY_RE
                .captures(page)
                .map(|x| format!("{}{}{}", &x[1], &x[2], &x[3]))
        })
}

/// First non empty key from [`KEY_SOURCES`].
pub fn megacloud_key(transport: &dyn Transport) -> Result<String> {
    let mut last_error = None;

    for source in KEY_SOURCES {
        match source.fetch(transport) {
            Ok(key) => return Ok(key),
            Err(e) => {
                warn!("megacloud key source {} failed: {}", source.url(), e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| Error::extraction("megacloud key source", "key")))
}

/// Older pages wrap sources in an OpenSSL envelope, newer ones in the layered cipher.
pub fn decrypt_sources(encrypted: &str, client_key: &str, megacloud_key: &str) -> Result<String> {
    let salted = b64::decode(encrypted.trim())
        .ok()
        .filter(|x| x.starts_with(kdf::SALTED_MAGIC));

    if let Some(envelope) = salted {
        let plaintext = kdf::decrypt_salted(&envelope, megacloud_key.as_bytes())?;
        return Ok(String::from_utf8_lossy(&plaintext).into_owned());
    }

    Ok(layered::decrypt_sources(
        encrypted,
        client_key,
        megacloud_key,
    )?)
}
