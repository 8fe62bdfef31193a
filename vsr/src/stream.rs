use crate::{Error, Result, providers::Provider};
use log::warn;
use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const MANIFEST_EXTENSION: &str = ".m3u8";

static ENG_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\beng\b").unwrap());

/// Whether a subtitle label names the English language.
pub fn is_english(label: &str) -> bool {
    let label = label.to_lowercase();
    label.contains("english") || ENG_WORD.is_match(&label)
}

pub fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| Error::invalid_url(url, e))
}

/// `scheme://host[:port]/` of an absolute url.
pub fn origin(url: &str) -> Result<String> {
    let parsed = parse_url(url)?;
    let host = parsed
        .host_str()
        .ok_or_else(|| Error::invalid_url(url, "missing host"))?;

    Ok(match parsed.port() {
        Some(port) => format!("{}://{}:{}/", parsed.scheme(), host, port),
        None => format!("{}://{}/", parsed.scheme(), host),
    })
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct SubtitleTrack {
    pub file: String,
    #[serde(default)]
    pub label: String,
}

/// A playable stream with the headers needed to play it.
///
/// Only English subtitles are ever stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedStream {
    stream_url: String,
    subtitles: Vec<SubtitleTrack>,
    referer: String,
}

impl ResolvedStream {
    /// An empty `referer` means the stream has no referer constraint.
    pub fn new(stream_url: impl Into<String>, referer: impl Into<String>) -> Result<Self> {
        let stream_url = stream_url.into().trim().to_owned();
        let referer = referer.into();

        if stream_url.is_empty() {
            return Err(Error::Unsupported(stream_url));
        }

        if !referer.is_empty() {
            origin(&referer)?;
        }

        Ok(Self {
            stream_url,
            subtitles: Vec::new(),
            referer,
        })
    }

    /// Like [`ResolvedStream::new`] but the url path must end with [`MANIFEST_EXTENSION`].
    pub fn manifest(stream_url: impl Into<String>, referer: impl Into<String>) -> Result<Self> {
        let stream = Self::new(stream_url, referer)?;
        let is_manifest = match Url::parse(&stream.stream_url) {
            Ok(url) => url.path().ends_with(MANIFEST_EXTENSION),
            Err(_) => stream.stream_url.ends_with(MANIFEST_EXTENSION),
        };

        if !is_manifest {
            return Err(Error::Unsupported(stream.stream_url));
        }

        Ok(stream)
    }

    pub fn with_subtitles(mut self, tracks: impl IntoIterator<Item = SubtitleTrack>) -> Self {
        self.subtitles.extend(
            tracks
                .into_iter()
                .filter(|x| !x.file.is_empty() && is_english(&x.label)),
        );
        self
    }

    pub fn stream_url(&self) -> &str {
        &self.stream_url
    }

    pub fn subtitles(&self) -> &[SubtitleTrack] {
        &self.subtitles
    }

    pub fn referer(&self) -> &str {
        &self.referer
    }
}

/// A best effort shortcut taken while resolving.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Degradation {
    SubtitlesUnavailable { reason: String },
    FellBack { from: Provider, to: Provider, reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub stream: ResolvedStream,
    pub degradations: Vec<Degradation>,
}

impl Resolution {
    pub fn new(stream: ResolvedStream) -> Self {
        Self {
            stream,
            degradations: Vec::new(),
        }
    }

    /// Attaches fetched subtitles, or records why there are none.
    pub fn subtitles(mut self, tracks: Result<Vec<SubtitleTrack>>) -> Self {
        match tracks {
            Ok(tracks) => self.stream = self.stream.with_subtitles(tracks),
            Err(e) => {
                warn!("continuing without subtitles: {}", e);
                self.degradations.push(Degradation::SubtitlesUnavailable {
                    reason: e.to_string(),
                });
            }
        }

        self
    }

    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}
