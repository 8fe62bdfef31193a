use crate::{
    Result,
    stream::parse_url,
    transport::{REFERER, Request, Transport, USER_AGENT},
};
use log::debug;
use reqwest::Url;
use serde::Serialize;

const MANIFEST_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const STREAM_INF: &str = "#EXT-X-STREAM-INF:";

/// One variant stream of a master playlist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Quality {
    pub url: String,
    pub resolution: Option<(u64, u64)>,
    pub bandwidth: u64,
    pub height: u64,
}

impl Quality {
    /// `WIDTHxHEIGHT`, or the bandwidth when the variant declares no resolution.
    pub fn label(&self) -> String {
        match self.resolution {
            Some((w, h)) => format!("{}x{}", w, h),
            None if self.bandwidth >= 1_000_000 => {
                format!("{:.1} Mbps", self.bandwidth as f64 / 1_000_000.0)
            }
            None => format!("{:.0} Kbps", self.bandwidth as f64 / 1000.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variants {
    /// Variants in manifest order.
    Qualities(Vec<Quality>),
    /// The manifest lists no variants and is itself the playable target.
    Direct(String),
}

pub fn parse_variants(url: &str, transport: &dyn Transport, referer: &str) -> Result<Variants> {
    let mut request = Request::get(url).header(USER_AGENT, MANIFEST_USER_AGENT);

    if !referer.is_empty() {
        request = request.header(REFERER, referer);
    }

    let response = transport.get(&request)?.error_for_status()?;
    let base = parse_url(url)?;
    let qualities = parse_master(&response.body, &base);

    debug!("{} lists {} variants", url, qualities.len());

    if qualities.is_empty() {
        Ok(Variants::Direct(url.to_owned()))
    } else {
        Ok(Variants::Qualities(qualities))
    }
}

/// Variant streams of a master playlist, urls resolved against `base`.
pub fn parse_master(text: &str, base: &Url) -> Vec<Quality> {
    match m3u8_rs::parse_playlist_res(text.as_bytes()) {
        Ok(m3u8_rs::Playlist::MasterPlaylist(master)) => master
            .variants
            .into_iter()
            .filter(|x| !x.is_i_frame)
            .map(|x| {
                let resolution = x.resolution.map(|r| (r.width, r.height));

                Quality {
                    url: join(base, &x.uri),
                    resolution,
                    bandwidth: x.bandwidth,
                    height: resolution.map(|(_, h)| h).unwrap_or(0),
                }
            })
            .collect(),
        Ok(m3u8_rs::Playlist::MediaPlaylist(_)) => Vec::new(),
        Err(_) => scan_lines(text, base),
    }
}

/// Tolerant fallback for manifests the playlist parser rejects.
fn scan_lines(text: &str, base: &Url) -> Vec<Quality> {
    let mut qualities = Vec::new();
    let mut pending = None;

    for line in text.lines().map(str::trim) {
        if let Some(attributes) = line.strip_prefix(STREAM_INF) {
            pending = Some(attributes);
        } else if line.is_empty() || line.starts_with('#') {
            continue;
        } else if let Some(attributes) = pending.take() {
            let resolution = attribute(attributes, "RESOLUTION").and_then(|x| {
                let (w, h) = x.split_once('x')?;
                Some((w.parse().ok()?, h.parse().ok()?))
            });

            qualities.push(Quality {
                url: join(base, line),
                resolution,
                bandwidth: attribute(attributes, "BANDWIDTH")
                    .and_then(|x| x.parse().ok())
                    .unwrap_or(0),
                height: resolution.map(|(_, h)| h).unwrap_or(0),
            });
        }
    }

    qualities
}

fn attribute<'a>(attributes: &'a str, name: &str) -> Option<&'a str> {
    attributes
        .split(',')
        .filter_map(|x| x.split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
}

fn join(base: &Url, uri: &str) -> String {
    base.join(uri)
        .map(|x| x.to_string())
        .unwrap_or_else(|_| uri.to_owned())
}
