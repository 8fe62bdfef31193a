//! Iframe chain: embed page -> `/rcp/` page -> `/prorcp/` player -> `file:` literal.

use super::{BROWSER_USER_AGENT, Extract};
use crate::{
    Error, Result,
    stream::{self, Resolution, ResolvedStream, SubtitleTrack},
    transport::{self, REFERER, Request, Transport, USER_AGENT, X_REQUESTED_WITH},
};
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

/// Captures the cdn host and the opaque hash of the first iframe.
pub const RCP_PATTERN: &str = r#"src="//([^/"]+)/rcp/([^"]+)""#;
pub const PRORCP_PATTERN: &str = r#"src:\s*'/prorcp/([^']+)'"#;
pub const FILE_PATTERN: &str = r#"file:\s*"(https://[^"]+)""#;

const PLACEHOLDERS: [&str; 4] = ["{v1}", "{v2}", "{v3}", "{v4}"];

static RCP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(RCP_PATTERN).unwrap());
static PRORCP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(PRORCP_PATTERN).unwrap());
static FILE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(FILE_PATTERN).unwrap());

pub struct Vidsrc;

impl Extract for Vidsrc {
    fn extract(&self, embed_url: &str, transport: &dyn Transport) -> Result<Resolution> {
        let embed = transport
            .get(&Request::get(embed_url).header(USER_AGENT, BROWSER_USER_AGENT))?
            .error_for_status()?;

        let captures = RCP_RE
            .captures(&embed.body)
            .ok_or_else(|| Error::extraction("vidsrc", "rcp iframe"))?;
        let cdn = captures[1].to_owned();
        let hash = captures[2].to_owned();
        debug!("vidsrc cdn is {}", cdn);

        let rcp = transport
            .get(
                &Request::get(format!("https://{}/rcp/{}", cdn, hash))
                    .header(REFERER, embed_url)
                    .header(USER_AGENT, BROWSER_USER_AGENT),
            )?
            .error_for_status()?;

        let prorcp = PRORCP_RE
            .captures(&rcp.body)
            .map(|x| x[1].to_owned())
            .ok_or_else(|| Error::extraction("vidsrc", "prorcp source"))?;

        let referer = format!("https://{}/", cdn);
        let player = transport
            .get(
                &Request::get(format!("https://{}/prorcp/{}", cdn, prorcp))
                    .header(REFERER, &referer)
                    .header(USER_AGENT, BROWSER_USER_AGENT),
            )?
            .error_for_status()?;

        let file = FILE_RE
            .captures(&player.body)
            .map(|x| x[1].to_owned())
            .ok_or_else(|| Error::extraction("vidsrc", "file url"))?;

        let stream = ResolvedStream::manifest(clean_file(&file, &cdn), referer)?;
        Ok(Resolution::new(stream).subtitles(subtitles(embed_url, &hash, transport)))
    }
}

/// Fills the host placeholders and keeps the first of `a or b` alternatives.
fn clean_file(file: &str, cdn: &str) -> String {
    let mut file = file.to_owned();

    for placeholder in PLACEHOLDERS {
        file = file.replace(placeholder, cdn);
    }

    match file.split_once(" or ") {
        Some((first, _)) => first.to_owned(),
        None => file,
    }
}

fn subtitles(embed_url: &str, hash: &str, transport: &dyn Transport) -> Result<Vec<SubtitleTrack>> {
    let origin = stream::origin(embed_url)?;
    let request = Request::get(format!("{}ajax/embed/episode/{}/subtitles", origin, hash))
        .header(USER_AGENT, BROWSER_USER_AGENT)
        .header(REFERER, embed_url)
        .header(X_REQUESTED_WITH, "XMLHttpRequest");

    transport::fetch_json(transport, &request)
}
