use super::{BROWSER_USER_AGENT, Extract, scan};
use crate::{
    Error, Result,
    stream::{self, Resolution, ResolvedStream},
    transport::{REFERER, Request, Transport, USER_AGENT},
};

/// Scans the embed page itself for a manifest url.
pub struct Generic;

impl Generic {
    pub(super) fn fetch_page(embed_url: &str, transport: &dyn Transport) -> Result<(String, String)> {
        let referer = stream::origin(embed_url)?;
        let page = transport
            .get(
                &Request::get(embed_url)
                    .header(USER_AGENT, BROWSER_USER_AGENT)
                    .header(REFERER, &referer),
            )?
            .error_for_status()?;

        Ok((page.body, referer))
    }
}

impl Extract for Generic {
    fn extract(&self, embed_url: &str, transport: &dyn Transport) -> Result<Resolution> {
        let (page, referer) = Self::fetch_page(embed_url, transport)?;
        let found =
            scan::find_manifest(&page).ok_or_else(|| Error::extraction("generic", "m3u8 url"))?;
        let stream_url = scan::absolute(&stream::parse_url(embed_url)?, found);

        Ok(Resolution::new(ResolvedStream::new(stream_url, referer)?))
    }
}
