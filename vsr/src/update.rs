use crate::{
    Result,
    transport::{self, Request, Transport, USER_AGENT},
};
use serde::Deserialize;

#[derive(Deserialize)]
struct Release {
    tag_name: String,
}

/// Outcome of comparing the running version against a release feed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReleaseCheck {
    pub current: String,
    pub remote: String,
}

impl ReleaseCheck {
    pub fn is_up_to_date(&self) -> bool {
        self.current.trim_start_matches('v') == self.remote.trim_start_matches('v')
    }
}

/// Reads the latest `tag_name` from a GitHub style release feed.
pub fn check_for_new_release(transport: &dyn Transport, feed: &str) -> Result<ReleaseCheck> {
    let release = transport::fetch_json::<Release>(
        transport,
        &Request::get(feed).header(USER_AGENT, concat!("vsr/", env!("CARGO_PKG_VERSION"))),
    )?;

    Ok(ReleaseCheck {
        current: env!("CARGO_PKG_VERSION").to_owned(),
        remote: release.tag_name,
    })
}
