//! Provider strategies and the dispatcher choosing between them.
//!
//! Every upstream site family hides its manifest differently. Each one gets a
//! unit struct implementing [`Extract`] and a [`Provider`] tag, and the
//! [`HOSTS`] table maps url fragments to tags. Adding a provider means adding
//! a variant, a module and a row.

pub mod embedsu;
pub mod megacloud;
pub mod multiembed;
pub mod scan;
pub mod vidlink;
pub mod vidsrc;

mod generic;

pub use embedsu::EmbedSu;
pub use generic::Generic;
pub use megacloud::Megacloud;
pub use multiembed::Multiembed;
pub use vidlink::Vidlink;
pub use vidsrc::Vidsrc;

use crate::{Result, stream::Resolution, transport::Transport};
use log::info;
use serde::Serialize;
use std::fmt;

/// Desktop Chrome on Linux, sent by every provider unless noted.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    IframeChain,
    EncryptedApi,
    LayeredCipher,
    HashIndirection,
    PackedScript,
    Generic,
}

/// Host fragments in match order. The first fragment contained in the embed
/// url wins.
pub const HOSTS: &[(&str, Provider)] = &[
    ("vidsrc.xyz", Provider::IframeChain),
    ("vidsrc.me", Provider::IframeChain),
    ("vidsrc.to", Provider::IframeChain),
    ("vidsrc.in", Provider::IframeChain),
    ("vidsrc.pm", Provider::IframeChain),
    ("vidsrc.net", Provider::IframeChain),
    ("vidsrc.rip", Provider::IframeChain),
    ("vidsrc.icu", Provider::IframeChain),
    ("vidlink.pro", Provider::EncryptedApi),
    ("embed.su", Provider::HashIndirection),
    ("multiembed.mov", Provider::PackedScript),
    ("superembeds", Provider::PackedScript),
    ("videostr.net", Provider::LayeredCipher),
    ("streameeeeee.site", Provider::LayeredCipher),
    ("streamaaa.top", Provider::LayeredCipher),
    ("megacloud.", Provider::LayeredCipher),
];

impl Provider {
    pub fn classify(embed_url: &str) -> Self {
        HOSTS
            .iter()
            .find(|(fragment, _)| embed_url.contains(fragment))
            .map(|(_, provider)| *provider)
            .unwrap_or(Self::Generic)
    }

    pub fn extractor(self) -> &'static dyn Extract {
        match self {
            Self::IframeChain => &Vidsrc,
            Self::EncryptedApi => &Vidlink,
            Self::LayeredCipher => &Megacloud,
            Self::HashIndirection => &EmbedSu,
            Self::PackedScript => &Multiembed,
            Self::Generic => &Generic,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::IframeChain => "iframe-chain",
            Self::EncryptedApi => "encrypted-api",
            Self::LayeredCipher => "layered-cipher",
            Self::HashIndirection => "hash-indirection",
            Self::PackedScript => "packed-script",
            Self::Generic => "generic",
        })
    }
}

pub trait Extract {
    fn extract(&self, embed_url: &str, transport: &dyn Transport) -> Result<Resolution>;
}

/// Routes `embed_url` to its provider and runs it.
pub fn resolve(embed_url: &str, transport: &dyn Transport) -> Result<Resolution> {
    let provider = Provider::classify(embed_url);
    info!("resolving {} as {}", embed_url, provider);
    provider.extractor().extract(embed_url, transport)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_known_hosts() {
        assert_eq!(
            Provider::classify("https://vidsrc.to/embed/movie/550"),
            Provider::IframeChain
        );
        assert_eq!(
            Provider::classify("https://vidlink.pro/movie/550"),
            Provider::EncryptedApi
        );
        assert_eq!(
            Provider::classify("https://embed.su/embed/movie/550"),
            Provider::HashIndirection
        );
        assert_eq!(
            Provider::classify("https://multiembed.mov/?video_id=550"),
            Provider::PackedScript
        );
        assert_eq!(
            Provider::classify("https://streams.superembeds.example/e/1"),
            Provider::PackedScript
        );
        assert_eq!(
            Provider::classify("https://megacloud.blog/embed-2/v3/e-1/abc?k=1"),
            Provider::LayeredCipher
        );
        assert_eq!(
            Provider::classify("https://videostr.net/embed-1/e-1/abc"),
            Provider::LayeredCipher
        );
    }

    #[test]
    fn unknown_host_is_generic() {
        assert_eq!(
            Provider::classify("https://player.example/e/1"),
            Provider::Generic
        );
    }

    #[test]
    fn fragments_are_unique() {
        for (i, (a, _)) in HOSTS.iter().enumerate() {
            assert!(HOSTS[i + 1..].iter().all(|(b, _)| a != b));
        }
    }
}
