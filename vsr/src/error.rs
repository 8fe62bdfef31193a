use std::time::Duration;
use thiserror::Error;
use vsr_cipher::CipherError;

/// Everything that can go wrong while resolving an embed page.
#[derive(Debug, Error)]
pub enum Error {
    /// Network, DNS or TLS failure. Never retried.
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },

    /// The resolution budget ran out before `url` could be fetched.
    #[error("deadline exceeded after {elapsed:.1?} while fetching {url}")]
    DeadlineExceeded { url: String, elapsed: Duration },

    /// An expected pattern was absent from a fetched body.
    #[error("could not find {what} in {provider} response")]
    Extraction {
        provider: &'static str,
        what: &'static str,
    },

    /// Malformed base64, hex or JSON.
    #[error("decode error: {0}")]
    Decode(String),

    /// A cipher ran but its output is not what the provider promised.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// The resolved url does not point to a manifest.
    #[error("resolved url is not an m3u8 manifest: {0}")]
    Unsupported(String),

    #[error("no qualities available")]
    NoQualities,

    /// Interactive quality choice failed or was out of range.
    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl Error {
    pub(crate) fn extraction(provider: &'static str, what: &'static str) -> Self {
        Self::Extraction { provider, what }
    }

    pub(crate) fn invalid_url(url: &str, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.to_owned(),
            reason: reason.to_string(),
        }
    }
}

impl From<base64::DecodeError> for Error {
    fn from(e: base64::DecodeError) -> Self {
        Self::Decode(format!("base64: {}", e))
    }
}

impl From<hex::FromHexError> for Error {
    fn from(e: hex::FromHexError) -> Self {
        Self::Decode(format!("hex: {}", e))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(format!("json: {}", e))
    }
}

impl From<CipherError> for Error {
    fn from(e: CipherError) -> Self {
        match e {
            CipherError::Base64(e) => e.into(),
            e => Self::Decryption(e.to_string()),
        }
    }
}
