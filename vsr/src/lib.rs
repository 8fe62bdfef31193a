//! Resolve streaming embed pages into something a media player can open.
//!
//! An embed page is routed by host to one of several provider strategies
//! (see [`providers`]), each of which reverses that site's obfuscation and
//! yields a [`ResolvedStream`]: the manifest url, the `Referer` it must be
//! fetched with and any English subtitles. [`manifest::parse_variants`] then
//! lists the qualities of the manifest and [`selector`] picks one.
//!
//! ```no_run
//! let client = reqwest::blocking::Client::new();
//! let resolution = vsr::resolve("https://vidsrc.to/embed/movie/550", &client)?;
//! println!("{}", resolution.stream.stream_url());
//! # Ok::<(), vsr::Error>(())
//! ```

pub mod manifest;
pub mod providers;
pub mod selector;
pub mod stream;
pub mod transport;
pub mod update;

mod commands;
mod error;
mod logger;
mod player;

#[doc(hidden)]
pub use commands::Args;
#[doc(hidden)]
pub use logger::Logger;
pub use error::Error;
pub use providers::{Provider, resolve};
pub use reqwest;
pub use stream::{Degradation, Resolution, ResolvedStream, SubtitleTrack};

/// A `Result` alias where the `Err` case is `vsr::Error`.
pub type Result<T> = std::result::Result<T, Error>;
