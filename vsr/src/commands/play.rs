use super::ClientOptions;
use crate::{
    manifest::{self, Variants},
    player::{Playback, Player},
    providers,
    selector::{self, Interaction},
};
use anyhow::Result;
use clap::Args;
use kdam::term::Colorizer;
use log::warn;

/// Resolve an embed page, pick a quality and hand it to a media player.
#[derive(Debug, Clone, Args)]
pub struct Play {
    /// Embed page url, e.g. https://vidlink.pro/movie/550
    #[arg(required = true)]
    pub url: String,

    /// Title shown by the player.
    /// By default the embed page url is used.
    #[arg(long)]
    pub title: Option<String>,

    /// Media player to launch.
    /// Defaults to iina on macOS and mpv everywhere else.
    #[arg(long, value_enum, default_value_t)]
    pub player: Player,

    /// Play the highest quality without asking.
    #[arg(long, help_heading = "Automation Options")]
    pub best: bool,

    /// Raw style input prompts for old and unsupported terminals.
    #[arg(long, help_heading = "Automation Options")]
    pub raw_prompts: bool,

    /// Skip user input prompts and proceed with defaults.
    #[arg(long, help_heading = "Automation Options")]
    pub skip_prompts: bool,

    #[command(flatten)]
    pub client: ClientOptions,
}

impl Play {
    pub fn execute(self) -> Result<()> {
        let transport = self.client.transport()?;
        let resolution = providers::resolve(&self.url, transport.as_ref())?;
        let stream = &resolution.stream;

        if resolution.is_degraded() {
            warn!("{} shortcut(s) taken while resolving", resolution.degradations.len());
        }

        let url = match manifest::parse_variants(stream.stream_url(), transport.as_ref(), stream.referer())? {
            Variants::Qualities(qualities) => {
                let interaction = Interaction::new(self.raw_prompts, self.skip_prompts);
                let quality = selector::select(&qualities, self.best, &interaction)?;
                println!(
                    "   {} {} {}",
                    "Selected".colorize("bold green"),
                    quality.label(),
                    quality.url
                );
                quality.url.clone()
            }
            Variants::Direct(url) => url,
        };

        self.player.play(&Playback {
            url: &url,
            referer: stream.referer(),
            subtitles: stream.subtitles(),
            title: self.title.as_deref().unwrap_or(&self.url),
        })
    }
}
