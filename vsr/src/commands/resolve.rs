use super::ClientOptions;
use crate::{
    manifest::{self, Variants},
    providers,
    stream::{Degradation, Resolution},
};
use anyhow::Result;
use clap::Args;
use kdam::term::Colorizer;
use serde::Serialize;

/// Resolve an embed page and print the stream, referer and subtitles.
#[derive(Debug, Clone, Args)]
pub struct Resolve {
    /// Embed page url, e.g. https://vidsrc.to/embed/movie/550
    #[arg(required = true)]
    pub url: String,

    /// Print the result in json format.
    #[arg(long)]
    pub json: bool,

    /// Also fetch the manifest and list its qualities.
    #[arg(long)]
    pub qualities: bool,

    #[command(flatten)]
    pub client: ClientOptions,
}

#[derive(Serialize)]
struct Output<'a> {
    #[serde(flatten)]
    resolution: &'a Resolution,
    #[serde(skip_serializing_if = "Option::is_none")]
    variants: Option<Variants>,
}

impl Resolve {
    pub fn execute(self) -> Result<()> {
        let transport = self.client.transport()?;
        let resolution = providers::resolve(&self.url, transport.as_ref())?;

        let variants = if self.qualities {
            Some(manifest::parse_variants(
                resolution.stream.stream_url(),
                transport.as_ref(),
                resolution.stream.referer(),
            )?)
        } else {
            None
        };

        if self.json {
            serde_json::to_writer_pretty(
                std::io::stdout(),
                &Output {
                    resolution: &resolution,
                    variants,
                },
            )?;
            println!();
            return Ok(());
        }

        let stream = &resolution.stream;
        println!("      {} {}", "Stream".colorize("bold green"), stream.stream_url());
        println!("     {} {}", "Referer".colorize("bold green"), stream.referer());

        for track in stream.subtitles() {
            println!("    {} {} {}", "Subtitle".colorize("bold cyan"), track.label, track.file);
        }

        for degradation in &resolution.degradations {
            let message = match degradation {
                Degradation::SubtitlesUnavailable { reason } => {
                    format!("subtitles unavailable ({})", reason)
                }
                Degradation::FellBack { from, to, reason } => {
                    format!("fell back from {} to {} ({})", from, to, reason)
                }
            };
            println!("     {} {}", "Warning".colorize("bold yellow"), message);
        }

        match variants {
            Some(Variants::Qualities(qualities)) => {
                for (i, quality) in qualities.iter().enumerate() {
                    println!("{:2}) {:<12} {}", i + 1, quality.label(), quality.url);
                }
            }
            Some(Variants::Direct(_)) => {
                println!("      {} manifest lists no variants", "Direct".colorize("bold cyan"))
            }
            None => (),
        }

        Ok(())
    }
}
