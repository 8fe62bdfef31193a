use crate::stream::SubtitleTrack;
use anyhow::{Result, bail};
use clap::ValueEnum;
use log::info;
use std::process::Command;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Player {
    Mpv,
    Iina,
}

impl Default for Player {
    fn default() -> Self {
        if cfg!(target_os = "macos") {
            Self::Iina
        } else {
            Self::Mpv
        }
    }
}

/// Everything a player needs to open a resolved stream.
pub struct Playback<'a> {
    pub url: &'a str,
    pub referer: &'a str,
    pub subtitles: &'a [SubtitleTrack],
    pub title: &'a str,
}

impl Player {
    pub fn program(self) -> &'static str {
        match self {
            Self::Mpv => "mpv",
            Self::Iina => "iina",
        }
    }

    pub fn args(self, playback: &Playback) -> Vec<String> {
        let mut args = Vec::new();

        match self {
            Self::Mpv => {
                args.push(playback.url.to_owned());
                args.push(format!("--referrer={}", playback.referer));
                args.push(format!("--force-media-title=Playing {}", playback.title));
                args.extend(
                    playback
                        .subtitles
                        .iter()
                        .map(|x| format!("--sub-file={}", x.file)),
                );
            }
            Self::Iina => {
                args.push("--no-stdin".to_owned());
                args.push("--keep-running".to_owned());
                args.push(format!("--mpv-referrer={}", playback.referer));
                args.push(playback.url.to_owned());
                args.push(format!("--mpv-force-media-title=Playing {}", playback.title));
                args.extend(
                    playback
                        .subtitles
                        .iter()
                        .map(|x| format!("--mpv-sub-files={}", x.file)),
                );
            }
        }

        args
    }

    /// Starts the player and waits for it to exit.
    pub fn play(self, playback: &Playback) -> Result<()> {
        info!("Starting {} for {}", self.program(), playback.title);

        let code = Command::new(self.program())
            .args(self.args(playback))
            .spawn()?
            .wait()?;

        if !code.success() {
            bail!("{} exited with code {}", self.program(), code.code().unwrap_or(1));
        }

        Ok(())
    }
}
