mod play;
mod resolve;
mod update;

pub use play::Play;
pub use resolve::Resolve;
pub use update::Update;

use crate::transport::{Deadline, Transport};
use anyhow::Result;
use clap::{ArgAction, ColorChoice, Parser, Subcommand};
use reqwest::{Proxy, blocking::Client};
use std::time::Duration;

/// Resolve streaming embed pages into playable HLS manifests.
#[derive(Debug, Clone, Parser)]
#[command(version, author = "clitic <clitic21@gmail.com>", about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// When to output colored text.
    #[arg(long, global = true, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Only print errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print debug logs, or trace logs when used twice.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    Play(Play),
    Resolve(Resolve),
    Update(Update),
}

impl Commands {
    pub fn execute(self) -> Result<()> {
        match self {
            Self::Play(args) => args.execute(),
            Self::Resolve(args) => args.execute(),
            Self::Update(args) => args.execute(),
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct ClientOptions {
    /// Give up on the whole resolution after this many seconds.
    /// Every request gets at most the time left.
    #[arg(long, help_heading = "Client Options", value_name = "SECONDS")]
    pub deadline: Option<u64>,

    /// Skip checking and validation of site certificates.
    #[arg(long, help_heading = "Client Options")]
    pub no_certificate_checks: bool,

    /// Set http(s) / socks proxy address for requests.
    #[arg(long, help_heading = "Client Options", value_parser = proxy_address_parser)]
    pub proxy: Option<Proxy>,

    /// Timeout for each request.
    #[arg(long, help_heading = "Client Options", value_name = "SECONDS", default_value_t = 30)]
    pub timeout: u64,
}

impl ClientOptions {
    fn client(&self) -> Result<Client> {
        let mut client_builder = Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(self.no_certificate_checks)
            .timeout(Duration::from_secs(self.timeout));

        if let Some(proxy) = &self.proxy {
            client_builder = client_builder.proxy(proxy.clone());
        }

        Ok(client_builder.build()?)
    }

    pub fn transport(&self) -> Result<Box<dyn Transport>> {
        let client = self.client()?;

        Ok(match self.deadline {
            Some(seconds) => Box::new(Deadline::new(client, Duration::from_secs(seconds))),
            None => Box::new(client),
        })
    }
}

fn proxy_address_parser(s: &str) -> Result<Proxy, String> {
    Proxy::all(s).map_err(|x| x.to_string())
}
