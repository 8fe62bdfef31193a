use super::ClientOptions;
use crate::update;
use anyhow::Result;
use clap::Args;
use kdam::term::Colorizer;

/// Check a release feed for a newer version.
#[derive(Debug, Clone, Args)]
pub struct Update {
    /// GitHub style release feed returning `{"tag_name": "..."}`.
    #[arg(long, required = true)]
    pub feed: String,

    #[command(flatten)]
    pub client: ClientOptions,
}

impl Update {
    pub fn execute(self) -> Result<()> {
        let transport = self.client.transport()?;
        let check = update::check_for_new_release(transport.as_ref(), &self.feed)?;

        if check.is_up_to_date() {
            println!("     {} vsr {} is up to date", "Latest".colorize("bold green"), check.current);
        } else {
            println!(
                "     {} a new release of vsr is available {} -> {}",
                "Notice".colorize("bold cyan"),
                check.current.colorize("bold red"),
                check.remote.colorize("bold green"),
            );
        }

        Ok(())
    }
}
