use super::Flags;
use anyhow::{anyhow, Context};
use kiln_core::model::Digest;
use kiln_core::store::{CasStore, DefaultStore};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Debug, Clone)]
#[structopt(
    name = "get",
    setting = structopt::clap::AppSettings::ColoredHelp,
    about = "Fetch a stored object by digest and write it to a file"
)]
pub struct GetCommand {
    #[structopt(help = "The digest of the object to fetch.")]
    digest: Digest,

    #[structopt(help = "Where to write the object's bytes.")]
    dst: PathBuf,

    #[structopt(flatten)]
    flags: Flags,
}

impl GetCommand {
    pub async fn run(self) -> Result<(), anyhow::Error> {
        let config = self.flags.into_config()?;
        let store = DefaultStore::new(&config);

        let bytes = store
            .get(&self.digest)
            .await?
            .ok_or_else(|| anyhow!("no object in the store for digest {}", self.digest))?;

        tokio::fs::write(&self.dst, &bytes)
            .await
            .with_context(|| format!("could not write {:?}", self.dst))?;

        Ok(())
    }
}
