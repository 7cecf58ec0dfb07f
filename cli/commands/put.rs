use super::Flags;
use anyhow::Context;
use kiln_core::store::{CasStore, DefaultStore};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Debug, Clone)]
#[structopt(
    name = "put",
    setting = structopt::clap::AppSettings::ColoredHelp,
    about = "Store a file's contents and print its digest"
)]
pub struct PutCommand {
    #[structopt(help = "The file whose contents should be stored.")]
    file: PathBuf,

    #[structopt(flatten)]
    flags: Flags,
}

impl PutCommand {
    pub async fn run(self) -> Result<(), anyhow::Error> {
        let config = self.flags.into_config()?;
        let store = DefaultStore::new(&config);

        let bytes = tokio::fs::read(&self.file)
            .await
            .with_context(|| format!("could not read {:?}", self.file))?;

        let digest = store.put(&bytes).await?;
        println!("{digest}");

        Ok(())
    }
}
