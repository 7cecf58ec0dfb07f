mod get;
mod put;
mod run;

pub use get::*;
pub use put::*;
pub use run::*;

use kiln_core::Config;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Default, Debug, Clone, StructOpt)]
pub struct Flags {
    #[structopt(
        help = r"The root of kiln's operating directory, holding the store and the sandboxes.",
        long = "kiln-root"
    )]
    pub(crate) kiln_root: Option<PathBuf>,
}

impl Flags {
    pub(crate) fn into_config(self) -> Result<Config, anyhow::Error> {
        let mut builder = Config::builder();
        if let Some(kiln_root) = self.kiln_root {
            builder.kiln_root(kiln_root);
        }
        Ok(builder.build()?)
    }
}
