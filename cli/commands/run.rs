use super::Flags;
use anyhow::Context;
use kiln_core::engine::{DefaultEngine, Evaluator};
use kiln_core::executor::local::{LocalExecutor, LocalExecutorContext};
use kiln_core::model::ActionKey;
use kiln_core::store::DefaultStore;
use std::path::PathBuf;
use std::sync::Arc;
use structopt::StructOpt;

#[derive(StructOpt, Debug, Clone)]
#[structopt(
    name = "run",
    setting = structopt::clap::AppSettings::ColoredHelp,
    about = "Resolve and execute an action described in a JSON file"
)]
pub struct RunCommand {
    #[structopt(help = "A JSON file describing the action to run.")]
    action: PathBuf,

    #[structopt(flatten)]
    flags: Flags,
}

impl RunCommand {
    pub async fn run(self) -> Result<(), anyhow::Error> {
        let config = self.flags.into_config()?;

        let store = Arc::new(DefaultStore::new(&config));
        let executor = Arc::new(LocalExecutor::new(LocalExecutorContext::new(
            &config,
            store.clone(),
        )));
        let engine = DefaultEngine::new(store, executor);

        let json = tokio::fs::read_to_string(&self.action)
            .await
            .with_context(|| format!("could not read {:?}", self.action))?;
        let key: ActionKey = serde_json::from_str(&json)
            .with_context(|| format!("could not parse an action out of {:?}", self.action))?;

        let digest = engine.register_action(&key).await?;
        let value = engine.action_value(&digest).await?;

        println!("action {digest}");
        for (index, output) in value.outputs().iter().enumerate() {
            println!("  out[{index}] {output}");
        }

        Ok(())
    }
}
