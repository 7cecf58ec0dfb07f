mod commands;

use commands::*;
use structopt::StructOpt;
use tracing::{error, log};

#[derive(StructOpt, Debug)]
#[structopt(
    name = "kiln",
    setting = structopt::clap::AppSettings::ColoredHelp,
    about = "A content-addressed action runner"
)]
struct Kiln {
    #[structopt(subcommand, help = "the command to run")]
    cmd: Command,
}

impl Kiln {
    async fn run(self) -> Result<(), anyhow::Error> {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .format_timestamp_micros()
            .format_module_path(false)
            .parse_env("KILN_LOG")
            .try_init()
            .unwrap();

        let result = self.cmd.run().await;

        if let Err(ref err) = result {
            error!("{:?}", &err);
        };

        result
    }
}

#[derive(StructOpt, Debug)]
enum Command {
    Get(GetCommand),
    Put(PutCommand),
    Run(RunCommand),
}

impl Command {
    async fn run(self) -> Result<(), anyhow::Error> {
        match self {
            Command::Get(x) => x.run().await,
            Command::Put(x) => x.run().await,
            Command::Run(x) => x.run().await,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), anyhow::Error> {
    Kiln::from_args().run().await
}
