use clap::Parser;
use conversation_recap::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Execute(args) => cli::execute::run(args).await,
    }
}
