use clap::Parser;
use model_repository::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    cli::user::run(cli.command).await
}
