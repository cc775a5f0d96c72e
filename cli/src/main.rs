use clap::Parser;
use powerkeys::{commands, logging, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    commands::run(cli).await
}
