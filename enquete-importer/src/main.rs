use anyhow::Result;
use clap::Parser;

use enquete_importer::cli::{Cli, handle_import_command};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Cli::parse();
    if let Err(err) = handle_import_command(args).await {
        log::error!("{:#}", err);
        return Err(err);
    }
    Ok(())
}
