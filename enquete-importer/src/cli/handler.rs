//! Import command handler

use anyhow::Result;
use colored::*;

use super::Cli;
use crate::config::AppConfig;
use crate::db::{DryRunSinkFactory, PostgresSinkFactory, SinkFactory};
use crate::runner::{FacilityFilter, Runner};
use crate::sheet::SheetSources;

/// Load the config, pick the sink and run the import
pub async fn handle_import_command(args: Cli) -> Result<()> {
    if args.no_color {
        colored::control::set_override(false);
    }

    if !args.config.exists() {
        anyhow::bail!("Config file does not exist: {}", args.config.display());
    }
    let config = AppConfig::load(&args.config)?;
    println!("Using config: {}", args.config.display().to_string().cyan());

    let sources = SheetSources::from_env()?;
    let postgres = PostgresSinkFactory;
    let dry_run = DryRunSinkFactory;
    let sinks: &dyn SinkFactory = if args.dry_run {
        println!("{}", "Dry run: nothing will be written".yellow());
        &dry_run
    } else {
        &postgres
    };

    let filter = FacilityFilter::new(args.corporations, args.facilities);
    let summary = Runner::new(&sources, sinks)
        .with_default_table(args.table)
        .run(&config, &filter)
        .await?;

    summary.print();
    Ok(())
}
