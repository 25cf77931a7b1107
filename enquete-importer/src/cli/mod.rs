//! Command-line interface

mod handler;

use std::path::PathBuf;

use clap::Parser;

use crate::config::DEFAULT_CONFIG_FILE;
use crate::runner::DEFAULT_TABLE;

pub use handler::handle_import_command;

#[derive(Parser, Debug)]
#[command(
    name = "enquete-importer",
    version,
    about = "Import survey spreadsheets into facility databases"
)]
pub struct Cli {
    /// Config file (TOML, or YAML by extension)
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Only import this corporation (repeatable)
    #[arg(short = 'c', long = "corporation")]
    pub corporations: Vec<String>,

    /// Only import this facility, as `facility` or `corporation.facility` (repeatable)
    #[arg(short = 'f', long = "facility")]
    pub facilities: Vec<String>,

    /// Destination table for jobs that do not name one
    #[arg(long, default_value = DEFAULT_TABLE)]
    pub table: String,

    /// Build every record but write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Disable colored summary output
    #[arg(long)]
    pub no_color: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["enquete-importer"]);
        assert_eq!(cli.config, PathBuf::from("config.toml"));
        assert_eq!(cli.table, "enquetes");
        assert!(cli.corporations.is_empty());
        assert!(cli.facilities.is_empty());
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_repeatable_filters() {
        let cli = Cli::parse_from([
            "enquete-importer",
            "--config",
            "settings.yaml",
            "-c",
            "tokyo",
            "--corporation",
            "osaka",
            "-f",
            "tokyo.shinjuku",
            "--table",
            "enquetes_2024",
            "--dry-run",
        ]);
        assert_eq!(cli.config, PathBuf::from("settings.yaml"));
        assert_eq!(cli.corporations, vec!["tokyo", "osaka"]);
        assert_eq!(cli.facilities, vec!["tokyo.shinjuku"]);
        assert_eq!(cli.table, "enquetes_2024");
        assert!(cli.dry_run);
    }
}
