//! Command-line entry point: walks a directory of scraped article records and
//! writes one row per (author, institution) pair.

use anyhow::Result;
use clap::{Parser, Subcommand};
use journal_affiliations::extract;

/// Top-level options. `--verbose` forces `RUST_LOG=debug` so diagnostics
/// reported at debug level, such as dropped departments, are shown.
#[derive(Parser)]
#[command(name = "journal-affiliations")]
#[command(about = "Resolve NEJM, JAMA and JCO affiliation text into per-author institutions")]
#[command(version, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve scraped article records into author/affiliation rows
    Resolve(extract::ResolveArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }

    match cli.command {
        Commands::Resolve(args) => extract::run(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_resolve_subcommand_parses_verbose_anywhere() {
        let cli = Cli::try_parse_from(["journal-affiliations", "resolve", "-i", "in", "-o", "out", "-v"])
            .unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Resolve(_)));
    }
}
