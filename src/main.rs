//! Pageforge - section-based page builder toolkit
//!
//! Command-line access to the section catalog, theme presets, and the
//! composition-to-code exporters. The web API runs as the separate
//! `pageforge-web` binary.

use clap::{Parser, Subcommand};
use pageforge::cli::{ExportArgs, SectionsArgs, ThemesArgs};
use std::process::ExitCode;

/// Pageforge - section-based page builder toolkit
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List section templates from the embedded catalog
    Sections(SectionsArgs),
    /// List preset themes and print their CSS variables
    Themes(ThemesArgs),
    /// Export a composition to framework code
    Export(ExportArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Sections(args) => args.execute(),
        Command::Themes(args) => args.execute(),
        Command::Export(args) => args.execute(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            e.exit_code()
        }
    }
}
