//! Export command: generate framework code from a saved composition.

use crate::cli::common::{CliError, CliResult};
use crate::codegen::{generate_nextjs, generate_react, GeneratedFile};
use crate::models::Composition;
use crate::registry::SectionRegistry;
use crate::themes::ThemeTable;
use clap::{Args, ValueEnum};
use std::fs;
use std::path::PathBuf;

/// Output dialect for the export command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Single-file React component
    React,
    /// Next.js app router page + layout pair
    Nextjs,
}

/// Export a composition to framework code
#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Path to a saved composition JSON file
    #[arg(short, long, value_name = "FILE")]
    pub composition: PathBuf,

    /// Output dialect
    #[arg(short, long, value_enum, default_value_t = ExportFormat::React)]
    pub format: ExportFormat,

    /// Theme id baked into the generated layout (nextjs only)
    #[arg(long, value_name = "THEME_ID")]
    pub theme: Option<String>,

    /// Directory the generated files are written into
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output: PathBuf,
}

impl ExportArgs {
    /// Execute the export command
    pub fn execute(&self) -> CliResult<()> {
        let content = fs::read_to_string(&self.composition)
            .map_err(|e| CliError::io(format!("Failed to read composition file: {e}")))?;
        let composition: Composition = serde_json::from_str(&content)
            .map_err(|e| CliError::validation(format!("Invalid composition file: {e}")))?;

        let registry = SectionRegistry::load()
            .map_err(|e| CliError::io(format!("Failed to load section catalog: {e}")))?;

        let files: Vec<GeneratedFile> = match self.format {
            ExportFormat::React => vec![generate_react(composition.snapshot(), &registry)],
            ExportFormat::Nextjs => {
                let table = ThemeTable::load()
                    .map_err(|e| CliError::io(format!("Failed to load theme catalog: {e}")))?;
                let theme = match &self.theme {
                    Some(id) => Some(
                        table
                            .get(id)
                            .ok_or_else(|| CliError::usage(format!("Unknown theme: {id}")))?,
                    ),
                    None => None,
                };
                generate_nextjs(composition.snapshot(), &registry, theme)
            }
        };

        for file in &files {
            let path = self.output.join(&file.path);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| CliError::io(format!("Failed to create output directory: {e}")))?;
            }
            fs::write(&path, &file.contents)
                .map_err(|e| CliError::io(format!("Failed to write output file: {e}")))?;
            println!("Wrote {}", path.display());
        }

        Ok(())
    }
}
