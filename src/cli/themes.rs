//! Themes command: list preset themes and print their CSS variables.

use crate::cli::common::{CliError, CliResult};
use crate::themes::ThemeTable;
use clap::Args;

/// List preset themes from the embedded catalog
#[derive(Debug, Clone, Args)]
pub struct ThemesArgs {
    /// Print the CSS custom properties of one theme instead of listing
    #[arg(long, value_name = "THEME_ID")]
    pub css: Option<String>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

impl ThemesArgs {
    /// Execute the themes command
    pub fn execute(&self) -> CliResult<()> {
        let table = ThemeTable::load()
            .map_err(|e| CliError::io(format!("Failed to load theme catalog: {e}")))?;

        if let Some(id) = &self.css {
            let theme = table
                .get(id)
                .ok_or_else(|| CliError::usage(format!("Unknown theme: {id}")))?;
            print!("{}", theme.to_css_variables());
            if let Some(url) = theme.font_stylesheet_url() {
                println!("/* fonts: {url} */");
            }
            return Ok(());
        }

        if self.json {
            let json = serde_json::to_string_pretty(table.list())
                .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?;
            println!("{json}");
            return Ok(());
        }

        for theme in table.list() {
            let fonts = if theme.google_fonts.is_some() {
                "google fonts"
            } else {
                "system fonts"
            };
            println!("{:<16} {:<20} ({fonts})", theme.id, theme.name);
        }

        Ok(())
    }
}
