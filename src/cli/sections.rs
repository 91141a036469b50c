//! Sections command: list the section template catalog.

use crate::cli::common::{CliError, CliResult};
use crate::models::SectionCategory;
use crate::registry::{SectionRegistry, SectionTemplate};
use clap::Args;
use serde::Serialize;

/// List section templates from the embedded catalog
#[derive(Debug, Clone, Args)]
pub struct SectionsArgs {
    /// Filter by category id (header, hero, feature, pricing, card, footer)
    #[arg(short, long, value_name = "CATEGORY")]
    pub category: Option<String>,

    /// Case-insensitive search over id and name
    #[arg(short, long, value_name = "TERM")]
    pub search: Option<String>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct SectionRow<'a> {
    id: &'a str,
    category: SectionCategory,
    name: &'a str,
}

impl SectionsArgs {
    /// Execute the sections command
    pub fn execute(&self) -> CliResult<()> {
        let registry = SectionRegistry::load()
            .map_err(|e| CliError::io(format!("Failed to load section catalog: {e}")))?;

        let mut templates: Vec<&SectionTemplate> = match &self.category {
            Some(id) => {
                let category = SectionCategory::from_id(id)
                    .ok_or_else(|| CliError::usage(format!("Unknown section category: {id}")))?;
                registry.list_by_category(category)
            }
            None => registry.all().iter().collect(),
        };

        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            templates.retain(|t| {
                t.id.to_lowercase().contains(&needle) || t.name.to_lowercase().contains(&needle)
            });
        }

        if self.json {
            let rows: Vec<SectionRow<'_>> = templates
                .iter()
                .map(|t| SectionRow {
                    id: &t.id,
                    category: t.category,
                    name: &t.name,
                })
                .collect();
            let json = serde_json::to_string_pretty(&rows)
                .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?;
            println!("{json}");
            return Ok(());
        }

        for category in SectionCategory::ALL {
            let in_category: Vec<&&SectionTemplate> = templates
                .iter()
                .filter(|t| t.category == category)
                .collect();
            if in_category.is_empty() {
                continue;
            }
            println!("{}", category.label());
            for template in in_category {
                println!("  {:<20} {}", template.id, template.name);
            }
        }

        Ok(())
    }
}
