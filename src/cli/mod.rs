//! CLI command handlers for Pageforge.
//!
//! Headless, scriptable access to the catalog, the theme table, and the code
//! generators for automation and CI use. The web API lives in its own binary.

pub mod common;
pub mod export;
pub mod sections;
pub mod themes;

// Re-export types used by main.rs and tests
pub use common::{CliError, CliResult};
pub use export::{ExportArgs, ExportFormat};
pub use sections::SectionsArgs;
pub use themes::ThemesArgs;
