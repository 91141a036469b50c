//! Preset theme catalog.
//!
//! Themes are static token sets: five named colors, three font stacks and an
//! optional Google Fonts directive. Selecting a theme never mutates the
//! composition; it derives a scoped style block the preview and the generated
//! layout embed.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as _;

/// The five named colors of a theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeColors {
    /// Body text color
    pub text: String,
    /// Page background color
    pub background: String,
    /// Primary brand color
    pub primary: String,
    /// Secondary surface color
    pub secondary: String,
    /// Accent color for highlights
    pub accent: String,
}

/// The three font stacks of a theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeFonts {
    /// Sans-serif stack
    pub sans: String,
    /// Serif stack
    pub serif: String,
    /// Monospace stack
    pub mono: String,
}

/// One immutable theme token set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Unique theme id (e.g. "clean-slate")
    pub id: String,
    /// Display name for menus
    pub name: String,
    /// Color tokens
    pub colors: ThemeColors,
    /// Font tokens
    pub fonts: ThemeFonts,
    /// Google Fonts query string, when the stacks need external loading
    #[serde(default)]
    pub google_fonts: Option<String>,
}

impl Theme {
    /// Derives the CSS custom-property declarations for this theme.
    ///
    /// The block is what a preview scope or a generated layout injects; the
    /// property names match what the section class vocabulary consumes.
    #[must_use]
    pub fn to_css_variables(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "--text: {};", self.colors.text);
        let _ = writeln!(out, "--background: {};", self.colors.background);
        let _ = writeln!(out, "--primary: {};", self.colors.primary);
        let _ = writeln!(out, "--secondary: {};", self.colors.secondary);
        let _ = writeln!(out, "--accent: {};", self.colors.accent);
        let _ = writeln!(out, "--font-sans: {};", self.fonts.sans);
        let _ = writeln!(out, "--font-serif: {};", self.fonts.serif);
        let _ = writeln!(out, "--font-mono: {};", self.fonts.mono);
        out
    }

    /// Full stylesheet URL for the theme's external fonts, if any.
    #[must_use]
    pub fn font_stylesheet_url(&self) -> Option<String> {
        self.google_fonts
            .as_ref()
            .map(|q| format!("https://fonts.googleapis.com/css2?{q}&display=swap"))
    }
}

/// Catalog schema from themes.json.
#[derive(Debug, Clone, Deserialize)]
struct ThemeCatalog {
    #[allow(dead_code)]
    version: String,
    themes: Vec<Theme>,
}

/// Theme catalog with stable listing order and id lookup.
#[derive(Debug, Clone)]
pub struct ThemeTable {
    themes: Vec<Theme>,
    lookup: HashMap<String, usize>,
}

impl ThemeTable {
    /// Loads the table from the embedded JSON catalog.
    pub fn load() -> Result<Self> {
        let json_data = include_str!("themes.json");
        let catalog: ThemeCatalog =
            serde_json::from_str(json_data).context("Failed to parse embedded themes.json")?;

        let mut lookup = HashMap::new();
        for (idx, theme) in catalog.themes.iter().enumerate() {
            lookup.insert(theme.id.clone(), idx);
        }

        Ok(Self {
            themes: catalog.themes,
            lookup,
        })
    }

    /// Gets a theme by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Theme> {
        let idx = self.lookup.get(id)?;
        self.themes.get(*idx)
    }

    /// All themes in catalog order.
    #[must_use]
    pub fn list(&self) -> &[Theme] {
        &self.themes
    }

    /// Number of themes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.themes.len()
    }

    /// True when the catalog is empty (never for the embedded catalog).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}
