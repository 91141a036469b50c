//! Code generation from a composition.
//!
//! Two pure serializers over the same snapshot the store exposes: a
//! single-file React component, and a Next.js-style page-plus-layout split.
//! Neither touches the DOM or the store; both must produce valid output for
//! the empty composition and must not panic on any reachable state.

pub mod nextjs;
pub mod react;

use crate::models::{CompositionSnapshot, OverrideRecord};
use crate::registry::SectionRegistry;
use std::collections::HashMap;
use std::fmt::Write as _;

pub use nextjs::generate_nextjs;
pub use react::generate_react;

/// One emitted source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Relative path within the exported project.
    pub path: String,
    /// File contents.
    pub contents: String,
}

/// A placed section resolved for emission: symbol name plus its overrides.
#[derive(Debug, Clone)]
pub(crate) struct EmitSection {
    pub component: String,
    pub record: OverrideRecord,
}

/// Resolves the snapshot into emission order: derived component names and
/// per-position override records.
///
/// Component symbols derive from the template's display name with
/// non-alphanumerics stripped ("Video Hero" -> "VideoHero"). Two distinct
/// templates colliding on a derived name get an index suffix so the emitted
/// imports stay unambiguous; the same template placed twice shares one
/// symbol.
pub(crate) fn resolve_sections(
    snapshot: CompositionSnapshot<'_>,
    registry: &SectionRegistry,
) -> Vec<EmitSection> {
    // template id -> symbol, assigned on first appearance
    let mut symbols: HashMap<String, String> = HashMap::new();
    let mut taken: HashMap<String, String> = HashMap::new(); // symbol -> template id

    let mut sections = Vec::with_capacity(snapshot.sections.len());
    for (position, placed) in snapshot.sections.iter().enumerate() {
        let component = symbols
            .entry(placed.template_id.clone())
            .or_insert_with(|| {
                let base = registry
                    .get(&placed.template_id)
                    .map_or_else(|| derive_symbol(&placed.template_id), |t| derive_symbol(&t.name));
                let mut candidate = base.clone();
                let mut suffix = 2;
                while taken
                    .get(&candidate)
                    .is_some_and(|owner| owner != &placed.template_id)
                {
                    candidate = format!("{base}{suffix}");
                    suffix += 1;
                }
                taken.insert(candidate.clone(), placed.template_id.clone());
                candidate
            })
            .clone();

        let record = snapshot
            .overrides
            .get(&position)
            .cloned()
            .unwrap_or_default();
        sections.push(EmitSection { component, record });
    }
    sections
}

/// Derives a component symbol from a display name.
///
/// Keeps alphanumerics, drops everything else, and prefixes names that would
/// start with a digit so the result is always a valid identifier.
pub(crate) fn derive_symbol(name: &str) -> String {
    let cleaned: String = name.chars().filter(char::is_ascii_alphanumeric).collect();
    let cleaned = if cleaned.is_empty() {
        "Section".to_string()
    } else {
        cleaned
    };
    if cleaned.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        format!("Section{cleaned}")
    } else {
        cleaned
    }
}

/// Unique component symbols in first-appearance order, for import lines.
pub(crate) fn unique_components(sections: &[EmitSection]) -> Vec<String> {
    let mut seen = Vec::new();
    for section in sections {
        if !seen.contains(&section.component) {
            seen.push(section.component.clone());
        }
    }
    seen
}

/// Emits the JSX wrapper opening tag for one section.
///
/// The wrapper always carries the override class string (empty when none)
/// and, when a background image is set, the inline
/// cover/center/no-repeat style object.
pub(crate) fn write_wrapper_open(out: &mut String, indent: &str, record: &OverrideRecord) {
    let classes = escape_jsx_attr(&record.style_classes);
    match &record.background_image_url {
        Some(url) => {
            let url = escape_jsx_attr(url);
            let _ = writeln!(
                out,
                "{indent}<div className=\"{classes}\" style={{{{ backgroundImage: \"url('{url}')\", \
                 backgroundSize: \"cover\", backgroundPosition: \"center\", backgroundRepeat: \"no-repeat\" }}}}>"
            );
        }
        None => {
            let _ = writeln!(out, "{indent}<div className=\"{classes}\">");
        }
    }
}

/// Emits text overrides as a comment block.
///
/// Overrides are not re-applied as executable code; the generated component
/// renders the pristine template, and the comment preserves what the user
/// changed so the handoff is lossless.
pub(crate) fn write_text_override_comments(out: &mut String, indent: &str, record: &OverrideRecord) {
    for (tag, text) in &record.text_overrides {
        let text = text.replace("*/", "*\\/");
        let _ = writeln!(out, "{indent}{{/* {tag}: \"{text}\" */}}");
    }
}

fn escape_jsx_attr(value: &str) -> String {
    value.replace('"', "&quot;")
}
