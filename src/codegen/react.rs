//! Single-file React component generator.

use super::{
    resolve_sections, unique_components, write_text_override_comments, write_wrapper_open,
    GeneratedFile,
};
use crate::models::CompositionSnapshot;
use crate::registry::SectionRegistry;
use std::fmt::Write as _;

/// Generates one React component composing every placed section in order.
///
/// Section components are imported from a local `./sections` module; each is
/// wrapped in a `div` carrying its style-class and background overrides, with
/// text overrides preserved as a comment block above the wrapper. An empty
/// composition yields a component returning an empty container, which is
/// still valid JSX.
#[must_use]
pub fn generate_react(snapshot: CompositionSnapshot<'_>, registry: &SectionRegistry) -> GeneratedFile {
    let sections = resolve_sections(snapshot, registry);

    let mut out = String::new();
    out.push_str("import React from \"react\";\n");
    let imports = unique_components(&sections);
    if !imports.is_empty() {
        let _ = writeln!(out, "import {{ {} }} from \"./sections\";\n", imports.join(", "));
    } else {
        out.push('\n');
    }

    out.push_str("export default function GeneratedPage() {\n");
    out.push_str("  return (\n");
    out.push_str("    <div className=\"min-h-screen\">\n");
    for section in &sections {
        write_text_override_comments(&mut out, "      ", &section.record);
        write_wrapper_open(&mut out, "      ", &section.record);
        let _ = writeln!(out, "        <{} />", section.component);
        out.push_str("      </div>\n");
    }
    out.push_str("    </div>\n");
    out.push_str("  );\n");
    out.push_str("}\n");

    GeneratedFile {
        path: "GeneratedPage.jsx".to_string(),
        contents: out,
    }
}
