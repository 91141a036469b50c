//! Next.js-style page-plus-layout generator.

use super::{
    resolve_sections, unique_components, write_text_override_comments, write_wrapper_open,
    GeneratedFile,
};
use crate::models::CompositionSnapshot;
use crate::registry::SectionRegistry;
use crate::themes::Theme;
use std::fmt::Write as _;

/// Generates an `app/` route pair: the layout owns the HTML shell (and, when
/// a theme is selected, its font stylesheet and CSS variables), while the
/// page composes the placed sections.
///
/// Both files are valid for the empty composition.
#[must_use]
pub fn generate_nextjs(
    snapshot: CompositionSnapshot<'_>,
    registry: &SectionRegistry,
    theme: Option<&Theme>,
) -> Vec<GeneratedFile> {
    let sections = resolve_sections(snapshot, registry);
    vec![generate_layout(theme), generate_page(&sections)]
}

fn generate_layout(theme: Option<&Theme>) -> GeneratedFile {
    let mut out = String::new();
    out.push_str("export const metadata = {\n");
    out.push_str("  title: \"Generated Site\",\n");
    out.push_str("};\n\n");
    out.push_str("export default function RootLayout({ children }) {\n");
    out.push_str("  return (\n");
    out.push_str("    <html lang=\"en\">\n");
    out.push_str("      <head>\n");
    if let Some(theme) = theme {
        if let Some(url) = theme.font_stylesheet_url() {
            let _ = writeln!(out, "        <link rel=\"stylesheet\" href=\"{url}\" />");
        }
        out.push_str("        <style>{`:root {\n");
        for line in theme.to_css_variables().lines() {
            let _ = writeln!(out, "          {line}");
        }
        out.push_str("        }`}</style>\n");
    }
    out.push_str("      </head>\n");
    out.push_str("      <body>{children}</body>\n");
    out.push_str("    </html>\n");
    out.push_str("  );\n");
    out.push_str("}\n");

    GeneratedFile {
        path: "app/layout.jsx".to_string(),
        contents: out,
    }
}

fn generate_page(sections: &[super::EmitSection]) -> GeneratedFile {
    let mut out = String::new();
    let imports = unique_components(sections);
    if !imports.is_empty() {
        let _ = writeln!(
            out,
            "import {{ {} }} from \"../components/sections\";\n",
            imports.join(", ")
        );
    }

    out.push_str("export default function Page() {\n");
    out.push_str("  return (\n");
    out.push_str("    <main className=\"min-h-screen\">\n");
    for section in sections {
        write_text_override_comments(&mut out, "      ", &section.record);
        write_wrapper_open(&mut out, "      ", &section.record);
        let _ = writeln!(out, "        <{} />", section.component);
        out.push_str("      </div>\n");
    }
    out.push_str("    </main>\n");
    out.push_str("  );\n");
    out.push_str("}\n");

    GeneratedFile {
        path: "app/page.jsx".to_string(),
        contents: out,
    }
}
