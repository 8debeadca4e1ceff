//! Directive and template markup parsing.

use dompile::core::Position;
use dompile::templating::{DEFAULT_SLOT, IncludeKind, TemplateInfo, parse_directives, parse_placeholders};

#[test]
fn directives_in_document_order_with_positions() {
    let text = "<p>\n<!--#include virtual=\"/a.html\" --> and <!--#Include FILE=\"b.html\"-->\n</p>";

    let directives = parse_directives(text);

    assert_eq!(directives.len(), 2);
    assert_eq!(directives[0].kind, IncludeKind::Virtual);
    assert_eq!(directives[0].raw_path, "/a.html");
    assert_eq!(directives[0].range.start, Position::new(1, 0));
    assert_eq!(directives[1].kind, IncludeKind::File);
    assert_eq!(directives[1].raw_path, "b.html");
    assert_eq!(&text[directives[1].span.clone()], "<!--#Include FILE=\"b.html\"-->");
}

#[test]
fn template_info_collects_fills_and_default_content() {
    let text = "<template extends=\"/layouts/base.html\"></template>\n\
                <template slot=\"title\">Hi</template>\n\
                <p>body</p>\n\
                <template slot=\"title\">Again</template>";

    let info = TemplateInfo::parse(text);

    assert_eq!(info.extends.as_ref().map(|e| e.path.as_str()), Some("/layouts/base.html"));
    assert_eq!(info.default_content, "<p>body</p>");
    assert_eq!(info.slot(DEFAULT_SLOT).map(|s| s.content.as_str()), Some("<p>body</p>"));
    assert_eq!(info.slot("title").map(|s| s.content.as_str()), Some("Again"));
    assert_eq!(info.duplicates.len(), 1);
    assert_eq!(info.duplicates[0].content, "Hi");
}

#[test]
fn placeholders_with_names_fallbacks_and_required() {
    let text = "<slot></slot><slot name=\"title\">Untitled</slot><slot name=\"nav\" required/>";

    let placeholders = parse_placeholders(text);

    assert_eq!(placeholders.len(), 3);
    assert_eq!(placeholders[0].name, DEFAULT_SLOT);
    assert!(!placeholders[0].required);
    assert_eq!(placeholders[1].name, "title");
    assert_eq!(placeholders[1].fallback, "Untitled");
    assert_eq!(placeholders[2].name, "nav");
    assert!(placeholders[2].required);
    assert_eq!(placeholders[2].fallback, "");
}
