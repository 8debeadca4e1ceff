//! Layout chains, slots and head injection through the full pipeline.

use anyhow::Result;
use dompile::core::{DiagnosticKind, Severity};
use dompile::resolver::DependencyKind;

use crate::common::{SiteFixture, sample_site};

#[test]
fn sample_page_composes_layout_includes_and_head() -> Result<()> {
    let site = sample_site()?;

    let result = site.pipeline().render_path(&site.source("index.html"));

    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(
        result.html,
        "<html><head><title>Welcome</title><meta charset=\"utf-8\"></head>\
         <body><nav>Home</nav><main><p>Hello</p></main></body></html>"
    );
    assert_eq!(
        result.dependencies,
        vec![
            site.source("layouts/base.html"),
            site.source("includes/nav.html"),
            site.source("includes/head.html"),
        ]
    );
    Ok(())
}

#[test]
fn three_level_chain_nests_outward() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write("src/grandparent.html", "<html><slot></slot></html>")?;
    site.write(
        "src/parent.html",
        "<template extends=\"grandparent.html\"></template><body><slot></slot></body>",
    )?;
    site.write("src/child.html", "<template extends=\"parent.html\"></template><p>child</p>")?;

    let pipeline = site.pipeline();
    let (result, tracker) = pipeline.trace_path(&site.source("child.html"));

    assert_eq!(result.html, "<html><body><p>child</p></body></html>");
    assert_eq!(
        result.dependencies,
        vec![site.source("parent.html"), site.source("grandparent.html")]
    );
    assert_eq!(
        tracker.direct_dependencies(&site.source("child.html")),
        vec![site.source("parent.html")]
    );
    let tree = tracker.to_tree_string(&site.source("child.html"), &site.source_root());
    assert!(tree.contains("parent.html (layout)"));
    Ok(())
}

#[test]
fn slot_fill_may_contain_template_elements() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write("src/layout.html", "<main><slot></slot></main><aside><slot name=\"side\"></slot></aside>")?;
    site.write(
        "src/page.html",
        "<template extends=\"layout.html\"></template>\
         <template slot=\"side\"><template id=\"row\"><td>r</td></template> after</template>body",
    )?;

    let result = site.pipeline().render_path(&site.source("page.html"));

    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(
        result.html,
        "<main>body</main><aside><template id=\"row\"><td>r</td></template> after</aside>"
    );
    Ok(())
}

#[test]
fn named_slots_fill_through_intermediate_layouts() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write(
        "src/root.html",
        "<title><slot name=\"title\">Untitled</slot></title><slot></slot><footer><slot name=\"footer\">(c)</slot></footer>",
    )?;
    site.write(
        "src/section.html",
        "<template extends=\"root.html\"></template><template slot=\"footer\">section footer</template><article><slot></slot></article>",
    )?;
    site.write(
        "src/page.html",
        "<template extends=\"section.html\"></template><template slot=\"title\">Page</template>body",
    )?;

    let result = site.pipeline().render_path(&site.source("page.html"));

    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(
        result.html,
        "<title>Page</title><article>body</article><footer>section footer</footer>"
    );
    Ok(())
}

#[test]
fn missing_required_slot_warns_and_renders_fallback() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write("src/layout.html", "<h1><slot name=\"title\" required>?</slot></h1><slot></slot>")?;
    site.write("src/page.html", "<template extends=\"layout.html\"></template>text")?;

    let result = site.pipeline().render_path(&site.source("page.html"));

    assert_eq!(result.html, "<h1>?</h1>text");
    assert_eq!(result.diagnostics.len(), 1);
    let diagnostic = &result.diagnostics[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::MissingRequiredSlot);
    assert_eq!(diagnostic.severity, Severity::Warning);
    assert_eq!(diagnostic.file, site.source("layout.html"));
    Ok(())
}

#[test]
fn orphan_slot_content_is_appended_with_warning() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write("src/layout.html", "<main><slot></slot></main>")?;
    site.write(
        "src/page.html",
        "<template extends=\"layout.html\"></template>text<template slot=\"sidebar\">aside</template>",
    )?;

    let result = site.pipeline().render_path(&site.source("page.html"));

    assert_eq!(result.html, "<main>text</main>\naside");
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::OrphanSlotContent);
    assert_eq!(
        result.diagnostics[0].message,
        "Slot 'sidebar' is not declared by any layout in the chain"
    );
    Ok(())
}

#[test]
fn layout_cycle_falls_back_to_own_content() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write("src/a.html", "<template extends=\"b.html\"></template>A")?;
    site.write("src/b.html", "<template extends=\"a.html\"></template>B<slot></slot>")?;

    let result = site.pipeline().render_path(&site.source("a.html"));

    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::LayoutCycle);
    assert_eq!(result.diagnostics[0].message, "Layout cycle detected: a.html -> b.html -> a.html");
    assert!(result.html.contains("dompile-error"));
    assert!(result.html.ends_with("\nA"));
    Ok(())
}

#[test]
fn missing_layout_is_an_error() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write("src/page.html", "<template extends=\"/layouts/none.html\"></template>content")?;

    let result = site.pipeline().render_path(&site.source("page.html"));

    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::LayoutNotFound);
    assert_eq!(result.diagnostics[0].severity, Severity::Error);
    assert!(result.html.ends_with("\ncontent"));
    Ok(())
}

#[test]
fn head_snippet_goes_before_closing_head() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write("src/includes/head.html", "<meta x>")?;
    site.write("src/page.html", "<html><head></head></html>")?;

    let (result, tracker) = site.pipeline().trace_path(&site.source("page.html"));

    assert_eq!(result.html, "<html><head><meta x></head></html>");
    assert!(result.diagnostics.is_empty());
    let tree = tracker.to_tree_string(&site.source("page.html"), &site.source_root());
    assert!(tree.contains("includes/head.html (head)"));
    assert_eq!(DependencyKind::Head.to_string(), "head");
    Ok(())
}

#[test]
fn head_snippet_without_head_is_prepended_with_warning() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write("src/includes/head.html", "<meta x>")?;
    site.write("src/page.html", "<p>no head</p>")?;

    let result = site.pipeline().render_path(&site.source("page.html"));

    assert_eq!(result.html, "<meta x><p>no head</p>");
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::HeadTargetMissing);
    assert_eq!(result.diagnostics[0].severity, Severity::Warning);
    Ok(())
}

#[test]
fn head_snippet_includes_are_expanded_and_tracked() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write("src/includes/head.html", "<!--#include file=\"meta.html\"-->")?;
    site.write("src/includes/meta.html", "<meta name=\"generator\">")?;
    site.write("src/page.html", "<head></head>")?;

    let result = site.pipeline().render_path(&site.source("page.html"));

    assert_eq!(result.html, "<head><meta name=\"generator\"></head>");
    assert_eq!(
        result.dependencies,
        vec![site.source("includes/head.html"), site.source("includes/meta.html")]
    );
    Ok(())
}
