//! Include expansion properties on a real filesystem.

use anyhow::Result;
use dompile::core::{DiagnosticKind, Position};
use dompile::utils::inline_marker;

use crate::common::{SiteFixture, init_test_logging};

fn count(kinds: &[DiagnosticKind], kind: DiagnosticKind) -> usize {
    kinds.iter().filter(|k| **k == kind).count()
}

#[test]
fn acyclic_graph_lists_each_reachable_file_once() -> Result<()> {
    init_test_logging(None);
    let site = SiteFixture::new()?;
    site.write(
        "src/index.html",
        "<!--#include virtual=\"/parts/b.html\"--><!--#include virtual=\"/parts/c.html\"-->",
    )?;
    site.write("src/parts/b.html", "b<!--#include file=\"d.html\"-->")?;
    site.write("src/parts/c.html", "c<!--#include file=\"d.html\"-->")?;
    site.write("src/parts/d.html", "d")?;
    site.write("src/parts/unused.html", "never")?;

    let result = site.pipeline().render_path(&site.source("index.html"));

    assert_eq!(result.html, "bdcd");
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(
        result.dependencies,
        vec![
            site.source("parts/b.html"),
            site.source("parts/d.html"),
            site.source("parts/c.html"),
        ]
    );
    Ok(())
}

#[test]
fn self_include_yields_one_cycle_diagnostic() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write("src/a.html", "x<!--#include file=\"a.html\"-->y")?;

    let result = site.pipeline().render_path(&site.source("a.html"));
    let kinds: Vec<_> = result.diagnostics.iter().map(|d| d.kind).collect();

    assert_eq!(kinds, vec![DiagnosticKind::IncludeCycle]);
    let message = &result.diagnostics[0].message;
    assert_eq!(message, "Circular include detected: a.html -> a.html");
    assert_eq!(result.html, format!("x{}y", inline_marker(message)));
    Ok(())
}

#[test]
fn indirect_cycle_is_cut_at_the_reentry() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write("src/a.html", "A<!--#include file=\"b.html\"-->")?;
    site.write("src/b.html", "B<!--#include file=\"a.html\"-->")?;

    let result = site.pipeline().render_path(&site.source("a.html"));

    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::IncludeCycle);
    assert_eq!(result.diagnostics[0].file, site.source("b.html"));
    assert!(result.html.starts_with("AB<!-- dompile: Circular include detected"));
    assert_eq!(result.dependencies, vec![site.source("b.html")]);
    Ok(())
}

#[test]
fn missing_include_is_reported_at_the_directive() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write("src/page.html", "before\n  <!--#include file=\"missing.html\"-->\nafter")?;

    let result = site.pipeline().render_path(&site.source("page.html"));

    assert_eq!(result.diagnostics.len(), 1);
    let diagnostic = &result.diagnostics[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::IncludeNotFound);
    assert_eq!(diagnostic.message, "Include file not found: missing.html");
    assert_eq!(diagnostic.range.start, Position::new(1, 2));
    assert_eq!(
        result.html,
        format!("before\n  {}\nafter", inline_marker(&diagnostic.message))
    );
    assert!(result.dependencies.is_empty());
    Ok(())
}

#[test]
fn virtual_and_file_includes_resolve_from_different_bases() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write("src/shared/nav.html", "ROOT-NAV")?;
    site.write("src/pages/deep/nav.html", "LOCAL-NAV")?;
    site.write(
        "src/pages/deep/x.html",
        "<!--#include virtual=\"shared/nav.html\"-->|<!--#include file=\"./nav.html\"-->",
    )?;

    let result = site.pipeline().render_path(&site.source("pages/deep/x.html"));

    assert_eq!(result.html, "ROOT-NAV|LOCAL-NAV");
    assert_eq!(
        result.dependencies,
        vec![site.source("shared/nav.html"), site.source("pages/deep/nav.html")]
    );
    Ok(())
}

#[test]
fn directory_target_counts_as_missing() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write("src/parts/inner.html", "x")?;
    site.write("src/page.html", "<!--#include virtual=\"/parts\"-->")?;

    let result = site.pipeline().render_path(&site.source("page.html"));

    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::IncludeNotFound);
    Ok(())
}

#[test]
fn escaping_the_source_root_is_refused() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write("secret.html", "top secret")?;
    site.write("src/page.html", "<!--#include file=\"../secret.html\"-->")?;

    let result = site.pipeline().render_path(&site.source("page.html"));

    assert!(!result.html.contains("top secret"));
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(
        result.diagnostics[0].message,
        "Include path escapes source root: ../secret.html"
    );
    Ok(())
}

#[test]
fn depth_bound_reports_once_where_crossed() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write_config("max-include-depth = 3\n")?;
    for i in 0..6 {
        site.write(
            &format!("src/level{i}.html"),
            &format!("{i}<!--#include file=\"level{}.html\"-->", i + 1),
        )?;
    }
    site.write("src/level6.html", "end")?;

    let result = site.pipeline().render_path(&site.source("level0.html"));
    let kinds: Vec<_> = result.diagnostics.iter().map(|d| d.kind).collect();

    assert_eq!(count(&kinds, DiagnosticKind::MaxDepthExceeded), 1);
    assert_eq!(kinds.len(), 1);
    assert_eq!(result.diagnostics[0].file, site.source("level3.html"));
    assert!(result.html.starts_with("0123<!-- dompile: Maximum include depth of 3 exceeded"));
    assert_eq!(result.dependencies.len(), 3);
    Ok(())
}

#[test]
fn lookalike_comments_are_left_alone() -> Result<()> {
    let site = SiteFixture::new()?;
    let text = "<!--#include virtual='single.html'--><!-- include file=\"x\" --><!--#echo var=\"x\"-->";
    site.write("src/page.html", text)?;

    let result = site.pipeline().render_path(&site.source("page.html"));

    assert_eq!(result.html, text);
    assert!(result.diagnostics.is_empty());
    Ok(())
}

#[test]
fn directive_keywords_are_case_insensitive() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write("src/part.html", "P")?;
    site.write("src/page.html", "<!--#INCLUDE FILE=\"part.html\"-->")?;

    let result = site.pipeline().render_path(&site.source("page.html"));

    assert_eq!(result.html, "P");
    Ok(())
}

#[test]
fn unreadable_root_document_renders_error_page() -> Result<()> {
    let site = SiteFixture::new()?;

    let result = site.pipeline().render_path(&site.source("nope.html"));

    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::BackingStoreFailure);
    assert!(result.html.contains("Rendering Failed"));
    assert!(result.dependencies.is_empty());
    Ok(())
}

#[test]
fn rerendering_after_a_change_sees_new_content() -> Result<()> {
    let site = SiteFixture::new()?;
    site.write("src/part.html", "one")?;
    site.write("src/page.html", "<!--#include file=\"part.html\"-->")?;
    let pipeline = site.pipeline();

    assert_eq!(pipeline.render_path(&site.source("page.html")).html, "one");
    site.write("src/part.html", "two")?;
    assert_eq!(pipeline.render_path(&site.source("page.html")).html, "two");
    Ok(())
}
