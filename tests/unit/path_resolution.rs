//! Include path resolution.

use dompile::config::PathConfinement;
use dompile::resolver::PathResolver;
use dompile::storage::MemoryStore;
use dompile::templating::{IncludeDirective, IncludeKind};
use std::path::{Path, PathBuf};

const ROOT: &str = "/site/src";

fn store() -> MemoryStore {
    MemoryStore::with_files([
        ("/site/src/shared/nav.html", "root nav"),
        ("/site/src/pages/deep/nav.html", "local nav"),
        ("/site/outside.html", "outside"),
    ])
}

#[test]
fn virtual_is_anchored_at_source_root() {
    let store = store();
    let resolver = PathResolver::new(&store, PathConfinement::Confined);
    let including = Path::new("/site/src/pages/deep/x.html");

    for raw in ["shared/nav.html", "/shared/nav.html", "shared\\nav.html"] {
        let resolved = resolver.resolve(
            &IncludeDirective::detached(IncludeKind::Virtual, raw),
            including,
            Path::new(ROOT),
        );
        assert_eq!(resolved.resolved_path, PathBuf::from("/site/src/shared/nav.html"), "{raw}");
        assert!(resolved.exists);
    }
}

#[test]
fn file_is_anchored_at_including_directory() {
    let store = store();
    let resolver = PathResolver::new(&store, PathConfinement::Confined);

    let resolved = resolver.resolve(
        &IncludeDirective::detached(IncludeKind::File, "./nav.html"),
        Path::new("/site/src/pages/deep/x.html"),
        Path::new(ROOT),
    );

    assert_eq!(resolved.resolved_path, PathBuf::from("/site/src/pages/deep/nav.html"));
    assert!(resolved.exists);
    assert!(!resolved.escapes_root);
}

#[test]
fn confinement_marks_escapes_missing() {
    let store = store();
    let directive = IncludeDirective::detached(IncludeKind::File, "../../../outside.html");
    let including = Path::new("/site/src/pages/deep/x.html");

    let confined = PathResolver::new(&store, PathConfinement::Confined).resolve(&directive, including, Path::new(ROOT));
    assert_eq!(confined.resolved_path, PathBuf::from("/site/outside.html"));
    assert!(confined.escapes_root);
    assert!(!confined.exists);

    let unconfined =
        PathResolver::new(&store, PathConfinement::Unconfined).resolve(&directive, including, Path::new(ROOT));
    assert!(!unconfined.escapes_root);
    assert!(unconfined.exists);
}

#[test]
fn dot_dot_inside_root_is_fine() {
    let store = store();
    let resolver = PathResolver::new(&store, PathConfinement::Confined);

    let resolved = resolver.resolve(
        &IncludeDirective::detached(IncludeKind::File, "../../shared/nav.html"),
        Path::new("/site/src/pages/deep/x.html"),
        Path::new(ROOT),
    );

    assert_eq!(resolved.resolved_path, PathBuf::from("/site/src/shared/nav.html"));
    assert!(resolved.exists);
}

#[test]
fn directories_do_not_exist_as_includes() {
    let store = store();
    let resolver = PathResolver::new(&store, PathConfinement::Confined);

    let resolved = resolver.resolve(
        &IncludeDirective::detached(IncludeKind::Virtual, "/shared"),
        Path::new("/site/src/index.html"),
        Path::new(ROOT),
    );

    assert!(!resolved.exists);
    assert!(!resolved.escapes_root);
}

#[test]
fn suggestions_keep_the_directive_prefix() {
    let store = store();
    let resolver = PathResolver::new(&store, PathConfinement::Confined);

    let resolved = resolver.resolve(
        &IncludeDirective::detached(IncludeKind::Virtual, "/shared/navv.html"),
        Path::new("/site/src/index.html"),
        Path::new(ROOT),
    );
    assert!(!resolved.exists);
    assert_eq!(resolver.suggestions(&resolved), vec!["/shared/nav.html".to_string()]);
}
