//! Long include and layout chains.

use dompile::config::RenderConfig;
use dompile::core::DiagnosticKind;
use dompile::pipeline::RenderPipeline;
use dompile::storage::MemoryStore;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::common::init_test_logging;

const ROOT: &str = "/site/src";

fn chain(length: usize) -> MemoryStore {
    let mut store = MemoryStore::new();
    for i in 0..length {
        store.add(
            format!("{ROOT}/chain/{i}.html"),
            format!("<{i}><!--#include file=\"{}.html\"-->", i + 1),
        );
    }
    store.add(format!("{ROOT}/chain/{length}.html"), "end");
    store
}

#[test]
fn chain_within_bound_expands_fully() {
    init_test_logging(None);
    let length = 500;
    let config = RenderConfig::new(ROOT).with_max_include_depth(length);
    let pipeline = RenderPipeline::new(config, Arc::new(chain(length)));

    let start = Instant::now();
    let result = pipeline.render_path(Path::new("/site/src/chain/0.html"));
    println!("Expanded {length}-deep chain in {:?}", start.elapsed());

    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics.first());
    assert!(result.html.ends_with("<499>end"));
    assert_eq!(result.dependencies.len(), length);
}

#[test]
fn chain_beyond_bound_stops_once() {
    let pipeline = RenderPipeline::new(RenderConfig::new(ROOT), Arc::new(chain(2_000)));

    let result = pipeline.render_path(Path::new("/site/src/chain/0.html"));

    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].kind, DiagnosticKind::MaxDepthExceeded);
    assert_eq!(result.dependencies.len(), 10);
}

#[test]
fn very_deep_chain_on_a_small_stack() {
    let length = 5_000;
    // Same stack size as test threads and tokio's blocking pool
    let handle = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(move || {
            let config = RenderConfig::new(ROOT).with_max_include_depth(1_000_000);
            let pipeline = RenderPipeline::new(config, Arc::new(chain(length)));
            pipeline.trace_path(Path::new("/site/src/chain/0.html"))
        })
        .expect("spawn render thread");

    let start = Instant::now();
    let (result, tracker) = handle.join().expect("render thread completed");
    println!("Expanded {length}-deep chain with a large bound in {:?}", start.elapsed());

    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics.first());
    assert!(result.html.starts_with("<0><1><2>"));
    assert!(result.html.ends_with("<4999>end"));
    assert_eq!(result.dependencies.len(), length);
    assert!(!tracker.has_cycle(Path::new("/site/src/chain/0.html")));
}

#[test]
fn long_layout_chain() {
    let depth = 200;
    let mut store = MemoryStore::new();
    for i in 0..depth {
        store.add(
            format!("{ROOT}/layouts/{i}.html"),
            format!("<template extends=\"{}.html\"></template><l{i}><slot></slot></l{i}>", i + 1),
        );
    }
    store.add(format!("{ROOT}/layouts/{depth}.html"), "<root><slot></slot></root>");
    store.add(format!("{ROOT}/layouts/page.html"), "<template extends=\"0.html\"></template>leaf");
    let pipeline = RenderPipeline::new(RenderConfig::new(ROOT), Arc::new(store));

    let start = Instant::now();
    let result = pipeline.render_path(Path::new("/site/src/layouts/page.html"));
    println!("Composed {depth}-layout chain in {:?}", start.elapsed());

    assert!(result.diagnostics.is_empty());
    assert!(result.html.starts_with("<root><l199>"));
    assert!(result.html.contains("<l0>leaf</l0>"));
    assert_eq!(result.dependencies.len(), depth + 1);
}
