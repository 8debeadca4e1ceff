//! Stress test suite for dompile
//!
//! Large include graphs rendered through the in-memory store. Timings are
//! printed for manual review rather than asserted.
//!
//! ```bash
//! cargo test --test stress -- --nocapture
//! ```

#[path = "../common/mod.rs"]
mod common;

mod deep_chains;
