//! Unit test suite for dompile
//!
//! Exercises the public building blocks in isolation over an in-memory
//! store, without touching the filesystem.
//!
//! ```bash
//! cargo test --test unit
//! ```

mod path_resolution;
mod template_parsing;
