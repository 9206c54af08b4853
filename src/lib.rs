// Library target for integration tests and criterion benchmarks.
// The binary entry point is main.rs, which declares the full module tree.

pub mod config;
pub mod passage;
pub mod session;
