//! Purpose: Shared library crate used by the `batchkit` CLI and batch scripts.
//! Exports: `api` (stable surface) over `core` (config, table, dump, plot, report).
//! Role: Convenience glue for batch data-analysis scripts; each entry point is
//! an independent single-call operation with no shared state.
//! Invariants: Errors surface immediately with a kind callers can branch on.
//! Invariants: File handles live only for the duration of one call.
pub mod api;
pub mod core;
