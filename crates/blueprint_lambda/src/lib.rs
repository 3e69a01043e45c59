//! AWS-oriented adapters and handlers for the blueprint functions.
//!
//! Each blueprint is one binary under `src/bin/` wiring a pure handler from
//! `handlers/` to AWS SDK clients through the trait seams in `adapters/`.
//! Shared SDK-backed implementations used by more than one binary live in
//! `runtime/`.

pub mod adapters;
pub mod handlers;
pub mod logging;
pub mod runtime;
