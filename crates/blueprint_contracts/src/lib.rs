//! Shared event contracts and pure transforms for the blueprint functions.
//!
//! This crate owns the externally-dictated event and response shapes that the
//! blueprints pattern-match against, plus the pure helpers built on them
//! (validation, CORS computation, log-line grammars, policy assembly, event
//! batching). It intentionally excludes AWS SDK and Lambda runtime concerns.

pub mod apigw;
pub mod authorizer;
pub mod cloudfront;
pub mod collector;
pub mod config_rule;
pub mod cors;
pub mod firehose;
pub mod logs;
pub mod parsers;
pub mod records;
pub mod validation;
