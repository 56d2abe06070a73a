//! Thin adapters for the tools that consume resolution.
//!
//! Each one maps a host's request shape onto [`Resolver::resolve`](crate::Resolver::resolve)
//! with the output form that host expects.

pub mod bundler;
pub mod lint;
pub mod loader;

pub use bundler::replace_request;
pub use lint::LintResolution;
pub use loader::resolve_request;
