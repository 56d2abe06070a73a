#![deny(clippy::all)]
#![warn(clippy::pedantic)]

//! Benchmark harness for uniresolve.
//!
//! Run benchmarks with: `cargo bench -p uniresolve-bench`
//!
//! This crate only holds criterion benchmarks.
