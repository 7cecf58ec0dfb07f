//! # Kiln Core
//!
//! The action-evaluation and local-execution core of a content-addressed build
//! engine. An `ActionKey` describes a command to run over content-addressed
//! inputs; the `DefaultEngine` resolves it (recursively building whatever its
//! inputs depend on), hands the concrete request to an `Executor`, and
//! publishes the outputs back into the `CasStore` as immutable, hash-identified
//! objects.
//!
//! The engine, store, and executor are all seams: each is a trait with a
//! default local implementation, so any of them can be swapped without
//! touching the resolution protocol.

pub mod config;
pub mod engine;
pub mod executor;
pub mod model;
pub mod resolver;
pub mod store;

pub use config::*;

#[macro_use]
extern crate derive_builder;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
