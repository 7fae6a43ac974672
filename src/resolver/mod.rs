//! Relation resolution with single-creation semantics.
//!
//! The resolver turns natural names and source identifiers into
//! destination identities. Areas and people are lookup-only; project pages
//! are materialized exactly once under a per-name single-flight lock, with
//! their areas frozen at creation time.

mod service;
mod single_flight;

pub use service::{Resolver, ResolverError, match_person};
pub use single_flight::KeyedLocks;
