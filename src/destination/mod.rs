//! Destination-service boundary (Notion-modeled knowledge base).
//!
//! Pages are referenced by opaque string ids, never by embedded objects;
//! payloads are explicit tagged property values assembled by a builder. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;
