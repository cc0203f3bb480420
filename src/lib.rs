//! # vertex-flatten — Vertex Property Flattening
//!
//! Graph vertices carry a multi-valued property bag: every key maps to an
//! ordered sequence of property entries. Application code usually wants one
//! plain value per key instead. This crate resolves each key according to a
//! cardinality policy:
//!
//! | Cardinality | Result |
//! |-------------|--------|
//! | `single` (default) | value of the first stored entry |
//! | `list` | every value, stored order, duplicates kept |
//! | `set` | distinct values, no order |
//!
//! ## Design Principles
//!
//! 1. **Pure**: flattening reads the vertex and allocates a fresh record. No I/O, no state.
//! 2. **Closed modes**: `Cardinality` is an enum; mode strings are validated once, up front.
//! 3. **Generic values**: `Vertex<V>` works with any `V: Clone + Eq + Hash`; `Value` is the default.
//!
//! ## Quick Start
//!
//! ```rust
//! use vertex_flatten::{Cardinality, CardinalityPolicy, Value, Vertex, VertexId};
//!
//! let vertex: Vertex = Vertex::new(VertexId(0), "person")
//!     .with_property("name", "Fred")
//!     .with_property("roles", "hunter")
//!     .with_property("roles", "gatherer")
//!     .with_property("weapons", "spear")
//!     .with_property("weapons", "spear");
//!
//! let policy = CardinalityPolicy::new()
//!     .with("roles", Cardinality::Set)
//!     .with("weapons", Cardinality::List);
//!
//! let record = vertex.flatten(Some(&policy));
//! assert_eq!(record.get("name").unwrap().as_single(), Some(&Value::from("Fred")));
//! assert_eq!(record.get("roles").unwrap().len(), 2);
//! assert_eq!(record.get("weapons").unwrap().len(), 2);
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod flatten;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Value, FromValue, Vertex, VertexId, PropertyEntry, PropertyEntries, PropertyId,
    Cardinality, CardinalityPolicy, Record, Resolved, FromResolved,
};

// ============================================================================
// Re-exports: Flattening
// ============================================================================

pub use flatten::{flatten, flatten_with_modes};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: unrecognized cardinality mode '{mode}'{}", key_suffix(.key))]
    ConfigurationError { key: Option<String>, mode: String },

    #[error("Type error: expected {expected}, got {got}")]
    TypeError { expected: String, got: String },

    #[error("Not found: {0}")]
    NotFound(String),
}

fn key_suffix(key: &Option<String>) -> String {
    key.as_ref().map(|k| format!(" for key '{k}'")).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, Error>;
