//! # Vertex Model
//!
//! DTOs on both sides of flattening: the vertex handed over by a graph
//! client, the cardinality policy supplied by the caller, and the record
//! handed back.
//!
//! Design rule: this module is pure data. No I/O, no state, no logging.

pub mod value;
pub mod vertex;
pub mod cardinality;
pub mod record;

pub use value::{Value, FromValue};
pub use vertex::{Vertex, VertexId, PropertyEntry, PropertyEntries, PropertyId};
pub use cardinality::{Cardinality, CardinalityPolicy};
pub use record::{Record, Resolved, FromResolved};
