//! Type discovery for schema assembly.
//!
//! Starting from the root operation types, walks type references (field
//! return types, argument input types, implemented interfaces, union
//! members) to find exactly the types that need generated filter/order
//! inputs. Types no root reaches are left out.
//!
//! ```rust
//! use sieve_discovery::{discover, TypeGraph};
//!
//! let graph = TypeGraph::builder()
//!     .object("Query", ["User"])
//!     .object("User", ["ID", "Post"])
//!     .object("Post", ["User"])
//!     .object("Orphan", ["String"])
//!     .build()
//!     .unwrap();
//!
//! let found = discover(&["Query"], &graph).unwrap();
//! assert!(found.contains("Post"));
//! assert!(!found.contains("Orphan"));
//! ```

mod error;
mod graph;
mod walk;

pub use error::DiscoveryError;
pub use graph::{
    named_type, EdgeProvider, TypeDef, TypeGraph, TypeGraphBuilder, TypeKind, BUILTIN_SCALARS,
};
pub use walk::{discover, Discovery};
