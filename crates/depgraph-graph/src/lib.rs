//! Resolution of host graph nodes into snapshot dependencies, and the batch
//! protocol that applies actions to them.
//!
//! - `store`: per-project snapshot store with atomic wholesale replacement
//! - `resolver`: node identifier -> (dependency, snapshot)
//! - `registry`: dependency kind -> view provider
//! - `transaction`: scoped transaction guard around per-node processing
//! - `executor`: cancellable batch execution over a graph context
//! - `handlers`: check-children and get-children actions plus a dispatcher

pub mod context;
pub mod executor;
pub mod handlers;
pub mod registry;
pub mod resolver;
pub mod store;
pub mod transaction;

pub use context::*;
pub use executor::*;
pub use handlers::*;
pub use registry::*;
pub use resolver::*;
pub use store::*;
pub use transaction::*;

pub use tokio_util::sync::CancellationToken;
