pub mod config_manager;
pub mod dependency;
pub mod error;
pub mod snapshot;
pub mod traits;
pub mod types;

pub use config_manager::*;
pub use dependency::*;
pub use error::*;
pub use snapshot::*;
pub use traits::*;
pub use types::*;
