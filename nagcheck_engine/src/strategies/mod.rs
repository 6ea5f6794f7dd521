//! # Collection Strategies
//!
//! Traits for backend adapters plus the whitelisted command executor that
//! subprocess-based adapters share.

pub mod command_executor;
pub mod errors;
pub mod traits;

pub use command_executor::{CommandError, CommandOutput, SystemCommandExecutor};
pub use errors::CollectionError;
pub use traits::{FactCollector, RecordCollector};
