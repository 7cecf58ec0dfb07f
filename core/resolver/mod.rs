mod action_resolver;
mod error;
mod execution_resolver;

pub use action_resolver::*;
pub use error::*;
pub use execution_resolver::*;
