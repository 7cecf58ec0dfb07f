mod action;
mod artifact;
mod digest;
mod error;
mod key;
mod value;

pub use action::*;
pub use artifact::*;
pub use digest::*;
pub use error::*;
pub use key::*;
pub use value::*;
