//! Type definitions

pub mod profile;
pub mod upload;

pub use profile::*;
pub use upload::*;
