//! Provides the evidence and scenario file formats understood by the Credence toolkit.

pub mod csv;
mod errors;
mod evidence;
pub mod json;
mod labels;
pub mod scenario;

pub use crate::errors::*;
pub use crate::evidence::*;
pub use crate::labels::parse_subset;

#[macro_use]
extern crate lazy_static;
