//! This crate provides the [`MassFunction`] implementation of Dempster-Shafer theory.

mod combine;
mod errors;
mod frame;
mod mass_function;

pub use combine::*;
pub use errors::*;
pub use frame::*;
pub use mass_function::*;

#[allow(unused_imports)]
#[macro_use]
extern crate approx;
