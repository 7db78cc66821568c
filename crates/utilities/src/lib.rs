//! Utility types and functions for the fasim toolset.
//!
//! This crate does not use unsafe code.
#![forbid(unsafe_code)]

mod error;
mod random_test;
mod tagged_index;
mod test_logger;
mod timing;

pub use error::*;
pub use random_test::*;
pub use tagged_index::*;
pub use test_logger::*;
pub use timing::*;
