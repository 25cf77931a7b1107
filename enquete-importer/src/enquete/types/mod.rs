//! Core types for enquete imports

mod value;
mod field;
mod definition;
mod key;
mod job;
mod row;

pub use value::*;
pub use field::*;
pub use definition::*;
pub use key::*;
pub use job::*;
pub use row::*;
