//! Core types for reconciliation

mod entity;
mod row;
mod value;

pub use entity::*;
pub use row::*;
pub use value::*;
