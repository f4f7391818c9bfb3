//! Points-to domain types
pub mod abstract_object;

pub use abstract_object::AbstractObject;
