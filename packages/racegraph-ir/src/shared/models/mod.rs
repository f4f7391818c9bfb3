//! Shared models
//!
//! Raw program representation consumed by the trace builder:
//! module → functions → instructions → operands.

mod error;
mod ids;
mod instruction;
mod module;
mod span;

pub use error::{ModelError, Result};
pub use ids::{InstId, ValueId};
pub use instruction::{Callee, InstKind, Instruction, Operand};
pub use module::{Function, FunctionBuilder, Module, ModuleBuilder};
pub use span::SourceLocation;
