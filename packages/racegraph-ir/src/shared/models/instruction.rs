//! Raw instructions
//!
//! A deliberately small instruction set: memory loads/stores, calls, and
//! everything else collapsed into `Other`. Concurrency semantics are attached
//! later by the instruction classifiers.

use super::ids::{InstId, ValueId};
use super::span::SourceLocation;
use serde::{Deserialize, Serialize};

/// Call argument / instruction operand
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// Pointer-valued entity
    Value(ValueId),
    /// Address of a function (thread entries, callbacks)
    Function(String),
    /// Result of another call instruction
    Result(InstId),
    /// Integer constant
    Const(i64),
    /// Null pointer
    Null,
}

impl Operand {
    pub fn function(name: impl Into<String>) -> Self {
        Operand::Function(name.into())
    }

    pub fn as_value(&self) -> Option<ValueId> {
        match self {
            Operand::Value(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&str> {
        match self {
            Operand::Function(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_result(&self) -> Option<InstId> {
        match self {
            Operand::Result(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<ValueId> for Operand {
    fn from(value: ValueId) -> Self {
        Operand::Value(value)
    }
}

/// Call target
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Callee {
    Direct(String),
    /// Function pointer, resolved through points-to
    Indirect(ValueId),
}

impl Callee {
    pub fn name(&self) -> Option<&str> {
        match self {
            Callee::Direct(name) => Some(name),
            Callee::Indirect(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum InstKind {
    Load {
        ptr: ValueId,
        #[serde(default)]
        volatile: bool,
    },
    Store {
        ptr: ValueId,
        #[serde(default)]
        volatile: bool,
    },
    Call {
        callee: Callee,
        #[serde(default)]
        args: Vec<Operand>,
    },
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub id: InstId,
    #[serde(flatten)]
    pub kind: InstKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl Instruction {
    pub fn new(id: InstId, kind: InstKind) -> Self {
        Self {
            id,
            kind,
            location: None,
        }
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn is_call(&self) -> bool {
        matches!(self.kind, InstKind::Call { .. })
    }

    /// Name of a direct callee, if this is a direct call
    pub fn callee_name(&self) -> Option<&str> {
        match &self.kind {
            InstKind::Call { callee, .. } => callee.name(),
            _ => None,
        }
    }

    /// Call arguments (empty for non-calls)
    pub fn args(&self) -> &[Operand] {
        match &self.kind {
            InstKind::Call { args, .. } => args,
            _ => &[],
        }
    }

    pub fn arg(&self, offset: usize) -> Option<&Operand> {
        self.args().get(offset)
    }
}
