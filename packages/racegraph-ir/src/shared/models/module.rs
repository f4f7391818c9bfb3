//! Program module: the unit one analysis run works on
//!
//! A `Module` owns its functions and keeps two lookup tables (function by
//! name, instruction by id) so the trace builder never scans linearly.

use super::error::{ModelError, Result};
use super::ids::{InstId, ValueId};
use super::instruction::{Callee, InstKind, Instruction, Operand};
use super::span::SourceLocation;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    /// Empty for declarations (external functions)
    #[serde(default)]
    pub body: Vec<Instruction>,
}

impl Function {
    pub fn is_declaration(&self) -> bool {
        self.body.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RawModule {
    name: String,
    #[serde(default)]
    functions: Vec<Function>,
}

/// Analyzed program
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawModule")]
pub struct Module {
    name: String,
    functions: Vec<Function>,
    #[serde(skip)]
    by_name: FxHashMap<String, usize>,
    #[serde(skip)]
    by_inst: FxHashMap<InstId, (usize, usize)>,
}

impl TryFrom<RawModule> for Module {
    type Error = ModelError;

    fn try_from(raw: RawModule) -> Result<Self> {
        Module::new(raw.name, raw.functions)
    }
}

impl Module {
    /// Create a module, rejecting duplicate function names and instruction ids
    pub fn new(name: impl Into<String>, functions: Vec<Function>) -> Result<Self> {
        let mut seen_functions = FxHashSet::default();
        let mut seen_insts = FxHashSet::default();
        for function in &functions {
            if !seen_functions.insert(function.name.as_str()) {
                return Err(ModelError::DuplicateFunction(function.name.clone()));
            }
            for inst in &function.body {
                if !seen_insts.insert(inst.id) {
                    return Err(ModelError::DuplicateInstruction(inst.id));
                }
            }
        }
        Ok(Self::indexed(name.into(), functions))
    }

    fn indexed(name: String, functions: Vec<Function>) -> Self {
        let mut by_name = FxHashMap::default();
        let mut by_inst = FxHashMap::default();
        for (f_idx, function) in functions.iter().enumerate() {
            by_name.insert(function.name.clone(), f_idx);
            for (pos, inst) in function.body.iter().enumerate() {
                by_inst.insert(inst.id, (f_idx, pos));
            }
        }
        Self {
            name,
            functions,
            by_name,
            by_inst,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.by_name.get(name).map(|&idx| &self.functions[idx])
    }

    /// Function with a body (definitions only)
    pub fn definition(&self, name: &str) -> Option<&Function> {
        self.function(name).filter(|f| !f.is_declaration())
    }

    pub fn instruction(&self, id: InstId) -> Option<&Instruction> {
        self.by_inst
            .get(&id)
            .map(|&(f_idx, pos)| &self.functions[f_idx].body[pos])
    }

    pub fn instruction_count(&self) -> usize {
        self.by_inst.len()
    }

    /// Names of all direct callees in the module (with repetitions)
    pub fn direct_callees(&self) -> impl Iterator<Item = &str> + '_ {
        self.functions
            .iter()
            .flat_map(|f| f.body.iter())
            .filter_map(Instruction::callee_name)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Builders
// ═══════════════════════════════════════════════════════════════════════════

/// Builder for constructing modules in code
///
/// # Example
/// ```
/// use racegraph_ir::shared::models::{ModuleBuilder, Operand};
///
/// let mut mb = ModuleBuilder::new("simple.c");
/// let x = mb.value();
/// mb.function("worker", |f| {
///     f.at(3, 5).store(x);
/// });
/// mb.function("main", |f| {
///     f.call("pthread_create", vec![x.into(), Operand::Null, Operand::function("worker"), Operand::Null]);
/// });
/// let module = mb.build();
/// assert!(module.definition("worker").is_some());
/// ```
#[derive(Debug)]
pub struct ModuleBuilder {
    name: String,
    functions: Vec<Function>,
    next_inst: u32,
    next_value: u32,
}

impl ModuleBuilder {
    /// Create a builder; the module name doubles as the source file of locations
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
            next_inst: 0,
            next_value: 0,
        }
    }

    /// Allocate a fresh pointer-valued entity
    pub fn value(&mut self) -> ValueId {
        let id = ValueId(self.next_value);
        self.next_value += 1;
        id
    }

    /// Define a function; replaces an earlier definition with the same name
    pub fn function(&mut self, name: &str, body: impl FnOnce(&mut FunctionBuilder<'_>)) -> &mut Self {
        let mut builder = FunctionBuilder {
            file: self.name.clone(),
            next_inst: &mut self.next_inst,
            body: Vec::new(),
            pending_location: None,
        };
        body(&mut builder);
        let function = Function {
            name: name.to_string(),
            body: builder.body,
        };
        self.functions.retain(|f| f.name != name);
        self.functions.push(function);
        self
    }

    /// Declare an external function (no body)
    pub fn declare(&mut self, name: &str) -> &mut Self {
        self.function(name, |_| {})
    }

    pub fn build(self) -> Module {
        // Instruction ids come from one counter and names are deduplicated above.
        Module::indexed(self.name, self.functions)
    }
}

/// Appends instructions to one function body
#[derive(Debug)]
pub struct FunctionBuilder<'a> {
    file: String,
    next_inst: &'a mut u32,
    body: Vec<Instruction>,
    pending_location: Option<SourceLocation>,
}

impl FunctionBuilder<'_> {
    /// Source location for the next instruction
    pub fn at(&mut self, line: u32, column: u32) -> &mut Self {
        self.pending_location = Some(SourceLocation::new(self.file.clone(), line, column));
        self
    }

    fn push(&mut self, kind: InstKind) -> InstId {
        let id = InstId(*self.next_inst);
        *self.next_inst += 1;
        let location = self.pending_location.take();
        self.body.push(Instruction { id, kind, location });
        id
    }

    pub fn load(&mut self, ptr: ValueId) -> InstId {
        self.push(InstKind::Load {
            ptr,
            volatile: false,
        })
    }

    pub fn store(&mut self, ptr: ValueId) -> InstId {
        self.push(InstKind::Store {
            ptr,
            volatile: false,
        })
    }

    pub fn volatile_load(&mut self, ptr: ValueId) -> InstId {
        self.push(InstKind::Load {
            ptr,
            volatile: true,
        })
    }

    pub fn volatile_store(&mut self, ptr: ValueId) -> InstId {
        self.push(InstKind::Store {
            ptr,
            volatile: true,
        })
    }

    pub fn call(&mut self, callee: &str, args: Vec<Operand>) -> InstId {
        self.push(InstKind::Call {
            callee: Callee::Direct(callee.to_string()),
            args,
        })
    }

    pub fn call_indirect(&mut self, target: ValueId, args: Vec<Operand>) -> InstId {
        self.push(InstKind::Call {
            callee: Callee::Indirect(target),
            args,
        })
    }

    pub fn other(&mut self) -> InstId {
        self.push(InstKind::Other)
    }
}
