//! IR nodes: concurrency-relevant views of raw instructions
//!
//! One closed family covers every concurrency API. Downstream analyses
//! (trace builder, shared memory, happens-before) match on the category and
//! never care which API produced a node; the API tag is kept for runtime
//! models and reports.
//!
//! Constructors take a raw instruction plus the API's operand offsets. A call
//! that does not have the expected shape is a classifier bug, so constructors
//! panic instead of returning errors.

use super::arena::NodeId;
use crate::shared::models::{Callee, InstId, InstKind, Instruction, Operand, SourceLocation, ValueId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic category of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeCategory {
    Read,
    Write,
    Free,
    Fork,
    Join,
    Lock,
    Unlock,
    Barrier,
    Call,
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// API tags
// ═══════════════════════════════════════════════════════════════════════════

/// How a memory access was expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessApi {
    Load,
    Store,
    /// Library call reading through one argument (e.g. memcpy source)
    ApiRead { operand: usize },
    /// Library call writing through one argument (e.g. memset destination)
    ApiWrite { operand: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FreeApi {
    Free,
    CxxDelete,
}

/// Thread-creating construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForkApi {
    PthreadCreate,
    /// One member of an OpenMP parallel-region team
    OmpFork { master: bool },
    /// One member of an OpenMP teams-region league
    OmpTeams { master: bool },
    OmpTask,
    /// One device thread of a kernel launch
    CudaKernel { block: u32, thread: u32 },
}

impl ForkApi {
    /// Barrier-team tag: forks of one instruction sharing a tag synchronize on barriers
    pub fn team(&self) -> Option<u32> {
        match self {
            ForkApi::OmpFork { .. } | ForkApi::OmpTeams { .. } => Some(0),
            ForkApi::CudaKernel { block, .. } => Some(*block),
            ForkApi::PthreadCreate | ForkApi::OmpTask => None,
        }
    }

    /// First member of an OpenMP team
    pub fn is_master(&self) -> bool {
        matches!(
            self,
            ForkApi::OmpFork { master: true } | ForkApi::OmpTeams { master: true }
        )
    }

    pub fn is_team_member(&self) -> bool {
        matches!(self, ForkApi::OmpFork { .. } | ForkApi::OmpTeams { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinApi {
    PthreadJoin,
    /// Join synthesized from a fork node (fork+join constructs, task waits, device syncs)
    Companion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockApi {
    PthreadMutex,
    PthreadSpin,
    OmpCritical,
    OmpLock,
    OmpOrdered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarrierApi {
    OmpBarrier,
    CudaBlock,
}

/// Call flavor; everything except `Plain` is interpreted by a runtime model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallApi {
    Plain,
    OmpMaster,
    OmpEndMaster,
    OmpSingle,
    OmpEndSingle,
    OmpTaskwait,
    OmpReduce,
    CudaDeviceSync,
    CudaStreamSync,
}

impl CallApi {
    pub fn is_runtime(&self) -> bool {
        !matches!(self, CallApi::Plain)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Node payloads
// ═══════════════════════════════════════════════════════════════════════════

/// Originating instruction and its source location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub inst: InstId,
    pub location: Option<SourceLocation>,
}

impl Site {
    pub fn of(inst: &Instruction) -> Self {
        Self {
            inst: inst.id,
            location: inst.location.clone(),
        }
    }
}

/// Routine a fork runs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThreadEntry {
    Direct(String),
    /// Function pointer, resolved through points-to
    Indirect(ValueId),
}

impl ThreadEntry {
    pub fn from_operand(operand: &Operand) -> Option<Self> {
        match operand {
            Operand::Function(name) => Some(ThreadEntry::Direct(name.clone())),
            Operand::Value(value) => Some(ThreadEntry::Indirect(*value)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessIr {
    pub site: Site,
    pub api: AccessApi,
    pub value: ValueId,
    /// Recorded for reports only; volatile does not synchronize
    pub volatile: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeIr {
    pub site: Site,
    pub api: FreeApi,
    pub value: ValueId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkIr {
    pub site: Site,
    pub api: ForkApi,
    pub handle: Operand,
    pub entry: ThreadEntry,
}

impl ForkIr {
    pub fn team(&self) -> Option<u32> {
        self.api.team()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinIr {
    pub site: Site,
    pub api: JoinApi,
    pub handle: Operand,
    /// Fork node this join was derived from
    pub fork: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockIr {
    pub site: Site,
    pub api: LockApi,
    pub lock: Operand,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarrierIr {
    pub site: Site,
    pub api: BarrierApi,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallIr {
    pub site: Site,
    pub api: CallApi,
    pub callee: Callee,
    pub args: Vec<Operand>,
}

/// Concurrency-relevant view of one instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum IrNode {
    Read(AccessIr),
    Write(AccessIr),
    Free(FreeIr),
    Fork(ForkIr),
    Join(JoinIr),
    Lock(LockIr),
    Unlock(LockIr),
    Barrier(BarrierIr),
    Call(CallIr),
}

// ═══════════════════════════════════════════════════════════════════════════
// Constructors
// ═══════════════════════════════════════════════════════════════════════════

fn require_call(inst: &Instruction, role: &str) {
    assert!(
        inst.is_call(),
        "{role}: instruction {} is not a call",
        inst.id
    );
}

fn call_operand<'a>(inst: &'a Instruction, offset: usize, role: &str) -> &'a Operand {
    require_call(inst, role);
    inst.arg(offset).unwrap_or_else(|| {
        panic!(
            "{role}: call {} to {} has no operand {offset}",
            inst.id,
            inst.callee_name().unwrap_or("<indirect>")
        )
    })
}

fn value_operand(inst: &Instruction, offset: usize, role: &str) -> ValueId {
    match call_operand(inst, offset, role) {
        Operand::Value(value) => *value,
        other => panic!(
            "{role}: operand {offset} of call {} must be a pointer value, found {other:?}",
            inst.id
        ),
    }
}

impl IrNode {
    /// Read through the pointer of a `Load`
    pub fn load(inst: &Instruction) -> Self {
        match &inst.kind {
            InstKind::Load { ptr, volatile } => IrNode::Read(AccessIr {
                site: Site::of(inst),
                api: AccessApi::Load,
                value: *ptr,
                volatile: *volatile,
            }),
            other => panic!("load: instruction {} is {other:?}", inst.id),
        }
    }

    /// Write through the pointer of a `Store`
    pub fn store(inst: &Instruction) -> Self {
        match &inst.kind {
            InstKind::Store { ptr, volatile } => IrNode::Write(AccessIr {
                site: Site::of(inst),
                api: AccessApi::Store,
                value: *ptr,
                volatile: *volatile,
            }),
            other => panic!("store: instruction {} is {other:?}", inst.id),
        }
    }

    pub fn api_read(inst: &Instruction, operand: usize) -> Self {
        IrNode::Read(AccessIr {
            site: Site::of(inst),
            api: AccessApi::ApiRead { operand },
            value: value_operand(inst, operand, "api read"),
            volatile: false,
        })
    }

    pub fn api_write(inst: &Instruction, operand: usize) -> Self {
        IrNode::Write(AccessIr {
            site: Site::of(inst),
            api: AccessApi::ApiWrite { operand },
            value: value_operand(inst, operand, "api write"),
            volatile: false,
        })
    }

    pub fn free(inst: &Instruction, api: FreeApi, operand: usize) -> Self {
        IrNode::Free(FreeIr {
            site: Site::of(inst),
            api,
            value: value_operand(inst, operand, "free"),
        })
    }

    /// Fork whose handle and entry are both call operands
    pub fn fork(inst: &Instruction, api: ForkApi, handle: usize, entry: usize) -> Self {
        let handle = call_operand(inst, handle, "fork handle").clone();
        let entry_operand = call_operand(inst, entry, "fork entry");
        let entry = ThreadEntry::from_operand(entry_operand).unwrap_or_else(|| {
            panic!(
                "fork entry: operand {entry_operand:?} of call {} is not a routine",
                inst.id
            )
        });
        Self::fork_with_entry(inst, api, handle, entry)
    }

    /// Fork whose entry was resolved elsewhere (e.g. through a task allocation)
    pub fn fork_with_entry(inst: &Instruction, api: ForkApi, handle: Operand, entry: ThreadEntry) -> Self {
        require_call(inst, "fork");
        IrNode::Fork(ForkIr {
            site: Site::of(inst),
            api,
            handle,
            entry,
        })
    }

    pub fn join(inst: &Instruction, api: JoinApi, handle: usize) -> Self {
        IrNode::Join(JoinIr {
            site: Site::of(inst),
            api,
            handle: call_operand(inst, handle, "join handle").clone(),
            fork: None,
        })
    }

    /// Join derived from a fork node, sharing its instruction and location
    pub fn companion_join(fork_id: NodeId, fork: &ForkIr) -> Self {
        IrNode::Join(JoinIr {
            site: fork.site.clone(),
            api: JoinApi::Companion,
            handle: fork.handle.clone(),
            fork: Some(fork_id),
        })
    }

    pub fn lock(inst: &Instruction, api: LockApi, operand: usize) -> Self {
        IrNode::Lock(LockIr {
            site: Site::of(inst),
            api,
            lock: call_operand(inst, operand, "lock").clone(),
        })
    }

    pub fn unlock(inst: &Instruction, api: LockApi, operand: usize) -> Self {
        IrNode::Unlock(LockIr {
            site: Site::of(inst),
            api,
            lock: call_operand(inst, operand, "unlock").clone(),
        })
    }

    pub fn barrier(inst: &Instruction, api: BarrierApi) -> Self {
        require_call(inst, "barrier");
        IrNode::Barrier(BarrierIr {
            site: Site::of(inst),
            api,
        })
    }

    pub fn call(inst: &Instruction, api: CallApi) -> Self {
        match &inst.kind {
            InstKind::Call { callee, args } => IrNode::Call(CallIr {
                site: Site::of(inst),
                api,
                callee: callee.clone(),
                args: args.clone(),
            }),
            other => panic!("call: instruction {} is {other:?}", inst.id),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════════

    pub fn category(&self) -> NodeCategory {
        match self {
            IrNode::Read(_) => NodeCategory::Read,
            IrNode::Write(_) => NodeCategory::Write,
            IrNode::Free(_) => NodeCategory::Free,
            IrNode::Fork(_) => NodeCategory::Fork,
            IrNode::Join(_) => NodeCategory::Join,
            IrNode::Lock(_) => NodeCategory::Lock,
            IrNode::Unlock(_) => NodeCategory::Unlock,
            IrNode::Barrier(_) => NodeCategory::Barrier,
            IrNode::Call(_) => NodeCategory::Call,
        }
    }

    pub fn site(&self) -> &Site {
        match self {
            IrNode::Read(n) | IrNode::Write(n) => &n.site,
            IrNode::Free(n) => &n.site,
            IrNode::Fork(n) => &n.site,
            IrNode::Join(n) => &n.site,
            IrNode::Lock(n) | IrNode::Unlock(n) => &n.site,
            IrNode::Barrier(n) => &n.site,
            IrNode::Call(n) => &n.site,
        }
    }

    pub fn inst(&self) -> InstId {
        self.site().inst
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        self.site().location.as_ref()
    }

    /// Pointer dereferenced by a Read/Write
    pub fn accessed_value(&self) -> Option<ValueId> {
        match self {
            IrNode::Read(n) | IrNode::Write(n) => Some(n.value),
            _ => None,
        }
    }

    /// Pointer released by a Free
    pub fn freed_value(&self) -> Option<ValueId> {
        match self {
            IrNode::Free(n) => Some(n.value),
            _ => None,
        }
    }

    pub fn thread_handle(&self) -> Option<&Operand> {
        match self {
            IrNode::Fork(n) => Some(&n.handle),
            IrNode::Join(n) => Some(&n.handle),
            _ => None,
        }
    }

    pub fn thread_entry(&self) -> Option<&ThreadEntry> {
        match self {
            IrNode::Fork(n) => Some(&n.entry),
            _ => None,
        }
    }

    pub fn lock_value(&self) -> Option<&Operand> {
        match self {
            IrNode::Lock(n) | IrNode::Unlock(n) => Some(&n.lock),
            _ => None,
        }
    }

    pub fn as_fork(&self) -> Option<&ForkIr> {
        match self {
            IrNode::Fork(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_join(&self) -> Option<&JoinIr> {
        match self {
            IrNode::Join(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<&CallIr> {
        match self {
            IrNode::Call(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_barrier(&self) -> Option<&BarrierIr> {
        match self {
            IrNode::Barrier(n) => Some(n),
            _ => None,
        }
    }
}

impl fmt::Display for IrNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.category(), self.inst())?;
        if let Some(location) = self.location() {
            write!(f, " at {location}")?;
        }
        Ok(())
    }
}
