//! Trace domain: events, thread traces, the program trace
pub mod event;
pub mod program_trace;
pub mod thread_trace;

pub use event::{AccessType, Event, EventId, EventKind, EventRef, ThreadId};
pub use program_trace::ProgramTrace;
pub use thread_trace::ThreadTrace;
