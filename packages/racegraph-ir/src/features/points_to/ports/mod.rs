//! Ports (Interfaces) for Points-to Analysis
//!
//! The provider is queried while function summaries are built (indirect
//! calls and thread entries), while shared memory is indexed (accessed and
//! freed objects) and while lock sets are compared (lock identity).

use crate::features::points_to::domain::AbstractObject;
use crate::shared::models::{Operand, ValueId};

/// Points-to results for one analyzed module
///
/// `Send + Sync` so that per-object race checks can run on the rayon pool.
pub trait PointsToProvider: Send + Sync {
    /// Objects `value` may point to (empty when unknown)
    fn points_to(&self, value: ValueId) -> Vec<AbstractObject>;

    /// Objects deallocated when `value` is freed
    fn freed_objects(&self, value: ValueId) -> Vec<AbstractObject> {
        self.points_to(value)
    }

    /// Functions a function pointer may target
    fn function_targets(&self, _value: ValueId) -> Vec<String> {
        Vec::new()
    }

    /// Human-readable name of an object, for reports
    fn describe(&self, _object: AbstractObject) -> Option<String> {
        None
    }

    /// Check if two values may point to a common object
    fn may_alias(&self, a: ValueId, b: ValueId) -> bool {
        if a == b {
            return true;
        }
        let pts_b = self.points_to(b);
        self.points_to(a).iter().any(|obj| pts_b.contains(obj))
    }

    /// Check if two values certainly denote the same object
    ///
    /// Identical values, or both point to exactly one and the same object.
    fn must_alias(&self, a: ValueId, b: ValueId) -> bool {
        if a == b {
            return true;
        }
        match (self.points_to(a).as_slice(), self.points_to(b).as_slice()) {
            ([x], [y]) => x == y,
            _ => false,
        }
    }

    /// `may_alias` lifted to operands (thread handles)
    fn operands_may_alias(&self, a: &Operand, b: &Operand) -> bool {
        match (a, b) {
            (Operand::Value(x), Operand::Value(y)) => self.may_alias(*x, *y),
            (Operand::Function(x), Operand::Function(y)) => x == y,
            (Operand::Result(x), Operand::Result(y)) => x == y,
            _ => false,
        }
    }

    /// `must_alias` lifted to operands (lock identities)
    fn operands_must_alias(&self, a: &Operand, b: &Operand) -> bool {
        match (a, b) {
            (Operand::Value(x), Operand::Value(y)) => self.must_alias(*x, *y),
            (Operand::Function(x), Operand::Function(y)) => x == y,
            (Operand::Result(x), Operand::Result(y)) => x == y,
            (Operand::Const(x), Operand::Const(y)) => x == y,
            _ => false,
        }
    }
}
