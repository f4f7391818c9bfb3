//! # Points-to Provider
//!
//! The race analysis consumes points-to results, it does not compute them.
//! This feature defines the provider contract and a table-backed provider.
//!
//! ## Usage
//! ```
//! use racegraph_ir::features::points_to::{PointsToProvider, StaticPointsTo};
//! use racegraph_ir::shared::models::ValueId;
//!
//! let mut pts = StaticPointsTo::new();
//! let global = pts.object("global");
//! pts.bind(ValueId(0), [global]);
//! pts.bind(ValueId(1), [global]);
//!
//! assert!(pts.may_alias(ValueId(0), ValueId(1)));
//! assert!(pts.must_alias(ValueId(0), ValueId(1)));
//! ```

pub mod domain;
pub mod infrastructure;
pub mod ports;

// Re-exports for public API
pub use domain::abstract_object::AbstractObject;
pub use infrastructure::static_points_to::StaticPointsTo;
pub use ports::PointsToProvider;
