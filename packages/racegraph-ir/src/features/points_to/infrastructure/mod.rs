//! Points-to provider implementations
pub mod static_points_to;

pub use static_points_to::StaticPointsTo;
