/// Oriented cylinder spanning a segment
pub mod cylinder;
/// Per segment outcome of the skeleton reconstruction
pub mod outcome;
/// Tree segment table rows
pub mod segment;
/// Skeleton reconstruction from a segment table
pub mod skeleton_alg;
pub use cylinder::{CylinderParams, CylinderPrimitive};
pub use outcome::{SegmentOutcome, SkipReason};
pub use segment::Segment;
