/// Axis aligned bounding box
pub mod bounding_box;
/// Vector alignment and elementary operations
pub mod geometry_operations;

pub use bounding_box::BoundingBox3;
