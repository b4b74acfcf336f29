/// Geometric operations
pub mod geometry;
/// Mesh object and operations
pub mod mesh3d;
/// Tree skeleton reconstruction
pub mod skeleton3d;
/// Delimited text tables
pub mod table;
/// Volume sampling and height profiles
pub mod volume;
