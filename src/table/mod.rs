/// Input/Output functions
pub mod io;
/// Table of named float columns
pub mod table;
/// Raycloud tree and forest files
pub mod treefile;
/// Point in voxel masking
pub mod voxels;
pub use table::Table;
pub use treefile::Treefile;
