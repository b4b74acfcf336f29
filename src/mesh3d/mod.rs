/// Triangle mesh with edge adjacency
pub mod generic_mesh3d;
/// Input/Ouput functions
pub mod io;
/// Mesh operations
pub mod mesh_operations;
pub use generic_mesh3d::GenericMesh3D;
