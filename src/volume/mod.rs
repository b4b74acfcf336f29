/// Height binning of samples
pub mod height_profile;
/// Accelerated ray crossing counts
pub mod raycasting_scene;
/// Implicit regular sample grid
pub mod sample_grid;
/// Inside sampling and volume profiles
pub mod volume_alg;
pub use height_profile::HeightProfile;
pub use sample_grid::{Axis, SampleGrid};
pub use volume_alg::VolumeProfileParams;
