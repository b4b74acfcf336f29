use anyhow::Result;
use nalgebra::base::*;
use std::path::{Path, PathBuf};

use crate::geometry::BoundingBox3;
use crate::mesh3d::{io, mesh_operations, GenericMesh3D};
use crate::table::{self, Table};
use crate::volume::height_profile::{self, HeightProfile};
use crate::volume::raycasting_scene::RaycastingScene;
use crate::volume::sample_grid::{Axis, SampleGrid};

/// Parameters of the mesh volume profile
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VolumeProfileParams {
    /// Distance between two samples
    pub voxel_size: f64,
    /// Height of the profile bins
    pub bin_size: f64,
    /// Number of rays per intersection query
    pub batch_size: usize,
    /// Height axis, also the direction of the rays
    pub axis: Axis,
}

impl Default for VolumeProfileParams {
    fn default() -> Self {
        VolumeProfileParams {
            voxel_size: 0.05,
            bin_size: 0.5,
            batch_size: 10000,
            axis: Axis::Z,
        }
    }
}

/// Volume profile of a mesh, with the samples found inside
pub struct VolumeProfile {
    pub profile: HeightProfile,
    pub inside_points: Vec<Vector3<f64>>,
}

/// Grid samples lying inside a closed mesh
///
/// A sample is inside when the ray going from it towards +axis crosses the
/// mesh an odd number of times. The mesh must be closed, otherwise the
/// result is meaningless (a warning is logged). Rays are processed by
/// batches of `batch_size`, which bounds the memory used but does not change
/// the result. Samples are returned in grid order.
pub fn sample_interior(
    mesh: &GenericMesh3D,
    bounds: &BoundingBox3,
    pitch: f64,
    batch_size: usize,
    axis: Axis,
) -> Result<Vec<Vector3<f64>>> {
    if batch_size == 0 {
        return Err(anyhow::Error::msg(
            "sample_interior(): Batch size should be positive",
        ));
    }
    let grid = SampleGrid::new(bounds, pitch)?;

    let nb_boundary = mesh.boundary_edges().len();
    if nb_boundary != 0 {
        log::warn!(
            "sample_interior(): Mesh is not closed ({} boundary edges), inside test is unreliable",
            nb_boundary
        );
    }

    let scene = RaycastingScene::from_mesh(mesh);
    let nb_samples = grid.get_nb_samples();
    log::info!(
        "Raycasting {} samples ({}x{}x{}) against {} triangles, {} per batch",
        nb_samples,
        grid.dims()[0],
        grid.dims()[1],
        grid.dims()[2],
        scene.get_nb_triangles(),
        batch_size
    );

    let mut inside_points = Vec::new();
    for range in grid.batches(batch_size) {
        let batch_points: Vec<Vector3<f64>> = range.map(|ind| grid.point(ind)).collect();
        let counts = scene.count_intersections(&batch_points, axis);
        inside_points.extend(
            batch_points
                .into_iter()
                .zip(counts)
                .filter_map(|(point, count)| if count % 2 == 1 { Some(point) } else { None }),
        );
    }

    log::info!("{} samples inside", inside_points.len());

    Ok(inside_points)
}

/// Volume profile of a closed mesh
///
/// Each inside sample weighs the volume of a voxel.
pub fn mesh_volume_profile(
    mesh: &GenericMesh3D,
    params: &VolumeProfileParams,
) -> Result<VolumeProfile> {
    let bounds = mesh
        .bounding_box()
        .ok_or(anyhow::Error::msg("mesh_volume_profile(): Empty mesh"))?;

    let inside_points = sample_interior(
        mesh,
        &bounds,
        params.voxel_size,
        params.batch_size,
        params.axis,
    )?;

    let heights: Vec<f64> = inside_points
        .iter()
        .map(|point| point[params.axis.ind()])
        .collect();
    let profile = height_profile::aggregate(&heights, params.bin_size, params.voxel_size.powi(3))?;

    Ok(VolumeProfile {
        profile,
        inside_points,
    })
}

/// Path of the inside samples dump of a mesh file
pub fn inside_voxels_path<P: AsRef<Path>>(mesh_path: P) -> PathBuf {
    let mesh_path = mesh_path.as_ref();
    let stem = mesh_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    mesh_path.with_file_name(format!("{}_inside_voxels.txt", stem))
}

/// Volume profile of a mesh file
///
/// The mesh is expected to be closed already. Duplicated vertices are merged
/// before sampling, and the inside samples are saved next to the mesh file
/// (`<stem>_inside_voxels.txt`).
pub fn compute_mesh_volume_profile<P: AsRef<Path>>(
    mesh_path: P,
    params: &VolumeProfileParams,
) -> Result<VolumeProfile> {
    log::info!("Computing volume profile for mesh: {}", mesh_path.as_ref().display());

    let mesh = io::load_mesh(&mesh_path)?;
    let mesh = mesh_operations::weld_vertices(&mesh)?;

    let volume_profile = mesh_volume_profile(&mesh, params)?;

    let dump_path = inside_voxels_path(&mesh_path);
    table::io::save_table(&dump_path, &Table::from_points(&volume_profile.inside_points))?;
    log::info!("Inside samples saved to {}", dump_path.display());

    Ok(volume_profile)
}

/// Number of points per height bin
pub fn count_points_in_height_bins(
    points: &[Vector3<f64>],
    axis: Axis,
    bin_size: f64,
) -> Result<HeightProfile> {
    let heights: Vec<f64> = points.iter().map(|point| point[axis.ind()]).collect();
    height_profile::aggregate(&heights, bin_size, 1.0)
}

/// Reads a point table, with columns `X Y Z` or `x y z`
pub fn load_points<P: AsRef<Path>>(filename: P) -> Result<Vec<Vector3<f64>>> {
    let table = table::io::read_table(filename)?;
    if table.column_index("X").is_some() {
        table.points("X", "Y", "Z")
    } else {
        table.points("x", "y", "z")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton3d::{skeleton_alg, CylinderParams, Segment};

    fn cube(min: f64, max: f64) -> Result<GenericMesh3D> {
        let mut mesh = GenericMesh3D::new();
        for &x in [min, max].iter() {
            for &y in [min, max].iter() {
                for &z in [min, max].iter() {
                    mesh.add_vertex(&Vector3::new(x, y, z));
                }
            }
        }
        // vertex index is 4 * ix + 2 * iy + iz
        let quads = [
            [0, 1, 3, 2],
            [4, 6, 7, 5],
            [0, 4, 5, 1],
            [2, 3, 7, 6],
            [0, 2, 6, 4],
            [1, 5, 7, 3],
        ];
        for quad in quads.iter() {
            mesh.add_face(quad[0], quad[1], quad[2])?;
            mesh.add_face(quad[0], quad[2], quad[3])?;
        }
        Ok(mesh)
    }

    #[test]
    fn unit_cube_sample_count() -> Result<()> {
        let mesh = cube(0.0, 1.0)?;
        assert!(mesh.is_watertight());
        let bounds = mesh.bounding_box().unwrap();

        let inside = sample_interior(&mesh, &bounds, 0.1, 10000, Axis::Z)?;
        // 10 samples per axis, the faces at the lower bounds included
        let expected = 1000.0;
        assert!(((inside.len() as f64) - expected).abs() <= 0.05 * expected);
        assert!(inside.iter().all(|point| bounds.contains(point)));
        Ok(())
    }

    #[test]
    fn nothing_inside_outside_the_mesh() -> Result<()> {
        let mesh = cube(0.0, 1.0)?;
        let bounds = BoundingBox3::new(Vector3::repeat(1.05), Vector3::repeat(2.0));
        let inside = sample_interior(&mesh, &bounds, 0.1, 100, Axis::Z)?;
        assert!(inside.is_empty());
        Ok(())
    }

    #[test]
    fn batch_size_does_not_change_result() -> Result<()> {
        let mesh = cube(-0.37, 0.61)?;
        let bounds = BoundingBox3::new(Vector3::repeat(-0.5), Vector3::repeat(0.7));
        let reference = sample_interior(&mesh, &bounds, 0.07, 10000, Axis::Z)?;
        assert!(!reference.is_empty());
        for batch_size in [1, 37, 1000] {
            let inside = sample_interior(&mesh, &bounds, 0.07, batch_size, Axis::Z)?;
            assert_eq!(inside, reference);
        }
        Ok(())
    }

    #[test]
    fn ray_axis_does_not_change_result() -> Result<()> {
        let mesh = cube(-0.37, 0.61)?;
        let bounds = BoundingBox3::new(Vector3::repeat(-0.5), Vector3::repeat(0.7));
        let along_z = sample_interior(&mesh, &bounds, 0.07, 500, Axis::Z)?;
        let along_x = sample_interior(&mesh, &bounds, 0.07, 500, Axis::X)?;
        assert_eq!(along_x, along_z);
        Ok(())
    }

    #[test]
    fn cylinder_volume_profile() -> Result<()> {
        let segments = vec![
            Segment::new(1, 0, Vector3::new(0.0, 0.0, 0.0), 0.5),
            Segment::new(2, 1, Vector3::new(0.0, 0.0, 2.0), 0.5),
        ];
        let params = CylinderParams {
            resolution: 64,
            split: 1,
        };
        let report = skeleton_alg::assemble(&segments, &params)?;

        let vol_params = VolumeProfileParams {
            voxel_size: 0.05,
            bin_size: 0.5,
            batch_size: 4096,
            axis: Axis::Z,
        };
        let volume = mesh_volume_profile(&report.mesh, &vol_params)?;
        let profile = &volume.profile;

        assert_eq!(profile.edges, vec![0.0, 0.5, 1.0, 1.5]);
        let expected_total = std::f64::consts::PI * 0.25 * 2.0;
        assert!((profile.total_weight() - expected_total).abs() < 0.05 * expected_total);
        for &weight in profile.weights.iter() {
            assert!((weight - expected_total / 4.0).abs() < 0.05 * expected_total / 4.0);
        }
        Ok(())
    }

    #[test]
    fn open_mesh_still_sampled() -> Result<()> {
        let mut mesh = cube(0.0, 1.0)?;
        // a dangling triangle opens the mesh
        let ind = mesh.add_vertex(&Vector3::new(2.0, 2.0, 2.0));
        mesh.add_face(0, 1, ind)?;
        assert!(!mesh.is_watertight());
        let bounds = BoundingBox3::new(Vector3::zeros(), Vector3::repeat(1.0));
        assert!(sample_interior(&mesh, &bounds, 0.25, 16, Axis::Z).is_ok());
        Ok(())
    }

    #[test]
    fn invalid_sampling_parameters() -> Result<()> {
        let mesh = cube(0.0, 1.0)?;
        let bounds = mesh.bounding_box().unwrap();
        assert!(sample_interior(&mesh, &bounds, 0.1, 0, Axis::Z).is_err());
        assert!(sample_interior(&mesh, &bounds, -0.1, 10, Axis::Z).is_err());
        assert!(mesh_volume_profile(&GenericMesh3D::new(), &VolumeProfileParams::default()).is_err());
        Ok(())
    }

    #[test]
    fn mesh_file_pipeline() -> Result<()> {
        let mesh = cube(0.0, 1.0)?;
        let mesh_path = std::env::temp_dir().join("tree_volume_3d_cube.obj");
        io::save_obj(&mesh_path, &mesh)?;

        let params = VolumeProfileParams {
            voxel_size: 0.25,
            bin_size: 0.5,
            batch_size: 10,
            axis: Axis::Z,
        };
        let volume = compute_mesh_volume_profile(&mesh_path, &params)?;
        let dump_path = inside_voxels_path(&mesh_path);
        let dumped = load_points(&dump_path)?;
        std::fs::remove_file(&mesh_path)?;
        std::fs::remove_file(&dump_path)?;

        assert_eq!(dumped, volume.inside_points);
        assert_eq!(volume.inside_points.len(), 64);
        assert_eq!(volume.profile.edges, vec![0.0, 0.5]);
        assert!((volume.profile.total_weight() - 1.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn point_height_bins() -> Result<()> {
        let points = vec![
            Vector3::new(3.0, 0.1, -7.0),
            Vector3::new(1.0, 0.3, 2.0),
            Vector3::new(0.0, 1.2, 0.0),
        ];
        let profile = count_points_in_height_bins(&points, Axis::Y, 0.5)?;
        assert_eq!(profile.edges, vec![0.0, 0.5, 1.0]);
        assert_eq!(profile.weights, vec![2.0, 0.0, 1.0]);
        Ok(())
    }

    #[test]
    fn dump_path_next_to_mesh() {
        let path = inside_voxels_path("/data/scans/tree_12.obj");
        assert_eq!(path, PathBuf::from("/data/scans/tree_12_inside_voxels.txt"));
    }
}
