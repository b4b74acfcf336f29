use anyhow::Result;
use nalgebra::base::*;

use crate::geometry::BoundingBox3;
use crate::table::Table;

/// Keeps the voxels containing at least one point
///
/// Voxels are rows with columns `X Y Z VOX_WIDTH` (center and edge length),
/// points are rows with columns `X Y Z`. A point on a voxel face is inside.
/// The returned table has the columns of the voxel table.
pub fn points_mask_voxels(voxels: &Table, points: &Table) -> Result<Table> {
    let centers = voxels.points("X", "Y", "Z")?;
    let widths = voxels.column("VOX_WIDTH")?;
    let mut points = points.points("X", "Y", "Z")?;

    // sorted along x, to only test the points in the voxel slab
    points.sort_by(|p1, p2| p1[0].total_cmp(&p2[0]));

    let mut masked = Table::new(voxels.header());
    for (ind_voxel, (center, &width)) in centers.iter().zip(widths.iter()).enumerate() {
        let half = Vector3::repeat(width / 2.0);
        let voxel = BoundingBox3::new(center - half, center + half);

        let first = points.partition_point(|point| point[0] < voxel.min[0]);
        let occupied = points[first..]
            .iter()
            .take_while(|point| point[0] <= voxel.max[0])
            .any(|point| voxel.contains(point));

        if occupied {
            masked.add_row(&voxels.get_row(ind_voxel)?)?;
        }
    }

    log::debug!(
        "points_mask_voxels(): {} of {} voxels contain points",
        masked.get_nb_rows(),
        voxels.get_nb_rows()
    );

    Ok(masked)
}
