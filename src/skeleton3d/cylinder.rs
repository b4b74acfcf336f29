use anyhow::Result;
use nalgebra::base::*;

use crate::geometry::geometry_operations;
use crate::mesh3d::{mesh_operations, GenericMesh3D};
use crate::skeleton3d::outcome::{Degeneracy, SkipReason};

/// Segments shorter than this are zero length
pub const DEGENERATE_LENGTH: f64 = 1e-9;

/// Axis of the cylinder before rotation
pub fn canonical_axis() -> Vector3<f64> {
    Vector3::new(0.0, 0.0, 1.0)
}

/// Tessellation of the cylinders
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CylinderParams {
    /// Number of faces around the axis
    pub resolution: usize,
    /// Number of rings along the axis
    pub split: usize,
}

impl Default for CylinderParams {
    fn default() -> Self {
        CylinderParams {
            resolution: 8,
            split: 4,
        }
    }
}

/// Cylinder spanning a segment, before tessellation
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CylinderPrimitive {
    pub radius: f64,
    pub height: f64,
    /// Aligns the canonical axis to the segment direction
    pub rotation: Matrix3<f64>,
    /// Position of the base
    pub translation: Vector3<f64>,
}

impl CylinderPrimitive {
    /// Cylinder going from `start` to `end`
    pub fn build(
        start: &Vector3<f64>,
        end: &Vector3<f64>,
        radius: f64,
    ) -> Result<CylinderPrimitive, SkipReason> {
        if !start.iter().chain(end.iter()).all(|x| x.is_finite()) {
            return Err(SkipReason::DegenerateGeometry(Degeneracy::NonFinite));
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(SkipReason::DegenerateGeometry(Degeneracy::InvalidRadius(
                radius,
            )));
        }

        let direction = geometry_operations::direction_vector(start, end);
        let height = direction.norm();
        if height < DEGENERATE_LENGTH {
            return Err(SkipReason::DegenerateGeometry(Degeneracy::ZeroLength));
        }

        let rotation = geometry_operations::rotation_from_vectors(&canonical_axis(), &direction)
            .ok_or(SkipReason::DegenerateGeometry(Degeneracy::ZeroLength))?;

        Ok(CylinderPrimitive {
            radius,
            height,
            rotation,
            translation: *start,
        })
    }

    /// Tessellated cylinder, rotated and translated in place
    pub fn to_mesh(&self, params: &CylinderParams) -> Result<GenericMesh3D> {
        let mut mesh =
            mesh_operations::create_cylinder(self.radius, self.height, params.resolution, params.split)?;
        mesh_operations::transform_mesh(&mut mesh, &self.rotation, &self.translation);
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cylinder_spans_segment() -> Result<()> {
        let start = Vector3::new(1.0, 2.0, 3.0);
        let end = Vector3::new(2.0, 4.0, 1.0);
        let cyl = CylinderPrimitive::build(&start, &end, 0.25)?;
        assert!((cyl.height - 3.0).abs() < 1e-12);

        let mesh = cyl.to_mesh(&CylinderParams::default())?;
        assert!(mesh.is_watertight());
        // base and top centers
        assert!((mesh.get_vertex(0)? - start).norm() < 1e-9);
        assert!((mesh.get_vertex(1)? - end).norm() < 1e-9);
        // every rim vertex stays at radius from the axis
        let axis = (end - start).normalize();
        for vert in mesh.vertices().iter().skip(2) {
            let rel = vert - start;
            let dist = (rel - axis * rel.dot(&axis)).norm();
            assert!((dist - 0.25).abs() < 1e-9);
        }
        Ok(())
    }

    #[test]
    fn downward_cylinder() -> Result<()> {
        let start = Vector3::new(0.0, 0.0, 5.0);
        let end = Vector3::new(0.0, 0.0, 4.0);
        let cyl = CylinderPrimitive::build(&start, &end, 0.1)?;
        assert!(cyl.rotation.iter().all(|x| x.is_finite()));
        let top = cyl.rotation * canonical_axis() * cyl.height + cyl.translation;
        assert!((top - end).norm() < 1e-9);
        Ok(())
    }

    #[test]
    fn degenerate_segments() {
        let point = Vector3::new(1.0, 1.0, 1.0);
        assert_eq!(
            CylinderPrimitive::build(&point, &point, 0.1),
            Err(SkipReason::DegenerateGeometry(Degeneracy::ZeroLength))
        );
        assert_eq!(
            CylinderPrimitive::build(&point, &Vector3::zeros(), -0.1),
            Err(SkipReason::DegenerateGeometry(Degeneracy::InvalidRadius(-0.1)))
        );
        assert_eq!(
            CylinderPrimitive::build(&point, &Vector3::new(f64::NAN, 0.0, 0.0), 0.1),
            Err(SkipReason::DegenerateGeometry(Degeneracy::NonFinite))
        );
    }
}
