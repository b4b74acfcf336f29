use nalgebra::base::*;

/// Below this norm of the cross product, vectors are treated as parallel
pub const PARALLEL_EPSILON: f64 = 1e-12;

/// Direction vector going from point1 to point2
pub fn direction_vector(point1: &Vector3<f64>, point2: &Vector3<f64>) -> Vector3<f64> {
    point2 - point1
}

/// Rotation matrix aligning vec1 to vec2 (Rodrigues' formula)
///
/// Returns None if one of the vectors has a zero norm.
///
/// Parallel vectors give the identity. Anti-parallel vectors give a half turn
/// around an axis orthogonal to vec1, where the closed formula divides by zero.
pub fn rotation_from_vectors(vec1: &Vector3<f64>, vec2: &Vector3<f64>) -> Option<Matrix3<f64>> {
    let a = vec1.try_normalize(0.0)?;
    let b = vec2.try_normalize(0.0)?;
    if !a.iter().chain(b.iter()).all(|x| x.is_finite()) {
        return None;
    }

    let v = a.cross(&b);
    let c = a.dot(&b);
    let s = v.norm();

    if s < PARALLEL_EPSILON {
        if c > 0.0 {
            return Some(Matrix3::identity());
        }
        let axis = orthogonal_unit_vector(&a);
        return Some(2.0 * axis * axis.transpose() - Matrix3::identity());
    }

    let kmat = v.cross_matrix();
    Some(Matrix3::identity() + kmat + kmat * kmat * ((1.0 - c) / (s * s)))
}

/// Unit vector orthogonal to a unit vector
fn orthogonal_unit_vector(vec: &Vector3<f64>) -> Vector3<f64> {
    // cross with the canonical axis the least aligned with vec
    let ind_min = vec.iamin();
    let mut canonical = Vector3::zeros();
    canonical[ind_min] = 1.0;
    vec.cross(&canonical).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn assert_aligned(vec1: &Vector3<f64>, vec2: &Vector3<f64>) {
        let rot = rotation_from_vectors(vec1, vec2).unwrap();
        let rotated = rot * vec1.normalize();
        assert!(
            (rotated - vec2.normalize()).norm() < 1e-9,
            "{:?} rotated to {:?}, expected {:?}",
            vec1,
            rotated,
            vec2.normalize()
        );
        // still a rotation
        assert!((rot * rot.transpose() - Matrix3::identity()).norm() < 1e-9);
        assert!((rot.determinant() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn random_vectors_are_aligned() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let vec1 = Vector3::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
            );
            let vec2 = Vector3::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
            );
            if vec1.norm() < 1e-3 || vec2.norm() < 1e-3 {
                continue;
            }
            assert_aligned(&vec1, &vec2);
        }
    }

    #[test]
    fn same_direction_is_identity() {
        let vec = Vector3::new(0.3, -1.2, 2.0);
        let rot = rotation_from_vectors(&vec, &(vec * 4.0)).unwrap();
        assert!((rot - Matrix3::identity()).norm() < 1e-12);
    }

    #[test]
    fn opposite_direction_is_half_turn() {
        let z_axis = Vector3::new(0.0, 0.0, 1.0);
        assert_aligned(&z_axis, &Vector3::new(0.0, 0.0, -2.0));
        assert_aligned(
            &Vector3::new(1.0, 2.0, 3.0),
            &Vector3::new(-1.0, -2.0, -3.0),
        );
        let rot = rotation_from_vectors(&z_axis, &(-z_axis)).unwrap();
        assert!(rot.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn zero_vector_is_rejected() {
        let vec = Vector3::new(1.0, 0.0, 0.0);
        assert!(rotation_from_vectors(&vec, &Vector3::zeros()).is_none());
        assert!(rotation_from_vectors(&Vector3::zeros(), &vec).is_none());
    }

    #[test]
    fn direction_between_points() {
        let dir = direction_vector(&Vector3::new(1.0, 2.0, 3.0), &Vector3::new(2.0, 0.0, 3.5));
        assert_eq!(dir, Vector3::new(1.0, -2.0, 0.5));
    }
}
