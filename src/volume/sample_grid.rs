use anyhow::Result;
use nalgebra::base::*;
use std::ops::Range;

use crate::geometry::BoundingBox3;

/// Coordinate axis
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Axis {
    X,
    Y,
    #[default]
    Z,
}

impl Axis {
    /// Index of the coordinate
    pub fn ind(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Indices of the two other coordinates, in direct order
    pub fn others(self) -> [usize; 2] {
        match self {
            Axis::X => [1, 2],
            Axis::Y => [2, 0],
            Axis::Z => [0, 1],
        }
    }

    /// Unit vector along the axis
    pub fn direction(self) -> Vector3<f64> {
        let mut dir = Vector3::zeros();
        dir[self.ind()] = 1.0;
        dir
    }
}

/// Regular grid of sample points over a box, never stored
///
/// Along each axis, samples are `min + i * pitch` for `i` in
/// `0..ceil((max - min) / pitch)`, so the upper bound is excluded.
/// Samples are indexed in row major order, x varying the slowest.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SampleGrid {
    origin: Vector3<f64>,
    pitch: f64,
    dims: [usize; 3],
}

impl SampleGrid {
    pub fn new(bounds: &BoundingBox3, pitch: f64) -> Result<SampleGrid> {
        if !(pitch.is_finite() && pitch > 0.0) {
            return Err(anyhow::Error::msg(
                "SampleGrid::new(): Pitch should be positive",
            ));
        }
        if !bounds
            .min
            .iter()
            .chain(bounds.max.iter())
            .all(|x| x.is_finite())
        {
            return Err(anyhow::Error::msg(
                "SampleGrid::new(): Bounds should be finite",
            ));
        }

        let mut dims = [0; 3];
        for i in 0..3 {
            let extent = bounds.max[i] - bounds.min[i];
            dims[i] = if extent > 0.0 {
                (extent / pitch).ceil() as usize
            } else {
                0
            };
        }
        dims.iter()
            .try_fold(1usize, |nb, &dim| nb.checked_mul(dim))
            .ok_or(anyhow::Error::msg("SampleGrid::new(): Too many samples"))?;

        Ok(SampleGrid {
            origin: bounds.min,
            pitch,
            dims,
        })
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    /// Total number of samples
    pub fn get_nb_samples(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// Sample point of a flat index
    pub fn point(&self, ind: usize) -> Vector3<f64> {
        debug_assert!(ind < self.get_nb_samples());
        let [_, ny, nz] = self.dims;
        let ix = ind / (ny * nz);
        let iy = (ind / nz) % ny;
        let iz = ind % nz;
        Vector3::new(
            self.origin[0] + (ix as f64) * self.pitch,
            self.origin[1] + (iy as f64) * self.pitch,
            self.origin[2] + (iz as f64) * self.pitch,
        )
    }

    /// Contiguous index ranges covering every sample exactly once
    ///
    /// All ranges have `batch_size` indices, except maybe the last one.
    pub fn batches(&self, batch_size: usize) -> impl Iterator<Item = Range<usize>> {
        let nb_samples = self.get_nb_samples();
        let batch_size = batch_size.max(1);
        (0..nb_samples)
            .step_by(batch_size)
            .map(move |start| start..(start + batch_size).min(nb_samples))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_grid() -> SampleGrid {
        let bounds = BoundingBox3::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.5, 0.25));
        SampleGrid::new(&bounds, 0.25).unwrap()
    }

    #[test]
    fn upper_bound_is_excluded() {
        let grid = unit_grid();
        assert_eq!(grid.dims(), [4, 2, 1]);
        assert_eq!(grid.get_nb_samples(), 8);
    }

    #[test]
    fn row_major_indexing() {
        let grid = unit_grid();
        assert_eq!(grid.point(0), Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(grid.point(1), Vector3::new(0.0, 0.25, 0.0));
        assert_eq!(grid.point(2), Vector3::new(0.25, 0.0, 0.0));
        assert_eq!(grid.point(7), Vector3::new(0.75, 0.25, 0.0));
    }

    #[test]
    fn batches_cover_every_index_once() {
        let bounds = BoundingBox3::new(Vector3::zeros(), Vector3::new(1.0, 1.0, 1.0));
        let grid = SampleGrid::new(&bounds, 0.1).unwrap();
        let nb_samples = grid.get_nb_samples();
        for batch_size in [1, 7, 37, nb_samples, nb_samples + 5] {
            let mut next = 0;
            for range in grid.batches(batch_size) {
                assert_eq!(range.start, next);
                assert!(range.end > range.start);
                assert!(range.len() <= batch_size);
                next = range.end;
            }
            assert_eq!(next, nb_samples);
        }
    }

    #[test]
    fn flat_box_has_no_sample() {
        let bounds = BoundingBox3::new(Vector3::zeros(), Vector3::new(1.0, 1.0, 0.0));
        let grid = SampleGrid::new(&bounds, 0.1).unwrap();
        assert_eq!(grid.get_nb_samples(), 0);
        assert_eq!(grid.batches(10).count(), 0);
    }

    #[test]
    fn invalid_pitch() {
        let bounds = BoundingBox3::new(Vector3::zeros(), Vector3::new(1.0, 1.0, 1.0));
        assert!(SampleGrid::new(&bounds, 0.0).is_err());
        assert!(SampleGrid::new(&bounds, f64::NAN).is_err());
    }

    #[test]
    fn axes() {
        assert_eq!(Axis::default(), Axis::Z);
        assert_eq!(Axis::Y.others(), [2, 0]);
        assert_eq!(Axis::X.direction(), Vector3::new(1.0, 0.0, 0.0));
    }
}
