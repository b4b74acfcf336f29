use nalgebra::base::*;

/// Axis aligned bounding box
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox3 {
    pub min: Vector3<f64>,
    pub max: Vector3<f64>,
}

impl BoundingBox3 {
    /// Bounding box from its two corners
    pub fn new(min: Vector3<f64>, max: Vector3<f64>) -> BoundingBox3 {
        BoundingBox3 { min, max }
    }

    /// Empty bounding box, neutral for extension
    pub fn empty() -> BoundingBox3 {
        BoundingBox3 {
            min: Vector3::repeat(f64::INFINITY),
            max: Vector3::repeat(f64::NEG_INFINITY),
        }
    }

    /// Smallest box containing all points, None if there is no point
    pub fn from_points<'a, I>(points: I) -> Option<BoundingBox3>
    where
        I: IntoIterator<Item = &'a Vector3<f64>>,
    {
        let bbox = points
            .into_iter()
            .fold(BoundingBox3::empty(), |mut bbox, point| {
                bbox.extend_point(point);
                bbox
            });
        if bbox.is_empty() {
            None
        } else {
            Some(bbox)
        }
    }

    pub fn is_empty(&self) -> bool {
        (0..3).any(|i| self.min[i] > self.max[i])
    }

    pub fn extend_point(&mut self, point: &Vector3<f64>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    pub fn extend_box(&mut self, other: &BoundingBox3) {
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
    }

    pub fn extent(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Index of the longest axis
    pub fn longest_axis(&self) -> usize {
        self.extent().imax()
    }

    /// Closed membership test
    pub fn contains(&self, point: &Vector3<f64>) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }
}
