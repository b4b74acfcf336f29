//! Triangle scene answering batched ray crossing counts.
//!
//! Triangles are stored in a balanced bounding box tree with implicit
//! indexing: children of node `i` are `2 * i + 1` and `2 * i + 2`. Primitives
//! are split at the median centroid along the longest axis of their box.
//!
//! Rays are axis aligned, so a ray/triangle test reduces to a point in
//! triangle test in the plane orthogonal to the ray. Points on an edge
//! shared by two triangles are given to exactly one of them (half open edge
//! rule), so that a ray going through an edge or a vertex of a closed mesh
//! is counted once.

use nalgebra::base::*;
use rayon::prelude::*;

use crate::geometry::BoundingBox3;
use crate::mesh3d::GenericMesh3D;
use crate::volume::sample_grid::Axis;

const INNER: usize = usize::MAX;
const EMPTY: usize = usize::MAX - 1;

#[derive(Copy, Clone, Debug)]
struct Node {
    /// Triangle index for leaves, INNER or EMPTY otherwise
    idx: usize,
    bbox: BoundingBox3,
}

impl Node {
    fn empty() -> Node {
        Node {
            idx: EMPTY,
            bbox: BoundingBox3::empty(),
        }
    }
}

struct BuildInput {
    idx: usize,
    bbox: BoundingBox3,
    centroid: Vector3<f64>,
}

/// Accelerated triangle soup for ray crossing counts
pub struct RaycastingScene {
    triangles: Vec<[Vector3<f64>; 3]>,
    nodes: Vec<Node>,
}

/// Signed double area of (p0, p1, p), positive when p is left of p0 -> p1
fn orient(p0: &Vector2<f64>, p1: &Vector2<f64>, p: &Vector2<f64>) -> f64 {
    (p1[0] - p0[0]) * (p[1] - p0[1]) - (p1[1] - p0[1]) * (p[0] - p0[0])
}

/// Same as `orient`, but computed from the same end point whatever the edge
/// direction, so that both triangles sharing an edge get opposite values
fn edge_function(p0: &Vector2<f64>, p1: &Vector2<f64>, p: &Vector2<f64>) -> f64 {
    if (p0[0], p0[1]) < (p1[0], p1[1]) {
        orient(p0, p1, p)
    } else {
        -orient(p1, p0, p)
    }
}

/// Ownership of the points lying exactly on an edge of a direct triangle
fn owns_edge(p0: &Vector2<f64>, p1: &Vector2<f64>) -> bool {
    let dx = p1[0] - p0[0];
    let dy = p1[1] - p0[1];
    dy < 0.0 || (dy == 0.0 && dx > 0.0)
}

/// Checks if the ray from `origin` towards +axis crosses the triangle
pub fn ray_crosses_triangle(triangle: &[Vector3<f64>; 3], origin: &Vector3<f64>, axis: Axis) -> bool {
    let [u, v] = axis.others();
    let a = axis.ind();
    let proj = |p: &Vector3<f64>| Vector2::new(p[u], p[v]);

    let mut tri = *triangle;
    let area = orient(&proj(&tri[0]), &proj(&tri[1]), &proj(&tri[2]));
    if area == 0.0 || !area.is_finite() {
        // triangle parallel to the ray
        return false;
    }
    if area < 0.0 {
        tri.swap(1, 2);
    }

    let pts = [proj(&tri[0]), proj(&tri[1]), proj(&tri[2])];
    let pt = proj(origin);

    // weights[i] is the edge function of the edge opposite to vertex i
    let mut weights = [0.0; 3];
    for i in 0..3 {
        let p0 = &pts[(i + 1) % 3];
        let p1 = &pts[(i + 2) % 3];
        let w = edge_function(p0, p1, &pt);
        if w < 0.0 || (w == 0.0 && !owns_edge(p0, p1)) {
            return false;
        }
        weights[i] = w;
    }

    let sum = weights[0] + weights[1] + weights[2];
    if sum <= 0.0 {
        return false;
    }
    let hit = (weights[0] * tri[0][a] + weights[1] * tri[1][a] + weights[2] * tri[2][a]) / sum;
    hit > origin[a]
}

fn next_power_of_2(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

impl RaycastingScene {
    /// Scene made of the faces of a mesh
    pub fn from_mesh(mesh: &GenericMesh3D) -> RaycastingScene {
        let vertices = mesh.vertices();
        let triangles = mesh
            .faces()
            .iter()
            .map(|face| [vertices[face[0]], vertices[face[1]], vertices[face[2]]])
            .collect();
        RaycastingScene::from_triangles(triangles)
    }

    /// Scene made of a triangle soup
    pub fn from_triangles(triangles: Vec<[Vector3<f64>; 3]>) -> RaycastingScene {
        if triangles.is_empty() {
            return RaycastingScene {
                triangles,
                nodes: Vec::new(),
            };
        }

        let mut input: Vec<BuildInput> = triangles
            .iter()
            .enumerate()
            .map(|(idx, tri)| {
                let mut bbox = BoundingBox3::empty();
                for p in tri.iter() {
                    bbox.extend_point(p);
                }
                BuildInput {
                    idx,
                    bbox,
                    centroid: (tri[0] + tri[1] + tri[2]) / 3.0,
                }
            })
            .collect();

        let mut scene = RaycastingScene {
            nodes: vec![Node::empty(); next_power_of_2(triangles.len()) * 2 - 1],
            triangles,
        };
        scene.build_recursive(&mut input, 0);
        scene
    }

    fn build_recursive(&mut self, input: &mut [BuildInput], ind_node: usize) {
        debug_assert!(ind_node < self.nodes.len());
        if input.len() == 1 {
            self.nodes[ind_node] = Node {
                idx: input[0].idx,
                bbox: input[0].bbox,
            };
            return;
        }

        let mut bbox = input[0].bbox;
        for inp in input.iter().skip(1) {
            bbox.extend_box(&inp.bbox);
        }
        let dim = bbox.longest_axis();

        // left half gets the extra element, keeping the tree within its
        // power of two capacity
        let center = (input.len() - 1) / 2;
        input.select_nth_unstable_by(center, |i1, i2| {
            i1.centroid[dim].total_cmp(&i2.centroid[dim])
        });

        self.nodes[ind_node] = Node { idx: INNER, bbox };

        let (left, right) = input.split_at_mut(center + 1);
        self.build_recursive(left, 2 * ind_node + 1);
        self.build_recursive(right, 2 * ind_node + 2);
    }

    pub fn get_nb_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Number of triangles crossed by the ray from `origin` towards +axis
    pub fn count_ray_intersections(&self, origin: &Vector3<f64>, axis: Axis) -> u32 {
        if self.nodes.is_empty() {
            return 0;
        }
        let [u, v] = axis.others();
        let a = axis.ind();

        let mut count = 0;
        let mut stack = vec![0];
        while let Some(ind_node) = stack.pop() {
            let node = &self.nodes[ind_node];
            if node.idx == EMPTY {
                continue;
            }
            let bbox = &node.bbox;
            if origin[u] < bbox.min[u]
                || origin[u] > bbox.max[u]
                || origin[v] < bbox.min[v]
                || origin[v] > bbox.max[v]
                || bbox.max[a] <= origin[a]
            {
                continue;
            }
            if node.idx == INNER {
                stack.push(2 * ind_node + 1);
                stack.push(2 * ind_node + 2);
            } else if ray_crosses_triangle(&self.triangles[node.idx], origin, axis) {
                count = count + 1;
            }
        }
        count
    }

    /// Crossing counts of a batch of rays sharing the same direction
    ///
    /// Rays of the batch are processed in parallel.
    pub fn count_intersections(&self, origins: &[Vector3<f64>], axis: Axis) -> Vec<u32> {
        origins
            .par_iter()
            .map(|origin| self.count_ray_intersections(origin, axis))
            .collect()
    }
}
