use anyhow::Result;
use nalgebra::base::*;

use crate::geometry::BoundingBox3;

/// Mesh vertex
pub type Vertex = Vector3<f64>;
/// Mesh edge (sorted vertex indices)
pub type Edge = [usize; 2];
/// Mesh face (array of vertex indices, in winding order)
pub type Face = [usize; 3];

#[derive(Clone, Debug, Default)]
/// Triangle mesh stored as growable vertex/face buffers, with edge adjacency
///
/// Faces keep their winding. A face may carry a label, used to tag the faces
/// coming from the same primitive (for instance a skeleton segment).
pub struct GenericMesh3D {
    pub(super) vertices: Vec<Vertex>,
    pub(super) edges: Vec<Edge>,
    pub(super) faces: Vec<Face>,
    pub(super) labels: Vec<Option<i64>>,

    pub(super) map_vert_edg: Vec<Vec<usize>>,
    pub(super) map_edg_face: Vec<Vec<usize>>,
}

fn sorted_face(face: &Face) -> Face {
    let mut sorted = *face;
    sorted.sort();
    sorted
}

impl GenericMesh3D {
    /// Generic mesh constructor
    pub fn new() -> GenericMesh3D {
        GenericMesh3D {
            vertices: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
            labels: Vec::new(),

            map_vert_edg: Vec::new(),
            map_edg_face: Vec::new(),
        }
    }

    /// Adds a vertex to the mesh
    pub fn add_vertex(&mut self, point: &Vector3<f64>) -> usize {
        self.vertices.push(*point);
        self.map_vert_edg.push(Vec::new());
        self.vertices.len() - 1
    }

    /// Vertex getter
    pub fn get_vertex(&self, ind_vertex: usize) -> Result<Vertex> {
        if ind_vertex >= self.vertices.len() {
            return Err(anyhow::Error::msg("get_vertex(): Index out of bounds"));
        }

        Ok(self.vertices[ind_vertex])
    }

    /// All vertices
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Gets number of vertices
    pub fn get_nb_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Adds an edge to the mesh
    pub fn add_edge(&mut self, ind_vertex1: usize, ind_vertex2: usize) -> Result<usize> {
        let edge = if ind_vertex1 < ind_vertex2 {
            [ind_vertex1, ind_vertex2]
        } else {
            [ind_vertex2, ind_vertex1]
        };
        let [ind_vertex1, ind_vertex2] = edge;
        if ind_vertex2 >= self.map_vert_edg.len() {
            return Err(anyhow::Error::msg("add_edge(): Vertex index out of bounds"));
        }
        if ind_vertex1 == ind_vertex2 {
            return Err(anyhow::Error::msg("add_edge(): Degenerate edge"));
        }

        let ind_edge = self.is_edge_in(ind_vertex1, ind_vertex2);

        match ind_edge {
            Some(ind) => Ok(ind),
            None => {
                self.edges.push(edge);
                self.map_edg_face.push(Vec::new());
                self.map_vert_edg[ind_vertex1].push(self.edges.len() - 1);
                self.map_vert_edg[ind_vertex2].push(self.edges.len() - 1);
                Ok(self.edges.len() - 1)
            }
        }
    }

    /// Edge getter
    pub fn get_edge(&self, ind_edge: usize) -> Result<Edge> {
        if ind_edge >= self.edges.len() {
            return Err(anyhow::Error::msg("get_edge(): Index out of bounds"));
        }
        Ok(self.edges[ind_edge])
    }

    /// Get number of edges
    pub fn get_nb_edges(&self) -> usize {
        self.edges.len()
    }

    /// Adds a face to the mesh
    ///
    /// Returns the index of the existing face if the same vertex triplet is
    /// already in the mesh, whatever its winding.
    pub fn add_face(
        &mut self,
        ind_vertex1: usize,
        ind_vertex2: usize,
        ind_vertex3: usize,
    ) -> Result<usize> {
        self.add_labeled_face(ind_vertex1, ind_vertex2, ind_vertex3, None)
    }

    /// Adds a face to the mesh, with a label
    pub fn add_labeled_face(
        &mut self,
        ind_vertex1: usize,
        ind_vertex2: usize,
        ind_vertex3: usize,
        label: Option<i64>,
    ) -> Result<usize> {
        let face = [ind_vertex1, ind_vertex2, ind_vertex3];
        let key = sorted_face(&face);
        if key[2] >= self.map_vert_edg.len() {
            return Err(anyhow::Error::msg("add_face(): Vertex index out of bounds"));
        }
        if key[0] == key[1] || key[1] == key[2] {
            return Err(anyhow::Error::msg("add_face(): Degenerate face"));
        }

        if let Some(ind_fac) = self.is_face_in(ind_vertex1, ind_vertex2, ind_vertex3) {
            return Ok(ind_fac);
        }

        let ind_edge1 = self.add_edge(key[0], key[1])?;
        let ind_edge2 = self.add_edge(key[1], key[2])?;
        let ind_edge3 = self.add_edge(key[0], key[2])?;

        self.faces.push(face);
        self.labels.push(label);
        let ind_face = self.faces.len() - 1;

        self.map_edg_face[ind_edge1].push(ind_face);
        self.map_edg_face[ind_edge2].push(ind_face);
        self.map_edg_face[ind_edge3].push(ind_face);

        Ok(ind_face)
    }

    /// Face getter
    pub fn get_face(&self, ind_face: usize) -> Result<Face> {
        if ind_face >= self.faces.len() {
            return Err(anyhow::Error::msg("get_face(): Index out of bounds"));
        }
        Ok(self.faces[ind_face])
    }

    /// All faces
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Face label getter
    pub fn get_face_label(&self, ind_face: usize) -> Result<Option<i64>> {
        if ind_face >= self.labels.len() {
            return Err(anyhow::Error::msg("get_face_label(): Index out of bounds"));
        }
        Ok(self.labels[ind_face])
    }

    /// Gets number of faces
    pub fn get_nb_faces(&self) -> usize {
        self.faces.len()
    }

    /// Coordinates of the three vertices of a face
    pub fn face_coordinates(&self, ind_face: usize) -> Result<[Vertex; 3]> {
        let face = self.get_face(ind_face)?;
        Ok([
            self.vertices[face[0]],
            self.vertices[face[1]],
            self.vertices[face[2]],
        ])
    }

    /// Checks if an edge is in the mesh
    ///
    /// Returns edge index if found
    pub fn is_edge_in(&self, ind_vertex1: usize, ind_vertex2: usize) -> Option<usize> {
        let edge = if ind_vertex1 < ind_vertex2 {
            [ind_vertex1, ind_vertex2]
        } else {
            [ind_vertex2, ind_vertex1]
        };
        if edge[1] >= self.vertices.len() {
            return None;
        }
        self.map_vert_edg[edge[0]]
            .iter()
            .find(|&&ind_edg| self.edges[ind_edg] == edge)
            .copied()
    }

    /// Checks if a face is in the mesh
    ///
    /// Returns face index if found
    pub fn is_face_in(
        &self,
        ind_vertex1: usize,
        ind_vertex2: usize,
        ind_vertex3: usize,
    ) -> Option<usize> {
        let key = sorted_face(&[ind_vertex1, ind_vertex2, ind_vertex3]);
        if key[2] >= self.vertices.len() {
            return None;
        }
        let ind_edg = self.is_edge_in(key[0], key[1])?;
        self.map_edg_face[ind_edg]
            .iter()
            .find(|&&ind_face| sorted_face(&self.faces[ind_face]) == key)
            .copied()
    }

    /// Edges not shared by exactly two faces
    pub fn boundary_edges(&self) -> Vec<usize> {
        self.map_edg_face
            .iter()
            .enumerate()
            .filter_map(|(ind_edg, faces)| {
                if faces.len() != 2 {
                    Some(ind_edg)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Checks that every edge is shared by exactly two faces
    pub fn is_watertight(&self) -> bool {
        !self.faces.is_empty() && self.map_edg_face.iter().all(|faces| faces.len() == 2)
    }

    /// Bounding box of the vertices, None for an empty mesh
    pub fn bounding_box(&self) -> Option<BoundingBox3> {
        BoundingBox3::from_points(self.vertices.iter())
    }
}
