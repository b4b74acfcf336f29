use anyhow::Result;
use nalgebra::base::*;
use std::collections::HashMap;

use crate::mesh3d::GenericMesh3D;

/// Closed cylinder around the z axis, base at z = 0 and top at z = height
///
/// The side is made of `resolution` faces around the axis and `split` rings
/// along the axis. Faces are oriented outwards.
pub fn create_cylinder(
    radius: f64,
    height: f64,
    resolution: usize,
    split: usize,
) -> Result<GenericMesh3D> {
    if resolution < 3 {
        return Err(anyhow::Error::msg(
            "create_cylinder(): Resolution should be at least 3",
        ));
    }
    if split < 1 {
        return Err(anyhow::Error::msg(
            "create_cylinder(): Split should be at least 1",
        ));
    }
    if !(radius > 0.0 && height > 0.0 && radius.is_finite() && height.is_finite()) {
        return Err(anyhow::Error::msg(
            "create_cylinder(): Radius and height should be positive",
        ));
    }

    let mut mesh = GenericMesh3D::new();
    let bottom = mesh.add_vertex(&Vector3::new(0.0, 0.0, 0.0));
    let top = mesh.add_vertex(&Vector3::new(0.0, 0.0, height));

    let mut rings = Vec::with_capacity(split + 1);
    for k in 0..=split {
        let z = height * (k as f64) / (split as f64);
        let ring: Vec<usize> = (0..resolution)
            .map(|i| {
                let ang = 2.0 * std::f64::consts::PI * (i as f64) / (resolution as f64);
                mesh.add_vertex(&Vector3::new(radius * ang.cos(), radius * ang.sin(), z))
            })
            .collect();
        rings.push(ring);
    }

    for i in 0..resolution {
        let j = (i + 1) % resolution;
        mesh.add_face(bottom, rings[0][j], rings[0][i])?;
        mesh.add_face(top, rings[split][i], rings[split][j])?;
        for k in 0..split {
            mesh.add_face(rings[k][i], rings[k][j], rings[k + 1][j])?;
            mesh.add_face(rings[k][i], rings[k + 1][j], rings[k + 1][i])?;
        }
    }

    Ok(mesh)
}

/// Applies `rotation` around the origin, then `translation`, to every vertex
pub fn transform_mesh(
    mesh: &mut GenericMesh3D,
    rotation: &Matrix3<f64>,
    translation: &Vector3<f64>,
) {
    for vert in mesh.vertices.iter_mut() {
        *vert = rotation * *vert + translation;
    }
}

/// Appends a mesh to another one
///
/// No boolean union is computed: buffers are concatenated, face indices are
/// offset, and every appended face gets `label` (or keeps its own if None).
pub fn merge_into(
    target: &mut GenericMesh3D,
    source: &GenericMesh3D,
    label: Option<i64>,
) -> Result<()> {
    let offset = target.get_nb_vertices();
    for vert in source.vertices.iter() {
        target.add_vertex(vert);
    }
    for (face, &face_label) in source.faces.iter().zip(source.labels.iter()) {
        target.add_labeled_face(
            face[0] + offset,
            face[1] + offset,
            face[2] + offset,
            label.or(face_label),
        )?;
    }
    Ok(())
}

/// Copy of the mesh where vertices with identical coordinates are merged
///
/// Faces becoming degenerate are dropped, duplicated faces are kept once.
pub fn weld_vertices(mesh: &GenericMesh3D) -> Result<GenericMesh3D> {
    let mut welded = GenericMesh3D::new();
    let mut corresp: HashMap<[u64; 3], usize> = HashMap::new();

    let new_inds: Vec<usize> = mesh
        .vertices
        .iter()
        .map(|vert| {
            // + 0.0 folds -0.0 onto 0.0
            let key = [
                (vert[0] + 0.0).to_bits(),
                (vert[1] + 0.0).to_bits(),
                (vert[2] + 0.0).to_bits(),
            ];
            *corresp
                .entry(key)
                .or_insert_with(|| welded.add_vertex(vert))
        })
        .collect();

    let mut nb_dropped = 0;
    for (face, &label) in mesh.faces.iter().zip(mesh.labels.iter()) {
        let [ind1, ind2, ind3] = [new_inds[face[0]], new_inds[face[1]], new_inds[face[2]]];
        if ind1 == ind2 || ind2 == ind3 || ind1 == ind3 {
            nb_dropped = nb_dropped + 1;
            continue;
        }
        welded.add_labeled_face(ind1, ind2, ind3, label)?;
    }

    log::debug!(
        "weld_vertices(): {} -> {} vertices, {} degenerate faces dropped",
        mesh.get_nb_vertices(),
        welded.get_nb_vertices(),
        nb_dropped
    );

    Ok(welded)
}
