use anyhow::Result;
use nalgebra::base::*;
use rand::Rng;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;

use crate::mesh3d::GenericMesh3D;

fn parse_vertex<'a, I>(line_split: &mut I) -> Result<Vector3<f64>>
where
    I: Iterator<Item = &'a str>,
{
    let mut vert: Vector3<f64> = Vector3::new(0.0, 0.0, 0.0);
    for i in 0..3 {
        let cur = line_split
            .next()
            .ok_or(anyhow::Error::msg("Expected vertex coordinate"))?;
        vert[i] = cur.parse::<f64>()?;
    }
    Ok(vert)
}

/// Adds a polygon as a triangle fan, skipping degenerate triangles
///
/// Returns the number of skipped triangles
fn add_polygon(mesh: &mut GenericMesh3D, polygon: &[usize]) -> Result<usize> {
    if polygon.len() < 3 {
        return Err(anyhow::Error::msg("Face with less than 3 vertices"));
    }
    let mut nb_skipped = 0;
    for i in 1..(polygon.len() - 1) {
        let [ind1, ind2, ind3] = [polygon[0], polygon[i], polygon[i + 1]];
        if ind1 == ind2 || ind2 == ind3 || ind1 == ind3 {
            nb_skipped = nb_skipped + 1;
            continue;
        }
        mesh.add_face(ind1, ind2, ind3)?;
    }
    Ok(nb_skipped)
}

/// Loads obj file as generic mesh
///
/// Polygons are triangulated as fans, texture and normal indices are ignored.
pub fn load_obj<P: AsRef<Path>>(filename: P) -> Result<GenericMesh3D> {
    let mut mesh = GenericMesh3D::new();
    let mut nb_skipped = 0;

    let file = File::open(filename)?;
    let lines = io::BufReader::new(file).lines();
    for line_ in lines {
        let line = line_?;
        let mut line_split = line.split_whitespace();
        match line_split.next() {
            Some("v") => {
                let vert = parse_vertex(&mut line_split)?;
                mesh.add_vertex(&vert);
            }
            Some("f") => {
                let mut polygon = Vec::new();
                for cur in line_split {
                    let ind = cur
                        .split('/')
                        .next()
                        .ok_or(anyhow::Error::msg("Expected value"))?
                        .parse::<i64>()?;
                    // negative indices are relative to the last vertex
                    let ind = if ind < 0 {
                        mesh.get_nb_vertices() as i64 + ind
                    } else {
                        ind - 1
                    };
                    if ind < 0 {
                        return Err(anyhow::Error::msg("load_obj(): Invalid face index"));
                    }
                    polygon.push(ind as usize);
                }
                nb_skipped = nb_skipped + add_polygon(&mut mesh, &polygon)?;
            }
            _ => (),
        }
    }

    if nb_skipped != 0 {
        log::warn!("load_obj(): {} degenerate faces skipped", nb_skipped);
    }

    Ok(mesh)
}

/// Loads off file as generic mesh
pub fn load_off<P: AsRef<Path>>(filename: P) -> Result<GenericMesh3D> {
    let mut mesh = GenericMesh3D::new();

    let file = File::open(filename)?;
    let lines = io::BufReader::new(file).lines();
    let mut opt_sizes = None;
    let mut cur_vert = 0;
    let mut cur_face = 0;
    let mut nb_skipped = 0;
    for line_ in lines {
        let line = line_?;
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        match opt_sizes {
            None => {
                if line == "OFF" {
                    continue;
                }
                let mut line_split = line.split_whitespace();
                let nb_vert = line_split
                    .next()
                    .ok_or(anyhow::Error::msg("Expected number of vertices"))?
                    .parse::<usize>()?;
                let nb_face = line_split
                    .next()
                    .ok_or(anyhow::Error::msg("Expected number of faces"))?
                    .parse::<usize>()?;
                opt_sizes = Some((nb_vert, nb_face));
            }
            Some((nb_vert, nb_face)) => {
                let mut line_split = line.split_whitespace();
                if cur_vert < nb_vert {
                    let vert = parse_vertex(&mut line_split)?;
                    mesh.add_vertex(&vert);
                    cur_vert = cur_vert + 1;
                } else if cur_face < nb_face {
                    let nbv = line_split
                        .next()
                        .ok_or(anyhow::Error::msg("Expected face size"))?
                        .parse::<usize>()?;
                    let mut polygon = Vec::with_capacity(nbv);
                    for _ in 0..nbv {
                        let ind = line_split
                            .next()
                            .ok_or(anyhow::Error::msg("Expected vertex index"))?
                            .parse::<usize>()?;
                        polygon.push(ind);
                    }
                    nb_skipped = nb_skipped + add_polygon(&mut mesh, &polygon)?;
                    cur_face = cur_face + 1;
                }
            }
        }
    }

    if let Some((nb_vert, nb_face)) = opt_sizes {
        if cur_vert != nb_vert || cur_face != nb_face {
            return Err(anyhow::Error::msg("load_off(): Truncated file"));
        }
    } else {
        return Err(anyhow::Error::msg("load_off(): Missing header"));
    }
    if nb_skipped != 0 {
        log::warn!("load_off(): {} degenerate faces skipped", nb_skipped);
    }

    Ok(mesh)
}

/// Loads a mesh, choosing the format from the file extension
pub fn load_mesh<P: AsRef<Path>>(filename: P) -> Result<GenericMesh3D> {
    let extension = filename
        .as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());
    match extension.as_deref() {
        Some("obj") => load_obj(filename),
        Some("off") => load_off(filename),
        _ => Err(anyhow::Error::msg(
            "load_mesh(): Unknown mesh format (expected .obj or .off)",
        )),
    }
}

/// Save mesh as obj file
///
/// Labeled faces are written in groups named `section<label>`.
pub fn save_obj<P: AsRef<Path>>(filename: P, mesh: &GenericMesh3D) -> Result<()> {
    let mut file = BufWriter::new(File::create(filename)?);

    for vert in mesh.vertices.iter() {
        writeln!(file, "v {} {} {}", vert[0], vert[1], vert[2])?;
    }

    let mut groups: Vec<(i64, Vec<usize>)> = Vec::new();
    let mut group_of_label: HashMap<i64, usize> = HashMap::new();
    let mut non_grouped = Vec::new();
    for (ind_face, opt_lab) in mesh.labels.iter().enumerate() {
        if let Some(lab) = opt_lab {
            let ind_group = *group_of_label.entry(*lab).or_insert_with(|| {
                groups.push((*lab, Vec::new()));
                groups.len() - 1
            });
            groups[ind_group].1.push(ind_face);
        } else {
            non_grouped.push(ind_face);
        }
    }

    for &f in non_grouped.iter() {
        let face = mesh.faces[f];
        writeln!(file, "f {} {} {}", face[0] + 1, face[1] + 1, face[2] + 1)?;
    }
    for (lab, group) in groups {
        writeln!(file, "g section{}", lab)?;
        for &f in group.iter() {
            let face = mesh.faces[f];
            writeln!(file, "f {} {} {}", face[0] + 1, face[1] + 1, face[2] + 1)?;
        }
    }

    Ok(())
}

/// Save mesh as ascii ply file, with one random color per face label
pub fn save_ply<P: AsRef<Path>>(filename: P, mesh: &GenericMesh3D) -> Result<()> {
    let mut file = BufWriter::new(File::create(filename)?);

    writeln!(file, "ply")?;
    writeln!(file, "format ascii 1.0")?;

    writeln!(file, "element vertex {}", mesh.vertices.len())?;
    writeln!(file, "property float x")?;
    writeln!(file, "property float y")?;
    writeln!(file, "property float z")?;

    writeln!(file, "element face {}", mesh.faces.len())?;
    writeln!(file, "property list uchar int vertex_index")?;
    writeln!(file, "property uchar red")?;
    writeln!(file, "property uchar green")?;
    writeln!(file, "property uchar blue")?;

    writeln!(file, "end_header")?;

    for vert in mesh.vertices.iter() {
        writeln!(file, "{} {} {}", vert[0], vert[1], vert[2])?;
    }

    let mut rng = rand::thread_rng();
    let mut colors: HashMap<Option<i64>, [u8; 3]> = HashMap::new();
    for (face, label) in mesh.faces.iter().zip(mesh.labels.iter()) {
        let col = *colors.entry(*label).or_insert_with(|| {
            let rand_r = rng.gen_range(0..11) as f64;
            let rand_g = rng.gen_range(0..11) as f64;
            let rand_b = rng.gen_range(0..11) as f64;
            [
                (255.0 * rand_r / 10.0) as u8,
                (255.0 * rand_g / 10.0) as u8,
                (255.0 * rand_b / 10.0) as u8,
            ]
        });
        writeln!(
            file,
            "3 {} {} {} {} {} {}",
            face[0], face[1], face[2], col[0], col[1], col[2]
        )?;
    }

    Ok(())
}
