use anyhow::Result;
use clap::Parser;
use env_logger;
use std::time::Instant;

use tree_volume_3d::mesh3d;
use tree_volume_3d::skeleton3d::{segment, skeleton_alg, CylinderParams};
use tree_volume_3d::table;

#[derive(Parser)]
struct Cli {
    /// Segment table with columns x, y, z, radius, parent_id, section_id
    #[arg(long = "treefile")]
    tree_path: std::path::PathBuf,
    /// Reads the input as a raycloud tree (or forest) file, one tree per line
    #[arg(long = "raycloud")]
    raycloud: bool,
    /// Saves the per tree attributes of a raycloud file
    #[arg(long = "treeattroutfile")]
    tree_attr_out_path: Option<std::path::PathBuf>,
    /// Output mesh, .obj or .ply (one color per segment)
    #[arg(default_value = "./ressources/skeleton.obj", long = "meshoutfile")]
    mesh_out_path: std::path::PathBuf,
    #[arg(default_value_t = 8, long = "resolution")]
    resolution: usize,
    #[arg(default_value_t = 4, long = "split")]
    split: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Cli::parse();

    println!("Loading segment table");
    let tree_table = if args.raycloud {
        let treefile = table::treefile::read_treefile(&args.tree_path)?;
        println!("{} trees", treefile.get_nb_trees());
        if let Some(ref tree_attr_out_path) = args.tree_attr_out_path {
            table::io::save_table(tree_attr_out_path, &treefile.trees)?;
        }
        treefile.segments
    } else {
        table::io::read_table(&args.tree_path)?
    };
    let trees = segment::segments_by_tree(&tree_table)?;
    println!("{} segments", tree_table.get_nb_rows());

    println!("Reconstructing skeleton");
    let now = Instant::now();
    let params = CylinderParams {
        resolution: args.resolution,
        split: args.split,
    };
    let report = skeleton_alg::assemble_forest(&trees, &params)?;
    let duration = now.elapsed();
    println!(
        "Skeleton reconstructed in {}ms: {} cylinders, {} segments skipped",
        duration.as_millis(),
        report.get_nb_built(),
        report.get_nb_skipped()
    );
    println!("");

    println!("Saving skeleton mesh");
    let is_ply = args
        .mesh_out_path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("ply"))
        .unwrap_or(false);
    if is_ply {
        mesh3d::io::save_ply(&args.mesh_out_path, &report.mesh)?;
    } else {
        mesh3d::io::save_obj(&args.mesh_out_path, &report.mesh)?;
    }

    Ok(())
}
