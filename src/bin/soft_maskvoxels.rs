use anyhow::Result;
use clap::Parser;
use env_logger;

use tree_volume_3d::table::{io, voxels};

#[derive(Parser)]
struct Cli {
    /// Voxel table with columns X, Y, Z, VOX_WIDTH
    #[arg(long = "voxelfile")]
    voxel_path: std::path::PathBuf,
    /// Point table with columns X, Y, Z
    #[arg(long = "pointfile")]
    point_path: std::path::PathBuf,
    #[arg(default_value = "./ressources/masked_voxels.txt", long = "voxeloutfile")]
    voxel_out_path: std::path::PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Cli::parse();

    println!("Loading voxels and points");
    let voxel_table = io::read_table(&args.voxel_path)?;
    let point_table = io::read_table(&args.point_path)?;

    println!("Masking voxels");
    let masked = voxels::points_mask_voxels(&voxel_table, &point_table)?;
    println!(
        "{} of {} voxels contain points",
        masked.get_nb_rows(),
        voxel_table.get_nb_rows()
    );

    println!("Saving voxels");
    io::save_table(&args.voxel_out_path, &masked)?;

    Ok(())
}
