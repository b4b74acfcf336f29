use anyhow::Result;
use clap::Parser;
use env_logger;
use std::time::Instant;

use tree_volume_3d::table;
use tree_volume_3d::volume::{volume_alg, Axis, VolumeProfileParams};

#[derive(Parser)]
struct Cli {
    /// Closed mesh (.obj or .off)
    #[arg(long = "meshfile")]
    mesh_path: std::path::PathBuf,
    #[arg(default_value = "./ressources/volume_profile.txt", long = "profileoutfile")]
    profile_out_path: std::path::PathBuf,
    #[arg(default_value_t = 0.05, long = "voxelsize")]
    voxel_size: f64,
    #[arg(default_value_t = 0.5, long = "binsize")]
    bin_size: f64,
    #[arg(default_value_t = 10000, long = "batchsize")]
    batch_size: usize,
    #[arg(value_enum, default_value_t = Axis::Z, long = "axis")]
    axis: Axis,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let params = VolumeProfileParams {
        voxel_size: args.voxel_size,
        bin_size: args.bin_size,
        batch_size: args.batch_size,
        axis: args.axis,
    };

    println!("Computing volume profile");
    let now = Instant::now();
    let volume = volume_alg::compute_mesh_volume_profile(&args.mesh_path, &params)?;
    let duration = now.elapsed();
    let sec = duration.as_secs();
    let min = sec / 60;
    let sec = sec - min * 60;
    println!("Volume profile computed in {}m{}s", min, sec);
    println!("");

    println!("{} samples inside", volume.inside_points.len());
    println!("Bin edges: {:?}", volume.profile.edges);
    println!("Bin volumes: {:?}", volume.profile.weights);
    println!("Total volume: {}", volume.profile.total_weight());

    println!("Saving profile");
    table::io::save_table(&args.profile_out_path, &volume.profile.to_table()?)?;

    Ok(())
}
