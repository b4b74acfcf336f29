use anyhow::Result;
use clap::Parser;
use env_logger;

use tree_volume_3d::table;
use tree_volume_3d::volume::{volume_alg, Axis};

#[derive(Parser)]
struct Cli {
    /// Point table with columns X, Y, Z
    #[arg(long = "pointfile")]
    point_path: std::path::PathBuf,
    #[arg(default_value = "./ressources/height_bins.txt", long = "binsoutfile")]
    bins_out_path: std::path::PathBuf,
    #[arg(default_value_t = 0.5, long = "binsize")]
    bin_size: f64,
    #[arg(value_enum, default_value_t = Axis::Y, long = "axis")]
    axis: Axis,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Cli::parse();

    println!("Loading points");
    let points = volume_alg::load_points(&args.point_path)?;
    println!("{} points", points.len());

    let profile = volume_alg::count_points_in_height_bins(&points, args.axis, args.bin_size)?;
    println!("Bin edges: {:?}", profile.boundaries());
    println!("Bin counts: {:?}", profile.weights);

    println!("Saving bins");
    table::io::save_table(&args.bins_out_path, &profile.to_table()?)?;

    Ok(())
}
