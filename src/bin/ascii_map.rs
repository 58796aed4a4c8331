//! Debug tool: print a small biome map as text, one character per cell.

use std::collections::HashMap;

use clap::Parser;

use biome_mapper::biomes::Biome;
use biome_mapper::generator::{new_grid, AutomatonParams, Generator};
use biome_mapper::jitter::JitterMode;

#[derive(Parser, Debug)]
#[command(name = "ascii_map")]
#[command(about = "Print a biome map as ASCII")]
struct Args {
    #[arg(short = 'W', long, default_value = "96", allow_negative_numbers = true)]
    width: i64,

    #[arg(short = 'H', long, default_value = "40", allow_negative_numbers = true)]
    height: i64,

    #[arg(short, long, default_value = "12345")]
    seed: u64,

    #[arg(short, long, default_value = "0.05")]
    frequency: f64,

    /// Show the land-growth automaton instead of the noise map
    #[arg(long)]
    land_growth: bool,
}

fn main() {
    let args = Args::parse();

    let mut grid = match new_grid(args.width, args.height) {
        Ok(grid) => grid,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(i32::from(err.exit_code()));
        }
    };
    let mut generator = Generator::new(args.seed, JitterMode::Coordinate, AutomatonParams::default());

    if args.land_growth {
        if let Err(err) = generator.grow_land(&mut grid) {
            eprintln!("{err}");
            std::process::exit(i32::from(err.exit_code()));
        }
    } else {
        generator.fill_biome_map(&mut grid, args.frequency);
    }

    println!(
        "=== BIOME MAP ({}x{}) seed={} frequency={} ===",
        grid.width, grid.height, args.seed, args.frequency
    );
    println!("LEGEND:");
    for biome in Biome::ALL.into_iter().skip(1) {
        println!("  {} = {}", biome.ascii(), biome);
    }
    println!();

    let mut counts: HashMap<Biome, usize> = HashMap::new();
    for row in grid.rows() {
        let line: String = row
            .iter()
            .map(|cell| {
                *counts.entry(cell.biome).or_default() += 1;
                cell.biome.ascii()
            })
            .collect();
        println!("{line}");
    }

    println!();
    println!("BIOME DISTRIBUTION:");
    let total = grid.len() as f64;
    for biome in Biome::ALL {
        if let Some(&count) = counts.get(&biome) {
            println!("  {:<10} {:>6} ({:.1}%)", biome.label(), count, 100.0 * count as f64 / total);
        }
    }
}
