use std::path::PathBuf;

use clap::Parser;
use env_logger::{Builder, Env};

use tethys::{Config, Pipeline};

#[derive(Parser, Debug)]
#[command(version, about = "Compute and plot the sediment CDOM index from MODIS and SST imagery")]
struct Args {
    /// Path to the pipeline configuration file
    #[arg(short, long, default_value = "./data/config/cdom.json")]
    config: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_secs();
    builder.init();

    let args = Args::parse();

    println!("Starting sediment CDOM index processing...");

    let config = Config::from_file(&args.config)?;
    println!("Processing date range: {}", config.date_range());

    let pipeline = Pipeline::new(config);
    let summary = pipeline.run()?;

    let composite = &summary.composite;
    let total = composite.width * composite.height;
    println!(
        "Sediment CDOM index - Valid cells: {}/{} ({:.1}%)",
        composite.valid_count(),
        total,
        100.0 * composite.valid_count() as f32 / total.max(1) as f32
    );

    if let Some((min, max)) = composite.finite_min_max() {
        println!("  Min: {:.4}", min);
        println!("  Max: {:.4}", max);
        println!("  Mean: {:.4}", composite.mean());
    }

    for path in &summary.plots {
        println!("✓ Saved plot to: {}", path.display());
    }
    println!("Wrote {} plot(s)", summary.plots.len());

    Ok(())
}
