//! Download MODIS L1B granules listed in a LAADS order manifest.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use env_logger::{Builder, Env};
use log::warn;

use tethys::fetch::manifest::{targets_from_csv, DEFAULT_URL_COLUMN, LAADS_BASE_URL};
use tethys::fetch::{build_client, download, RetryPolicy};

#[derive(Parser, Debug)]
#[command(version, about = "Download MODIS granules from a LAADS CSV manifest")]
struct Args {
    /// CSV manifest exported from the LAADS order page
    csv_file: PathBuf,

    /// Directory the granules are written into
    #[arg(long, default_value = "./data/satdata/modis")]
    download_folder: PathBuf,

    /// LAADS app key, read from the environment when not given
    #[arg(long, env = "DEFAULT_TOKEN")]
    token: Option<String>,

    /// Manifest column holding the file URLs
    #[arg(long, default_value = DEFAULT_URL_COLUMN)]
    column_name: String,

    /// Extra attempts after a failed download
    #[arg(long, default_value_t = 0)]
    retries: u32,
}

fn main() {
    dotenvy::dotenv().ok();

    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_secs();
    builder.init();

    let args = Args::parse();

    if args.token.is_none() {
        warn!("No DEFAULT_TOKEN set, LAADS may reject the downloads");
    }

    println!("Files will be downloaded to: {}", args.download_folder.display());

    let client = match build_client(Duration::from_secs(300)) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to build HTTP client: {}", e);
            return;
        }
    };

    let targets = match targets_from_csv(
        &args.csv_file,
        &args.column_name,
        LAADS_BASE_URL,
        &args.download_folder,
        args.token.as_deref(),
    ) {
        Ok(targets) => targets,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };

    println!("Found {} granule(s) in the manifest", targets.len());

    let policy = RetryPolicy::with_retries(args.retries);
    let mut downloaded = 0usize;

    for target in &targets {
        match download(&client, target, &policy) {
            Ok(path) => {
                println!("✓ Downloaded: {}", path.display());
                downloaded += 1;
            }
            Err(e) => println!("✗ {}", e),
        }
    }

    println!("Downloaded {}/{} granule(s)", downloaded, targets.len());
}
