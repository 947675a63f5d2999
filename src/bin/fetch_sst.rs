//! Download 8-day SST composites rendered by the NASA NEO service.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use env_logger::{Builder, Env};

use tethys::fetch::periods::SstFetchConfig;
use tethys::fetch::{build_client, download, RetryPolicy};

#[derive(Parser, Debug)]
#[command(version, about = "Download SST composites for the configured date windows")]
struct Args {
    /// Path to the fetch configuration file
    #[arg(short, long, default_value = "./data/config/sst_fetch.json")]
    config: PathBuf,

    /// Extra attempts after a failed download
    #[arg(long, default_value_t = 0)]
    retries: u32,
}

fn main() {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_secs();
    builder.init();

    let args = Args::parse();

    let config = match SstFetchConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };

    let client = match build_client(Duration::from_secs(300)) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to build HTTP client: {}", e);
            return;
        }
    };

    let targets = config.targets();
    println!("Requesting {} SST composite(s)", targets.len());

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

    println!("Downloaded {}/{} composite(s)", downloaded, targets.len());
}
